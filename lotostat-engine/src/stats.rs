use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use lotostat_db::models::{Draw, GameRuleset};

use crate::numbers::{
    count_even, count_multiples, count_primes, quadrant_counts, sum, MULTIPLE_DIVISORS,
    QUADRANT_COUNT,
};

pub const NO_DATE: &str = "N/A";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvenOdd {
    pub even: usize,
    pub odd: usize,
}

/// Instantané calculé en une passe sur l'historique d'une modalité.
/// Toutes les séries par tirage suivent l'ordre chronologique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub last_update: String,
    pub draw_count: usize,
    pub even_odd: Vec<EvenOdd>,
    pub primes: Vec<usize>,
    pub multiples: BTreeMap<u8, Vec<usize>>,
    pub quadrants: [Vec<usize>; QUADRANT_COUNT],
    pub sums: Vec<u32>,
    /// Tirages écoulés depuis la dernière sortie, pour chaque numéro de l'univers.
    pub lateness: BTreeMap<u8, u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SumSummary {
    pub min: u32,
    pub max: u32,
    pub mean: f64,
}

/// `draws` du plus ancien au plus récent.
pub fn compute_statistics(draws: &[Draw], rules: &GameRuleset) -> Statistics {
    let mut stats = Statistics {
        last_update: draws
            .last()
            .map(|d| d.date.clone())
            .unwrap_or_else(|| NO_DATE.to_string()),
        draw_count: draws.len(),
        even_odd: Vec::with_capacity(draws.len()),
        primes: Vec::with_capacity(draws.len()),
        multiples: MULTIPLE_DIVISORS
            .iter()
            .map(|&m| (m, Vec::with_capacity(draws.len())))
            .collect(),
        quadrants: Default::default(),
        sums: Vec::with_capacity(draws.len()),
        lateness: rules.universe().map(|n| (n, 0)).collect(),
    };

    for draw in draws {
        let sorted = draw.sorted_numbers();

        let even = count_even(&sorted);
        stats.even_odd.push(EvenOdd { even, odd: sorted.len() - even });

        stats.primes.push(count_primes(&sorted));

        for (&m, series) in stats.multiples.iter_mut() {
            series.push(count_multiples(&sorted, m));
        }

        stats.sums.push(sum(&sorted));

        let counts = quadrant_counts(&sorted, rules.max_number);
        for (series, count) in stats.quadrants.iter_mut().zip(counts) {
            series.push(count);
        }

        for (n, delay) in stats.lateness.iter_mut() {
            if sorted.binary_search(n).is_ok() {
                *delay = 0;
            } else {
                *delay += 1;
            }
        }
    }

    log::debug!(
        "{}: statistiques calculées sur {} tirages (dernier : {})",
        rules.name,
        stats.draw_count,
        stats.last_update
    );

    stats
}

impl Statistics {
    /// Occurrences de chaque répartition pairs/impairs, triées par nombre de pairs.
    pub fn even_odd_histogram(&self) -> Vec<(EvenOdd, usize)> {
        let mut counts: BTreeMap<(usize, usize), usize> = BTreeMap::new();
        for eo in &self.even_odd {
            *counts.entry((eo.even, eo.odd)).or_insert(0) += 1;
        }
        counts
            .into_iter()
            .map(|((even, odd), count)| (EvenOdd { even, odd }, count))
            .collect()
    }

    pub fn prime_histogram(&self) -> Vec<(usize, usize)> {
        let mut counts: BTreeMap<usize, usize> = BTreeMap::new();
        for &p in &self.primes {
            *counts.entry(p).or_insert(0) += 1;
        }
        counts.into_iter().collect()
    }

    pub fn quadrant_averages(&self) -> [f64; QUADRANT_COUNT] {
        let mut averages = [0.0; QUADRANT_COUNT];
        for (avg, series) in averages.iter_mut().zip(&self.quadrants) {
            *avg = mean(series.iter().map(|&c| c as f64), series.len());
        }
        averages
    }

    pub fn multiple_averages(&self) -> Vec<(u8, f64)> {
        self.multiples
            .iter()
            .map(|(&m, series)| (m, mean(series.iter().map(|&c| c as f64), series.len())))
            .collect()
    }

    pub fn sum_summary(&self) -> Option<SumSummary> {
        let min = *self.sums.iter().min()?;
        let max = *self.sums.iter().max()?;
        let mean = mean(self.sums.iter().map(|&s| s as f64), self.sums.len());
        Some(SumSummary { min, max, mean })
    }

    /// Numéros les plus en retard d'abord ; à retard égal, le plus petit numéro d'abord.
    pub fn most_late(&self, limit: usize) -> Vec<(u8, u32)> {
        let mut ranked: Vec<(u8, u32)> = self.lateness.iter().map(|(&n, &d)| (n, d)).collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        ranked.truncate(limit);
        ranked
    }

    pub fn recent_sums(&self, limit: usize) -> &[u32] {
        let start = self.sums.len().saturating_sub(limit);
        &self.sums[start..]
    }

    pub fn lateness_of(&self, n: u8) -> u32 {
        self.lateness.get(&n).copied().unwrap_or(0)
    }
}

fn mean(values: impl Iterator<Item = f64>, len: usize) -> f64 {
    if len == 0 {
        return 0.0;
    }
    values.sum::<f64>() / len as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use lotostat_db::models::{LOTOFACIL, MEGA_SENA};

    fn draw(id: u32, numbers: &[u8]) -> Draw {
        Draw {
            sequence_id: id,
            date: format!("{:02}/03/2024", id),
            numbers: numbers.to_vec(),
        }
    }

    #[test]
    fn test_empty_history() {
        let stats = compute_statistics(&[], &MEGA_SENA);
        assert_eq!(stats.draw_count, 0);
        assert_eq!(stats.last_update, NO_DATE);
        assert!(stats.even_odd.is_empty());
        assert!(stats.primes.is_empty());
        assert!(stats.sums.is_empty());
        assert!(stats.quadrants.iter().all(|q| q.is_empty()));
        assert!(stats.multiples.values().all(|s| s.is_empty()));
        assert_eq!(stats.multiples.len(), 5);
        assert_eq!(stats.lateness.len(), 60);
        assert!(stats.lateness.values().all(|&d| d == 0));
        assert_eq!(stats.sum_summary(), None);
        assert_eq!(stats.quadrant_averages(), [0.0; 4]);
    }

    #[test]
    fn test_single_draw_lateness() {
        let stats = compute_statistics(&[draw(1, &[1, 2, 3, 4, 5, 6])], &MEGA_SENA);
        for n in 1..=6 {
            assert_eq!(stats.lateness[&n], 0, "numéro {n}");
        }
        for n in 7..=60 {
            assert_eq!(stats.lateness[&n], 1, "numéro {n}");
        }
    }

    #[test]
    fn test_lateness_replay() {
        let draws = vec![
            draw(1, &[1, 2, 3, 4, 5, 6]),
            draw(2, &[1, 7, 8, 9, 10, 11]),
            draw(3, &[12, 13, 14, 15, 16, 17]),
        ];
        let stats = compute_statistics(&draws, &MEGA_SENA);
        assert_eq!(stats.lateness[&12], 0);
        assert_eq!(stats.lateness[&1], 1);
        assert_eq!(stats.lateness[&7], 1);
        assert_eq!(stats.lateness[&2], 2);
        assert_eq!(stats.lateness[&60], 3);
        assert_eq!(stats.last_update, "03/03/2024");
    }

    #[test]
    fn test_per_draw_series() {
        let draws = vec![
            draw(1, &[60, 2, 3, 15, 16, 31]),
            draw(2, &[10, 20, 30, 40, 50, 59]),
        ];
        let stats = compute_statistics(&draws, &MEGA_SENA);
        assert_eq!(stats.draw_count, 2);
        assert_eq!(stats.even_odd[0], EvenOdd { even: 3, odd: 3 });
        assert_eq!(stats.even_odd[1], EvenOdd { even: 5, odd: 1 });
        assert_eq!(stats.primes, vec![3, 1]);
        assert_eq!(stats.sums, vec![127, 209]);
        assert_eq!(stats.multiples[&2], vec![3, 5]);
        assert_eq!(stats.multiples[&3], vec![3, 1]);
        assert_eq!(stats.multiples[&4], vec![2, 2]);
        assert_eq!(stats.multiples[&5], vec![2, 5]);
        assert_eq!(stats.multiples[&6], vec![1, 1]);
        assert_eq!(stats.quadrants[0], vec![3, 1]);
        assert_eq!(stats.quadrants[1], vec![1, 2]);
        assert_eq!(stats.quadrants[2], vec![1, 1]);
        assert_eq!(stats.quadrants[3], vec![1, 2]);
    }

    #[test]
    fn test_lotofacil_quadrants_sum_to_draw_size() {
        let draws = vec![draw(1, &[1, 3, 5, 6, 7, 9, 12, 13, 14, 18, 19, 20, 22, 24, 25])];
        let stats = compute_statistics(&draws, &LOTOFACIL);
        let total: usize = stats.quadrants.iter().map(|q| q[0]).sum();
        assert_eq!(total, 15);
        assert_eq!(stats.quadrants[0][0], 4);
        assert_eq!(stats.quadrants[1][0], 3);
        assert_eq!(stats.quadrants[2][0], 3);
        assert_eq!(stats.quadrants[3][0], 5);
    }

    #[test]
    fn test_summaries() {
        let draws = vec![
            draw(1, &[1, 2, 3, 4, 5, 6]),
            draw(2, &[2, 4, 6, 8, 10, 12]),
            draw(3, &[1, 3, 5, 7, 9, 11]),
            draw(4, &[7, 8, 9, 10, 11, 12]),
        ];
        let stats = compute_statistics(&draws, &MEGA_SENA);

        let eo = stats.even_odd_histogram();
        assert_eq!(
            eo,
            vec![
                (EvenOdd { even: 0, odd: 6 }, 1),
                (EvenOdd { even: 3, odd: 3 }, 2),
                (EvenOdd { even: 6, odd: 0 }, 1),
            ]
        );

        let summary = stats.sum_summary().unwrap();
        assert_eq!(summary.min, 21);
        assert_eq!(summary.max, 57);
        assert!((summary.mean - 39.0).abs() < 1e-10);

        assert_eq!(stats.recent_sums(2), &[36, 57]);
        assert_eq!(stats.recent_sums(10).len(), 4);

        let late = stats.most_late(3);
        assert_eq!(late, vec![(13, 4), (14, 4), (15, 4)]);

        let averages = stats.quadrant_averages();
        assert!((averages[0] - 6.0).abs() < 1e-10);
        assert!((averages[1] - 0.0).abs() < 1e-10);
    }

    #[test]
    fn test_prime_histogram() {
        let draws = vec![
            draw(1, &[2, 3, 5, 8, 10, 12]),
            draw(2, &[4, 6, 8, 10, 12, 14]),
            draw(3, &[7, 9, 20, 22, 24, 26]),
        ];
        let stats = compute_statistics(&draws, &MEGA_SENA);
        assert_eq!(stats.prime_histogram(), vec![(0, 1), (1, 1), (3, 1)]);
    }
}
