use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use lotostat_db::models::GameRuleset;

use crate::numbers::{count_even, count_multiples, count_primes, quadrant_counts, sum, QUADRANT_COUNT};
use crate::stats::Statistics;

/// Ce dont un validateur a besoin en plus de la combinaison elle-même.
#[derive(Debug, Clone, Copy)]
pub struct ValidationContext<'a> {
    pub rules: &'a GameRuleset,
    pub stats: &'a Statistics,
}

pub trait Constraint {
    fn name(&self) -> &'static str;
    /// `combination` est triée et sans doublon.
    fn accepts(&self, combination: &[u8], ctx: &ValidationContext<'_>) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatenessParams {
    pub required_late_count: usize,
    pub min_delay: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvenOddParams {
    pub even: usize,
    pub odd: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimesParams {
    #[serde(default)]
    pub min: Option<usize>,
    #[serde(default)]
    pub max: Option<usize>,
}

/// Diviseur → nombre exact de multiples. Les diviseurs absents ne sont pas contraints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiplesParams {
    #[serde(default)]
    pub targets: BTreeMap<u8, usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "params", rename_all = "snake_case")]
pub enum StrategyConstraint {
    Lateness(LatenessParams),
    EvenOdd(EvenOddParams),
    Primes(PrimesParams),
    Multiples(MultiplesParams),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuadrantBound {
    #[serde(default)]
    pub min: Option<usize>,
    /// `Some(0)` est traité comme « pas de maximum », comme l'ancien écran de saisie.
    #[serde(default)]
    pub max: Option<usize>,
}

impl QuadrantBound {
    pub fn effective_max(&self) -> Option<usize> {
        self.max.filter(|&m| m != 0)
    }

    pub fn contains(&self, count: usize) -> bool {
        self.min.map_or(true, |min| count >= min)
            && self.effective_max().map_or(true, |max| count <= max)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuadrantParams {
    #[serde(default)]
    pub bounds: [QuadrantBound; QUADRANT_COUNT],
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SumParams {
    #[serde(default)]
    pub min: Option<u32>,
    #[serde(default)]
    pub max: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "params", rename_all = "snake_case")]
pub enum FilterConstraint {
    Quadrants(QuadrantParams),
    SumTotal(SumParams),
}

impl StrategyConstraint {
    pub fn lateness(&self) -> Option<&LatenessParams> {
        match self {
            StrategyConstraint::Lateness(p) => Some(p),
            _ => None,
        }
    }
}

impl Constraint for StrategyConstraint {
    fn name(&self) -> &'static str {
        match self {
            StrategyConstraint::Lateness(_) => "Numéros en retard",
            StrategyConstraint::EvenOdd(_) => "Pairs / impairs",
            StrategyConstraint::Primes(_) => "Nombres premiers",
            StrategyConstraint::Multiples(_) => "Multiples",
        }
    }

    fn accepts(&self, combination: &[u8], ctx: &ValidationContext<'_>) -> bool {
        match self {
            StrategyConstraint::Lateness(p) => {
                let late = combination
                    .iter()
                    .filter(|&&n| ctx.stats.lateness_of(n) >= p.min_delay)
                    .count();
                late == p.required_late_count
            }
            StrategyConstraint::EvenOdd(p) => {
                let even = count_even(combination);
                even == p.even && combination.len() - even == p.odd
            }
            StrategyConstraint::Primes(p) => {
                let primes = count_primes(combination);
                let min = p.min.unwrap_or(0);
                let max = p.max.unwrap_or(combination.len());
                primes >= min && primes <= max
            }
            StrategyConstraint::Multiples(p) => p
                .targets
                .iter()
                .all(|(&divisor, &target)| count_multiples(combination, divisor) == target),
        }
    }
}

impl Constraint for FilterConstraint {
    fn name(&self) -> &'static str {
        match self {
            FilterConstraint::Quadrants(_) => "Quadrants",
            FilterConstraint::SumTotal(_) => "Somme totale",
        }
    }

    fn accepts(&self, combination: &[u8], ctx: &ValidationContext<'_>) -> bool {
        match self {
            FilterConstraint::SumTotal(p) => {
                let total = sum(combination);
                let min = p.min.unwrap_or(0);
                let max = p
                    .max
                    .unwrap_or(ctx.rules.max_number as u32 * combination.len() as u32);
                total >= min && total <= max
            }
            FilterConstraint::Quadrants(p) => {
                let counts = quadrant_counts(combination, ctx.rules.max_number);
                counts
                    .iter()
                    .zip(&p.bounds)
                    .all(|(&count, bound)| bound.contains(count))
            }
        }
    }
}

/// Stratégies d'abord, puis filtres ; arrêt au premier échec.
pub fn is_valid(
    combination: &[u8],
    strategies: &[StrategyConstraint],
    filters: &[FilterConstraint],
    ctx: &ValidationContext<'_>,
) -> bool {
    strategies.iter().all(|s| s.accepts(combination, ctx))
        && filters.iter().all(|f| f.accepts(combination, ctx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::compute_statistics;
    use lotostat_db::models::{Draw, LOTOFACIL, MEGA_SENA};

    fn empty_stats(rules: &GameRuleset) -> Statistics {
        compute_statistics(&[], rules)
    }

    fn ctx<'a>(rules: &'a GameRuleset, stats: &'a Statistics) -> ValidationContext<'a> {
        ValidationContext { rules, stats }
    }

    #[test]
    fn test_even_odd_requires_both() {
        let stats = empty_stats(&MEGA_SENA);
        let c = ctx(&MEGA_SENA, &stats);
        let combo = [2, 4, 6, 7, 9, 11];

        assert!(StrategyConstraint::EvenOdd(EvenOddParams { even: 3, odd: 3 }).accepts(&combo, &c));
        assert!(!StrategyConstraint::EvenOdd(EvenOddParams { even: 3, odd: 2 }).accepts(&combo, &c));
        assert!(!StrategyConstraint::EvenOdd(EvenOddParams { even: 4, odd: 3 }).accepts(&combo, &c));
    }

    #[test]
    fn test_primes_defaults() {
        let stats = empty_stats(&MEGA_SENA);
        let c = ctx(&MEGA_SENA, &stats);
        let combo = [2, 3, 5, 10, 20, 30];

        assert!(StrategyConstraint::Primes(PrimesParams::default()).accepts(&combo, &c));
        assert!(StrategyConstraint::Primes(PrimesParams { min: Some(3), max: None }).accepts(&combo, &c));
        assert!(!StrategyConstraint::Primes(PrimesParams { min: Some(4), max: None }).accepts(&combo, &c));
        assert!(!StrategyConstraint::Primes(PrimesParams { min: None, max: Some(2) }).accepts(&combo, &c));
        assert!(!StrategyConstraint::Primes(PrimesParams { min: None, max: Some(0) }).accepts(&combo, &c));
    }

    #[test]
    fn test_multiples_only_listed_divisors() {
        let stats = empty_stats(&MEGA_SENA);
        let c = ctx(&MEGA_SENA, &stats);
        let combo = [3, 6, 9, 10, 11, 13];

        let params = MultiplesParams { targets: BTreeMap::from([(3, 3)]) };
        assert!(StrategyConstraint::Multiples(params).accepts(&combo, &c));

        let params = MultiplesParams { targets: BTreeMap::from([(3, 3), (5, 0)]) };
        assert!(!StrategyConstraint::Multiples(params).accepts(&combo, &c));

        let params = MultiplesParams::default();
        assert!(StrategyConstraint::Multiples(params).accepts(&combo, &c));
    }

    #[test]
    fn test_lateness_exact_count() {
        let draws = vec![
            Draw { sequence_id: 1, date: "01/01/2024".into(), numbers: vec![1, 2, 3, 4, 5, 6] },
            Draw { sequence_id: 2, date: "04/01/2024".into(), numbers: vec![7, 8, 9, 10, 11, 12] },
        ];
        let stats = compute_statistics(&draws, &MEGA_SENA);
        let c = ctx(&MEGA_SENA, &stats);
        let strategy = StrategyConstraint::Lateness(LatenessParams { required_late_count: 2, min_delay: 2 });

        // 13.. ont un retard de 2, 1..=6 de 1, 7..=12 de 0
        assert!(strategy.accepts(&[1, 7, 8, 9, 13, 14], &c));
        assert!(!strategy.accepts(&[1, 7, 8, 13, 14, 15], &c));
        assert!(!strategy.accepts(&[1, 2, 7, 8, 9, 13], &c));
    }

    #[test]
    fn test_sum_defaults() {
        let stats = empty_stats(&MEGA_SENA);
        let c = ctx(&MEGA_SENA, &stats);
        let combo = [55, 56, 57, 58, 59, 60];

        assert!(FilterConstraint::SumTotal(SumParams::default()).accepts(&combo, &c));
        assert!(FilterConstraint::SumTotal(SumParams { min: Some(345), max: None }).accepts(&combo, &c));
        assert!(!FilterConstraint::SumTotal(SumParams { min: Some(346), max: None }).accepts(&combo, &c));
        assert!(!FilterConstraint::SumTotal(SumParams { min: Some(100), max: Some(120) }).accepts(&combo, &c));
    }

    #[test]
    fn test_quadrants_bounds() {
        let stats = empty_stats(&LOTOFACIL);
        let c = ctx(&LOTOFACIL, &stats);
        // 1-6 : 5, 7-12 : 4, 13-18 : 3, 19-25 : 3
        let combo = [1, 2, 3, 4, 5, 7, 8, 9, 10, 13, 14, 15, 19, 20, 25];

        let mut params = QuadrantParams::default();
        assert!(FilterConstraint::Quadrants(params).accepts(&combo, &c));

        params.bounds[0] = QuadrantBound { min: Some(5), max: Some(5) };
        params.bounds[3] = QuadrantBound { min: Some(3), max: None };
        assert!(FilterConstraint::Quadrants(params).accepts(&combo, &c));

        params.bounds[1] = QuadrantBound { min: None, max: Some(3) };
        assert!(!FilterConstraint::Quadrants(params).accepts(&combo, &c));
    }

    #[test]
    fn test_quadrant_zero_max_is_unbounded() {
        let bound = QuadrantBound { min: None, max: Some(0) };
        assert_eq!(bound.effective_max(), None);
        assert!(bound.contains(7));
        assert!(!QuadrantBound { min: Some(2), max: Some(0) }.contains(1));
    }

    #[test]
    fn test_is_valid_short_circuit_order() {
        let stats = empty_stats(&MEGA_SENA);
        let c = ctx(&MEGA_SENA, &stats);
        let strategies = vec![StrategyConstraint::EvenOdd(EvenOddParams { even: 6, odd: 0 })];
        let filters = vec![FilterConstraint::SumTotal(SumParams { min: None, max: Some(50) })];

        assert!(is_valid(&[2, 4, 6, 8, 10, 12], &strategies, &filters, &c));
        assert!(!is_valid(&[2, 4, 6, 8, 10, 60], &strategies, &filters, &c));
        assert!(!is_valid(&[1, 4, 6, 8, 10, 12], &strategies, &filters, &c));
        assert!(is_valid(&[1, 4, 6, 8, 10, 60], &[], &[], &c));
    }

    #[test]
    fn test_serde_tagged_layout() {
        let strategy = StrategyConstraint::EvenOdd(EvenOddParams { even: 8, odd: 7 });
        let json = serde_json::to_value(&strategy).unwrap();
        assert_eq!(json["kind"], "even_odd");
        assert_eq!(json["params"]["even"], 8);

        let filter: FilterConstraint =
            serde_json::from_str(r#"{"kind":"sum_total","params":{"min":100}}"#).unwrap();
        assert_eq!(filter, FilterConstraint::SumTotal(SumParams { min: Some(100), max: None }));
    }
}
