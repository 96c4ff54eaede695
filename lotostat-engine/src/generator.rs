use std::collections::BTreeSet;

use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use lotostat_db::models::GameRuleset;

use crate::config::GeneratorConfig;
use crate::constraints::{is_valid, FilterConstraint, LatenessParams, StrategyConstraint, ValidationContext};
use crate::stats::Statistics;

/// Combinaison triée, sans doublon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Combination(Vec<u8>);

impl Combination {
    fn from_set(set: BTreeSet<u8>) -> Self {
        Combination(set.into_iter().collect())
    }

    pub fn numbers(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Display for Combination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|n| format!("{:02}", n)).collect();
        write!(f, "{}", parts.join(" - "))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct GenerationRequest<'a> {
    pub count: usize,
    pub pick_count: usize,
    pub rules: &'a GameRuleset,
    pub strategies: &'a [StrategyConstraint],
    pub filters: &'a [FilterConstraint],
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
    pub combinations: Vec<Combination>,
    pub attempts: usize,
}

impl Generation {
    fn empty() -> Self {
        Generation { combinations: Vec::new(), attempts: 0 }
    }

    /// Moins de combinaisons que demandé : contraintes trop restrictives.
    pub fn is_short(&self, requested: usize) -> bool {
        self.combinations.len() < requested
    }
}

pub fn generate(request: &GenerationRequest<'_>, stats: &Statistics, config: &GeneratorConfig) -> Generation {
    let mut rng: StdRng = match config.seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_rng(&mut rand::rng()),
    };
    generate_with_rng(request, stats, config.max_attempts, &mut rng)
}

/// Échantillonnage par rejet borné par `max_attempts`. Ne boucle jamais au-delà.
pub fn generate_with_rng<R: Rng>(
    request: &GenerationRequest<'_>,
    stats: &Statistics,
    max_attempts: usize,
    rng: &mut R,
) -> Generation {
    let universe = request.rules.universe_vec();
    if request.count == 0 || request.pick_count == 0 || request.pick_count > universe.len() {
        log::warn!(
            "{}: demande dégénérée (count={}, picks={}, univers={})",
            request.rules.name,
            request.count,
            request.pick_count,
            universe.len()
        );
        return Generation::empty();
    }

    let ctx = ValidationContext { rules: request.rules, stats };

    let lateness = request.strategies.iter().find_map(|s| s.lateness());
    let late_pool: Vec<u8> = match lateness {
        Some(p) => universe
            .iter()
            .copied()
            .filter(|&n| stats.lateness_of(n) >= p.min_delay)
            .collect(),
        None => Vec::new(),
    };

    let mut generation = Generation::empty();
    while generation.combinations.len() < request.count && generation.attempts < max_attempts {
        generation.attempts += 1;

        let candidate = match lateness {
            Some(p) if can_split(p, &late_pool, request.pick_count) => {
                late_split_candidate(p, &late_pool, &universe, request.pick_count, rng)
            }
            _ => uniform_candidate(&universe, request.pick_count, rng),
        };

        if is_valid(candidate.numbers(), request.strategies, request.filters, &ctx) {
            generation.combinations.push(candidate);
        }
    }

    if generation.is_short(request.count) {
        log::warn!(
            "{}: {} / {} combinaisons après {} tentatives (budget épuisé)",
            request.rules.name,
            generation.combinations.len(),
            request.count,
            generation.attempts
        );
    } else {
        log::debug!(
            "{}: {} combinaisons en {} tentatives",
            request.rules.name,
            generation.combinations.len(),
            generation.attempts
        );
    }

    generation
}

fn can_split(params: &LatenessParams, late_pool: &[u8], pick_count: usize) -> bool {
    late_pool.len() >= params.required_late_count && params.required_late_count <= pick_count
}

fn uniform_candidate<R: Rng>(universe: &[u8], pick_count: usize, rng: &mut R) -> Combination {
    let set: BTreeSet<u8> = universe.choose_multiple(rng, pick_count).copied().collect();
    Combination::from_set(set)
}

/// `required_late_count` numéros distincts pris dans les retardataires, puis complément
/// uniforme sur tout l'univers (les doublons sont redessinés).
fn late_split_candidate<R: Rng>(
    params: &LatenessParams,
    late_pool: &[u8],
    universe: &[u8],
    pick_count: usize,
    rng: &mut R,
) -> Combination {
    let mut set: BTreeSet<u8> = late_pool
        .choose_multiple(rng, params.required_late_count)
        .copied()
        .collect();
    while set.len() < pick_count {
        set.insert(universe[rng.random_range(0..universe.len())]);
    }
    Combination::from_set(set)
}
