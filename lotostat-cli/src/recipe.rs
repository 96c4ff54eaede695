use std::collections::BTreeMap;

use clap::Args;

use lotostat_engine::config::ConstraintSet;
use lotostat_engine::constraints::{
    EvenOddParams, FilterConstraint, LatenessParams, MultiplesParams, PrimesParams,
    QuadrantBound, QuadrantParams, StrategyConstraint, SumParams,
};
use lotostat_engine::numbers::QUADRANT_COUNT;

/// Contraintes passées en ligne de commande.
#[derive(Args, Debug, Default)]
pub struct ConstraintArgs {
    /// Nombre exact de numéros en retard dans chaque grille
    #[arg(long, requires = "min_delay")]
    pub late: Option<usize>,

    /// Retard minimal (en tirages) pour qu'un numéro compte comme en retard
    #[arg(long, requires = "late")]
    pub min_delay: Option<u32>,

    /// Nombre exact de numéros pairs
    #[arg(long, requires = "odd")]
    pub even: Option<usize>,

    /// Nombre exact de numéros impairs
    #[arg(long, requires = "even")]
    pub odd: Option<usize>,

    /// Minimum de nombres premiers
    #[arg(long)]
    pub primes_min: Option<usize>,

    /// Maximum de nombres premiers
    #[arg(long)]
    pub primes_max: Option<usize>,

    /// Nombre exact de multiples d'un diviseur, ex: 3=2 (répétable)
    #[arg(long = "multiple", value_parser = parse_multiple)]
    pub multiples: Vec<(u8, usize)>,

    /// Somme minimale des dezenas
    #[arg(long)]
    pub sum_min: Option<u32>,

    /// Somme maximale des dezenas
    #[arg(long)]
    pub sum_max: Option<u32>,

    /// Bornes d'un quadrant, ex: 1=2:4, 3=:2, 4=1: (répétable)
    #[arg(long = "quadrant", value_parser = parse_quadrant)]
    pub quadrants: Vec<(usize, QuadrantBound)>,
}

pub(crate) fn parse_optional<T: std::str::FromStr>(raw: &str) -> Result<Option<T>, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<T>()
        .map(Some)
        .map_err(|_| format!("valeur invalide : '{}'", raw))
}

pub fn parse_multiple(raw: &str) -> Result<(u8, usize), String> {
    let (divisor, count) = raw
        .split_once('=')
        .ok_or_else(|| format!("format attendu DIVISEUR=NOMBRE, reçu '{}'", raw))?;
    let divisor: u8 = divisor
        .trim()
        .parse()
        .map_err(|_| format!("diviseur invalide : '{}'", divisor))?;
    if divisor == 0 {
        return Err("le diviseur doit être non nul".to_string());
    }
    let count: usize = count
        .trim()
        .parse()
        .map_err(|_| format!("nombre invalide : '{}'", count))?;
    Ok((divisor, count))
}

pub fn parse_quadrant(raw: &str) -> Result<(usize, QuadrantBound), String> {
    let (index, range) = raw
        .split_once('=')
        .ok_or_else(|| format!("format attendu Q=MIN:MAX, reçu '{}'", raw))?;
    let index: usize = index
        .trim()
        .trim_start_matches(['q', 'Q'])
        .parse()
        .map_err(|_| format!("quadrant invalide : '{}'", index))?;
    if !(1..=QUADRANT_COUNT).contains(&index) {
        return Err(format!("quadrant {} hors limites (1-{})", index, QUADRANT_COUNT));
    }
    let (min, max) = range
        .split_once(':')
        .ok_or_else(|| format!("format attendu MIN:MAX, reçu '{}'", range))?;
    Ok((
        index,
        QuadrantBound {
            min: parse_optional(min)?,
            max: parse_optional(max)?,
        },
    ))
}

impl ConstraintArgs {
    pub fn to_constraint_set(&self) -> ConstraintSet {
        let mut set = ConstraintSet::default();

        if let (Some(required_late_count), Some(min_delay)) = (self.late, self.min_delay) {
            set.strategies.push(StrategyConstraint::Lateness(LatenessParams {
                required_late_count,
                min_delay,
            }));
        }
        if let (Some(even), Some(odd)) = (self.even, self.odd) {
            set.strategies.push(StrategyConstraint::EvenOdd(EvenOddParams { even, odd }));
        }
        if self.primes_min.is_some() || self.primes_max.is_some() {
            set.strategies.push(StrategyConstraint::Primes(PrimesParams {
                min: self.primes_min,
                max: self.primes_max,
            }));
        }
        if !self.multiples.is_empty() {
            let targets: BTreeMap<u8, usize> = self.multiples.iter().copied().collect();
            set.strategies.push(StrategyConstraint::Multiples(MultiplesParams { targets }));
        }

        if !self.quadrants.is_empty() {
            let mut params = QuadrantParams::default();
            for &(index, bound) in &self.quadrants {
                params.bounds[index - 1] = bound;
            }
            set.filters.push(FilterConstraint::Quadrants(params));
        }
        if self.sum_min.is_some() || self.sum_max.is_some() {
            set.filters.push(FilterConstraint::SumTotal(SumParams {
                min: self.sum_min,
                max: self.sum_max,
            }));
        }

        set
    }
}
