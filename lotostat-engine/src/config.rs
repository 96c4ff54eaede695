use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::constraints::{FilterConstraint, StrategyConstraint};

pub const DEFAULT_MAX_ATTEMPTS: usize = 200_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    pub max_attempts: usize,
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            seed: None,
        }
    }
}

/// Recette de génération réutilisable : stratégies puis filtres.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintSet {
    #[serde(default)]
    pub strategies: Vec<StrategyConstraint>,
    #[serde(default)]
    pub filters: Vec<FilterConstraint>,
}

impl ConstraintSet {
    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty() && self.filters.is_empty()
    }

    /// Ajoute les contraintes de `other` à la suite des siennes.
    pub fn extend(&mut self, other: ConstraintSet) {
        self.strategies.extend(other.strategies);
        self.filters.extend(other.filters);
    }
}

pub fn save_constraints(set: &ConstraintSet, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(set)
        .context("Impossible de sérialiser les contraintes")?;
    std::fs::write(path, json)
        .with_context(|| format!("Impossible d'écrire {:?}", path))?;
    log::info!("Contraintes sauvegardées dans {:?}", path);
    Ok(())
}

pub fn load_constraints(path: &Path) -> Result<ConstraintSet> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Impossible de lire {:?}", path))?;
    let set: ConstraintSet = serde_json::from_str(&json)
        .with_context(|| format!("Contraintes invalides dans {:?}", path))?;
    Ok(set)
}
