use std::ops::RangeInclusive;
use std::str::FromStr;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draw {
    pub sequence_id: u32,
    pub date: String,
    pub numbers: Vec<u8>,
}

impl Draw {
    pub fn sorted_numbers(&self) -> Vec<u8> {
        let mut sorted = self.numbers.clone();
        sorted.sort_unstable();
        sorted
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GameMode {
    MegaSena,
    Lotofacil,
}

/// Règles fixes d'une modalité. Jamais modifiées.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameRuleset {
    pub name: &'static str,
    pub max_number: u8,
    /// Nombre de dezenas tirées par concours officiel.
    pub draw_size: usize,
    pub min_picks: usize,
    pub max_picks: usize,
}

pub const MEGA_SENA: GameRuleset = GameRuleset {
    name: "Mega-Sena",
    max_number: 60,
    draw_size: 6,
    min_picks: 6,
    max_picks: 20,
};

pub const LOTOFACIL: GameRuleset = GameRuleset {
    name: "Lotofácil",
    max_number: 25,
    draw_size: 15,
    min_picks: 15,
    max_picks: 20,
};

pub const MAX_GAMES: usize = 100;

impl GameMode {
    pub fn rules(&self) -> &'static GameRuleset {
        match self {
            GameMode::MegaSena => &MEGA_SENA,
            GameMode::Lotofacil => &LOTOFACIL,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            GameMode::MegaSena => "mega-sena",
            GameMode::Lotofacil => "lotofacil",
        }
    }
}

impl std::fmt::Display for GameMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl FromStr for GameMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mega-sena" | "megasena" | "mega" | "1" => Ok(GameMode::MegaSena),
            "lotofacil" | "lotofácil" | "loto" | "2" => Ok(GameMode::Lotofacil),
            other => Err(format!(
                "Modalité inconnue : '{}' (attendu : mega-sena ou lotofacil)",
                other
            )),
        }
    }
}

impl GameRuleset {
    pub fn universe(&self) -> RangeInclusive<u8> {
        1..=self.max_number
    }

    pub fn universe_vec(&self) -> Vec<u8> {
        self.universe().collect()
    }

    pub fn clamp_picks(&self, picks: usize) -> usize {
        picks.clamp(self.min_picks, self.max_picks)
    }

    pub fn clamp_count(&self, count: usize) -> usize {
        count.clamp(1, MAX_GAMES)
    }
}

pub fn validate_draw(mode: GameMode, numbers: &[u8]) -> Result<()> {
    let rules = mode.rules();
    if numbers.len() != rules.draw_size {
        bail!(
            "{} : {} numéros attendus, {} reçus",
            rules.name,
            rules.draw_size,
            numbers.len()
        );
    }
    for &n in numbers {
        if n < 1 || n > rules.max_number {
            bail!("Numéro {} hors limites (1-{})", n, rules.max_number);
        }
    }
    for i in 0..numbers.len() {
        for j in (i + 1)..numbers.len() {
            if numbers[i] == numbers[j] {
                bail!("Numéro en double : {}", numbers[i]);
            }
        }
    }
    Ok(())
}
