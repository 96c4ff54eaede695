//! Statistiques sur l'historique des tirages et génération de grilles sous contraintes.
//!
//! `stats::compute_statistics` produit un instantané en une passe ; `generator::generate`
//! tire des combinaisons par rejet, dans un budget de tentatives fixe.

pub mod config;
pub mod constraints;
pub mod generator;
pub mod numbers;
pub mod stats;
