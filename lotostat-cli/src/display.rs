use comfy_table::{Table, ContentArrangement, presets::UTF8_FULL, Cell, Color};
use textplots::Plot;

use crate::import::ImportResult;
use lotostat_db::models::{Draw, GameRuleset};
use lotostat_engine::config::ConstraintSet;
use lotostat_engine::constraints::{Constraint, FilterConstraint, StrategyConstraint};
use lotostat_engine::generator::Generation;
use lotostat_engine::numbers::sum;
use lotostat_engine::stats::Statistics;

/// Sommes reprises dans la courbe et dans le rapport.
pub(crate) const RECENT_SUMS: usize = 50;

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn join_numbers(numbers: &[u8]) -> String {
    numbers
        .iter()
        .map(|n| format!("{:02}", n))
        .collect::<Vec<_>>()
        .join(" - ")
}

pub fn display_draws(draws: &[Draw]) {
    if draws.is_empty() {
        println!("Aucun tirage à afficher.");
        return;
    }

    let mut table = new_table(vec!["Concours", "Date", "Dezenas"]);
    for draw in draws {
        table.add_row(vec![
            &draw.sequence_id.to_string(),
            &draw.date,
            &join_numbers(&draw.sorted_numbers()),
        ]);
    }

    println!("{table}");
}

pub fn display_import_summary(result: &ImportResult) {
    println!("Import terminé :");
    println!("  Total lignes lues : {}", result.total_records);
    println!("  Importés          : {}", result.imported);
    println!("  Lignes ignorées   : {}", result.skipped);
    if result.errors > 0 {
        println!("  Erreurs           : {}", result.errors);
    }
}

pub fn display_stats(stats: &Statistics, rules: &GameRuleset, top: usize) {
    println!("\n📊 {} — {} tirages analysés (dernier : {})\n", rules.name, stats.draw_count, stats.last_update);

    println!("── Pairs / impairs ──");
    let mut table = new_table(vec!["Répartition", "Tirages", "Part"]);
    for (eo, count) in stats.even_odd_histogram() {
        table.add_row(vec![
            format!("{}P-{}I", eo.even, eo.odd),
            count.to_string(),
            format!("{:.1} %", share(count, stats.draw_count)),
        ]);
    }
    println!("{table}");

    println!("\n── Nombres premiers ──");
    let mut table = new_table(vec!["Premiers", "Tirages", "Part"]);
    for (primes, count) in stats.prime_histogram() {
        table.add_row(vec![
            format!("{} premiers", primes),
            count.to_string(),
            format!("{:.1} %", share(count, stats.draw_count)),
        ]);
    }
    println!("{table}");

    println!("\n── Multiples (moyenne par tirage) ──");
    let mut table = new_table(vec!["Diviseur", "Moyenne"]);
    for (m, avg) in stats.multiple_averages() {
        table.add_row(vec![format!("×{}", m), format!("{:.2}", avg)]);
    }
    println!("{table}");

    println!("\n── Quadrants (moyenne par tirage) ──");
    let mut table = new_table(vec!["Quadrant", "Moyenne"]);
    for (i, avg) in stats.quadrant_averages().iter().enumerate() {
        table.add_row(vec![format!("Q{}", i + 1), format!("{:.2}", avg)]);
    }
    println!("{table}");

    println!("\n── Somme des dezenas ──");
    match stats.sum_summary() {
        Some(s) => println!("  Min : {}   Max : {}   Moyenne : {:.2}", s.min, s.max, s.mean),
        None => println!("  (Pas de données)"),
    }
    display_sums_chart(stats.recent_sums(RECENT_SUMS));

    println!("\n── Top {} des retards ──", top);
    let mut table = new_table(vec!["Numéro", "Retard"]);
    for (n, delay) in stats.most_late(top) {
        table.add_row(vec![format!("{:02}", n), delay.to_string()]);
    }
    println!("{table}");
}

/// Part en pourcentage, 0 quand `total` est nul.
pub(crate) fn share(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 * 100.0 / total as f64
    }
}

/// Courbe ASCII des dernières sommes.
pub fn display_sums_chart(sums: &[u32]) {
    if sums.len() < 2 {
        return;
    }
    let points: Vec<(f32, f32)> = sums
        .iter()
        .enumerate()
        .map(|(i, &s)| ((i + 1) as f32, s as f32))
        .collect();
    let y_min = *sums.iter().min().unwrap_or(&0) as f32 - 5.0;
    let y_max = *sums.iter().max().unwrap_or(&0) as f32 + 5.0;

    println!("\n  Évolution des {} dernières sommes :", sums.len());
    let shape = textplots::Shape::Lines(&points);
    let mut chart = textplots::Chart::new_with_y_range(120, 40, 1.0, sums.len() as f32, y_min, y_max);
    println!("{}", chart.lineplot(&shape));
}

fn strategy_detail(strategy: &StrategyConstraint) -> String {
    match strategy {
        StrategyConstraint::Lateness(p) => {
            format!("{} numéro(s) avec retard ≥ {}", p.required_late_count, p.min_delay)
        }
        StrategyConstraint::EvenOdd(p) => format!("{} pairs, {} impairs", p.even, p.odd),
        StrategyConstraint::Primes(p) => format!("entre {} et {}", bound(p.min), bound(p.max)),
        StrategyConstraint::Multiples(p) if p.targets.is_empty() => "aucun diviseur".to_string(),
        StrategyConstraint::Multiples(p) => p
            .targets
            .iter()
            .map(|(d, c)| format!("{} multiple(s) de {}", c, d))
            .collect::<Vec<_>>()
            .join(", "),
    }
}

fn filter_detail(filter: &FilterConstraint) -> String {
    match filter {
        FilterConstraint::SumTotal(p) => {
            format!("entre {} et {}", bound(p.min.map(|v| v as usize)), bound(p.max.map(|v| v as usize)))
        }
        FilterConstraint::Quadrants(p) => p
            .bounds
            .iter()
            .enumerate()
            .map(|(i, b)| format!("Q{}[{}..{}]", i + 1, bound(b.min), bound(b.effective_max())))
            .collect::<Vec<_>>()
            .join(" "),
    }
}

fn bound(value: Option<usize>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "*".to_string())
}

pub fn display_constraints(set: &ConstraintSet) {
    if set.is_empty() {
        println!("Aucune contrainte : tirage uniforme.");
        return;
    }

    let mut table = new_table(vec!["#", "Type", "Critère", "Paramètres"]);
    for (i, s) in set.strategies.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new("Stratégie").fg(Color::Cyan),
            Cell::new(s.name()),
            Cell::new(strategy_detail(s)),
        ]);
    }
    let offset = set.strategies.len();
    for (i, f) in set.filters.iter().enumerate() {
        table.add_row(vec![
            Cell::new(offset + i + 1),
            Cell::new("Filtre").fg(Color::Yellow),
            Cell::new(f.name()),
            Cell::new(filter_detail(f)),
        ]);
    }
    println!("{table}");
}

pub fn display_generation(generation: &Generation, requested: usize) {
    if generation.combinations.is_empty() {
        println!(
            "\nCritères trop restrictifs ou base insuffisante ({} tentatives). Modifiez les paramètres.",
            generation.attempts
        );
        return;
    }

    println!("\n🎲 Grilles générées\n");
    let mut table = new_table(vec!["#", "Dezenas", "Somme"]);
    for (i, combo) in generation.combinations.iter().enumerate() {
        table.add_row(vec![format!("{:02}", i + 1), combo.to_string(), sum(combo.numbers()).to_string()]);
    }
    println!("{table}");

    if generation.is_short(requested) {
        println!(
            "Seulement {} grille(s) sur {} demandées après {} tentatives.",
            generation.combinations.len(),
            requested,
            generation.attempts
        );
    } else {
        println!("{} grille(s) en {} tentatives.", generation.combinations.len(), generation.attempts);
    }
}
