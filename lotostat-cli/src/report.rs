use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};

use crate::display::{RECENT_SUMS, share};
use lotostat_db::models::GameMode;
use lotostat_engine::stats::Statistics;

fn write_body(out: &mut String, mode: GameMode, stats: &Statistics, top: usize) -> std::fmt::Result {
    let generated = chrono::Local::now().format("%d/%m/%Y %H:%M");

    writeln!(out, "# Rapport {}\n", mode.rules().name)?;
    writeln!(out, "- Généré le : {}", generated)?;
    writeln!(out, "- Dernière mise à jour : {}", stats.last_update)?;
    writeln!(out, "- Tirages analysés : {}\n", stats.draw_count)?;

    writeln!(out, "## Pairs / impairs\n")?;
    writeln!(out, "| Répartition | Tirages | Part |")?;
    writeln!(out, "|---|---|---|")?;
    for (eo, count) in stats.even_odd_histogram() {
        writeln!(
            out,
            "| {}P-{}I | {} | {:.1} % |",
            eo.even, eo.odd, count, share(count, stats.draw_count)
        )?;
    }

    writeln!(out, "\n## Nombres premiers\n")?;
    writeln!(out, "| Premiers | Tirages | Part |")?;
    writeln!(out, "|---|---|---|")?;
    for (primes, count) in stats.prime_histogram() {
        writeln!(out, "| {} | {} | {:.1} % |", primes, count, share(count, stats.draw_count))?;
    }

    writeln!(out, "\n## Quadrants\n")?;
    writeln!(out, "| Quadrant | Moyenne |")?;
    writeln!(out, "|---|---|")?;
    for (i, avg) in stats.quadrant_averages().iter().enumerate() {
        writeln!(out, "| Q{} | {:.2} |", i + 1, avg)?;
    }

    writeln!(out, "\n## Somme des dezenas\n")?;
    match stats.sum_summary() {
        Some(s) => {
            writeln!(out, "- Minimum : {}", s.min)?;
            writeln!(out, "- Maximum : {}", s.max)?;
            writeln!(out, "- Moyenne : {:.2}", s.mean)?;
        }
        None => writeln!(out, "Pas de données.")?,
    }

    let sums = stats.recent_sums(RECENT_SUMS);
    writeln!(out, "\n## Dernières sommes\n")?;
    if sums.is_empty() {
        writeln!(out, "Pas de données.")?;
    } else {
        let first = stats.draw_count - sums.len() + 1;
        writeln!(out, "| Tirage | Somme |")?;
        writeln!(out, "|---|---|")?;
        for (i, total) in sums.iter().enumerate() {
            writeln!(out, "| {} | {} |", first + i, total)?;
        }
    }

    writeln!(out, "\n## Top {} des retards\n", top)?;
    writeln!(out, "| Numéro | Retard |")?;
    writeln!(out, "|---|---|")?;
    for (n, delay) in stats.most_late(top) {
        writeln!(out, "| {:02} | {} |", n, delay)?;
    }

    Ok(())
}

/// Rapport Markdown d'un instantané statistique.
pub fn render_report(mode: GameMode, stats: &Statistics, top: usize) -> Result<String> {
    let mut out = String::new();
    write_body(&mut out, mode, stats, top).context("Impossible de composer le rapport")?;
    Ok(out)
}

pub fn write_report(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Impossible de créer le répertoire {:?}", parent))?;
    }
    std::fs::write(path, content)
        .with_context(|| format!("Impossible d'écrire le rapport {:?}", path))?;
    log::info!("Rapport écrit dans {:?}", path);
    Ok(())
}
