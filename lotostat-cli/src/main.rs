mod display;
mod import;
mod interactive;
mod recipe;
mod report;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use crate::display::{
    display_constraints, display_draws, display_generation, display_import_summary, display_stats,
};
use crate::recipe::ConstraintArgs;
use lotostat_db::db::{count_draws, db_path, fetch_draws, fetch_last_draws, migrate, open_db};
use lotostat_db::models::GameMode;
use lotostat_db::rusqlite::Connection;
use lotostat_engine::config::{
    ConstraintSet, DEFAULT_MAX_ATTEMPTS, GeneratorConfig, load_constraints, save_constraints,
};
use lotostat_engine::generator::{Combination, Generation, GenerationRequest, generate};
use lotostat_engine::stats::{Statistics, compute_statistics};

#[derive(Parser)]
#[command(name = "lotostat", about = "Statistiques et générateur de grilles Mega-Sena / Lotofácil")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Importer l'historique d'une modalité depuis un fichier CSV (remplace l'existant)
    Import {
        /// Modalité : mega-sena ou lotofacil
        #[arg(short, long, default_value = "mega-sena")]
        mode: GameMode,

        /// Chemin vers le fichier CSV
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Afficher le chemin de la base de données
    DbPath,

    /// Lister les derniers tirages
    List {
        #[arg(short, long, default_value = "mega-sena")]
        mode: GameMode,

        /// Nombre de tirages à afficher
        #[arg(short, long, default_value = "10")]
        last: u32,
    },

    /// Afficher les statistiques de l'historique
    Stats {
        #[arg(short, long, default_value = "mega-sena")]
        mode: GameMode,

        /// Nombre de numéros les plus en retard à afficher
        #[arg(short, long, default_value = "10")]
        top: usize,
    },

    /// Générer des grilles sous contraintes
    Generate {
        #[arg(short, long, default_value = "mega-sena")]
        mode: GameMode,

        /// Nombre de grilles (1-100)
        #[arg(short, long, default_value = "5")]
        count: usize,

        /// Dezenas par grille (défaut : minimum de la modalité)
        #[arg(short, long)]
        picks: Option<usize>,

        #[command(flatten)]
        constraints: ConstraintArgs,

        /// Charger des contraintes depuis un fichier JSON
        #[arg(long = "constraints")]
        constraints_file: Option<PathBuf>,

        /// Sauvegarder les contraintes utilisées dans un fichier JSON
        #[arg(long)]
        save_constraints: Option<PathBuf>,

        /// Nombre maximal de tentatives
        #[arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS)]
        max_attempts: usize,

        /// Seed pour la reproductibilité
        #[arg(long)]
        seed: Option<u64>,

        /// Exporter les grilles dans un fichier JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Écrire un rapport Markdown des statistiques
    Report {
        #[arg(short, long, default_value = "mega-sena")]
        mode: GameMode,

        /// Fichier de sortie
        #[arg(short, long, default_value = "rapport.md")]
        output: PathBuf,

        /// Nombre de numéros les plus en retard dans le rapport
        #[arg(short, long, default_value = "20")]
        top: usize,
    },

    /// Mode interactif : assistant de génération
    Interactive,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let path = db_path();
    let conn = open_db(&path)?;
    migrate(&conn)?;

    match cli.command {
        Command::Import { mode, file } => cmd_import(&conn, mode, &file),
        Command::DbPath => {
            println!("{}", path.display());
            Ok(())
        }
        Command::List { mode, last } => cmd_list(&conn, mode, last),
        Command::Stats { mode, top } => cmd_stats(&conn, mode, top),
        Command::Generate {
            mode,
            count,
            picks,
            constraints,
            constraints_file,
            save_constraints,
            max_attempts,
            seed,
            output,
        } => {
            let mut set = match constraints_file {
                Some(file) => load_constraints(&file)?,
                None => ConstraintSet::default(),
            };
            set.extend(constraints.to_constraint_set());
            let config = GeneratorConfig { max_attempts, seed };
            cmd_generate(
                &conn,
                mode,
                count,
                picks,
                &set,
                &config,
                save_constraints.as_deref(),
                output.as_deref(),
            )
        }
        Command::Report { mode, output, top } => cmd_report(&conn, mode, &output, top),
        Command::Interactive => interactive::run_interactive(&conn),
    }
}

/// `None` (message affiché) si la modalité n'a encore aucun tirage.
fn load_statistics(conn: &Connection, mode: GameMode) -> Result<Option<Statistics>> {
    let n = count_draws(conn, mode)?;
    if n == 0 {
        println!("Base vide. Lancez d'abord : lotostat import --mode {} --file <csv>", mode.key());
        return Ok(None);
    }
    let draws = fetch_draws(conn, mode)?;
    Ok(Some(compute_statistics(&draws, mode.rules())))
}

fn generate_with_spinner(
    request: &GenerationRequest<'_>,
    stats: &Statistics,
    config: &GeneratorConfig,
) -> Result<Generation> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {msg}")?);
    pb.set_message(format!(
        "Recherche de {} grille(s) de {} dezenas...",
        request.count, request.pick_count
    ));
    pb.enable_steady_tick(Duration::from_millis(100));

    let generation = generate(request, stats, config);

    pb.finish_and_clear();
    Ok(generation)
}

fn cmd_import(conn: &Connection, mode: GameMode, file: &Path) -> Result<()> {
    let result = import::import_csv(conn, mode, file)?;
    display_import_summary(&result);
    Ok(())
}

fn cmd_list(conn: &Connection, mode: GameMode, last: u32) -> Result<()> {
    let n = count_draws(conn, mode)?;
    if n == 0 {
        println!("Base vide. Lancez d'abord : lotostat import --mode {} --file <csv>", mode.key());
        return Ok(());
    }
    let draws = fetch_last_draws(conn, mode, last)?;
    display_draws(&draws);
    Ok(())
}

fn cmd_stats(conn: &Connection, mode: GameMode, top: usize) -> Result<()> {
    let Some(stats) = load_statistics(conn, mode)? else {
        return Ok(());
    };
    display_stats(&stats, mode.rules(), top);
    Ok(())
}

#[derive(Serialize)]
struct GenerationExport<'a> {
    mode: GameMode,
    generated_at: String,
    pick_count: usize,
    attempts: usize,
    constraints: &'a ConstraintSet,
    combinations: &'a [Combination],
}

#[allow(clippy::too_many_arguments)]
fn cmd_generate(
    conn: &Connection,
    mode: GameMode,
    count: usize,
    picks: Option<usize>,
    set: &ConstraintSet,
    config: &GeneratorConfig,
    save_to: Option<&Path>,
    output: Option<&Path>,
) -> Result<()> {
    let Some(stats) = load_statistics(conn, mode)? else {
        return Ok(());
    };
    let rules = mode.rules();

    let count_clamped = rules.clamp_count(count);
    if count_clamped != count {
        println!("Nombre de grilles ramené à {}.", count_clamped);
    }
    let requested_picks = picks.unwrap_or(rules.min_picks);
    let pick_count = rules.clamp_picks(requested_picks);
    if pick_count != requested_picks {
        println!(
            "Dezenas par grille ramenées à {} ({} : {}-{}).",
            pick_count, rules.name, rules.min_picks, rules.max_picks
        );
    }

    if let Some(path) = save_to {
        save_constraints(set, path)?;
        println!("Contraintes sauvegardées dans {}", path.display());
    }

    display_constraints(set);

    let request = GenerationRequest {
        count: count_clamped,
        pick_count,
        rules,
        strategies: &set.strategies,
        filters: &set.filters,
    };
    let generation = generate_with_spinner(&request, &stats, config)?;
    display_generation(&generation, count_clamped);

    if let Some(path) = output {
        let export = GenerationExport {
            mode,
            generated_at: chrono::Local::now().to_rfc3339(),
            pick_count,
            attempts: generation.attempts,
            constraints: set,
            combinations: &generation.combinations,
        };
        let json = serde_json::to_string_pretty(&export)
            .context("Impossible de sérialiser les grilles")?;
        std::fs::write(path, json)
            .with_context(|| format!("Impossible d'écrire {:?}", path))?;
        println!("Grilles exportées dans {}", path.display());
    }

    Ok(())
}

fn cmd_report(conn: &Connection, mode: GameMode, output: &Path, top: usize) -> Result<()> {
    let Some(stats) = load_statistics(conn, mode)? else {
        return Ok(());
    };
    let content = report::render_report(mode, &stats, top)?;
    report::write_report(output, &content)?;
    println!("Rapport {} écrit dans {}", mode.rules().name, output.display());
    Ok(())
}
