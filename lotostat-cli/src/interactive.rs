use std::collections::BTreeMap;
use std::fmt::Display;
use std::io::{self, Write};
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result, bail};
use lotostat_db::models::{GameMode, GameRuleset};
use lotostat_db::rusqlite::Connection;
use lotostat_engine::config::{ConstraintSet, GeneratorConfig, save_constraints};
use lotostat_engine::constraints::{
    Constraint, EvenOddParams, FilterConstraint, LatenessParams, MultiplesParams, PrimesParams,
    QuadrantParams, StrategyConstraint, SumParams,
};
use lotostat_engine::generator::GenerationRequest;
use lotostat_engine::numbers::QUADRANT_COUNT;
use lotostat_engine::stats::Statistics;

use crate::display::{display_constraints, display_generation};
use crate::recipe::{parse_multiple, parse_optional, parse_quadrant};

#[derive(Debug, PartialEq)]
enum InteractiveCommand {
    Late,
    EvenOdd,
    Primes,
    Multiples,
    Quadrants,
    Sum,
    Show,
    Clear,
    Generate,
    Save,
    Quit,
}

fn parse_command(input: &str) -> Option<InteractiveCommand> {
    match input.trim().to_lowercase().as_str() {
        "1" | "retard" | "late" => Some(InteractiveCommand::Late),
        "2" | "pairs" | "parite" | "parité" | "even" => Some(InteractiveCommand::EvenOdd),
        "3" | "premiers" | "primes" => Some(InteractiveCommand::Primes),
        "4" | "multiples" | "mult" => Some(InteractiveCommand::Multiples),
        "5" | "quadrants" | "quad" => Some(InteractiveCommand::Quadrants),
        "6" | "somme" | "sum" => Some(InteractiveCommand::Sum),
        "7" | "contraintes" | "show" => Some(InteractiveCommand::Show),
        "8" | "effacer" | "clear" => Some(InteractiveCommand::Clear),
        "9" | "generer" | "générer" | "generate" | "gen" => Some(InteractiveCommand::Generate),
        "10" | "sauver" | "save" => Some(InteractiveCommand::Save),
        "11" | "quitter" | "quit" | "q" | "exit" => Some(InteractiveCommand::Quit),
        _ => None,
    }
}

fn display_menu(mode: GameMode, count: usize, picks: usize) {
    println!();
    println!("── {} : {} grille(s) de {} dezenas ──", mode.rules().name, count, picks);
    println!("  1. retard      Numéros en retard");
    println!("  2. pairs       Pairs / impairs");
    println!("  3. premiers    Nombres premiers");
    println!("  4. multiples   Multiples");
    println!("  5. quadrants   Bornes par quadrant");
    println!("  6. somme       Somme totale");
    println!("  7. contraintes Afficher les contraintes");
    println!("  8. effacer     Retirer toutes les contraintes");
    println!("  9. generer     Générer (ou régénérer) les grilles");
    println!(" 10. sauver      Sauvegarder les contraintes (JSON)");
    println!(" 11. quitter     Quitter");
    println!();
}

fn prompt(msg: &str) -> Result<String> {
    print!("{}", msg);
    io::stdout().flush()?;
    let mut input = String::new();
    let read = io::stdin()
        .read_line(&mut input)
        .context("Erreur de lecture")?;
    if read == 0 {
        bail!("Fin de l'entrée");
    }
    Ok(input.trim().to_string())
}

fn prompt_with_default(msg: &str, default: &str) -> Result<String> {
    let input = prompt(&format!("{} [{}] : ", msg, default))?;
    if input.is_empty() {
        Ok(default.to_string())
    } else {
        Ok(input)
    }
}

fn prompt_value<T: FromStr + Display>(msg: &str, default: T) -> Result<T> {
    let default = default.to_string();
    loop {
        let input = prompt_with_default(msg, &default)?;
        match input.parse::<T>() {
            Ok(v) => return Ok(v),
            Err(_) => println!("Valeur invalide : '{}'. Réessayez.", input),
        }
    }
}

/// Saisie vide = paramètre non défini.
fn prompt_optional<T: FromStr>(msg: &str) -> Result<Option<T>> {
    loop {
        let input = prompt(&format!("{} (vide = libre) : ", msg))?;
        match parse_optional::<T>(&input) {
            Ok(v) => return Ok(v),
            Err(e) => println!("{}. Réessayez.", e),
        }
    }
}

fn prompt_mode() -> Result<GameMode> {
    loop {
        let input = prompt_with_default("Modalité (1 = Mega-Sena, 2 = Lotofácil)", "1")?;
        match input.parse::<GameMode>() {
            Ok(mode) => return Ok(mode),
            Err(e) => println!("{}", e),
        }
    }
}

/// `3=2 5=1` ou `3=2,5=1`.
fn parse_multiples_line(input: &str) -> Result<BTreeMap<u8, usize>> {
    input
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(|s| parse_multiple(s).map_err(anyhow::Error::msg))
        .collect()
}

/// Une saisie `MIN:MAX` (ou vide) par quadrant, 1-indexé.
fn parse_quadrant_entry(index: usize, input: &str, params: &mut QuadrantParams) -> Result<()> {
    if input.trim().is_empty() {
        return Ok(());
    }
    let (_, bound) = parse_quadrant(&format!("{}={}", index, input)).map_err(anyhow::Error::msg)?;
    params.bounds[index - 1] = bound;
    Ok(())
}

fn ask_lateness() -> Result<Option<StrategyConstraint>> {
    let required_late_count = prompt_value("Nombre de numéros en retard par grille", 2usize)?;
    let min_delay = prompt_value("Retard minimal (tirages)", 10u32)?;
    Ok(Some(StrategyConstraint::Lateness(LatenessParams {
        required_late_count,
        min_delay,
    })))
}

fn ask_even_odd(picks: usize) -> Result<Option<StrategyConstraint>> {
    let even = prompt_value("Nombre de pairs", picks / 2)?;
    let odd = prompt_value("Nombre d'impairs", picks.saturating_sub(even))?;
    if even + odd != picks {
        println!("Attention : {} + {} ≠ {} dezenas, aucune grille ne pourra passer.", even, odd, picks);
    }
    Ok(Some(StrategyConstraint::EvenOdd(EvenOddParams { even, odd })))
}

fn ask_primes() -> Result<Option<StrategyConstraint>> {
    let min = prompt_optional("Minimum de premiers")?;
    let max = prompt_optional("Maximum de premiers")?;
    if min.is_none() && max.is_none() {
        return Ok(None);
    }
    Ok(Some(StrategyConstraint::Primes(PrimesParams { min, max })))
}

fn ask_multiples() -> Result<Option<StrategyConstraint>> {
    loop {
        let input = prompt("Diviseur=nombre (ex: 3=2 5=1, vide = libre) : ")?;
        match parse_multiples_line(&input) {
            Ok(targets) if targets.is_empty() => return Ok(None),
            Ok(targets) => return Ok(Some(StrategyConstraint::Multiples(MultiplesParams { targets }))),
            Err(e) => println!("{e:#}. Réessayez."),
        }
    }
}

fn ask_quadrants(rules: &GameRuleset) -> Result<Option<FilterConstraint>> {
    let size = rules.max_number as usize / QUADRANT_COUNT;
    let mut params = QuadrantParams::default();
    for index in 1..=QUADRANT_COUNT {
        let first = (index - 1) * size + 1;
        let last = if index == QUADRANT_COUNT { rules.max_number as usize } else { index * size };
        loop {
            let input = prompt(&format!("Q{} ({:02}-{:02}) MIN:MAX (vide = libre) : ", index, first, last))?;
            match parse_quadrant_entry(index, &input, &mut params) {
                Ok(()) => break,
                Err(e) => println!("{e:#}. Réessayez."),
            }
        }
    }
    if params == QuadrantParams::default() {
        return Ok(None);
    }
    Ok(Some(FilterConstraint::Quadrants(params)))
}

fn ask_sum() -> Result<Option<FilterConstraint>> {
    let min = prompt_optional("Somme minimale")?;
    let max = prompt_optional("Somme maximale")?;
    if min.is_none() && max.is_none() {
        return Ok(None);
    }
    Ok(Some(FilterConstraint::SumTotal(SumParams { min, max })))
}

fn push_strategy(set: &mut ConstraintSet, strategy: Option<StrategyConstraint>) {
    match strategy {
        Some(s) => {
            println!("Ajouté : {}", s.name());
            set.strategies.push(s);
        }
        None => println!("Aucun paramètre saisi, rien n'est ajouté."),
    }
}

fn push_filter(set: &mut ConstraintSet, filter: Option<FilterConstraint>) {
    match filter {
        Some(f) => {
            println!("Ajouté : {}", f.name());
            set.filters.push(f);
        }
        None => println!("Aucun paramètre saisi, rien n'est ajouté."),
    }
}

fn cmd_generate_interactive(
    stats: &Statistics,
    rules: &GameRuleset,
    count: usize,
    picks: usize,
    set: &ConstraintSet,
) -> Result<()> {
    let request = GenerationRequest {
        count,
        pick_count: picks,
        rules,
        strategies: &set.strategies,
        filters: &set.filters,
    };
    let generation = super::generate_with_spinner(&request, stats, &GeneratorConfig::default())?;
    display_generation(&generation, count);
    Ok(())
}

fn cmd_save_interactive(set: &ConstraintSet) -> Result<()> {
    let path = prompt_with_default("Fichier de sortie", "contraintes.json")?;
    save_constraints(set, &PathBuf::from(&path))?;
    println!("Contraintes sauvegardées dans {}", path);
    Ok(())
}

pub fn run_interactive(conn: &Connection) -> Result<()> {
    println!("Bienvenue dans le mode interactif de lotostat !");

    let mode = prompt_mode()?;
    let Some(stats) = super::load_statistics(conn, mode)? else {
        return Ok(());
    };
    let rules = mode.rules();
    println!("{} tirages chargés (dernier : {}).", stats.draw_count, stats.last_update);

    let count = rules.clamp_count(prompt_value("Nombre de grilles", 5usize)?);
    let picks = rules.clamp_picks(prompt_value(
        &format!("Dezenas par grille ({}-{})", rules.min_picks, rules.max_picks),
        rules.min_picks,
    )?);

    let mut set = ConstraintSet::default();

    loop {
        display_menu(mode, count, picks);
        let input = match prompt("> ") {
            Ok(s) => s,
            Err(_) => break,
        };

        if input.is_empty() {
            continue;
        }

        let outcome = match parse_command(&input) {
            Some(InteractiveCommand::Quit) => {
                println!("Au revoir !");
                break;
            }
            Some(InteractiveCommand::Late) => ask_lateness().map(|s| push_strategy(&mut set, s)),
            Some(InteractiveCommand::EvenOdd) => ask_even_odd(picks).map(|s| push_strategy(&mut set, s)),
            Some(InteractiveCommand::Primes) => ask_primes().map(|s| push_strategy(&mut set, s)),
            Some(InteractiveCommand::Multiples) => ask_multiples().map(|s| push_strategy(&mut set, s)),
            Some(InteractiveCommand::Quadrants) => ask_quadrants(rules).map(|f| push_filter(&mut set, f)),
            Some(InteractiveCommand::Sum) => ask_sum().map(|f| push_filter(&mut set, f)),
            Some(InteractiveCommand::Show) => {
                display_constraints(&set);
                Ok(())
            }
            Some(InteractiveCommand::Clear) => {
                set = ConstraintSet::default();
                println!("Contraintes retirées.");
                Ok(())
            }
            Some(InteractiveCommand::Generate) => cmd_generate_interactive(&stats, rules, count, picks, &set),
            Some(InteractiveCommand::Save) => cmd_save_interactive(&set),
            None => {
                println!("Commande inconnue : '{}'. Tapez un numéro (1-11) ou un nom de commande.", input);
                Ok(())
            }
        };

        if let Err(e) = outcome {
            println!("Erreur: {e:#}");
        }
    }

    Ok(())
}
