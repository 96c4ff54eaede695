use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::Path;

use crate::models::{Draw, GameMode};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS draws (
    mode          TEXT NOT NULL,
    sequence_id   INTEGER NOT NULL,
    date          TEXT NOT NULL,
    numbers       TEXT NOT NULL,
    PRIMARY KEY (mode, sequence_id)
);
";

pub fn db_path() -> std::path::PathBuf {
    let mut path = std::env::current_dir().unwrap_or_default();
    path.push("data");
    path.push("lotostat.db");
    path
}

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Impossible de créer le répertoire {:?}", parent))?;
    }
    let conn = Connection::open(path)
        .with_context(|| format!("Impossible d'ouvrir la base {:?}", path))?;
    Ok(conn)
}

pub fn migrate(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)
        .context("Échec de la migration")?;
    Ok(())
}

fn encode_numbers(numbers: &[u8]) -> String {
    numbers
        .iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

fn decode_numbers(raw: &str) -> std::result::Result<Vec<u8>, std::num::ParseIntError> {
    raw.split(',')
        .filter(|s| !s.is_empty())
        .map(|s| s.trim().parse::<u8>())
        .collect()
}

pub fn insert_draw(conn: &Connection, mode: GameMode, draw: &Draw) -> Result<bool> {
    let changed = conn.execute(
        "INSERT OR IGNORE INTO draws (mode, sequence_id, date, numbers)
         VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![
            mode.key(),
            draw.sequence_id,
            draw.date,
            encode_numbers(&draw.numbers),
        ],
    ).context("Échec de l'insertion")?;
    Ok(changed > 0)
}

/// Remplace tout l'historique d'une modalité. Retourne le nombre de tirages insérés
/// (les concours en double dans `draws` ne sont comptés qu'une fois).
pub fn replace_draws(conn: &Connection, mode: GameMode, draws: &[Draw]) -> Result<u32> {
    let tx = conn.unchecked_transaction()
        .context("Impossible de démarrer la transaction")?;

    let removed = tx.execute("DELETE FROM draws WHERE mode = ?1", [mode.key()])
        .context("Échec de la suppression de l'historique")?;
    if removed > 0 {
        log::info!("{}: {} tirages remplacés", mode, removed);
    }

    let mut inserted = 0u32;
    for draw in draws {
        if insert_draw(&tx, mode, draw)? {
            inserted += 1;
        } else {
            log::warn!("{}: concours {} en double ignoré", mode, draw.sequence_id);
        }
    }

    tx.commit().context("Échec du commit")?;
    Ok(inserted)
}

fn query_draws<P: rusqlite::Params>(conn: &Connection, sql: &str, params: P) -> Result<Vec<Draw>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params, |row| {
        Ok((
            row.get::<_, u32>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
        ))
    })?.collect::<Result<Vec<_>, _>>()?;

    rows.into_iter()
        .map(|(sequence_id, date, raw)| -> Result<Draw> {
            let numbers = decode_numbers(&raw)
                .with_context(|| format!("Numéros illisibles pour le concours {}: '{}'", sequence_id, raw))?;
            Ok(Draw { sequence_id, date, numbers })
        })
        .collect()
}

/// Historique complet, du plus ancien au plus récent.
pub fn fetch_draws(conn: &Connection, mode: GameMode) -> Result<Vec<Draw>> {
    query_draws(
        conn,
        "SELECT sequence_id, date, numbers FROM draws WHERE mode = ?1 ORDER BY sequence_id ASC",
        rusqlite::params![mode.key()],
    )
}

/// Derniers tirages, le plus récent en premier.
pub fn fetch_last_draws(conn: &Connection, mode: GameMode, limit: u32) -> Result<Vec<Draw>> {
    query_draws(
        conn,
        "SELECT sequence_id, date, numbers FROM draws WHERE mode = ?1 ORDER BY sequence_id DESC LIMIT ?2",
        rusqlite::params![mode.key(), limit],
    )
}

pub fn count_draws(conn: &Connection, mode: GameMode) -> Result<u32> {
    let count: u32 = conn.query_row(
        "SELECT COUNT(*) FROM draws WHERE mode = ?1",
        [mode.key()],
        |row| row.get(0),
    )?;
    Ok(count)
}
