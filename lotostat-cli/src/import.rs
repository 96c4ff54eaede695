use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use lotostat_db::rusqlite::Connection;
use std::path::Path;

use lotostat_db::db::replace_draws;
use lotostat_db::models::{Draw, GameMode, validate_draw};

const MIN_COLUMNS: usize = 8;
const DEFAULT_DATE: &str = "01/01/2024";

pub struct ImportResult {
    pub total_records: u32,
    pub imported: u32,
    pub skipped: u32,
    pub errors: u32,
}

fn detect_delimiter(header: &str) -> u8 {
    if header.contains(';') { b';' } else { b',' }
}

/// Dates `JJ/MM/AAAA` ou `AAAA-MM-JJ`, restituées en `JJ/MM/AAAA`.
fn normalize_date(raw: &str) -> Result<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(DEFAULT_DATE.to_string());
    }
    let date = NaiveDate::parse_from_str(raw, "%d/%m/%Y")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
        .with_context(|| format!("Format de date invalide: '{}'", raw))?;
    Ok(date.format("%d/%m/%Y").to_string())
}

/// `None` quand la ligne a trop peu de colonnes pour être un tirage.
fn parse_record(record: &csv::StringRecord, row: u32, mode: GameMode) -> Result<Option<Draw>> {
    if record.len() < MIN_COLUMNS {
        return Ok(None);
    }

    let sequence_id = record
        .get(0)
        .and_then(|s| s.trim().parse::<u32>().ok())
        .filter(|&id| id > 0)
        .unwrap_or(row);

    let date = normalize_date(record.get(1).unwrap_or_default())?;

    // les colonnes suivant les dezenas (gagnants, gains...) sont ignorées
    let numbers = record
        .iter()
        .skip(2)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .take(mode.rules().draw_size)
        .map(|s| {
            s.parse::<u8>()
                .with_context(|| format!("Impossible de parser le numéro '{}'", s))
        })
        .collect::<Result<Vec<u8>>>()?;

    validate_draw(mode, &numbers)?;

    Ok(Some(Draw { sequence_id, date, numbers }))
}

pub fn parse_csv(content: &str, mode: GameMode) -> (Vec<Draw>, ImportResult) {
    let header = content.lines().next().unwrap_or_default();
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(detect_delimiter(header))
        .flexible(true)
        .has_headers(true)
        .from_reader(content.as_bytes());

    let mut result = ImportResult {
        total_records: 0,
        imported: 0,
        skipped: 0,
        errors: 0,
    };
    let mut draws = Vec::new();

    for record_result in reader.records() {
        result.total_records += 1;
        match record_result {
            Ok(record) => {
                match parse_record(&record, result.total_records, mode) {
                    Ok(Some(draw)) => {
                        draws.push(draw);
                        result.imported += 1;
                    }
                    Ok(None) => result.skipped += 1,
                    Err(e) => {
                        log::warn!("Ligne {} rejetée : {:#}", result.total_records, e);
                        result.errors += 1;
                    }
                }
            }
            Err(e) => {
                log::warn!("Erreur lecture ligne {}: {}", result.total_records, e);
                result.errors += 1;
            }
        }
    }

    (draws, result)
}

/// Remplace l'historique de la modalité par le contenu du fichier.
pub fn import_csv(conn: &Connection, mode: GameMode, path: &Path) -> Result<ImportResult> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Impossible d'ouvrir {:?}", path))?;

    let (draws, mut result) = parse_csv(&content, mode);
    if draws.is_empty() {
        bail!("Format de CSV invalide ou fichier vide : aucun tirage valide dans {:?}", path);
    }

    let inserted = replace_draws(conn, mode, &draws)?;
    let duplicates = result.imported - inserted;
    if duplicates > 0 {
        result.imported = inserted;
        result.skipped += duplicates;
    }

    log::info!(
        "{}: {} tirages importés depuis {:?} ({} ignorés, {} erreurs)",
        mode, result.imported, path, result.skipped, result.errors
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lotostat_db::db::{count_draws, fetch_draws, migrate};

    const MEGA_CSV: &str = "\
Concurso;Data;B1;B2;B3;B4;B5;B6
1;11/03/1996;41;5;4;52;30;33
2;18/03/1996;9;39;37;49;43;41
3;25/03/1996;10;11;29;30;36;47
";

    #[test]
    fn test_normalize_date() {
        assert_eq!(normalize_date("17/02/2026").unwrap(), "17/02/2026");
        assert_eq!(normalize_date("2020-01-05").unwrap(), "05/01/2020");
        assert_eq!(normalize_date("").unwrap(), DEFAULT_DATE);
        assert!(normalize_date("31/02/2020").is_err());
        assert!(normalize_date("hier").is_err());
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter("Concurso;Data;B1"), b';');
        assert_eq!(detect_delimiter("Concurso,Data,B1"), b',');
    }

    #[test]
    fn test_parse_semicolon_csv() {
        let (draws, result) = parse_csv(MEGA_CSV, GameMode::MegaSena);
        assert_eq!(result.total_records, 3);
        assert_eq!(result.imported, 3);
        assert_eq!(result.errors, 0);
        assert_eq!(draws[0].sequence_id, 1);
        assert_eq!(draws[0].numbers, vec![41, 5, 4, 52, 30, 33]);
        assert_eq!(draws[2].date, "25/03/1996");
    }

    #[test]
    fn test_parse_comma_csv_with_extra_columns() {
        let csv = "\
Concurso,Data,B1,B2,B3,B4,B5,B6,Ganhadores,Rateio
2700,02/04/2024,3,17,22,38,49,58,0,0
";
        let (draws, result) = parse_csv(csv, GameMode::MegaSena);
        assert_eq!(result.imported, 1);
        assert_eq!(draws[0].sequence_id, 2700);
        assert_eq!(draws[0].numbers, vec![3, 17, 22, 38, 49, 58]);
    }

    #[test]
    fn test_short_rows_skipped_and_bad_rows_rejected() {
        let csv = "\
Concurso;Data;B1;B2;B3;B4;B5;B6
1;11/03/1996;41;5
2;18/03/1996;9;39;37;49;43;xx
3;25/03/1996;10;11;29;30;36;61
;;10;11;29;30;36;47
";
        let (draws, result) = parse_csv(csv, GameMode::MegaSena);
        assert_eq!(result.total_records, 4);
        assert_eq!(result.skipped, 1);
        assert_eq!(result.errors, 2);
        assert_eq!(result.imported, 1);
        assert_eq!(draws[0].sequence_id, 4);
        assert_eq!(draws[0].date, DEFAULT_DATE);
    }

    #[test]
    fn test_lotofacil_requires_fifteen_numbers() {
        let (_, result) = parse_csv(MEGA_CSV, GameMode::Lotofacil);
        assert_eq!(result.imported, 0);
        assert_eq!(result.errors, 3);
    }

    #[test]
    fn test_import_replaces_history() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();

        let path = std::env::temp_dir().join(format!("lotostat-import-{}.csv", std::process::id()));
        std::fs::write(&path, MEGA_CSV).unwrap();

        let first = import_csv(&conn, GameMode::MegaSena, &path).unwrap();
        assert_eq!(first.imported, 3);
        let again = import_csv(&conn, GameMode::MegaSena, &path).unwrap();
        assert_eq!(again.imported, 3);
        assert_eq!(count_draws(&conn, GameMode::MegaSena).unwrap(), 3);
        assert_eq!(fetch_draws(&conn, GameMode::MegaSena).unwrap()[1].sequence_id, 2);

        std::fs::write(&path, "Concurso;Data\n").unwrap();
        assert!(import_csv(&conn, GameMode::MegaSena, &path).is_err());
        assert_eq!(count_draws(&conn, GameMode::MegaSena).unwrap(), 3);

        std::fs::remove_file(&path).ok();
    }
}
