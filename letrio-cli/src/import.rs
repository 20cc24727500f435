use anyhow::{Context, Result};
use std::path::Path;

use letrio_db::models::NewDraw;

/// Lignes `periode;centaines;dizaines;unites`, séparateur `;` ou `,`.
/// L'en-tête est facultatif.
pub fn parse_record(record: &csv::StringRecord) -> Result<NewDraw> {
    let get = |idx: usize| -> Result<String> {
        record
            .get(idx)
            .map(|s| s.trim().to_string())
            .with_context(|| format!("Champ manquant à l'index {}", idx))
    };

    let get_digit = |idx: usize| -> Result<u8> {
        let s = get(idx)?;
        s.parse::<u8>()
            .with_context(|| format!("Impossible de parser '{}' (index {})", s, idx))
    };

    Ok(NewDraw {
        period: get(0)?,
        hundred: get_digit(1)?,
        ten: get_digit(2)?,
        one: get_digit(3)?,
    })
}

/// En-tête : le deuxième champ n'est pas numérique. Un chiffre hors plage
/// (`300`) reste une ligne de données, comptée en erreur.
fn is_header(record: &csv::StringRecord) -> bool {
    record
        .get(1)
        .is_some_and(|s| !s.trim().chars().all(|c| c.is_ascii_digit()))
}

pub fn detect_delimiter(content: &str) -> u8 {
    let first = content.lines().next().unwrap_or_default();
    if first.contains(';') { b';' } else { b',' }
}

pub struct ImportResult {
    pub total_records: u32,
    pub draws: Vec<NewDraw>,
    pub errors: u32,
}

pub fn parse_csv(content: &str) -> ImportResult {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(detect_delimiter(content))
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut result = ImportResult {
        total_records: 0,
        draws: Vec::new(),
        errors: 0,
    };

    for (line, record_result) in reader.records().enumerate() {
        match record_result {
            Ok(record) if line == 0 && is_header(&record) => continue,
            Ok(record) => {
                result.total_records += 1;
                match parse_record(&record) {
                    Ok(draw) => result.draws.push(draw),
                    Err(e) => {
                        eprintln!("Erreur parsing ligne {}: {}", line + 1, e);
                        result.errors += 1;
                    }
                }
            }
            Err(e) => {
                result.total_records += 1;
                eprintln!("Erreur lecture ligne {}: {}", line + 1, e);
                result.errors += 1;
            }
        }
    }

    result
}

pub fn read_csv(path: &Path) -> Result<ImportResult> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Impossible d'ouvrir {:?}", path))?;
    Ok(parse_csv(&content))
}
