use anyhow::{Context, Result};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension};
use std::path::{Path, PathBuf};

use crate::models::{Draw, Period, Prediction, Validation};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS draws (
    id       INTEGER PRIMARY KEY,
    period   TEXT NOT NULL UNIQUE,
    hundred  INTEGER NOT NULL,
    ten      INTEGER NOT NULL,
    one      INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS validations (
    id              INTEGER PRIMARY KEY,
    period          TEXT NOT NULL UNIQUE,
    actual_hundred  INTEGER NOT NULL,
    actual_ten      INTEGER NOT NULL,
    actual_one      INTEGER NOT NULL,
    hundred_hit     INTEGER NOT NULL,
    ten_hit         INTEGER NOT NULL,
    one_hit         INTEGER NOT NULL,
    prediction      TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS pending (
    slot        INTEGER PRIMARY KEY CHECK (slot = 0),
    prediction  TEXT NOT NULL
);
";

pub fn data_dir() -> PathBuf {
    let mut path = std::env::current_dir().unwrap_or_default();
    path.push("data");
    path
}

pub fn db_path() -> PathBuf {
    data_dir().join("letrio.db")
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

fn period_column(raw: String, idx: usize) -> rusqlite::Result<Period> {
    Period::parse(&raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            format!("Période invalide en base : '{raw}'").into(),
        )
    })
}

fn prediction_column(raw: String, idx: usize) -> rusqlite::Result<Prediction> {
    serde_json::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn draw_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Draw> {
    Ok(Draw {
        id: row.get::<_, i64>(0)? as u64,
        period: period_column(row.get(1)?, 1)?,
        hundred: row.get(2)?,
        ten: row.get(3)?,
        one: row.get(4)?,
    })
}

pub fn insert_draw(conn: &Connection, draw: &Draw) -> Result<bool> {
    let changed = conn.execute(
        "INSERT OR IGNORE INTO draws (id, period, hundred, ten, one) VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![
            draw.id as i64,
            draw.period.as_str(),
            draw.hundred,
            draw.ten,
            draw.one,
        ],
    ).context("Échec de l'insertion du tirage")?;
    Ok(changed > 0)
}

/// Historique complet, du plus ancien au plus récent.
pub fn fetch_all_draws(conn: &Connection) -> Result<Vec<Draw>> {
    let mut stmt = conn.prepare(
        "SELECT id, period, hundred, ten, one FROM draws ORDER BY id ASC"
    )?;
    let draws = stmt.query_map([], draw_from_row)?.collect::<Result<Vec<_>, _>>()?;
    Ok(draws)
}

/// Les `limit` derniers tirages, le plus récent en premier.
pub fn fetch_last_draws(conn: &Connection, limit: u32) -> Result<Vec<Draw>> {
    let mut stmt = conn.prepare(
        "SELECT id, period, hundred, ten, one FROM draws ORDER BY id DESC LIMIT ?1"
    )?;
    let draws = stmt.query_map([limit], draw_from_row)?.collect::<Result<Vec<_>, _>>()?;
    Ok(draws)
}

pub fn count_draws(conn: &Connection) -> Result<u32> {
    let count: u32 = conn.query_row("SELECT COUNT(*) FROM draws", [], |row| row.get(0))?;
    Ok(count)
}

pub fn insert_validation(conn: &Connection, validation: &Validation) -> Result<bool> {
    let prediction = serde_json::to_string(&validation.prediction)
        .context("Échec de la sérialisation de la prédiction")?;
    let changed = conn.execute(
        "INSERT OR IGNORE INTO validations (id, period, actual_hundred, actual_ten, actual_one, hundred_hit, ten_hit, one_hit, prediction)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        rusqlite::params![
            validation.id as i64,
            validation.period.as_str(),
            validation.actual_hundred,
            validation.actual_ten,
            validation.actual_one,
            validation.hundred_hit,
            validation.ten_hit,
            validation.one_hit,
            prediction,
        ],
    ).context("Échec de l'insertion de la validation")?;
    Ok(changed > 0)
}

/// Journal des validations, du plus ancien au plus récent.
pub fn fetch_validations(conn: &Connection) -> Result<Vec<Validation>> {
    let mut stmt = conn.prepare(
        "SELECT id, period, actual_hundred, actual_ten, actual_one, hundred_hit, ten_hit, one_hit, prediction
         FROM validations ORDER BY id ASC"
    )?;
    let validations = stmt.query_map([], |row| {
        Ok(Validation {
            id: row.get::<_, i64>(0)? as u64,
            period: period_column(row.get(1)?, 1)?,
            actual_hundred: row.get(2)?,
            actual_ten: row.get(3)?,
            actual_one: row.get(4)?,
            hundred_hit: row.get(5)?,
            ten_hit: row.get(6)?,
            one_hit: row.get(7)?,
            prediction: prediction_column(row.get(8)?, 8)?,
        })
    })?.collect::<Result<Vec<_>, _>>()?;
    Ok(validations)
}

/// Remplace la prédiction en attente (ou vide l'emplacement avec `None`).
pub fn save_pending(conn: &Connection, prediction: Option<&Prediction>) -> Result<()> {
    match prediction {
        Some(p) => {
            let json = serde_json::to_string(p)
                .context("Échec de la sérialisation de la prédiction")?;
            conn.execute(
                "INSERT INTO pending (slot, prediction) VALUES (0, ?1)
                 ON CONFLICT(slot) DO UPDATE SET prediction = excluded.prediction",
                [json],
            ).context("Échec de l'enregistrement de la prédiction en attente")?;
        }
        None => {
            conn.execute("DELETE FROM pending", [])
                .context("Échec de la suppression de la prédiction en attente")?;
        }
    }
    Ok(())
}

pub fn load_pending(conn: &Connection) -> Result<Option<Prediction>> {
    let pending = conn
        .query_row("SELECT prediction FROM pending WHERE slot = 0", [], |row| {
            prediction_column(row.get(0)?, 0)
        })
        .optional()?;
    Ok(pending)
}

pub fn clear_all(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "DELETE FROM pending; DELETE FROM validations; DELETE FROM draws;"
    ).context("Échec de la remise à zéro")?;
    Ok(())
}
