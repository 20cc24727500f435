use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use letrio_db::db::{
    data_dir, fetch_all_draws, fetch_validations, insert_draw, insert_validation, load_pending,
    save_pending,
};
use letrio_db::models::{NewDraw, Period};
use letrio_db::rusqlite::Connection;
use letrio_engine::{EngineConfig, IngestOutcome, LotteryEngine};

pub fn config_path() -> PathBuf {
    data_dir().join("letrio.json")
}

/// Reconstruit le moteur à partir de la base.
pub fn load_engine(conn: &Connection, config: EngineConfig) -> Result<LotteryEngine> {
    let draws = fetch_all_draws(conn)?;
    let validations = fetch_validations(conn)?;
    let pending = load_pending(conn)?;
    let engine = LotteryEngine::restore(config, draws, validations, pending)
        .context("Base incohérente, lancez `letrio clear` pour repartir de zéro")?;
    Ok(engine)
}

/// Écrit le tirage, sa validation éventuelle et la nouvelle prédiction.
/// À appeler dans une transaction.
pub fn record_outcome(conn: &Connection, outcome: &IngestOutcome) -> Result<()> {
    insert_draw(conn, &outcome.draw)?;
    if let Some(validation) = &outcome.validation {
        insert_validation(conn, validation)?;
    }
    save_pending(conn, Some(&outcome.prediction))?;
    Ok(())
}

pub struct BatchResult {
    pub outcomes: Vec<IngestOutcome>,
    pub rejected: Vec<(NewDraw, String)>,
}

/// Période par défaut d'un nouveau tirage : celle visée par la prédiction
/// en attente, sinon l'horodatage `now` (base vide).
pub fn next_period(engine: &LotteryEngine, now: NaiveDateTime) -> String {
    match engine.current_prediction() {
        Some(pending) => pending.period.to_string(),
        None => Period::from_timestamp(now).to_string(),
    }
}

/// Ingère une série de tirages ; les tirages refusés par le moteur sont
/// listés sans interrompre le lot. Tout est écrit dans une seule transaction.
pub fn ingest_batch(
    conn: &Connection,
    engine: &mut LotteryEngine,
    draws: Vec<NewDraw>,
) -> Result<BatchResult> {
    let mut draws = draws.into_iter();
    ingest_each(conn, engine, |_| draws.next())
}

/// Comme `ingest_batch`, mais chaque tirage est produit au vu de l'état
/// courant du moteur (`None` termine le lot).
///
/// Si l'écriture échoue, la transaction est annulée et le moteur est
/// rechargé depuis la base : mémoire et disque restent identiques.
pub fn ingest_each<F>(conn: &Connection, engine: &mut LotteryEngine, next: F) -> Result<BatchResult>
where
    F: FnMut(&LotteryEngine) -> Option<NewDraw>,
{
    let config = engine.config().clone();
    let tx = conn
        .unchecked_transaction()
        .context("Impossible de démarrer la transaction")?;

    let written = write_batch(&tx, engine, next).and_then(|result| {
        tx.commit().context("Échec du commit")?;
        Ok(result)
    });

    match written {
        Ok(result) => Ok(result),
        Err(e) => {
            log::debug!("lot annulé, rechargement du moteur : {:#}", e);
            *engine = load_engine(conn, config)?;
            Err(e)
        }
    }
}

fn write_batch<F>(conn: &Connection, engine: &mut LotteryEngine, mut next: F) -> Result<BatchResult>
where
    F: FnMut(&LotteryEngine) -> Option<NewDraw>,
{
    let mut result = BatchResult {
        outcomes: Vec::new(),
        rejected: Vec::new(),
    };

    while let Some(new) = next(engine) {
        match engine.ingest_draw(new.clone()) {
            Ok(outcome) => {
                record_outcome(conn, &outcome)?;
                result.outcomes.push(outcome);
            }
            Err(e) => {
                log::debug!("tirage {} refusé : {}", new.period, e);
                result.rejected.push((new, e.to_string()));
            }
        }
    }

    Ok(result)
}
