use letrio_db::models::{Draw, NewDraw, Statistics};
use rayon::prelude::*;
use serde::Serialize;

use crate::config::{EngineConfig, WindowSize};
use crate::engine::LotteryEngine;
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktestResult {
    pub window: WindowSize,
    pub statistics: Statistics,
    /// Précision cumulée (%) après chaque validation.
    pub accuracy_curve: Vec<f64>,
}

/// Rejoue tout l'historique dans un moteur neuf : chaque tirage n'est prédit
/// qu'à partir des tirages qui le précèdent.
pub fn replay(history: &[Draw], config: &EngineConfig) -> Result<BacktestResult> {
    let mut engine = LotteryEngine::new(config.clone())?;
    let mut hits = 0usize;
    let mut accuracy_curve = Vec::with_capacity(history.len().saturating_sub(1));

    for draw in history {
        let outcome = engine.ingest_draw(NewDraw {
            period: draw.period.to_string(),
            hundred: draw.hundred,
            ten: draw.ten,
            one: draw.one,
        })?;
        if let Some(v) = outcome.validation {
            if v.is_hit() {
                hits += 1;
            }
            accuracy_curve.push(100.0 * hits as f64 / engine.validations().len() as f64);
        }
    }

    Ok(BacktestResult {
        window: config.window_size,
        statistics: engine.statistics(),
        accuracy_curve,
    })
}

/// Un rejeu par taille de fenêtre, en parallèle. `on_done` est appelé à la fin de chaque rejeu.
pub fn backtest_windows(
    history: &[Draw],
    config: &EngineConfig,
    windows: &[WindowSize],
    on_done: impl Fn(WindowSize) + Sync,
) -> Result<Vec<BacktestResult>> {
    windows
        .par_iter()
        .map(|&window| {
            let config = EngineConfig { window_size: window, ..config.clone() };
            let result = replay(history, &config);
            on_done(window);
            log::debug!("rejeu fenêtre {} terminé", window);
            result
        })
        .collect()
}

/// Meilleure fenêtre : précision maximale, puis série la plus longue, puis la plus petite fenêtre.
pub fn best_window(results: &[BacktestResult]) -> Option<&BacktestResult> {
    results.iter().max_by(|a, b| {
        a.statistics
            .overall_accuracy
            .cmp(&b.statistics.overall_accuracy)
            .then(a.statistics.longest_streak.cmp(&b.statistics.longest_streak))
            .then(b.window.get().cmp(&a.window.get()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::make_test_draws;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_replay_validates_every_draw_but_first() {
        let draws = make_test_draws(40);
        let result = replay(&draws, &EngineConfig::default()).unwrap();
        assert_eq!(result.statistics.total, 39);
        assert_eq!(result.accuracy_curve.len(), 39);
        let last = *result.accuracy_curve.last().unwrap();
        assert_eq!(last.round() as u32, result.statistics.overall_accuracy);
    }

    #[test]
    fn test_backtest_windows_in_parallel_matches_sequential() {
        let draws = make_test_draws(60);
        let windows = vec![WindowSize::new(10).unwrap(), WindowSize::new(30).unwrap()];
        let done = AtomicUsize::new(0);
        let results = backtest_windows(&draws, &EngineConfig::default(), &windows, |_| {
            done.fetch_add(1, Ordering::Relaxed);
        })
        .unwrap();

        assert_eq!(done.load(Ordering::Relaxed), 2);
        assert_eq!(results.len(), 2);
        for (result, window) in results.iter().zip(&windows) {
            assert_eq!(result.window, *window);
            let config = EngineConfig { window_size: *window, ..EngineConfig::default() };
            assert_eq!(result, &replay(&draws, &config).unwrap());
        }
    }

    #[test]
    fn test_best_window() {
        let draws = make_test_draws(30);
        let results = backtest_windows(&draws, &EngineConfig::default(), &WindowSize::all(), |_| {}).unwrap();
        let best = best_window(&results).unwrap();
        assert!(results
            .iter()
            .all(|r| r.statistics.overall_accuracy <= best.statistics.overall_accuracy));
        assert!(best_window(&[]).is_none());
    }
}
