use std::sync::Arc;

use letrio_db::models::{Draw, NewDraw, Prediction, Statistics, Validation};
use parking_lot::RwLock;

use crate::engine::{IngestOutcome, LotteryEngine};
use crate::error::Result;

/// Moteur partagé entre threads. Les écritures passent par un verrou exclusif,
/// les lectures renvoient des copies.
#[derive(Clone)]
pub struct SharedEngine(Arc<RwLock<LotteryEngine>>);

impl SharedEngine {
    pub fn new(engine: LotteryEngine) -> Self {
        Self(Arc::new(RwLock::new(engine)))
    }

    pub fn ingest_draw(&self, new: NewDraw) -> Result<IngestOutcome> {
        self.0.write().ingest_draw(new)
    }

    pub fn set_window_size(&self, size: usize) -> Result<()> {
        self.0.write().set_window_size(size)
    }

    pub fn clear(&self) {
        self.0.write().clear();
    }

    pub fn current_prediction(&self) -> Option<Prediction> {
        self.0.read().current_prediction().cloned()
    }

    pub fn validations(&self) -> Vec<Validation> {
        self.0.read().validations().to_vec()
    }

    pub fn statistics(&self) -> Statistics {
        self.0.read().statistics()
    }

    pub fn draws(&self) -> Vec<Draw> {
        self.0.read().draws().to_vec()
    }

    /// Lecture arbitraire sous le verrou partagé.
    pub fn read<T>(&self, f: impl FnOnce(&LotteryEngine) -> T) -> T {
        f(&self.0.read())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;

    #[test]
    fn test_concurrent_ingestion_keeps_invariants() {
        let shared = SharedEngine::new(LotteryEngine::new(EngineConfig::default()).unwrap());
        let writer = {
            let shared = shared.clone();
            std::thread::spawn(move || {
                for i in 0..60u32 {
                    shared
                        .ingest_draw(NewDraw {
                            period: format!("{}", 5000 + i),
                            hundred: (i % 10) as u8,
                            ten: (i * 3 % 10) as u8,
                            one: (i * 7 % 10) as u8,
                        })
                        .unwrap();
                }
            })
        };

        for _ in 0..200 {
            let (draws, validations, pending) = shared.read(|e| {
                (e.draws().len(), e.validations().len(), e.current_prediction().cloned())
            });
            // Chaque tirage après le premier valide exactement la prédiction précédente.
            assert_eq!(validations, draws.saturating_sub(1));
            assert_eq!(pending.is_some(), draws > 0);
        }

        writer.join().unwrap();
        assert_eq!(shared.draws().len(), 60);
        assert_eq!(shared.validations().len(), 59);
        assert_eq!(shared.statistics().total, 59);
    }
}
