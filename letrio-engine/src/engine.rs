use letrio_db::models::{Draw, NewDraw, Position, Prediction, Statistics, Validation};
use serde::Serialize;

use crate::config::{EngineConfig, Weights, WindowSize};
use crate::error::{EngineError, Result};
use crate::predictor::Predictor;
use crate::report::{BasicFeatures, FeatureMatrix};
use crate::statistics::statistics;
use crate::store::DrawStore;
use crate::validator::{validate, ValidationLog};

/// Ce qu'une ingestion a produit : le tirage stocké, la validation de la
/// prédiction qui le visait (s'il y en avait une) et la nouvelle prédiction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngestOutcome {
    pub draw: Draw,
    pub validation: Option<Validation>,
    pub prediction: Prediction,
}

/// Point d'entrée unique : historique, prédiction en attente et journal des validations.
///
/// Toute opération qui échoue laisse l'état inchangé.
pub struct LotteryEngine {
    config: EngineConfig,
    predictor: Predictor,
    store: DrawStore,
    log: ValidationLog,
    pending: Option<Prediction>,
}

impl LotteryEngine {
    pub fn new(config: EngineConfig) -> Result<Self> {
        let predictor = Predictor::new(&config)?;
        Ok(Self {
            config,
            predictor,
            store: DrawStore::new(),
            log: ValidationLog::new(),
            pending: None,
        })
    }

    /// Reconstruit un moteur depuis un état persisté, en vérifiant sa cohérence.
    /// Sans prédiction stockée, celle du prochain tirage est recalculée.
    pub fn restore(
        config: EngineConfig,
        draws: Vec<Draw>,
        validations: Vec<Validation>,
        pending: Option<Prediction>,
    ) -> Result<Self> {
        let mut engine = Self::new(config)?;
        engine.store = DrawStore::from_draws(draws)?;

        for validation in validations {
            let matches = validation
                .id
                .checked_sub(1)
                .and_then(|i| engine.store.all().get(i as usize))
                .is_some_and(|d| {
                    d.period == validation.period
                        && d.digits()
                            == [validation.actual_hundred, validation.actual_ten, validation.actual_one]
                });
            if !matches {
                return Err(EngineError::InconsistentState(format!(
                    "validation {} sans tirage correspondant",
                    validation.period
                )));
            }
            engine.log.record(validation)?;
        }

        let expected = engine.predictor.schedule().next_period(engine.store.all());
        engine.pending = match (pending, expected) {
            (Some(p), Some(period)) if p.period == period => Some(p),
            (Some(p), _) => {
                return Err(EngineError::InconsistentState(format!(
                    "prédiction en attente pour {} hors séquence",
                    p.period
                )));
            }
            (None, Some(_)) => Some(engine.predict()?),
            (None, None) => None,
        };

        log::debug!(
            "moteur restauré : {} tirages, {} validations",
            engine.store.len(),
            engine.log.len()
        );
        Ok(engine)
    }

    /// Ajoute un tirage, valide la prédiction qui le visait, puis prédit la période suivante.
    pub fn ingest_draw(&mut self, new: NewDraw) -> Result<IngestOutcome> {
        let draw = self.store.append(new)?.clone();

        let (validation, prediction) = match self.settle(&draw) {
            Ok(settled) => settled,
            Err(e) => {
                self.store.pop();
                return Err(e);
            }
        };

        if let Some(v) = &validation {
            log::debug!("période {} validée, touché : {}", v.period, v.is_hit());
        }
        self.pending = Some(prediction.clone());
        Ok(IngestOutcome {
            draw,
            validation,
            prediction,
        })
    }

    pub fn current_prediction(&self) -> Option<&Prediction> {
        self.pending.as_ref()
    }

    /// Du plus ancien au plus récent.
    pub fn validations(&self) -> &[Validation] {
        self.log.entries()
    }

    pub fn statistics(&self) -> Statistics {
        statistics(self.log.entries())
    }

    pub fn draws(&self) -> &[Draw] {
        self.store.all()
    }

    pub fn window(&self) -> &[Draw] {
        self.store.window(self.config.window_size)
    }

    pub fn window_size(&self) -> WindowSize {
        self.config.window_size
    }

    pub fn weights(&self) -> &Weights {
        &self.config.weights
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Change la fenêtre et recalcule la prédiction en attente (même période visée).
    pub fn set_window_size(&mut self, size: usize) -> Result<()> {
        let window = WindowSize::new(size)?;
        let previous = self.config.window_size;
        self.config.window_size = window;
        if let Err(e) = self.refresh_pending() {
            self.config.window_size = previous;
            return Err(e);
        }
        log::debug!("fenêtre : {} -> {}", previous, window);
        Ok(())
    }

    /// Remplace les poids du score composite et recalcule la prédiction en attente.
    pub fn set_weights(&mut self, weights: Weights) -> Result<()> {
        let config = EngineConfig { weights, ..self.config.clone() };
        let predictor = Predictor::new(&config)?;
        let previous = std::mem::replace(&mut self.predictor, predictor);
        if let Err(e) = self.refresh_pending() {
            self.predictor = previous;
            return Err(e);
        }
        self.config = config;
        Ok(())
    }

    /// Vide l'historique, la prédiction en attente et le journal. Idempotent.
    pub fn clear(&mut self) {
        self.store.clear();
        self.log.clear();
        self.pending = None;
    }

    pub fn feature_matrix(&self, position: Position) -> FeatureMatrix {
        FeatureMatrix::compute(self.predictor.scorer(), self.window(), position)
    }

    pub fn basic_features(&self) -> BasicFeatures {
        BasicFeatures::compute(self.window())
    }

    /// Valide la prédiction en attente contre `draw` (déjà stocké) et prépare la suivante.
    /// Le journal n'est modifié qu'en dernier.
    fn settle(&mut self, draw: &Draw) -> Result<(Option<Validation>, Prediction)> {
        let validation = match self.pending.as_ref() {
            Some(pending) if pending.period == draw.period => Some(validate(pending, draw)?),
            Some(pending) => {
                log::debug!(
                    "prédiction {} abandonnée : tirage reçu pour {}",
                    pending.period,
                    draw.period
                );
                None
            }
            None => None,
        };
        let prediction = self.predict()?;
        if let Some(v) = &validation {
            self.log.record(v.clone())?;
        }
        Ok((validation, prediction))
    }

    fn predict(&self) -> Result<Prediction> {
        self.predictor.predict(self.store.all(), self.config.window_size)
    }

    fn refresh_pending(&mut self) -> Result<()> {
        if self.pending.is_some() {
            self.pending = Some(self.predict()?);
        }
        Ok(())
    }
}
