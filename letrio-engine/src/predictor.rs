use chrono::TimeDelta;
use letrio_db::models::{Draw, Period, Position, Prediction};

use crate::config::{EngineConfig, WindowSize};
use crate::error::{EngineError, Result};
use crate::scorer::CompositeScorer;

/// Règle de succession des périodes.
///
/// - horodatage `YYYYMMDDHHmmss` : + l'écart entre les deux derniers tirages
///   horodatés, ou l'intervalle par défaut ;
/// - autre période numérique : + 1, en conservant la largeur (zéros à gauche) ;
/// - sinon : suffixe `+1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodSchedule {
    default_interval: TimeDelta,
}

impl PeriodSchedule {
    pub fn new(default_interval_secs: i64) -> Self {
        Self {
            default_interval: TimeDelta::seconds(default_interval_secs.max(1)),
        }
    }

    /// Période qui suit le dernier tirage de l'historique.
    pub fn next_period(&self, history: &[Draw]) -> Option<Period> {
        let last = &history.last()?.period;
        let previous = history.len().checked_sub(2).map(|i| &history[i].period);
        Some(self.successor(last, previous))
    }

    pub fn successor(&self, last: &Period, previous: Option<&Period>) -> Period {
        if let Some(ts) = last.timestamp() {
            let interval = previous
                .and_then(Period::timestamp)
                .map(|prev| ts.signed_duration_since(prev))
                .filter(|d| *d > TimeDelta::zero())
                .unwrap_or(self.default_interval);
            if let Some(next) = ts.checked_add_signed(interval) {
                return Period::from_timestamp(next);
            }
        }

        let raw = last.as_str();
        let next = if last.is_numeric() {
            increment_decimal(raw)
        } else {
            format!("{raw}+1")
        };
        // Les deux formes ne contiennent ni espace ni caractère de contrôle.
        Period::parse(&next).unwrap_or_else(|| last.clone())
    }
}

impl Default for PeriodSchedule {
    fn default() -> Self {
        Self::new(EngineConfig::default().default_interval_secs)
    }
}

fn increment_decimal(digits: &str) -> String {
    let mut chars: Vec<char> = digits.chars().collect();
    let mut i = chars.len();
    loop {
        if i == 0 {
            chars.insert(0, '1');
            break;
        }
        i -= 1;
        if chars[i] == '9' {
            chars[i] = '0';
        } else {
            chars[i] = char::from(chars[i] as u8 + 1);
            break;
        }
    }
    chars.into_iter().collect()
}

pub struct Predictor {
    scorer: CompositeScorer,
    schedule: PeriodSchedule,
}

impl Predictor {
    pub fn new(config: &EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            scorer: CompositeScorer::new(config.weights)?,
            schedule: PeriodSchedule::new(config.default_interval_secs),
        })
    }

    pub fn scorer(&self) -> &CompositeScorer {
        &self.scorer
    }

    pub fn schedule(&self) -> &PeriodSchedule {
        &self.schedule
    }

    /// Prédiction pour la période qui suit le dernier tirage.
    /// Un seul tirage suffit : les signaux sans historique prennent leur valeur neutre.
    pub fn predict(&self, history: &[Draw], window: WindowSize) -> Result<Prediction> {
        let Some(period) = self.schedule.next_period(history) else {
            return Err(EngineError::InsufficientHistory { required: 1, available: 0 });
        };
        let view = window_view(history, window);

        Ok(Prediction {
            period,
            hundred: self.scorer.rank(view, Position::Hundred),
            ten: self.scorer.rank(view, Position::Ten),
            one: self.scorer.rank(view, Position::One),
        })
    }
}

/// Les `window` derniers tirages, dans l'ordre chronologique.
pub fn window_view(history: &[Draw], window: WindowSize) -> &[Draw] {
    let start = history.len().saturating_sub(window.get());
    &history[start..]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::make_test_draws;

    fn period(raw: &str) -> Period {
        Period::parse(raw).unwrap()
    }

    #[test]
    fn test_increment_decimal() {
        assert_eq!(increment_decimal("2024001"), "2024002");
        assert_eq!(increment_decimal("0099"), "0100");
        assert_eq!(increment_decimal("999"), "1000");
    }

    #[test]
    fn test_successor_timestamp_uses_observed_interval() {
        let s = PeriodSchedule::new(60);
        let next = s.successor(&period("20240315093500"), Some(&period("20240315093000")));
        assert_eq!(next.as_str(), "20240315094000");
    }

    #[test]
    fn test_successor_timestamp_default_interval() {
        let s = PeriodSchedule::new(90);
        let next = s.successor(&period("20240315235930"), None);
        assert_eq!(next.as_str(), "20240316000100");
    }

    #[test]
    fn test_successor_other_forms() {
        let s = PeriodSchedule::default();
        assert_eq!(s.successor(&period("2024099"), None).as_str(), "2024100");
        assert_eq!(s.successor(&period("A-17"), None).as_str(), "A-17+1");
        assert!(s.successor(&period("A-17"), None) > period("A-17"));
    }

    #[test]
    fn test_predict_full_permutations_for_every_window() {
        let predictor = Predictor::new(&EngineConfig::default()).unwrap();
        let draws = make_test_draws(250);
        for window in WindowSize::all() {
            let pred = predictor.predict(&draws, window).unwrap();
            for position in Position::ALL {
                assert!(pred.position(position).is_permutation(),
                    "window={} {:?}", window, position);
            }
        }
    }

    #[test]
    fn test_predict_is_deterministic() {
        let predictor = Predictor::new(&EngineConfig::default()).unwrap();
        let draws = make_test_draws(80);
        let window = WindowSize::new(30).unwrap();
        let a = predictor.predict(&draws, window).unwrap();
        let b = predictor.predict(&draws, window).unwrap();
        assert_eq!(a, b);
        for position in Position::ALL {
            let pa: Vec<u64> = a.position(position).entries().iter().map(|e| e.probability.to_bits()).collect();
            let pb: Vec<u64> = b.position(position).entries().iter().map(|e| e.probability.to_bits()).collect();
            assert_eq!(pa, pb);
        }
    }

    #[test]
    fn test_predict_targets_next_period() {
        let predictor = Predictor::new(&EngineConfig::default()).unwrap();
        let draws = make_test_draws(5);
        let pred = predictor.predict(&draws, WindowSize::default()).unwrap();
        assert_eq!(pred.period.as_str(), "2024006");
    }

    #[test]
    fn test_predict_single_draw() {
        let predictor = Predictor::new(&EngineConfig::default()).unwrap();
        let draws = make_test_draws(1);
        let pred = predictor.predict(&draws, WindowSize::default()).unwrap();
        assert!(pred.hundred.is_permutation());
    }

    #[test]
    fn test_predict_empty_history() {
        let predictor = Predictor::new(&EngineConfig::default()).unwrap();
        let err = predictor.predict(&[], WindowSize::default()).unwrap_err();
        assert_eq!(err, EngineError::InsufficientHistory { required: 1, available: 0 });
    }

    #[test]
    fn test_window_view() {
        let draws = make_test_draws(25);
        let view = window_view(&draws, WindowSize::new(10).unwrap());
        assert_eq!(view.len(), 10);
        assert_eq!(view[0].id, 16);
        assert_eq!(view[9].id, 25);
        assert_eq!(window_view(&draws[..4], WindowSize::new(10).unwrap()).len(), 4);
    }
}
