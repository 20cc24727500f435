pub mod follow;
pub mod frequency;
pub mod markov;
pub mod omission;
pub mod periodicity;

use std::fmt;

use letrio_db::models::{Draw, Position, DIGIT_COUNT};
use serde::{Deserialize, Serialize};

pub type Signal = [f64; DIGIT_COUNT];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalKind {
    Frequency,
    Omission,
    Follow,
    Periodicity,
    Markov,
}

impl SignalKind {
    pub const ALL: [SignalKind; 5] = [
        SignalKind::Frequency,
        SignalKind::Omission,
        SignalKind::Follow,
        SignalKind::Periodicity,
        SignalKind::Markov,
    ];
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalKind::Frequency => write!(f, "Chaud/Froid"),
            SignalKind::Omission => write!(f, "Retard"),
            SignalKind::Follow => write!(f, "Suivi"),
            SignalKind::Periodicity => write!(f, "Périodicité"),
            SignalKind::Markov => write!(f, "Markov"),
        }
    }
}

pub trait SignalExtractor: Send + Sync {
    fn kind(&self) -> SignalKind;

    fn name(&self) -> &str;

    /// `window` est chronologique : window[0] = tirage le plus ancien.
    /// Retourne un score dans [0, 1] pour chacun des dix chiffres.
    fn score(&self, window: &[Draw], position: Position) -> Signal;
}

pub fn all_extractors() -> Vec<Box<dyn SignalExtractor>> {
    vec![
        Box::new(frequency::FrequencyExtractor::new()),
        Box::new(omission::OmissionExtractor::new()),
        Box::new(follow::FollowExtractor::new()),
        Box::new(periodicity::PeriodicityExtractor::default()),
        Box::new(markov::MarkovExtractor::new()),
    ]
}

/// Signal neutre utilisé quand la fenêtre ne permet pas de conclure.
pub fn uniform() -> Signal {
    [1.0 / DIGIT_COUNT as f64; DIGIT_COUNT]
}

/// Ramène le maximum à 1.0 ; un signal nul devient uniforme.
pub fn normalize_max(raw: Signal) -> Signal {
    let max = raw.iter().copied().fold(0.0f64, f64::max);
    if max <= 0.0 {
        return uniform();
    }
    raw.map(|v| v / max)
}

pub fn is_valid_signal(signal: &Signal) -> bool {
    signal.iter().all(|&v| v.is_finite() && (0.0..=1.0).contains(&v))
}

/// Chiffres de la position dans l'ordre de la fenêtre.
pub(crate) fn digit_series(window: &[Draw], position: Position) -> Vec<usize> {
    window.iter().map(|d| d.digit(position) as usize).collect()
}

#[cfg(test)]
pub(crate) fn make_test_draws(n: usize) -> Vec<Draw> {
    use letrio_db::models::Period;

    (0..n)
        .map(|i| Draw {
            id: i as u64 + 1,
            period: Period::parse(&format!("{}", 2_024_001 + i)).unwrap(),
            hundred: ((i * 3) % 10) as u8,
            ten: ((i * 7 + 1) % 10) as u8,
            one: ((i * i + 2) % 10) as u8,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_extractors_distinct_kinds() {
        let extractors = all_extractors();
        assert_eq!(extractors.len(), SignalKind::ALL.len());
        for (e, kind) in extractors.iter().zip(SignalKind::ALL) {
            assert_eq!(e.kind(), kind);
        }
    }

    #[test]
    fn test_all_extractors_valid_on_every_window_length() {
        let draws = make_test_draws(60);
        for e in all_extractors() {
            for len in [0, 1, 2, 3, 10, 60] {
                for position in Position::ALL {
                    let signal = e.score(&draws[..len], position);
                    assert!(is_valid_signal(&signal),
                        "{} len={} {:?} -> {:?}", e.name(), len, position, signal);
                }
            }
        }
    }

    #[test]
    fn test_short_window_defaults_to_uniform() {
        let draws = make_test_draws(1);
        for e in all_extractors() {
            if matches!(e.kind(), SignalKind::Follow | SignalKind::Markov) {
                let signal = e.score(&draws, Position::Hundred);
                assert_eq!(signal, uniform(), "{}", e.name());
            }
        }
    }

    #[test]
    fn test_normalize_max() {
        let mut raw = [0.0; DIGIT_COUNT];
        raw[3] = 4.0;
        raw[5] = 2.0;
        let n = normalize_max(raw);
        assert_eq!(n[3], 1.0);
        assert_eq!(n[5], 0.5);
        assert_eq!(n[0], 0.0);
        assert_eq!(normalize_max([0.0; DIGIT_COUNT]), uniform());
    }
}
