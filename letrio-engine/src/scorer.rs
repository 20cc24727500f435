use letrio_db::models::{DigitProbability, DigitScore, Draw, Position, PositionPrediction, DIGIT_COUNT};

use crate::config::Weights;
use crate::error::Result;
use crate::extractors::{all_extractors, Signal, SignalExtractor, SignalKind};

/// Détail d'un score composite : la contribution brute de chaque signal.
#[derive(Debug, Clone)]
pub struct Breakdown {
    pub signals: Vec<(SignalKind, Signal)>,
    pub composite: Signal,
}

pub struct CompositeScorer {
    extractors: Vec<Box<dyn SignalExtractor>>,
    weights: Weights,
}

impl CompositeScorer {
    pub fn new(weights: Weights) -> Result<Self> {
        weights.validate()?;
        Ok(Self {
            extractors: all_extractors(),
            weights,
        })
    }

    pub fn weights(&self) -> &Weights {
        &self.weights
    }

    pub fn breakdown(&self, window: &[Draw], position: Position) -> Breakdown {
        let mut composite = [0.0f64; DIGIT_COUNT];
        let mut signals = Vec::with_capacity(self.extractors.len());

        for extractor in &self.extractors {
            let signal = extractor.score(window, position);
            let w = self.weights.get(extractor.kind());
            for d in 0..DIGIT_COUNT {
                composite[d] += w * signal[d];
            }
            log::trace!("{} {:?} {:?}", extractor.name(), position, signal);
            signals.push((extractor.kind(), signal));
        }

        Breakdown { signals, composite }
    }

    pub fn composite(&self, window: &[Draw], position: Position) -> Signal {
        self.breakdown(window, position).composite
    }

    pub fn rank(&self, window: &[Draw], position: Position) -> PositionPrediction {
        to_position_prediction(&rank_digits(&self.composite(window, position)))
    }
}

/// Chiffres par score décroissant ; à score égal, le plus petit chiffre d'abord.
pub fn rank_digits(composite: &Signal) -> Vec<DigitScore> {
    let mut ranked: Vec<DigitScore> = composite
        .iter()
        .enumerate()
        .map(|(d, &score)| DigitScore { digit: d as u8, score })
        .collect();
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.digit.cmp(&b.digit)));
    ranked
}

/// Convertit un classement en "probabilités" d'affichage : part du total, en pourcentage.
pub fn to_position_prediction(ranked: &[DigitScore]) -> PositionPrediction {
    let total: f64 = ranked.iter().map(|s| s.score.max(0.0)).sum();
    let entries = ranked
        .iter()
        .map(|s| DigitProbability {
            digit: s.digit,
            probability: if total > 0.0 {
                s.score.max(0.0) / total * 100.0
            } else {
                100.0 / DIGIT_COUNT as f64
            },
        })
        .collect();
    PositionPrediction::new(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::make_test_draws;

    #[test]
    fn test_rank_descending_with_digit_tiebreak() {
        let mut composite = [0.1; DIGIT_COUNT];
        composite[7] = 0.9;
        composite[2] = 0.5;
        composite[4] = 0.5;
        let ranked = rank_digits(&composite);
        let digits: Vec<u8> = ranked.iter().map(|s| s.digit).collect();
        assert_eq!(digits, vec![7, 2, 4, 0, 1, 3, 5, 6, 8, 9]);
    }

    #[test]
    fn test_probabilities_monotonic() {
        let composite = [0.3, 0.1, 0.9, 0.2, 0.0, 0.5, 0.7, 0.4, 0.6, 0.8];
        let pred = to_position_prediction(&rank_digits(&composite));
        assert!(pred.is_permutation());
        let probs: Vec<f64> = pred.entries().iter().map(|e| e.probability).collect();
        assert!(probs.windows(2).all(|w| w[0] >= w[1]));
        assert!((probs.iter().sum::<f64>() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_composite_gives_uniform_probabilities() {
        let pred = to_position_prediction(&rank_digits(&[0.0; DIGIT_COUNT]));
        assert_eq!(pred.digits(), (0..10).collect::<Vec<u8>>());
        assert!(pred.entries().iter().all(|e| (e.probability - 10.0).abs() < 1e-12));
    }

    #[test]
    fn test_composite_is_weighted_sum() {
        let scorer = CompositeScorer::new(Weights::default()).unwrap();
        let draws = make_test_draws(40);
        let b = scorer.breakdown(&draws, Position::Ten);
        assert_eq!(b.signals.len(), 5);
        for d in 0..DIGIT_COUNT {
            let expected: f64 = b
                .signals
                .iter()
                .map(|(kind, s)| scorer.weights().get(*kind) * s[d])
                .sum();
            assert!((b.composite[d] - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn test_single_signal_weights_follow_that_signal() {
        let weights = Weights {
            frequency: 0.0,
            omission: 1.0,
            follow: 0.0,
            periodicity: 0.0,
            markov: 0.0,
        };
        let scorer = CompositeScorer::new(weights).unwrap();
        let draws = make_test_draws(30);
        let ranking = scorer.rank(&draws, Position::Hundred);
        // Le chiffre du dernier tirage a un retard nul : il finit dernier.
        let latest = draws.last().unwrap().hundred;
        assert_eq!(*ranking.digits().last().unwrap(), latest);
    }

    #[test]
    fn test_invalid_weights_rejected() {
        let weights = Weights { frequency: 0.9, ..Weights::default() };
        assert!(CompositeScorer::new(weights).is_err());
    }
}
