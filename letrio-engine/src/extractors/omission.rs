use letrio_db::models::{Draw, Position, DIGIT_COUNT};

use super::{digit_series, uniform, Signal, SignalExtractor, SignalKind};

/// Retard : plus un chiffre est absent depuis longtemps, plus la pression de retour est forte.
pub struct OmissionExtractor;

impl OmissionExtractor {
    pub fn new() -> Self {
        Self
    }
}

/// Nombre de tirages depuis la dernière apparition (0 = présent au dernier tirage).
/// Un chiffre jamais vu reçoit la longueur de la fenêtre.
pub fn gaps(window: &[Draw], position: Position) -> [usize; DIGIT_COUNT] {
    let n = window.len();
    let mut gaps = [n; DIGIT_COUNT];
    for (age, d) in digit_series(window, position).into_iter().rev().enumerate() {
        if gaps[d] == n {
            gaps[d] = age;
        }
    }
    gaps
}

impl SignalExtractor for OmissionExtractor {
    fn kind(&self) -> SignalKind {
        SignalKind::Omission
    }

    fn name(&self) -> &str {
        "Omission"
    }

    fn score(&self, window: &[Draw], position: Position) -> Signal {
        let n = window.len();
        if n == 0 {
            return uniform();
        }
        gaps(window, position).map(|g| g as f64 / n as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use letrio_db::models::Period;

    fn draws_from(units: &[u8]) -> Vec<Draw> {
        units
            .iter()
            .enumerate()
            .map(|(i, &u)| Draw {
                id: i as u64 + 1,
                period: Period::parse(&format!("{}", 100 + i)).unwrap(),
                hundred: 0,
                ten: 0,
                one: u,
            })
            .collect()
    }

    #[test]
    fn test_gaps() {
        let draws = draws_from(&[3, 1, 2, 1]);
        let g = gaps(&draws, Position::One);
        assert_eq!(g[1], 0);
        assert_eq!(g[2], 1);
        assert_eq!(g[3], 3);
        assert_eq!(g[9], 4);
    }

    #[test]
    fn test_absent_digit_gets_max_score() {
        let draws = draws_from(&[0, 1, 2, 3, 4, 5, 6, 7, 8, 0, 1, 2]);
        let s = OmissionExtractor::new().score(&draws, Position::One);
        let max = s.iter().copied().fold(f64::MIN, f64::max);
        assert_eq!(s[9], max);
        assert_eq!(s[9], 1.0);
        for d in 0..9 {
            assert!(s[d] < s[9], "digit {} = {}", d, s[d]);
        }
    }

    #[test]
    fn test_latest_digit_scores_zero() {
        let draws = draws_from(&[4, 4, 6]);
        let s = OmissionExtractor::new().score(&draws, Position::One);
        assert_eq!(s[6], 0.0);
    }

    #[test]
    fn test_omission_empty_window() {
        assert_eq!(OmissionExtractor::new().score(&[], Position::One), uniform());
    }
}
