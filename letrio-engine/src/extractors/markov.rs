use letrio_db::models::{Draw, Position, DIGIT_COUNT};

use super::{digit_series, normalize_max, uniform, Signal, SignalExtractor, SignalKind};

pub type TransitionMatrix = [[u32; DIGIT_COUNT]; DIGIT_COUNT];

pub struct MarkovExtractor;

impl MarkovExtractor {
    pub fn new() -> Self {
        Self
    }
}

/// transition[i][j] = nombre de fois où j a suivi i sur la position.
pub fn transition_counts(window: &[Draw], position: Position) -> TransitionMatrix {
    let mut transition = [[0u32; DIGIT_COUNT]; DIGIT_COUNT];
    let series = digit_series(window, position);
    for pair in series.windows(2) {
        transition[pair[0]][pair[1]] += 1;
    }
    transition
}

impl SignalExtractor for MarkovExtractor {
    fn kind(&self) -> SignalKind {
        SignalKind::Markov
    }

    fn name(&self) -> &str {
        "Markov"
    }

    fn score(&self, window: &[Draw], position: Position) -> Signal {
        if window.len() < 2 {
            return uniform();
        }
        let Some(latest) = window.last() else {
            return uniform();
        };

        let transition = transition_counts(window, position);
        let row = &transition[latest.digit(position) as usize];
        let total: u32 = row.iter().sum();
        if total == 0 {
            // Le dernier chiffre n'a jamais été suivi dans la fenêtre.
            return uniform();
        }

        normalize_max(row.map(|c| c as f64))
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
    fn test_transition_counts() {
        let draws = draws_from(&[1, 2, 1, 3, 1]);
        let m = transition_counts(&draws, Position::One);
        assert_eq!(m[1][2], 1);
        assert_eq!(m[1][3], 1);
        assert_eq!(m[2][1], 1);
        assert_eq!(m[3][1], 1);
        let total: u32 = m.iter().flatten().sum();
        assert_eq!(total, 4);
    }

    #[test]
    fn test_markov_row_max_normalized() {
        // Dernier chiffre 1 ; après 1 : 2 deux fois, 3 une fois.
        let draws = draws_from(&[1, 2, 1, 2, 1, 3, 1]);
        let s = MarkovExtractor::new().score(&draws, Position::One);
        assert!((s[2] - 1.0).abs() < 1e-12);
        assert!((s[3] - 0.5).abs() < 1e-12);
        assert_eq!(s[0], 0.0);
    }

    #[test]
    fn test_markov_single_successor_reaches_one() {
        // Après 4 vient toujours 7 : le successeur certain vaut 1.0, pas 1/10.
        let draws = draws_from(&[4, 7, 4, 7, 4]);
        let s = MarkovExtractor::new().score(&draws, Position::One);
        assert_eq!(s[7], 1.0);
        assert_eq!(s.iter().filter(|&&v| v > 0.0).count(), 1);
    }

    #[test]
    fn test_markov_unseen_row_is_uniform() {
        // 9 n'apparaît qu'en dernier : aucune transition depuis 9.
        let draws = draws_from(&[1, 2, 9]);
        assert_eq!(MarkovExtractor::new().score(&draws, Position::One), uniform());
    }

    #[test]
    fn test_markov_empty_draws() {
        assert_eq!(MarkovExtractor::new().score(&[], Position::One), uniform());
    }
}
