use letrio_db::models::{Draw, Position, DIGIT_COUNT};

use super::{digit_series, normalize_max, uniform, Signal, SignalExtractor, SignalKind};

/// Chaud/froid : nombre d'apparitions dans la fenêtre, départagé par la plus récente.
pub struct FrequencyExtractor;

impl FrequencyExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl SignalExtractor for FrequencyExtractor {
    fn kind(&self) -> SignalKind {
        SignalKind::Frequency
    }

    fn name(&self) -> &str {
        "Frequency"
    }

    fn score(&self, window: &[Draw], position: Position) -> Signal {
        let n = window.len();
        if n == 0 {
            return uniform();
        }

        let mut counts = [0u32; DIGIT_COUNT];
        let mut last_seen: [Option<usize>; DIGIT_COUNT] = [None; DIGIT_COUNT];
        for (t, d) in digit_series(window, position).into_iter().enumerate() {
            counts[d] += 1;
            last_seen[d] = Some(t);
        }

        // Bonus de récence dans ]0, 0.5] : ne renverse jamais un écart d'une apparition.
        let mut raw = [0.0f64; DIGIT_COUNT];
        for d in 0..DIGIT_COUNT {
            let bonus = match last_seen[d] {
                Some(t) => 0.5 * (t + 1) as f64 / n as f64,
                None => 0.0,
            };
            raw[d] = counts[d] as f64 + bonus;
        }

        normalize_max(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use letrio_db::models::Period;

    fn draws_from(hundreds: &[u8]) -> Vec<Draw> {
        hundreds
            .iter()
            .enumerate()
            .map(|(i, &h)| Draw {
                id: i as u64 + 1,
                period: Period::parse(&format!("{}", 100 + i)).unwrap(),
                hundred: h,
                ten: 0,
                one: 0,
            })
            .collect()
    }

    #[test]
    fn test_frequency_most_common_is_max() {
        let draws = draws_from(&[1, 2, 1, 3, 1, 2]);
        let s = FrequencyExtractor::new().score(&draws, Position::Hundred);
        assert_eq!(s[1], 1.0);
        assert!(s[1] > s[2]);
        assert!(s[2] > s[3]);
        assert_eq!(s[9], 0.0);
    }

    #[test]
    fn test_frequency_tie_broken_by_recency() {
        // 4 et 7 apparaissent deux fois, 7 plus récemment
        let draws = draws_from(&[4, 7, 4, 7]);
        let s = FrequencyExtractor::new().score(&draws, Position::Hundred);
        assert!(s[7] > s[4], "7={} 4={}", s[7], s[4]);
    }

    #[test]
    fn test_frequency_recency_never_beats_count() {
        let draws = draws_from(&[5, 5, 5, 2, 2]);
        let s = FrequencyExtractor::new().score(&draws, Position::Hundred);
        assert!(s[5] > s[2]);
    }

    #[test]
    fn test_frequency_empty_window() {
        let s = FrequencyExtractor::new().score(&[], Position::One);
        assert_eq!(s, uniform());
    }
}
