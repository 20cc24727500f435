use letrio_db::models::{Draw, Position, DIGIT_COUNT};

use super::{normalize_max, uniform, Signal, SignalExtractor, SignalKind};

/// Relation de suivi : quels chiffres sont sortis après un tirage qui partageait
/// un chiffre avec le dernier tirage, sur la même position (poids plein) ou une
/// autre position (poids `cross_weight`).
pub struct FollowExtractor {
    cross_weight: f64,
}

impl FollowExtractor {
    pub fn new() -> Self {
        Self { cross_weight: 0.5 }
    }
}

impl SignalExtractor for FollowExtractor {
    fn kind(&self) -> SignalKind {
        SignalKind::Follow
    }

    fn name(&self) -> &str {
        "Follow"
    }

    fn score(&self, window: &[Draw], position: Position) -> Signal {
        let Some(latest) = window.last() else {
            return uniform();
        };
        if window.len() < 2 {
            return uniform();
        }

        let mut raw = [0.0f64; DIGIT_COUNT];
        for pair in window.windows(2) {
            let (prev, next) = (&pair[0], &pair[1]);
            let followed = next.digit(position) as usize;
            for source in Position::ALL {
                if prev.digit(source) != latest.digit(source) {
                    continue;
                }
                raw[followed] += if source == position { 1.0 } else { self.cross_weight };
            }
        }

        normalize_max(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use letrio_db::models::Period;

    fn draw(i: usize, digits: [u8; 3]) -> Draw {
        Draw {
            id: i as u64 + 1,
            period: Period::parse(&format!("{}", 100 + i)).unwrap(),
            hundred: digits[0],
            ten: digits[1],
            one: digits[2],
        }
    }

    #[test]
    fn test_follow_same_position() {
        // Après un 2 aux centaines vient toujours un 8 ; le dernier tirage finit sur 2.
        let draws = vec![
            draw(0, [2, 0, 0]),
            draw(1, [8, 5, 5]),
            draw(2, [2, 1, 1]),
            draw(3, [8, 6, 6]),
            draw(4, [2, 9, 9]),
        ];
        let s = FollowExtractor::new().score(&draws, Position::Hundred);
        assert_eq!(s[8], 1.0);
        assert!(s.iter().enumerate().all(|(d, &v)| d == 8 || v < 1.0));
    }

    #[test]
    fn test_follow_cross_position_weighs_less() {
        // Le dernier tirage a 3 aux dizaines : une seule correspondance croisée.
        let draws = vec![
            draw(0, [1, 3, 0]),
            draw(1, [6, 0, 0]),
            draw(2, [4, 0, 0]),
            draw(3, [7, 0, 0]),
            draw(4, [4, 3, 5]),
        ];
        // paires : (1,3,0)->6 : dizaines 3 = 3 -> +0.5 pour 6
        //          (4,0,0)->7 : centaines 4 = 4 -> +1.0 pour 7
        let s = FollowExtractor::new().score(&draws, Position::Hundred);
        assert_eq!(s[7], 1.0);
        assert!((s[6] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_follow_no_evidence_is_uniform() {
        let draws = vec![draw(0, [1, 1, 1]), draw(1, [2, 2, 2])];
        assert_eq!(FollowExtractor::new().score(&draws, Position::Ten), uniform());
    }

    #[test]
    fn test_follow_single_draw_is_uniform() {
        let draws = vec![draw(0, [1, 1, 1])];
        assert_eq!(FollowExtractor::new().score(&draws, Position::Ten), uniform());
    }
}
