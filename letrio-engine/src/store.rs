use letrio_db::models::{Draw, NewDraw, Period, Position, DIGIT_COUNT};

use crate::config::WindowSize;
use crate::error::{EngineError, Result};
use crate::predictor::window_view;

/// Historique des tirages, en ajout seul, trié par période croissante.
#[derive(Debug, Clone, Default)]
pub struct DrawStore {
    draws: Vec<Draw>,
}

impl DrawStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconstruit un historique déjà stocké en vérifiant ordre et identifiants.
    pub fn from_draws(draws: Vec<Draw>) -> Result<Self> {
        for (i, draw) in draws.iter().enumerate() {
            check_digits(draw.hundred, draw.ten, draw.one)?;
            if draw.id != i as u64 + 1 {
                return Err(EngineError::InconsistentState(format!(
                    "tirage {} : identifiant {} attendu, {} trouvé",
                    draw.period,
                    i + 1,
                    draw.id
                )));
            }
            if i > 0 && draw.period <= draws[i - 1].period {
                return Err(EngineError::InconsistentState(format!(
                    "période {} non croissante après {}",
                    draw.period,
                    draws[i - 1].period
                )));
            }
        }
        Ok(Self { draws })
    }

    /// Ajoute un tirage. En cas d'erreur, l'historique est inchangé.
    pub fn append(&mut self, new: NewDraw) -> Result<&Draw> {
        check_digits(new.hundred, new.ten, new.one)?;

        let period = Period::parse(&new.period).ok_or_else(|| EngineError::InvalidPeriod {
            period: new.period.clone(),
            reason: "vide ou contenant des espaces".to_string(),
        })?;

        if let Some(last) = self.draws.last() {
            if period <= last.period {
                return Err(EngineError::InvalidPeriod {
                    period: new.period,
                    reason: format!("doit suivre la dernière période {}", last.period),
                });
            }
        }

        let draw = Draw {
            id: self.draws.len() as u64 + 1,
            period,
            hundred: new.hundred,
            ten: new.ten,
            one: new.one,
        };
        log::trace!("tirage {} ajouté : {}", draw.period, draw);
        self.draws.push(draw);
        Ok(&self.draws[self.draws.len() - 1])
    }

    /// Retire le dernier tirage ajouté.
    pub(crate) fn pop(&mut self) -> Option<Draw> {
        self.draws.pop()
    }

    pub fn window(&self, size: WindowSize) -> &[Draw] {
        window_view(&self.draws, size)
    }

    pub fn all(&self) -> &[Draw] {
        &self.draws
    }

    pub fn last(&self) -> Option<&Draw> {
        self.draws.last()
    }

    pub fn len(&self) -> usize {
        self.draws.len()
    }

    pub fn is_empty(&self) -> bool {
        self.draws.is_empty()
    }

    pub fn clear(&mut self) {
        self.draws.clear();
    }
}

fn check_digits(hundred: u8, ten: u8, one: u8) -> Result<()> {
    for (position, value) in Position::ALL.into_iter().zip([hundred, ten, one]) {
        if value as usize >= DIGIT_COUNT {
            return Err(EngineError::InvalidDigit {
                position: position.label(),
                value,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_draw(period: &str, digits: [u8; 3]) -> NewDraw {
        NewDraw {
            period: period.to_string(),
            hundred: digits[0],
            ten: digits[1],
            one: digits[2],
        }
    }

    #[test]
    fn test_append_assigns_sequential_ids() {
        let mut store = DrawStore::new();
        assert_eq!(store.append(new_draw("2024001", [1, 2, 3])).unwrap().id, 1);
        assert_eq!(store.append(new_draw("2024002", [4, 5, 6])).unwrap().id, 2);
        assert_eq!(store.len(), 2);
        assert_eq!(store.last().unwrap().to_string(), "456");
    }

    #[test]
    fn test_non_increasing_period_rejected() {
        let mut store = DrawStore::new();
        store.append(new_draw("2024005", [1, 2, 3])).unwrap();
        for period in ["2024005", "2024004"] {
            let err = store.append(new_draw(period, [0, 0, 0])).unwrap_err();
            assert!(matches!(err, EngineError::InvalidPeriod { .. }));
        }
        assert_eq!(store.len(), 1);
        assert_eq!(store.last().unwrap().period.as_str(), "2024005");
    }

    #[test]
    fn test_numeric_ordering_not_lexicographic() {
        let mut store = DrawStore::new();
        store.append(new_draw("99", [1, 2, 3])).unwrap();
        assert!(store.append(new_draw("100", [1, 2, 3])).is_ok());
    }

    #[test]
    fn test_malformed_period_rejected() {
        let mut store = DrawStore::new();
        for period in ["", "2024 001"] {
            let err = store.append(new_draw(period, [1, 2, 3])).unwrap_err();
            assert!(matches!(err, EngineError::InvalidPeriod { .. }));
        }
        assert!(store.is_empty());
    }

    #[test]
    fn test_digit_out_of_range() {
        let mut store = DrawStore::new();
        let err = store.append(new_draw("1", [1, 10, 3])).unwrap_err();
        assert_eq!(err, EngineError::InvalidDigit { position: "Dizaines", value: 10 });
        assert!(store.is_empty());
    }

    #[test]
    fn test_window_is_chronological_tail() {
        let mut store = DrawStore::new();
        for i in 0..35u8 {
            store.append(new_draw(&format!("{}", 1000 + i as u32), [i % 10, 0, 0])).unwrap();
        }
        let w = store.window(WindowSize::new(20).unwrap());
        assert_eq!(w.len(), 20);
        assert_eq!(w[0].id, 16);
        assert_eq!(w[19].id, 35);
        assert_eq!(store.window(WindowSize::new(200).unwrap()).len(), 35);
    }

    #[test]
    fn test_from_draws_checks_invariants() {
        let mut store = DrawStore::new();
        store.append(new_draw("1", [1, 2, 3])).unwrap();
        store.append(new_draw("2", [1, 2, 3])).unwrap();
        let draws = store.all().to_vec();
        assert!(DrawStore::from_draws(draws.clone()).is_ok());

        let mut swapped = draws;
        swapped.swap(0, 1);
        assert!(matches!(
            DrawStore::from_draws(swapped),
            Err(EngineError::InconsistentState(_))
        ));
    }

    #[test]
    fn test_pop_and_clear() {
        let mut store = DrawStore::new();
        store.append(new_draw("1", [1, 2, 3])).unwrap();
        store.append(new_draw("2", [4, 5, 6])).unwrap();
        assert_eq!(store.pop().unwrap().id, 2);
        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.append(new_draw("1", [0, 0, 0])).unwrap().id, 1);
    }
}
