use letrio_db::models::{Draw, Position, Prediction, Validation, HIT_TOP_K};

use crate::error::{EngineError, Result};

/// Confronte la prédiction en attente au tirage réel de la même période.
/// L'identifiant de la validation est celui du tirage.
pub fn validate(pending: &Prediction, actual: &Draw) -> Result<Validation> {
    if pending.period != actual.period {
        return Err(EngineError::PeriodMismatch {
            expected: pending.period.to_string(),
            actual: actual.period.to_string(),
        });
    }

    let hit = |position: Position| {
        pending.position(position).contains_in_top(actual.digit(position), HIT_TOP_K)
    };

    Ok(Validation {
        id: actual.id,
        period: actual.period.clone(),
        actual_hundred: actual.hundred,
        actual_ten: actual.ten,
        actual_one: actual.one,
        prediction: pending.clone(),
        hundred_hit: hit(Position::Hundred),
        ten_hit: hit(Position::Ten),
        one_hit: hit(Position::One),
    })
}

/// Journal des validations, en ajout seul.
#[derive(Debug, Clone, Default)]
pub struct ValidationLog {
    entries: Vec<Validation>,
}

impl ValidationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, validation: Validation) -> Result<&Validation> {
        if let Some(last) = self.entries.last() {
            if validation.period <= last.period {
                return Err(EngineError::InconsistentState(format!(
                    "validation {} enregistrée après {}",
                    validation.period, last.period
                )));
            }
        }
        self.entries.push(validation);
        Ok(&self.entries[self.entries.len() - 1])
    }

    pub fn entries(&self) -> &[Validation] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
