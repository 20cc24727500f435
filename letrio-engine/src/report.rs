use letrio_db::models::{Draw, Period, Position, DIGIT_COUNT};
use serde::Serialize;

use crate::extractors::omission::gaps;
use crate::extractors::SignalKind;
use crate::scorer::{rank_digits, CompositeScorer};

/// Caractéristiques d'un chiffre sur une position, pour la fenêtre courante.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DigitFeatures {
    pub digit: u8,
    pub count: usize,
    pub gap: usize,
    pub signals: Vec<(SignalKind, f64)>,
    pub composite: f64,
    /// 1 = meilleur chiffre.
    pub rank: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureMatrix {
    pub position: Position,
    pub window_len: usize,
    /// Indexé par chiffre (0-9).
    pub rows: Vec<DigitFeatures>,
}

impl FeatureMatrix {
    pub fn compute(scorer: &CompositeScorer, window: &[Draw], position: Position) -> Self {
        let breakdown = scorer.breakdown(window, position);
        let gaps = gaps(window, position);

        let mut counts = [0usize; DIGIT_COUNT];
        for draw in window {
            counts[draw.digit(position) as usize] += 1;
        }

        let mut ranks = [0usize; DIGIT_COUNT];
        for (i, s) in rank_digits(&breakdown.composite).iter().enumerate() {
            ranks[s.digit as usize] = i + 1;
        }

        let rows = (0..DIGIT_COUNT)
            .map(|d| DigitFeatures {
                digit: d as u8,
                count: counts[d],
                gap: gaps[d],
                signals: breakdown.signals.iter().map(|(kind, s)| (*kind, s[d])).collect(),
                composite: breakdown.composite[d],
                rank: ranks[d],
            })
            .collect();

        Self {
            position,
            window_len: window.len(),
            rows,
        }
    }

    /// Lignes triées par rang.
    pub fn ranked(&self) -> Vec<&DigitFeatures> {
        let mut rows: Vec<&DigitFeatures> = self.rows.iter().collect();
        rows.sort_by_key(|r| r.rank);
        rows
    }
}

/// Somme, écart, parité et grandeur d'un tirage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DrawFeatures {
    pub period: Period,
    pub digits: [u8; 3],
    pub sum: u32,
    pub span: u8,
    pub odd: u8,
    pub even: u8,
    /// Chiffres >= 5.
    pub big: u8,
    pub small: u8,
}

impl DrawFeatures {
    pub const BIG_THRESHOLD: u8 = 5;

    pub fn of(draw: &Draw) -> Self {
        let digits = draw.digits();
        let odd = digits.iter().filter(|&&d| d % 2 == 1).count() as u8;
        let big = digits.iter().filter(|&&d| d >= Self::BIG_THRESHOLD).count() as u8;
        Self {
            period: draw.period.clone(),
            digits,
            sum: draw.sum(),
            span: draw.span(),
            odd,
            even: 3 - odd,
            big,
            small: 3 - big,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BasicFeatures {
    /// Ordre chronologique.
    pub draws: Vec<DrawFeatures>,
    pub average_sum: f64,
    pub average_span: f64,
    pub odd_total: usize,
    pub even_total: usize,
    pub big_total: usize,
    pub small_total: usize,
}

impl BasicFeatures {
    pub fn compute(window: &[Draw]) -> Self {
        let draws: Vec<DrawFeatures> = window.iter().map(DrawFeatures::of).collect();
        let n = draws.len().max(1) as f64;
        let total = |f: fn(&DrawFeatures) -> u8| draws.iter().map(|d| f(d) as usize).sum::<usize>();

        Self {
            average_sum: draws.iter().map(|d| d.sum as f64).sum::<f64>() / n,
            average_span: draws.iter().map(|d| d.span as f64).sum::<f64>() / n,
            odd_total: total(|d| d.odd),
            even_total: total(|d| d.even),
            big_total: total(|d| d.big),
            small_total: total(|d| d.small),
            draws,
        }
    }

    pub fn latest(&self) -> Option<&DrawFeatures> {
        self.draws.last()
    }
}
