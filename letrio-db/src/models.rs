use std::cmp::Ordering;
use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Nombre de chiffres possibles par position (0-9).
pub const DIGIT_COUNT: usize = 10;

/// Un chiffre est "touché" s'il figure dans ce top du classement.
pub const HIT_TOP_K: usize = 3;

/// Format des périodes produites par l'ingestion automatique.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Identifiant de période d'un tirage.
///
/// Deux périodes entièrement numériques se comparent numériquement ;
/// sinon la comparaison est lexicographique. Les périodes numériques
/// sont toujours ordonnées avant les autres.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Period(String);

impl Period {
    /// `None` si la chaîne est vide ou contient des espaces / caractères de contrôle.
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.is_empty() || raw.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return None;
        }
        Some(Self(raw.to_string()))
    }

    pub fn from_timestamp(ts: NaiveDateTime) -> Self {
        Self(ts.format(TIMESTAMP_FORMAT).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_numeric(&self) -> bool {
        self.0.bytes().all(|b| b.is_ascii_digit())
    }

    /// Horodatage `YYYYMMDDHHmmss`, si la période en est un.
    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        if self.0.len() != 14 || !self.is_numeric() {
            return None;
        }
        NaiveDateTime::parse_from_str(&self.0, TIMESTAMP_FORMAT).ok()
    }

    /// `HH:mm:ss` pour un horodatage, la période brute sinon.
    pub fn display_label(&self) -> String {
        if self.0.len() == 14 && self.is_numeric() {
            format!("{}:{}:{}", &self.0[8..10], &self.0[10..12], &self.0[12..14])
        } else {
            self.0.clone()
        }
    }

    /// `#` suivi des quatre derniers caractères.
    pub fn short_label(&self) -> String {
        let start = self.0.char_indices().rev().nth(3).map(|(i, _)| i).unwrap_or(0);
        format!("#{}", &self.0[start..])
    }
}

impl Ord for Period {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.is_numeric(), other.is_numeric()) {
            (true, true) => {
                let a = self.0.trim_start_matches('0');
                let b = other.0.trim_start_matches('0');
                a.len()
                    .cmp(&b.len())
                    .then_with(|| a.cmp(b))
                    .then_with(|| self.0.len().cmp(&other.0.len()))
            }
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for Period {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    Hundred,
    Ten,
    One,
}

impl Position {
    pub const ALL: [Position; 3] = [Position::Hundred, Position::Ten, Position::One];

    pub fn index(&self) -> usize {
        match self {
            Position::Hundred => 0,
            Position::Ten => 1,
            Position::One => 2,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Position::Hundred => "Centaines",
            Position::Ten => "Dizaines",
            Position::One => "Unités",
        }
    }

    pub fn digit_of(&self, draw: &Draw) -> u8 {
        draw.digits()[self.index()]
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Tirage tel que fourni par une source d'ingestion, avant validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDraw {
    pub period: String,
    pub hundred: u8,
    pub ten: u8,
    pub one: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draw {
    pub id: u64,
    pub period: Period,
    pub hundred: u8,
    pub ten: u8,
    pub one: u8,
}

impl Draw {
    pub fn digits(&self) -> [u8; 3] {
        [self.hundred, self.ten, self.one]
    }

    pub fn digit(&self, position: Position) -> u8 {
        position.digit_of(self)
    }

    pub fn sum(&self) -> u32 {
        self.digits().iter().map(|&d| d as u32).sum()
    }

    pub fn span(&self) -> u8 {
        let digits = self.digits();
        let max = digits.iter().copied().max().unwrap_or(0);
        let min = digits.iter().copied().min().unwrap_or(0);
        max - min
    }
}

impl fmt::Display for Draw {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.hundred, self.ten, self.one)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DigitScore {
    pub digit: u8,
    pub score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DigitProbability {
    pub digit: u8,
    pub probability: f64,
}

/// Classement complet d'une position : les dix chiffres, par probabilité décroissante.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PositionPrediction(Vec<DigitProbability>);

impl PositionPrediction {
    pub fn new(ranking: Vec<DigitProbability>) -> Self {
        Self(ranking)
    }

    pub fn entries(&self) -> &[DigitProbability] {
        &self.0
    }

    pub fn digits(&self) -> Vec<u8> {
        self.0.iter().map(|e| e.digit).collect()
    }

    pub fn top(&self, k: usize) -> &[DigitProbability] {
        &self.0[..k.min(self.0.len())]
    }

    pub fn top_digits(&self, k: usize) -> Vec<u8> {
        self.top(k).iter().map(|e| e.digit).collect()
    }

    pub fn contains_in_top(&self, digit: u8, k: usize) -> bool {
        self.top(k).iter().any(|e| e.digit == digit)
    }

    /// Vrai si chaque chiffre 0-9 apparaît exactement une fois.
    pub fn is_permutation(&self) -> bool {
        if self.0.len() != DIGIT_COUNT {
            return false;
        }
        let mut seen = [false; DIGIT_COUNT];
        for e in &self.0 {
            let idx = e.digit as usize;
            if idx >= DIGIT_COUNT || seen[idx] {
                return false;
            }
            seen[idx] = true;
        }
        true
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Période visée par la prédiction (celle qui suit le dernier tirage connu).
    pub period: Period,
    pub hundred: PositionPrediction,
    pub ten: PositionPrediction,
    pub one: PositionPrediction,
}

impl Prediction {
    pub fn position(&self, position: Position) -> &PositionPrediction {
        match position {
            Position::Hundred => &self.hundred,
            Position::Ten => &self.ten,
            Position::One => &self.one,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Validation {
    pub id: u64,
    pub period: Period,
    pub actual_hundred: u8,
    pub actual_ten: u8,
    pub actual_one: u8,
    pub prediction: Prediction,
    pub hundred_hit: bool,
    pub ten_hit: bool,
    pub one_hit: bool,
}

impl Validation {
    pub fn actual(&self, position: Position) -> u8 {
        match position {
            Position::Hundred => self.actual_hundred,
            Position::Ten => self.actual_ten,
            Position::One => self.actual_one,
        }
    }

    pub fn hit(&self, position: Position) -> bool {
        match position {
            Position::Hundred => self.hundred_hit,
            Position::Ten => self.ten_hit,
            Position::One => self.one_hit,
        }
    }

    /// Au moins une position touchée.
    pub fn is_hit(&self) -> bool {
        self.hundred_hit || self.ten_hit || self.one_hit
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
    /// Pourcentage arrondi des validations avec au moins une position touchée.
    pub overall_accuracy: u32,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub total: u32,
    pub hits: u32,
    pub hundred_hits: u32,
    pub ten_hits: u32,
    pub one_hits: u32,
}
