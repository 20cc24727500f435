use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("Période invalide : '{period}' ({reason})")]
    InvalidPeriod { period: String, reason: String },

    #[error("Chiffre {value} hors limites (0-9) en position {position}")]
    InvalidDigit { position: &'static str, value: u8 },

    #[error("Fenêtre {0} invalide (10 à 200, par pas de 10)")]
    InvalidWindow(usize),

    #[error("La prédiction vise la période {expected}, le tirage porte la période {actual}")]
    PeriodMismatch { expected: String, actual: String },

    #[error("Historique insuffisant : au moins {required} tirage(s) requis, {available} disponible(s)")]
    InsufficientHistory { required: usize, available: usize },

    #[error("Poids invalides : {0}")]
    InvalidWeights(String),

    #[error("Configuration invalide : {0}")]
    InvalidConfig(String),

    #[error("État incohérent : {0}")]
    InconsistentState(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
