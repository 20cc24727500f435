use std::fmt;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::extractors::SignalKind;

/// Taille de fenêtre d'analyse : 10 à 200 tirages, par pas de 10.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct WindowSize(usize);

impl WindowSize {
    pub const MIN: usize = 10;
    pub const MAX: usize = 200;
    pub const STEP: usize = 10;

    pub fn new(size: usize) -> Result<Self> {
        if (Self::MIN..=Self::MAX).contains(&size) && size % Self::STEP == 0 {
            Ok(Self(size))
        } else {
            Err(EngineError::InvalidWindow(size))
        }
    }

    pub fn get(&self) -> usize {
        self.0
    }

    /// Toutes les tailles admises, dans l'ordre croissant.
    pub fn all() -> Vec<WindowSize> {
        (Self::MIN..=Self::MAX).step_by(Self::STEP).map(WindowSize).collect()
    }
}

impl Default for WindowSize {
    fn default() -> Self {
        Self(50)
    }
}

impl TryFrom<usize> for WindowSize {
    type Error = EngineError;

    fn try_from(size: usize) -> Result<Self> {
        Self::new(size)
    }
}

impl From<WindowSize> for usize {
    fn from(w: WindowSize) -> usize {
        w.0
    }
}

impl fmt::Display for WindowSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Pondération des cinq signaux dans le score composite. Somme = 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weights {
    pub frequency: f64,
    pub omission: f64,
    pub follow: f64,
    pub periodicity: f64,
    pub markov: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            frequency: 0.25,
            omission: 0.20,
            follow: 0.20,
            periodicity: 0.15,
            markov: 0.20,
        }
    }
}

impl Weights {
    const TOLERANCE: f64 = 1e-6;

    pub fn get(&self, kind: SignalKind) -> f64 {
        match kind {
            SignalKind::Frequency => self.frequency,
            SignalKind::Omission => self.omission,
            SignalKind::Follow => self.follow,
            SignalKind::Periodicity => self.periodicity,
            SignalKind::Markov => self.markov,
        }
    }

    pub fn sum(&self) -> f64 {
        SignalKind::ALL.iter().map(|&k| self.get(k)).sum()
    }

    pub fn validate(&self) -> Result<()> {
        for kind in SignalKind::ALL {
            let w = self.get(kind);
            if !w.is_finite() || w < 0.0 {
                return Err(EngineError::InvalidWeights(format!("{kind} = {w}")));
            }
        }
        let sum = self.sum();
        if (sum - 1.0).abs() > Self::TOLERANCE {
            return Err(EngineError::InvalidWeights(format!("somme = {sum}, attendu 1.0")));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub window_size: WindowSize,
    pub weights: Weights,
    /// Intervalle entre deux périodes horodatées quand l'historique ne permet pas de le déduire.
    pub default_interval_secs: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            window_size: WindowSize::default(),
            weights: Weights::default(),
            default_interval_secs: 60,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        self.weights.validate()?;
        if self.default_interval_secs <= 0 {
            return Err(EngineError::InvalidConfig(format!(
                "intervalle par défaut {} s",
                self.default_interval_secs
            )));
        }
        Ok(())
    }
}

/// Charge la configuration ; un fichier absent donne la configuration par défaut.
pub fn load_config(path: &Path) -> anyhow::Result<EngineConfig> {
    if !path.exists() {
        log::debug!("pas de configuration dans {path:?}, valeurs par défaut");
        return Ok(EngineConfig::default());
    }
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Impossible de lire {path:?}"))?;
    let config: EngineConfig = serde_json::from_str(&json)
        .with_context(|| format!("JSON invalide dans {path:?}"))?;
    config.validate()?;
    Ok(config)
}

pub fn save_config(config: &EngineConfig, path: &Path) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(path, json)
        .with_context(|| format!("Impossible d'écrire {path:?}"))?;
    Ok(())
}
