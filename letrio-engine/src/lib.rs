pub mod backtest;
pub mod config;
pub mod engine;
pub mod error;
pub mod extractors;
pub mod predictor;
pub mod report;
pub mod sampler;
pub mod scorer;
pub mod shared;
pub mod statistics;
pub mod store;
pub mod validator;

pub use config::{EngineConfig, Weights, WindowSize};
pub use engine::{IngestOutcome, LotteryEngine};
pub use error::{EngineError, Result};
pub use shared::SharedEngine;
