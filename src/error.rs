//! Error type shared by the scoring core and the pipeline
//!
//! Only conditions that would otherwise produce a misleading score are errors.
//! A wallet with no history or a token without a price is not an error.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("transaction {tx_id} has an unusable timestamp {timestamp}")]
    InvalidTimestamp { tx_id: String, timestamp: i64 },

    #[error("transaction {tx_id} breaks timestamp ordering after sort")]
    NonMonotonicTimestamps { tx_id: String },

    #[error("token {token_id} has negative quantity {quantity}")]
    NegativeTokenQuantity { token_id: String, quantity: f64 },

    #[error("statistic {stat} has negative weight {weight}")]
    NegativeWeight { stat: String, weight: f64 },

    #[error("statistic {stat} has calibration range min {min} > max {max}")]
    InvalidCalibrationRange { stat: String, min: f64, max: f64 },

    #[error("{field} is not a finite number")]
    NonFiniteValue { field: String },

    #[error("no chain data available for address {0}")]
    DataUnavailable(String),

    #[error("price lookup failed: {0}")]
    PriceLookup(String),

    #[error("scoring cancelled before {stage}")]
    Cancelled { stage: &'static str },

    #[error("scoring task failed: {0}")]
    TaskFailed(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ScoringError>;
