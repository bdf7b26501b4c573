//! Wallet statistics and scoring engine
//!
//! `scoring_core` holds the pure transforms (interval analysis, token valuation,
//! statistics extraction, normalization, quantization, descriptors).
//! `pipeline` wires them to data collaborators.

pub mod error;
pub mod pipeline;
pub mod scoring_core;

pub use error::{Result, ScoringError};
