//! # Scoring Pipeline
//!
//! Runtime wiring around the scoring core:
//! - `config` loads `ScoringConfig` from `WALLETSCORE_*` environment variables
//! - `sources` defines the `AccountSource` collaborator and the JSON snapshot
//!   adapters (`JsonAccountSource`, `JsonPriceFeed`)
//! - `engine` runs fetch → extract → normalize → quantize per wallet, with
//!   cancellation checkpoints between stages and concurrent batch scoring
//!
//! Nothing here persists scores or signs them; the caller receives a
//! `WalletScore` and decides what to do with it.

pub mod config;
pub mod engine;
pub mod sources;

pub use config::ScoringConfig;
pub use engine::{ScoringEngine, WalletScore};
pub use sources::{AccountSource, JsonAccountSource, JsonPriceFeed, PriceObservation, WalletData};
