//! Data collaborators consumed by the scoring pipeline
//!
//! The core only sees the `AccountSource` and `PriceLookup` traits. The JSON
//! snapshot adapters below back the CLI and tests; live explorer and oracle
//! clients implement the same traits elsewhere.

use crate::error::{Result, ScoringError};
use crate::scoring_core::types::{AccountSnapshot, TokenHolding, Transaction};
use crate::scoring_core::valuator::PriceLookup;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Everything the chain reports about one wallet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletData {
    pub account: AccountSnapshot,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub holdings: Vec<TokenHolding>,
}

/// Account/transaction source for one chain
#[async_trait]
pub trait AccountSource: Send + Sync {
    /// Fails with `DataUnavailable` when the chain does not know the address
    async fn fetch(&self, address: &str) -> Result<WalletData>;
}

/// Wallet snapshots loaded from a JSON array of `WalletData`
#[derive(Debug, Clone, Default)]
pub struct JsonAccountSource {
    wallets: HashMap<String, WalletData>,
}

impl JsonAccountSource {
    pub fn new(wallets: Vec<WalletData>) -> Self {
        Self {
            wallets: wallets
                .into_iter()
                .map(|w| (w.account.address.clone(), w))
                .collect(),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let wallets: Vec<WalletData> = serde_json::from_str(json)?;
        Ok(Self::new(wallets))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let source = Self::from_json_str(&json)?;
        log::info!(
            "Loaded {} wallet snapshots from {}",
            source.wallets.len(),
            path.as_ref().display()
        );
        Ok(source)
    }

    pub fn len(&self) -> usize {
        self.wallets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wallets.is_empty()
    }
}

#[async_trait]
impl AccountSource for JsonAccountSource {
    async fn fetch(&self, address: &str) -> Result<WalletData> {
        self.wallets
            .get(address)
            .cloned()
            .ok_or_else(|| ScoringError::DataUnavailable(address.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceObservation {
    /// USD
    pub price: f64,
    /// Epoch seconds
    pub timestamp: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PriceFeedFile {
    reference_time: Option<i64>,
    #[serde(default)]
    prices: HashMap<String, Vec<PriceObservation>>,
}

/// Historical price observations keyed by chain-qualified token id
///
/// A lookup picks the observation closest to the reference time, provided it
/// lies within the tolerance window on either side.
#[derive(Debug, Clone)]
pub struct JsonPriceFeed {
    reference_time: i64,
    prices: HashMap<String, Vec<PriceObservation>>,
}

impl JsonPriceFeed {
    pub fn new(reference_time: i64) -> Self {
        Self {
            reference_time,
            prices: HashMap::new(),
        }
    }

    pub fn with_observation(mut self, token_id: &str, price: f64, timestamp: i64) -> Self {
        self.prices
            .entry(token_id.to_string())
            .or_default()
            .push(PriceObservation { price, timestamp });
        self
    }

    /// `referenceTime` defaults to the current time when the file omits it
    pub fn from_json_str(json: &str) -> Result<Self> {
        let file: PriceFeedFile = serde_json::from_str(json)?;
        Ok(Self {
            reference_time: file
                .reference_time
                .unwrap_or_else(|| chrono::Utc::now().timestamp()),
            prices: file.prices,
        })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let feed = Self::from_json_str(&json)?;
        log::info!(
            "Loaded prices for {} tokens from {}",
            feed.prices.len(),
            path.as_ref().display()
        );
        Ok(feed)
    }

    pub fn reference_time(&self) -> i64 {
        self.reference_time
    }

    fn closest_within(&self, token_id: &str, tolerance_hours: u32) -> Option<f64> {
        let tolerance_secs = tolerance_hours as i64 * 3600;
        self.prices
            .get(token_id)?
            .iter()
            .filter(|o| (o.timestamp - self.reference_time).abs() <= tolerance_secs)
            .min_by_key(|o| ((o.timestamp - self.reference_time).abs(), -o.timestamp))
            .map(|o| o.price)
    }
}

#[async_trait]
impl PriceLookup for JsonPriceFeed {
    async fn price_of(&self, token_id: &str, tolerance_hours: u32) -> Result<Option<f64>> {
        Ok(self.closest_within(token_id, tolerance_hours))
    }
}
