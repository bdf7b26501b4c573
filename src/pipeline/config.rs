//! Scoring configuration from environment variables

use crate::scoring_core::extractor::{ExtractOptions, DEFAULT_PRICE_SEARCH_WIDTH_HOURS};
use chrono::{DateTime, Utc};
use std::env;

/// Configuration for a scoring runtime
///
/// Loaded from environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringConfig {
    /// Prefix qualifying token ids for price lookups
    pub chain_prefix: String,

    /// Price id of the native coin
    pub native_price_id: String,

    /// Decimal places of the raw native balance
    pub native_decimals: u32,

    /// Value token holdings against the price feed
    pub hold_token_balances: bool,

    /// Staleness tolerance for prices, in hours
    pub price_search_width_hours: u32,

    /// Weight/calibration table (JSON)
    pub weights_path: String,

    /// Wallet snapshot fixtures (JSON) for the file-backed account source
    pub wallets_path: String,

    /// Price observations (JSON) for the file-backed price feed
    pub prices_path: String,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            chain_prefix: "algorand".to_string(),
            native_price_id: "coingecko:algorand".to_string(),
            native_decimals: 6,
            hold_token_balances: true,
            price_search_width_hours: DEFAULT_PRICE_SEARCH_WIDTH_HOURS,
            weights_path: "config/weights.json".to_string(),
            wallets_path: "data/wallets.json".to_string(),
            prices_path: "data/prices.json".to_string(),
        }
    }
}

impl ScoringConfig {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - `WALLETSCORE_CHAIN_PREFIX` (default: algorand)
    /// - `WALLETSCORE_NATIVE_PRICE_ID` (default: coingecko:algorand)
    /// - `WALLETSCORE_NATIVE_DECIMALS` (default: 6)
    /// - `WALLETSCORE_HOLD_TOKEN_BALANCES` (default: true)
    /// - `WALLETSCORE_PRICE_SEARCH_WIDTH_HOURS` (default: 6)
    /// - `WALLETSCORE_WEIGHTS_PATH` (default: config/weights.json)
    /// - `WALLETSCORE_WALLETS_PATH` (default: data/wallets.json)
    /// - `WALLETSCORE_PRICES_PATH` (default: data/prices.json)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            chain_prefix: env::var("WALLETSCORE_CHAIN_PREFIX").unwrap_or(defaults.chain_prefix),

            native_price_id: env::var("WALLETSCORE_NATIVE_PRICE_ID")
                .unwrap_or(defaults.native_price_id),

            native_decimals: env::var("WALLETSCORE_NATIVE_DECIMALS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.native_decimals),

            hold_token_balances: env::var("WALLETSCORE_HOLD_TOKEN_BALANCES")
                .ok()
                .and_then(|s| s.to_lowercase().parse().ok())
                .unwrap_or(defaults.hold_token_balances),

            price_search_width_hours: env::var("WALLETSCORE_PRICE_SEARCH_WIDTH_HOURS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.price_search_width_hours),

            weights_path: env::var("WALLETSCORE_WEIGHTS_PATH").unwrap_or(defaults.weights_path),

            wallets_path: env::var("WALLETSCORE_WALLETS_PATH").unwrap_or(defaults.wallets_path),

            prices_path: env::var("WALLETSCORE_PRICES_PATH").unwrap_or(defaults.prices_path),
        }
    }

    /// Per-request extraction options evaluated at `evaluated_at`
    pub fn extract_options(&self, evaluated_at: DateTime<Utc>) -> ExtractOptions {
        ExtractOptions {
            evaluated_at,
            hold_token_balances: self.hold_token_balances,
            price_search_width_hours: self.price_search_width_hours,
            chain_prefix: self.chain_prefix.clone(),
            native_price_id: self.native_price_id.clone(),
            native_decimals: self.native_decimals,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VARS: &[&str] = &[
        "WALLETSCORE_CHAIN_PREFIX",
        "WALLETSCORE_NATIVE_DECIMALS",
        "WALLETSCORE_HOLD_TOKEN_BALANCES",
        "WALLETSCORE_PRICE_SEARCH_WIDTH_HOURS",
        "WALLETSCORE_WEIGHTS_PATH",
    ];

    // Single test: env vars are process-global and tests run in parallel
    #[test]
    fn test_config_from_env() {
        for var in VARS {
            env::remove_var(var);
        }

        let config = ScoringConfig::from_env();
        assert_eq!(config.chain_prefix, "algorand");
        assert_eq!(config.native_decimals, 6);
        assert!(config.hold_token_balances);
        assert_eq!(config.price_search_width_hours, 6);
        assert_eq!(config.weights_path, "config/weights.json");

        env::set_var("WALLETSCORE_CHAIN_PREFIX", "ethereum");
        env::set_var("WALLETSCORE_NATIVE_DECIMALS", "18");
        env::set_var("WALLETSCORE_HOLD_TOKEN_BALANCES", "FALSE");
        env::set_var("WALLETSCORE_PRICE_SEARCH_WIDTH_HOURS", "not-a-number");
        env::set_var("WALLETSCORE_WEIGHTS_PATH", "/tmp/weights.json");

        let config = ScoringConfig::from_env();
        assert_eq!(config.chain_prefix, "ethereum");
        assert_eq!(config.native_decimals, 18);
        assert!(!config.hold_token_balances);
        assert_eq!(config.price_search_width_hours, 6);
        assert_eq!(config.weights_path, "/tmp/weights.json");

        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_extract_options_carry_config() {
        let config = ScoringConfig {
            chain_prefix: "base".to_string(),
            price_search_width_hours: 12,
            ..Default::default()
        };
        let now = Utc::now();
        let options = config.extract_options(now);

        assert_eq!(options.evaluated_at, now);
        assert_eq!(options.chain_prefix, "base");
        assert_eq!(options.price_search_width_hours, 12);
        assert!(options.hold_token_balances);
    }
}
