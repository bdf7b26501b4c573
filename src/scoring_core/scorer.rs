//! Wallet scoring: statistics + weight table → normalized and quantized score

use super::normalizer::{ScoreNormalizer, WeightTable};
use super::quantizer::quantize;
use super::stats::WalletStats;
use crate::error::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreResult {
    /// In `[0, 1]`
    pub normalized_score: f64,
    /// `normalized_score * 10000`, rounded half up; the value that gets signed
    pub quantized_score: u16,
}

impl ScoreResult {
    /// Quantize stage: clamp a normalizer output to `[0, 1]` and fix its point
    pub fn from_normalized(normalized_score: f64) -> Self {
        let normalized_score = normalized_score.clamp(0.0, 1.0);
        Self {
            normalized_score,
            quantized_score: quantize(normalized_score),
        }
    }
}

pub struct WalletScorer;

impl WalletScorer {
    pub fn new() -> Self {
        Self
    }

    /// Score any statistics variant against a weight table
    ///
    /// Fails only on an invalid table (negative weight, inverted range).
    pub fn score(&self, stats: &dyn WalletStats, weights: &WeightTable) -> Result<ScoreResult> {
        let normalizer = ScoreNormalizer::new(weights)?;
        Ok(ScoreResult::from_normalized(normalizer.normalize(stats)))
    }
}

impl Default for WalletScorer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring_core::normalizer::StatWeight;
    use crate::scoring_core::stats::{names, WalletStatistics};
    use crate::scoring_core::valuator::TokenBalanceValuation;

    fn create_test_holdings(value_usd: f64) -> Vec<TokenBalanceValuation> {
        vec![TokenBalanceValuation::new("31566704".to_string(), value_usd, Some(1.0))]
    }

    fn weights() -> WeightTable {
        WeightTable::new()
            .with(names::WALLET_AGE, StatWeight::new(1.0, 0.0, 24.0))
            .with(names::TOTAL_TRANSACTIONS, StatWeight::new(1.0, 0.0, 1_000.0))
            .with(names::HOLD_TOKENS_VALUE_USD, StatWeight::new(2.0, 0.0, 10_000.0))
    }

    #[test]
    fn test_strong_wallet() {
        let stats = WalletStatistics {
            wallet_age: 36,
            total_transactions: 2_500,
            token_balances: create_test_holdings(50_000.0),
            ..Default::default()
        };

        let result = WalletScorer::new().score(&stats, &weights()).unwrap();
        assert_eq!(result.normalized_score, 1.0);
        assert_eq!(result.quantized_score, 10_000);
    }

    #[test]
    fn test_empty_wallet() {
        let result = WalletScorer::new().score(&WalletStatistics::default(), &weights()).unwrap();
        assert_eq!(result.normalized_score, 0.0);
        assert_eq!(result.quantized_score, 0);
    }

    #[test]
    fn test_middling_wallet() {
        let stats = WalletStatistics {
            wallet_age: 6,
            total_transactions: 500,
            token_balances: create_test_holdings(2_500.0),
            ..Default::default()
        };

        // (0.25 + 0.5 + 0.25 * 2) / 4
        let result = WalletScorer::new().score(&stats, &weights()).unwrap();
        assert_eq!(result.normalized_score, 0.3125);
        assert_eq!(result.quantized_score, 3125);
    }

    #[test]
    fn test_from_normalized_clamps() {
        assert_eq!(ScoreResult::from_normalized(1.7).quantized_score, 10_000);
        assert_eq!(ScoreResult::from_normalized(-0.2).normalized_score, 0.0);
        assert_eq!(ScoreResult::from_normalized(0.3125).quantized_score, 3125);
    }

    #[test]
    fn test_result_serializes_camel_case() {
        let result = ScoreResult {
            normalized_score: 0.5,
            quantized_score: 5_000,
        };
        let json = serde_json::to_string(&result).unwrap();
        assert_eq!(json, r#"{"normalizedScore":0.5,"quantizedScore":5000}"#);
    }
}
