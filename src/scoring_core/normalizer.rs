//! Weighted, calibrated normalization of statistics into [0, 1]

use super::stats::WalletStats;
use crate::error::{Result, ScoringError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

/// Weight and calibration range of one statistic
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatWeight {
    pub weight: f64,
    pub min: f64,
    pub max: f64,
}

impl StatWeight {
    pub fn new(weight: f64, min: f64, max: f64) -> Self {
        Self { weight, min, max }
    }

    /// Clamp to `[min, max]` and rescale to `[0, 1]`; 0 for a degenerate range
    pub fn calibrate(&self, raw: f64) -> f64 {
        if self.max == self.min {
            return 0.0;
        }
        let clamped = raw.clamp(self.min, self.max);
        (clamped - self.min) / (self.max - self.min)
    }
}

/// Per-chain weight/calibration table: `{statName: {weight, min, max}}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeightTable {
    entries: BTreeMap<String, StatWeight>,
}

impl WeightTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, stat: &str, weight: StatWeight) -> Self {
        self.entries.insert(stat.to_string(), weight);
        self
    }

    pub fn get(&self, stat: &str) -> Option<&StatWeight> {
        self.entries.get(stat)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &StatWeight)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Parse and validate a JSON table
    pub fn from_json_str(json: &str) -> Result<Self> {
        let table: WeightTable = serde_json::from_str(json)?;
        table.validate()?;
        Ok(table)
    }

    /// Load and validate a JSON table from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let table = Self::from_json_str(&json)?;
        log::debug!(
            "Loaded weight table with {} entries from {}",
            table.len(),
            path.as_ref().display()
        );
        Ok(table)
    }

    /// Non-negative finite weights and `min <= max` everywhere
    pub fn validate(&self) -> Result<()> {
        for (stat, w) in &self.entries {
            if !w.weight.is_finite() || !w.min.is_finite() || !w.max.is_finite() {
                return Err(ScoringError::NonFiniteValue {
                    field: format!("weight table entry {}", stat),
                });
            }
            if w.weight < 0.0 {
                return Err(ScoringError::NegativeWeight {
                    stat: stat.clone(),
                    weight: w.weight,
                });
            }
            if w.min > w.max {
                return Err(ScoringError::InvalidCalibrationRange {
                    stat: stat.clone(),
                    min: w.min,
                    max: w.max,
                });
            }
        }
        Ok(())
    }
}

pub struct ScoreNormalizer<'a> {
    table: &'a WeightTable,
}

impl<'a> ScoreNormalizer<'a> {
    /// Fails on a table with negative weights or inverted ranges
    pub fn new(table: &'a WeightTable) -> Result<Self> {
        table.validate()?;
        Ok(Self { table })
    }

    /// Weighted mean of calibrated statistics, or 0 when no weight applies
    ///
    /// Only statistics the variant actually carries contribute, summed in the
    /// variant's declaration order. Table entries naming statistics the variant
    /// lacks are ignored.
    pub fn normalize(&self, stats: &dyn WalletStats) -> f64 {
        let values = stats.stat_values();

        let mut weighted_sum = 0.0;
        let mut weight_sum = 0.0;
        for stat in &values {
            if let Some(w) = self.table.get(stat.name) {
                weighted_sum += w.calibrate(stat.value) * w.weight;
                weight_sum += w.weight;
            }
        }

        if log::log_enabled!(log::Level::Debug) {
            let present: HashSet<&str> = values.iter().map(|v| v.name).collect();
            for (name, _) in self.table.iter() {
                if !present.contains(name) {
                    log::debug!("Weight table entry {} has no matching statistic", name);
                }
            }
        }

        if weight_sum == 0.0 {
            0.0
        } else {
            weighted_sum / weight_sum
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring_core::stats::{names, BasicWalletStatistics, WalletStatistics};
    use crate::scoring_core::valuator::TokenBalanceValuation;

    fn stats() -> WalletStatistics {
        WalletStatistics {
            wallet_age: 12,
            total_transactions: 300,
            tokens_holding: 5,
            token_balances: vec![TokenBalanceValuation::new(
                "31566704".to_string(),
                500.0,
                Some(2.0),
            )],
            ..Default::default()
        }
    }

    #[test]
    fn test_calibrate_clamps_and_rescales() {
        let w = StatWeight::new(1.0, 10.0, 20.0);
        assert_eq!(w.calibrate(5.0), 0.0);
        assert_eq!(w.calibrate(15.0), 0.5);
        assert_eq!(w.calibrate(99.0), 1.0);
        assert_eq!(StatWeight::new(1.0, 3.0, 3.0).calibrate(3.0), 0.0);
    }

    #[test]
    fn test_weighted_mean() {
        let table = WeightTable::new()
            .with(names::WALLET_AGE, StatWeight::new(1.0, 0.0, 24.0))
            .with(names::TOTAL_TRANSACTIONS, StatWeight::new(3.0, 0.0, 300.0));

        let score = ScoreNormalizer::new(&table).unwrap().normalize(&stats());
        // (0.5 * 1 + 1.0 * 3) / 4
        assert_eq!(score, 0.875);
    }

    #[test]
    fn test_zero_weight_sum_scores_zero() {
        let table = WeightTable::new().with(names::WALLET_AGE, StatWeight::new(0.0, 0.0, 24.0));
        assert_eq!(ScoreNormalizer::new(&table).unwrap().normalize(&stats()), 0.0);
        assert_eq!(ScoreNormalizer::new(&WeightTable::new()).unwrap().normalize(&stats()), 0.0);
    }

    #[test]
    fn test_absent_groups_contribute_nothing() {
        let table = WeightTable::new()
            .with(names::WALLET_AGE, StatWeight::new(1.0, 0.0, 24.0))
            .with(names::TOKENS_HOLDING, StatWeight::new(5.0, 0.0, 5.0));

        let full = ScoreNormalizer::new(&table).unwrap().normalize(&stats());
        let basic = ScoreNormalizer::new(&table)
            .unwrap()
            .normalize(&BasicWalletStatistics::from(stats()));

        assert_eq!(full, (0.5 + 5.0) / 6.0);
        assert_eq!(basic, 0.5);
    }

    #[test]
    fn test_negative_weight_rejected() {
        let table = WeightTable::new().with(names::WALLET_AGE, StatWeight::new(-1.0, 0.0, 24.0));
        assert!(matches!(
            ScoreNormalizer::new(&table),
            Err(ScoringError::NegativeWeight { .. })
        ));
    }

    #[test]
    fn test_inverted_range_rejected() {
        let json = r#"{"walletAge": {"weight": 1.0, "min": 10.0, "max": 2.0}}"#;
        assert!(matches!(
            WeightTable::from_json_str(json),
            Err(ScoringError::InvalidCalibrationRange { min, max, .. }) if min == 10.0 && max == 2.0
        ));
    }

    #[test]
    fn test_parse_weight_table_json() {
        let json = r#"{
            "walletAge": {"weight": 2.0, "min": 0.0, "max": 48.0},
            "holdTokensValueUsd": {"weight": 1.0, "min": 0.0, "max": 10000.0}
        }"#;
        let table = WeightTable::from_json_str(json).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.get(names::WALLET_AGE), Some(&StatWeight::new(2.0, 0.0, 48.0)));
    }

    #[test]
    fn test_score_in_unit_interval() {
        let table = WeightTable::new()
            .with(names::WALLET_AGE, StatWeight::new(0.7, 0.0, 6.0))
            .with(names::BALANCE_CHANGE_IN_LAST_YEAR, StatWeight::new(2.0, -100.0, 100.0))
            .with(names::HOLD_TOKENS_VALUE_USD, StatWeight::new(1.3, 0.0, 500.0));

        let score = ScoreNormalizer::new(&table).unwrap().normalize(&stats());
        assert!((0.0..=1.0).contains(&score));
    }

    #[test]
    fn test_token_value_follows_valuations() {
        let table = WeightTable::new()
            .with(names::HOLD_TOKENS_VALUE_USD, StatWeight::new(1.0, 0.0, 2_000.0));

        assert_eq!(ScoreNormalizer::new(&table).unwrap().normalize(&stats()), 0.5);

        let unvalued = WalletStatistics {
            token_balances: Vec::new(),
            ..stats()
        };
        assert_eq!(ScoreNormalizer::new(&table).unwrap().normalize(&unvalued), 0.0);
    }
}
