//! Token balance valuation against an external price feed
//!
//! A holding without a price inside the tolerance window is still emitted,
//! with no unit price and a total value of zero.

use super::types::TokenHolding;
use crate::error::{Result, ScoringError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Price source keyed by chain-qualified token id (`<chain>:<token>`)
#[async_trait]
pub trait PriceLookup: Send + Sync {
    /// Latest USD price observed within `tolerance_hours`, if any
    async fn price_of(&self, token_id: &str, tolerance_hours: u32) -> Result<Option<f64>>;

    /// Batched lookup; ids without a price are absent from the map
    async fn prices_of(
        &self,
        token_ids: &[String],
        tolerance_hours: u32,
    ) -> Result<HashMap<String, f64>> {
        let mut prices = HashMap::with_capacity(token_ids.len());
        for id in token_ids {
            if let Some(price) = self.price_of(id, tolerance_hours).await? {
                prices.insert(id.clone(), price);
            }
        }
        Ok(prices)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenBalanceValuation {
    pub token_id: String,
    pub quantity: f64,
    pub unit_price: Option<f64>,
    pub total_value: f64,
}

impl TokenBalanceValuation {
    pub fn new(token_id: String, quantity: f64, unit_price: Option<f64>) -> Self {
        let total_value = unit_price.map(|price| quantity * price).unwrap_or(0.0);
        Self {
            token_id,
            quantity,
            unit_price,
            total_value,
        }
    }
}

/// Sum of `total_value`; unpriced holdings add zero
pub fn hold_tokens_value_usd(valuations: &[TokenBalanceValuation]) -> f64 {
    valuations.iter().map(|v| v.total_value).sum()
}

pub struct TokenBalanceValuator {
    chain_prefix: String,
    tolerance_hours: u32,
}

impl TokenBalanceValuator {
    pub fn new(chain_prefix: impl Into<String>, tolerance_hours: u32) -> Self {
        Self {
            chain_prefix: chain_prefix.into(),
            tolerance_hours,
        }
    }

    pub fn qualified_id(&self, token_id: &str) -> String {
        format!("{}:{}", self.chain_prefix, token_id)
    }

    /// Value every positive holding, calling the price feed once for the whole set
    pub async fn value_holdings<P>(
        &self,
        holdings: &[TokenHolding],
        prices: &P,
    ) -> Result<Vec<TokenBalanceValuation>>
    where
        P: PriceLookup + ?Sized,
    {
        let mut priced = Vec::with_capacity(holdings.len());
        for holding in holdings {
            if !holding.quantity.is_finite() {
                return Err(ScoringError::NonFiniteValue {
                    field: format!("quantity of token {}", holding.token_id),
                });
            }
            if holding.quantity < 0.0 {
                return Err(ScoringError::NegativeTokenQuantity {
                    token_id: holding.token_id.clone(),
                    quantity: holding.quantity,
                });
            }
            if holding.quantity == 0.0 {
                log::debug!("Skipping empty holding of {}", holding.token_id);
                continue;
            }
            priced.push(holding);
        }

        if priced.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<String> = priced
            .iter()
            .map(|h| self.qualified_id(&h.token_id))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let found = prices.prices_of(&ids, self.tolerance_hours).await?;

        let valuations: Vec<TokenBalanceValuation> = priced
            .into_iter()
            .map(|holding| {
                let unit_price = found
                    .get(&self.qualified_id(&holding.token_id))
                    .copied()
                    .filter(|price| {
                        let usable = price.is_finite() && *price >= 0.0;
                        if !usable {
                            log::warn!(
                                "Ignoring unusable price {} for {}",
                                price,
                                holding.token_id
                            );
                        }
                        usable
                    });
                if unit_price.is_none() {
                    log::debug!(
                        "No price within {}h for {}, valued at 0",
                        self.tolerance_hours,
                        holding.token_id
                    );
                }
                TokenBalanceValuation::new(holding.token_id.clone(), holding.quantity, unit_price)
            })
            .collect();

        Ok(valuations)
    }
}
