//! Scoring Engine - fetch → extract → normalize → quantize for one or many wallets
//!
//! ```text
//! address
//!     ↓
//! AccountSource::fetch()
//!     ↓
//! StatsExtractor (PriceLookup)
//!     ↓
//! ScoreNormalizer (WeightTable)
//!     ↓
//! quantize
//!     ↓
//! WalletScore
//! ```
//!
//! Cancellation is only observed at stage boundaries; a stage that has started
//! runs to completion. The engine never retries, and a failed collaborator call
//! surfaces as the wallet's error.

use super::config::ScoringConfig;
use super::sources::AccountSource;
use crate::error::{Result, ScoringError};
use crate::scoring_core::extractor::StatsExtractor;
use crate::scoring_core::normalizer::{ScoreNormalizer, WeightTable};
use crate::scoring_core::scorer::ScoreResult;
use crate::scoring_core::stats::WalletStatistics;
use crate::scoring_core::valuator::PriceLookup;
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::Serialize;
use std::sync::Arc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

pub const STAGE_FETCH: &str = "fetch";
pub const STAGE_EXTRACT: &str = "extract";
pub const STAGE_NORMALIZE: &str = "normalize";
pub const STAGE_QUANTIZE: &str = "quantize";

/// Scored wallet, as handed to the signing layer
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletScore {
    pub address: String,
    pub stats: WalletStatistics,
    pub score: ScoreResult,
}

pub struct ScoringEngine<S, P> {
    source: S,
    prices: P,
    config: ScoringConfig,
}

impl<S, P> ScoringEngine<S, P>
where
    S: AccountSource,
    P: PriceLookup,
{
    pub fn new(source: S, prices: P, config: ScoringConfig) -> Self {
        Self {
            source,
            prices,
            config,
        }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Score one wallet as of now
    pub async fn score_wallet(
        &self,
        address: &str,
        weights: &WeightTable,
        cancel: &CancellationToken,
    ) -> Result<WalletScore> {
        self.score_wallet_at(address, weights, Utc::now(), cancel).await
    }

    /// Score one wallet as of `evaluated_at`
    pub async fn score_wallet_at(
        &self,
        address: &str,
        weights: &WeightTable,
        evaluated_at: DateTime<Utc>,
        cancel: &CancellationToken,
    ) -> Result<WalletScore> {
        // Reject a bad table before touching any collaborator
        let normalizer = ScoreNormalizer::new(weights)?;

        checkpoint(cancel, STAGE_FETCH)?;
        let data = self.source.fetch(address).await?;
        debug!(
            "Fetched {}: {} transactions, {} holdings",
            address,
            data.transactions.len(),
            data.holdings.len()
        );

        checkpoint(cancel, STAGE_EXTRACT)?;
        let extractor = StatsExtractor::new(self.config.extract_options(evaluated_at));
        let stats = extractor
            .compute_statistics(&data.account, data.transactions, &data.holdings, &self.prices)
            .await?;

        checkpoint(cancel, STAGE_NORMALIZE)?;
        let normalized_score = normalizer.normalize(&stats);

        checkpoint(cancel, STAGE_QUANTIZE)?;
        let score = ScoreResult::from_normalized(normalized_score);

        info!(
            "Scored {}: normalized={:.6}, quantized={}{}",
            address,
            score.normalized_score,
            score.quantized_score,
            if stats.no_data { " (no data)" } else { "" }
        );

        Ok(WalletScore {
            address: address.to_string(),
            stats,
            score,
        })
    }
}

impl<S, P> ScoringEngine<S, P>
where
    S: AccountSource + 'static,
    P: PriceLookup + 'static,
{
    /// Score wallets concurrently; results come back in input order
    ///
    /// One wallet failing does not affect the others.
    pub async fn score_many(
        self: &Arc<Self>,
        addresses: &[String],
        weights: Arc<WeightTable>,
        cancel: CancellationToken,
    ) -> Vec<Result<WalletScore>> {
        let evaluated_at = Utc::now();
        let mut tasks = JoinSet::new();

        for (index, address) in addresses.iter().cloned().enumerate() {
            let engine = Arc::clone(self);
            let weights = Arc::clone(&weights);
            let cancel = cancel.clone();
            tasks.spawn(async move {
                let result = engine
                    .score_wallet_at(&address, &weights, evaluated_at, &cancel)
                    .await;
                (index, result)
            });
        }

        let mut slots: Vec<Option<Result<WalletScore>>> =
            (0..addresses.len()).map(|_| None).collect();
        let mut join_failure = String::from("task did not complete");

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, result)) => {
                    if let Err(e) = &result {
                        warn!("⚠️  Scoring {} failed: {}", addresses[index], e);
                    }
                    slots[index] = Some(result);
                }
                Err(e) => {
                    warn!("⚠️  Scoring task aborted: {}", e);
                    join_failure = e.to_string();
                }
            }
        }

        slots
            .into_iter()
            .map(|slot| slot.unwrap_or_else(|| Err(ScoringError::TaskFailed(join_failure.clone()))))
            .collect()
    }
}

fn checkpoint(cancel: &CancellationToken, stage: &'static str) -> Result<()> {
    if cancel.is_cancelled() {
        debug!("Cancellation observed before {}", stage);
        return Err(ScoringError::Cancelled { stage });
    }
    Ok(())
}
