//! Scoring Core - Wallet Statistics & Scoring Engine
//!
//! Turns raw chain data for one wallet into a canonical statistics record and a
//! reproducible fixed-point score. Everything here is a pure transform; the only
//! suspension point is the price lookup handed in by the caller.
//!
//! # Architecture
//!
//! ```text
//! AccountSnapshot + Transactions + TokenHoldings
//!     ↓
//! IntervalAnalyzer (sort, gaps, monthly buckets)   TokenBalanceValuator (PriceLookup)
//!     ↓                                                ↓
//! StatsExtractor → WalletStatistics
//!     ↓
//! ScoreNormalizer (WeightTable) → [0, 1]
//!     ↓
//! quantize → u16 in [0, 10000]
//! ```

pub mod descriptors;
pub mod extractor;
pub mod intervals;
pub mod normalizer;
pub mod quantizer;
pub mod scorer;
pub mod stats;
pub mod types;
pub mod valuator;

pub use descriptors::{descriptors_for, DescriptorMap, StatDescriptor, EXCLUDED_STAT_DESCRIPTIONS};
pub use extractor::{ExtractOptions, StatsExtractor};
pub use intervals::{GapStats, IntervalAnalysis, IntervalAnalyzer, IntervalBucket};
pub use normalizer::{ScoreNormalizer, StatWeight, WeightTable};
pub use quantizer::{dequantize, quantize, SCORE_SCALE};
pub use scorer::{ScoreResult, WalletScorer};
pub use stats::{
    BasicWalletStatistics, ContractStats, NativeBalanceStats, StatGroup, StatValue, StatsVariant,
    TokenBalanceStats, TokenHoldingStats, TransactionStats, WalletStatistics, WalletStats,
};
pub use types::{AccountSnapshot, TokenHolding, Transaction, TransactionKind};
pub use valuator::{PriceLookup, TokenBalanceValuation, TokenBalanceValuator};

use crate::error::Result;

/// Build the statistics record for one wallet
pub async fn compute_statistics<P>(
    account: &AccountSnapshot,
    transactions: Vec<Transaction>,
    holdings: &[TokenHolding],
    options: ExtractOptions,
    prices: &P,
) -> Result<WalletStatistics>
where
    P: PriceLookup + ?Sized,
{
    StatsExtractor::new(options)
        .compute_statistics(account, transactions, holdings, prices)
        .await
}

/// Score any statistics variant against a weight table
pub fn score(stats: &dyn WalletStats, weights: &WeightTable) -> Result<ScoreResult> {
    WalletScorer::new().score(stats, weights)
}
