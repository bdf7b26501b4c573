//! Stats extraction: account snapshot + transactions + holdings → `WalletStatistics`

use super::intervals::IntervalAnalyzer;
use super::stats::WalletStatistics;
use super::types::{AccountSnapshot, TokenHolding, Transaction};
use super::valuator::{PriceLookup, TokenBalanceValuator};
use crate::error::{Result, ScoringError};
use chrono::{DateTime, Datelike, Duration, Timelike, Utc};
use std::collections::HashSet;

pub const LAST_MONTH_DAYS: i64 = 30;
pub const LAST_YEAR_DAYS: i64 = 365;
pub const DEFAULT_PRICE_SEARCH_WIDTH_HOURS: u32 = 6;

/// Per-request extraction settings
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Reference "now" for ages and trailing windows
    pub evaluated_at: DateTime<Utc>,
    /// Value token holdings against the price feed
    pub hold_token_balances: bool,
    /// Staleness tolerance for token prices
    pub price_search_width_hours: u32,
    /// Prefix qualifying token ids for the price feed (`<prefix>:<token>`)
    pub chain_prefix: String,
    /// Price feed id of the native coin
    pub native_price_id: String,
    /// Raw native balance units per coin, as a power of ten
    pub native_decimals: u32,
}

impl ExtractOptions {
    pub fn new(evaluated_at: DateTime<Utc>) -> Self {
        Self {
            evaluated_at,
            hold_token_balances: true,
            price_search_width_hours: DEFAULT_PRICE_SEARCH_WIDTH_HOURS,
            chain_prefix: "algorand".to_string(),
            native_price_id: "coingecko:algorand".to_string(),
            native_decimals: 6,
        }
    }
}

pub struct StatsExtractor {
    options: ExtractOptions,
    analyzer: IntervalAnalyzer,
    valuator: TokenBalanceValuator,
}

impl StatsExtractor {
    pub fn new(options: ExtractOptions) -> Self {
        let valuator = TokenBalanceValuator::new(
            options.chain_prefix.clone(),
            options.price_search_width_hours,
        );
        Self {
            options,
            analyzer: IntervalAnalyzer::new(),
            valuator,
        }
    }

    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Build the statistics record for one wallet as of `evaluated_at`
    ///
    /// Transactions dated after `evaluated_at` are left out of every statistic.
    /// The price feed is queried once for the native coin and, when token
    /// valuation is enabled, once for the whole deduplicated token set.
    pub async fn compute_statistics<P>(
        &self,
        account: &AccountSnapshot,
        transactions: Vec<Transaction>,
        holdings: &[TokenHolding],
        prices: &P,
    ) -> Result<WalletStatistics>
    where
        P: PriceLookup + ?Sized,
    {
        for tx in &transactions {
            if !tx.amount.is_finite() {
                return Err(ScoringError::NonFiniteValue {
                    field: format!("amount of transaction {}", tx.id),
                });
            }
        }

        let now = self.options.evaluated_at;
        let now_ts = now.timestamp();
        let (transactions, later): (Vec<_>, Vec<_>) =
            transactions.into_iter().partition(|tx| tx.timestamp <= now_ts);
        if !later.is_empty() {
            log::debug!(
                "Ignoring {} transactions of {} dated after {}",
                later.len(),
                account.address,
                now
            );
        }

        let analysis = self.analyzer.analyze(transactions)?;
        let sorted = &analysis.transactions;

        let first_tx = sorted.first().map(|t| t.timestamp);
        let first_activity = match (account.first_activity, first_tx) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        let wallet_age = first_activity
            .and_then(|ts| DateTime::from_timestamp(ts, 0))
            .map(|first| whole_months_between(first, now))
            .unwrap_or(0);

        let time_from_last_transaction = sorted
            .last()
            .and_then(|t| DateTime::from_timestamp(t.timestamp, 0))
            .map(|last| whole_months_between(last, now))
            .unwrap_or(0);

        let month_cutoff = (now - Duration::days(LAST_MONTH_DAYS)).timestamp();
        let year_cutoff = (now - Duration::days(LAST_YEAR_DAYS)).timestamp();

        let mut stats = WalletStatistics {
            wallet_age,
            time_from_last_transaction,
            average_transaction_time: analysis.gaps.average_hours,
            min_transaction_time: analysis.gaps.min_hours,
            max_transaction_time: analysis.gaps.max_hours,
            ..Default::default()
        };

        let mut tagged_creations = 0u32;
        for tx in sorted {
            stats.total_transactions += 1;
            if tx.rejected {
                stats.total_rejected_transactions += 1;
            }
            if tx.is_contract_create() {
                tagged_creations += 1;
            }
            stats.wallet_turnover += tx.moved_amount();

            if (month_cutoff..=now_ts).contains(&tx.timestamp) {
                stats.last_month_transactions += 1;
                stats.balance_change_in_last_month += tx.signed_amount();
            }
            if (year_cutoff..=now_ts).contains(&tx.timestamp) {
                stats.last_year_transactions += 1;
                stats.balance_change_in_last_year += tx.signed_amount();
            }
        }
        stats.deployed_contracts = tagged_creations.max(account.created_contracts);
        stats.turnover_intervals = analysis.buckets;

        stats.native_balance =
            account.balance as f64 / 10f64.powi(self.options.native_decimals as i32);
        if let Some(price) = prices
            .price_of(&self.options.native_price_id, self.options.price_search_width_hours)
            .await?
            .filter(|p| p.is_finite() && *p >= 0.0)
        {
            stats.native_balance_usd = stats.native_balance * price;
        }

        let held = distinct_holdings(holdings);
        stats.tokens_holding = held.iter().filter(|h| h.quantity > 0.0).count() as u32;
        if self.options.hold_token_balances {
            stats.token_balances = self.valuator.value_holdings(&held, prices).await?;
        }

        stats.no_data = stats.total_transactions == 0 && account.balance == 0;

        log::debug!(
            "Extracted stats for {}: age={}m, txs={}, turnover={:.4}, tokens={}",
            account.address,
            stats.wallet_age,
            stats.total_transactions,
            stats.wallet_turnover,
            stats.tokens_holding
        );

        Ok(stats)
    }
}

/// First occurrence per token id, zero quantities dropped
fn distinct_holdings(holdings: &[TokenHolding]) -> Vec<TokenHolding> {
    let mut seen = HashSet::new();
    holdings
        .iter()
        .filter(|h| seen.insert(h.token_id.as_str()))
        .filter(|h| h.quantity != 0.0)
        .cloned()
        .collect()
}

/// Whole calendar months elapsed from `from` to `to`; 0 when `to` is not later
pub fn whole_months_between(from: DateTime<Utc>, to: DateTime<Utc>) -> u32 {
    if to <= from {
        return 0;
    }

    let mut months =
        (to.year() - from.year()) * 12 + to.month() as i32 - from.month() as i32;
    let from_rest = (from.day(), from.num_seconds_from_midnight());
    let to_rest = (to.day(), to.num_seconds_from_midnight());
    if to_rest < from_rest {
        months -= 1;
    }

    months.max(0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring_core::stats::{TokenBalanceStats, TransactionStats};
    use crate::scoring_core::types::TransactionKind;
    use async_trait::async_trait;
    use chrono::TimeZone;

    const DAY: i64 = 86_400;

    struct NoPrices;

    #[async_trait]
    impl PriceLookup for NoPrices {
        async fn price_of(&self, _token_id: &str, _tolerance_hours: u32) -> Result<Option<f64>> {
            Ok(None)
        }
    }

    struct FlatPrice(f64);

    #[async_trait]
    impl PriceLookup for FlatPrice {
        async fn price_of(&self, _token_id: &str, _tolerance_hours: u32) -> Result<Option<f64>> {
            Ok(Some(self.0))
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    fn account(balance: u64) -> AccountSnapshot {
        AccountSnapshot {
            address: "WALLET".to_string(),
            balance,
            first_activity: None,
            created_contracts: 0,
        }
    }

    fn tx(id: &str, timestamp: i64, amount: f64, kind: TransactionKind) -> Transaction {
        Transaction {
            id: id.to_string(),
            timestamp,
            amount,
            rejected: false,
            kind,
        }
    }

    #[tokio::test]
    async fn test_empty_history() {
        let extractor = StatsExtractor::new(ExtractOptions::new(now()));
        let stats = extractor
            .compute_statistics(&account(0), Vec::new(), &[], &NoPrices)
            .await
            .unwrap();

        assert!(stats.no_data);
        assert_eq!(stats.wallet_age, 0);
        assert_eq!(stats.total_transactions, 0);
        assert_eq!(stats.average_transaction_time, 0.0);
        assert_eq!(stats.min_transaction_time, 0.0);
        assert_eq!(stats.max_transaction_time, 0.0);
        assert_eq!(stats.transactions_per_month(), 0.0);
        assert_eq!(stats.time_from_last_transaction, 0);
        assert!(stats.turnover_intervals.is_empty());
    }

    #[tokio::test]
    async fn test_three_transaction_example() {
        let n = now().timestamp();
        let txs = vec![
            tx("c", n, 5.0, TransactionKind::Transfer),
            tx("a", n - 90 * DAY, 10.0, TransactionKind::Transfer),
            tx("b", n - 30 * DAY, 20.0, TransactionKind::Transfer),
        ];

        let extractor = StatsExtractor::new(ExtractOptions::new(now()));
        let stats = extractor
            .compute_statistics(&account(1_000_000), txs, &[], &NoPrices)
            .await
            .unwrap();

        assert_eq!(stats.total_transactions, 3);
        assert_eq!(stats.wallet_turnover, 35.0);
        assert_eq!(stats.average_transaction_time, 1080.0);
        assert_eq!(stats.min_transaction_time, 720.0);
        assert_eq!(stats.max_transaction_time, 1440.0);
        // 2024-03-17T12:00 → 2024-06-15T12:00
        assert_eq!(stats.wallet_age, 2);
        assert_eq!(stats.transactions_per_month(), 1.5);
        assert_eq!(stats.last_month_transactions, 2);
        assert_eq!(stats.last_year_transactions, 3);
        assert_eq!(stats.balance_change_in_last_month, 25.0);
        assert_eq!(stats.balance_change_in_last_year, 35.0);
        assert_eq!(stats.time_from_last_transaction, 0);
        assert_eq!(stats.native_balance, 1.0);
        assert!(!stats.no_data);

        let bucket_sum: f64 = stats.turnover_intervals.iter().map(|b| b.turnover).sum();
        assert_eq!(bucket_sum, stats.wallet_turnover);
    }

    #[tokio::test]
    async fn test_rejected_and_contract_counts() {
        let n = now().timestamp();
        let mut failed = tx("f", n - DAY, -50.0, TransactionKind::ContractCall);
        failed.rejected = true;
        let txs = vec![
            failed,
            tx("d1", n - 400 * DAY, -1.0, TransactionKind::ContractCreate),
            tx("d2", n - 10 * DAY, -1.0, TransactionKind::ContractCreate),
        ];

        let extractor = StatsExtractor::new(ExtractOptions::new(now()));
        let stats = extractor
            .compute_statistics(&account(0), txs, &[], &NoPrices)
            .await
            .unwrap();

        assert_eq!(stats.total_transactions, 3);
        assert_eq!(stats.total_rejected_transactions, 1);
        assert_eq!(stats.deployed_contracts, 2);
        assert_eq!(stats.wallet_turnover, 2.0);
        assert_eq!(stats.balance_change_in_last_month, -1.0);
        assert_eq!(stats.last_month_transactions, 2);
        assert_eq!(stats.last_year_transactions, 2);
    }

    #[tokio::test]
    async fn test_account_first_activity_extends_age() {
        let mut snapshot = account(0);
        let first_activity = Utc.with_ymd_and_hms(2022, 6, 1, 0, 0, 0).unwrap();
        snapshot.first_activity = Some(first_activity.timestamp());
        snapshot.created_contracts = 4;
        let txs = vec![tx("a", now().timestamp() - 40 * DAY, 1.0, TransactionKind::Transfer)];

        let extractor = StatsExtractor::new(ExtractOptions::new(now()));
        let stats = extractor
            .compute_statistics(&snapshot, txs, &[], &NoPrices)
            .await
            .unwrap();

        assert_eq!(stats.wallet_age, 24);
        assert_eq!(stats.time_from_last_transaction, 1);
        assert_eq!(stats.deployed_contracts, 4);
    }

    #[tokio::test]
    async fn test_holdings_valued_and_deduplicated() {
        let holdings = vec![
            TokenHolding { token_id: "1".to_string(), quantity: 4.0 },
            TokenHolding { token_id: "1".to_string(), quantity: 9.0 },
            TokenHolding { token_id: "2".to_string(), quantity: 0.0 },
            TokenHolding { token_id: "3".to_string(), quantity: 1.0 },
        ];

        let extractor = StatsExtractor::new(ExtractOptions::new(now()));
        let stats = extractor
            .compute_statistics(&account(2_000_000), Vec::new(), &holdings, &FlatPrice(0.5))
            .await
            .unwrap();

        assert_eq!(stats.tokens_holding, 2);
        assert_eq!(stats.token_balances.len(), 2);
        assert_eq!(stats.token_balances[0].quantity, 4.0);
        assert_eq!(stats.hold_tokens_value_usd(), 2.5);
        assert_eq!(stats.native_balance_usd, 1.0);
    }

    #[tokio::test]
    async fn test_unpriced_holding_still_counted() {
        let holdings = vec![TokenHolding { token_id: "404".to_string(), quantity: 100.0 }];

        let extractor = StatsExtractor::new(ExtractOptions::new(now()));
        let stats = extractor
            .compute_statistics(&account(0), Vec::new(), &holdings, &NoPrices)
            .await
            .unwrap();

        assert_eq!(stats.tokens_holding, 1);
        assert_eq!(stats.token_balances.len(), 1);
        assert_eq!(stats.token_balances[0].unit_price, None);
        assert_eq!(stats.token_balances[0].total_value, 0.0);
        assert_eq!(stats.hold_tokens_value_usd(), 0.0);
    }

    #[tokio::test]
    async fn test_token_lookup_disabled() {
        let mut options = ExtractOptions::new(now());
        options.hold_token_balances = false;

        let extractor = StatsExtractor::new(options);
        let stats = extractor
            .compute_statistics(&account(0), Vec::new(), &[], &FlatPrice(3.0))
            .await
            .unwrap();

        assert!(stats.token_balances.is_empty());
        assert_eq!(stats.hold_tokens_value_usd(), 0.0);
    }

    #[tokio::test]
    async fn test_non_finite_amount_rejected() {
        let extractor = StatsExtractor::new(ExtractOptions::new(now()));
        let txs = vec![tx("nan", now().timestamp(), f64::NAN, TransactionKind::Other)];

        let result = extractor.compute_statistics(&account(0), txs, &[], &NoPrices).await;
        assert!(matches!(result, Err(ScoringError::NonFiniteValue { .. })));
    }

    #[tokio::test]
    async fn test_transactions_after_evaluation_ignored() {
        let n = now().timestamp();
        let txs = vec![
            tx("past", n - 10 * DAY, 3.0, TransactionKind::Transfer),
            tx("edge", n, 2.0, TransactionKind::Transfer),
            tx("later", n + 10 * DAY, 7.0, TransactionKind::ContractCreate),
            tx("much-later", n + 400 * DAY, 50.0, TransactionKind::Transfer),
        ];

        let extractor = StatsExtractor::new(ExtractOptions::new(now()));
        let stats = extractor
            .compute_statistics(&account(1_000_000), txs, &[], &NoPrices)
            .await
            .unwrap();

        assert_eq!(stats.total_transactions, 2);
        assert_eq!(stats.last_month_transactions, 2);
        assert_eq!(stats.last_year_transactions, 2);
        assert_eq!(stats.balance_change_in_last_month, 5.0);
        assert_eq!(stats.balance_change_in_last_year, 5.0);
        assert_eq!(stats.wallet_turnover, 5.0);
        assert_eq!(stats.deployed_contracts, 0);
        assert_eq!(stats.max_transaction_time, 240.0);
        assert_eq!(stats.turnover_intervals.len(), 1);
        assert_eq!(stats.turnover_intervals[0].transaction_count, 2);
        assert_eq!(stats.time_from_last_transaction, 0);
    }

    #[tokio::test]
    async fn test_only_future_activity_has_no_age() {
        let mut snapshot = account(0);
        snapshot.first_activity = Some(now().timestamp() + 40 * DAY);
        let txs = vec![tx("later", now().timestamp() + 40 * DAY, 1.0, TransactionKind::Transfer)];

        let extractor = StatsExtractor::new(ExtractOptions::new(now()));
        let stats = extractor
            .compute_statistics(&snapshot, txs, &[], &NoPrices)
            .await
            .unwrap();

        assert_eq!(stats.wallet_age, 0);
        assert_eq!(stats.total_transactions, 0);
        assert_eq!(stats.transactions_per_month(), 0.0);
        assert!(stats.no_data);
    }

    #[test]
    fn test_whole_months_between() {
        let date = |y, m, d| Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap();
        let from = date(2024, 1, 31);
        assert_eq!(whole_months_between(from, date(2024, 2, 29)), 0);
        assert_eq!(whole_months_between(from, date(2024, 3, 31)), 2);
        assert_eq!(whole_months_between(from, date(2025, 1, 31)), 12);
        assert_eq!(whole_months_between(from, from), 0);
        assert_eq!(whole_months_between(from, date(2023, 1, 1)), 0);
    }
}
