//! Transaction ordering, gap statistics and calendar-month turnover buckets

use super::types::Transaction;
use crate::error::{Result, ScoringError};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

const SECS_PER_HOUR: f64 = 3600.0;

/// Time gaps between consecutive transactions, in hours
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GapStats {
    pub average_hours: f64,
    pub min_hours: f64,
    pub max_hours: f64,
}

/// One calendar month of wallet activity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntervalBucket {
    pub period_start: DateTime<Utc>,
    pub transaction_count: u32,
    pub turnover: f64,
    pub average_gap_hours: f64,
}

impl IntervalBucket {
    pub fn new(period_start: DateTime<Utc>) -> Self {
        Self {
            period_start,
            transaction_count: 0,
            turnover: 0.0,
            average_gap_hours: 0.0,
        }
    }
}

/// Running gap state for one bucket while it is being filled
struct BucketBuilder {
    bucket: IntervalBucket,
    last_timestamp: Option<i64>,
    gap_sum_hours: f64,
}

impl BucketBuilder {
    fn new(period_start: DateTime<Utc>) -> Self {
        Self {
            bucket: IntervalBucket::new(period_start),
            last_timestamp: None,
            gap_sum_hours: 0.0,
        }
    }

    /// Transactions must be added in sorted order
    fn add_transaction(&mut self, tx: &Transaction) {
        if let Some(last) = self.last_timestamp {
            self.gap_sum_hours += (tx.timestamp - last) as f64 / SECS_PER_HOUR;
        }
        self.last_timestamp = Some(tx.timestamp);

        let bucket = &mut self.bucket;
        bucket.transaction_count += 1;
        bucket.turnover += tx.moved_amount();
        bucket.average_gap_hours = if bucket.transaction_count > 1 {
            self.gap_sum_hours / (bucket.transaction_count - 1) as f64
        } else {
            0.0
        };
    }
}

/// Output of [`IntervalAnalyzer::analyze`]
#[derive(Debug, Clone)]
pub struct IntervalAnalysis {
    /// Sorted by `(timestamp, id)` ascending
    pub transactions: Vec<Transaction>,
    pub gaps: GapStats,
    pub buckets: Vec<IntervalBucket>,
}

pub struct IntervalAnalyzer;

impl IntervalAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze(&self, transactions: Vec<Transaction>) -> Result<IntervalAnalysis> {
        let transactions = sort_transactions(transactions)?;
        let gaps = gap_stats(&transactions);
        let buckets = monthly_buckets(&transactions)?;

        log::debug!(
            "Interval analysis: {} transactions, {} monthly buckets",
            transactions.len(),
            buckets.len()
        );

        Ok(IntervalAnalysis {
            transactions,
            gaps,
            buckets,
        })
    }
}

impl Default for IntervalAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate timestamps and order by `(timestamp, id)`
pub fn sort_transactions(mut transactions: Vec<Transaction>) -> Result<Vec<Transaction>> {
    for tx in &transactions {
        if tx.timestamp < 0 || DateTime::from_timestamp(tx.timestamp, 0).is_none() {
            return Err(ScoringError::InvalidTimestamp {
                tx_id: tx.id.clone(),
                timestamp: tx.timestamp,
            });
        }
    }

    transactions.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then_with(|| a.id.cmp(&b.id)));

    if let Some(pair) = transactions.windows(2).find(|w| w[1].timestamp < w[0].timestamp) {
        return Err(ScoringError::NonMonotonicTimestamps {
            tx_id: pair[1].id.clone(),
        });
    }

    Ok(transactions)
}

/// Average/min/max gap over adjacent pairs; all zero with fewer than two transactions
pub fn gap_stats(sorted: &[Transaction]) -> GapStats {
    let gaps: Vec<f64> = sorted
        .windows(2)
        .map(|w| (w[1].timestamp - w[0].timestamp) as f64 / SECS_PER_HOUR)
        .collect();

    if gaps.is_empty() {
        return GapStats::default();
    }

    GapStats {
        average_hours: gaps.iter().sum::<f64>() / gaps.len() as f64,
        min_hours: gaps.iter().copied().fold(f64::INFINITY, f64::min),
        max_hours: gaps.iter().copied().fold(f64::NEG_INFINITY, f64::max),
    }
}

/// Zero-filled monthly buckets from the first to the last transaction's month
pub fn monthly_buckets(sorted: &[Transaction]) -> Result<Vec<IntervalBucket>> {
    let (first, last) = match (sorted.first(), sorted.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Ok(Vec::new()),
    };

    let first_month = month_index(first)?;
    let last_month = month_index(last)?;

    let mut builders = Vec::with_capacity((last_month - first_month + 1) as usize);
    for index in first_month..=last_month {
        let start = period_start(index).ok_or_else(|| ScoringError::InvalidTimestamp {
            tx_id: first.id.clone(),
            timestamp: first.timestamp,
        })?;
        builders.push(BucketBuilder::new(start));
    }

    for tx in sorted {
        let offset = (month_index(tx)? - first_month) as usize;
        builders[offset].add_transaction(tx);
    }

    Ok(builders.into_iter().map(|builder| builder.bucket).collect())
}

/// Months since year 0, so consecutive calendar months differ by one
fn month_index(tx: &Transaction) -> Result<i64> {
    let dt = DateTime::from_timestamp(tx.timestamp, 0).ok_or_else(|| {
        ScoringError::InvalidTimestamp {
            tx_id: tx.id.clone(),
            timestamp: tx.timestamp,
        }
    })?;
    Ok(dt.year() as i64 * 12 + dt.month0() as i64)
}

fn period_start(month_index: i64) -> Option<DateTime<Utc>> {
    let year = i32::try_from(month_index.div_euclid(12)).ok()?;
    let month = month_index.rem_euclid(12) as u32 + 1;
    NaiveDate::from_ymd_opt(year, month, 1)?
        .and_hms_opt(0, 0, 0)
        .map(|naive| naive.and_utc())
}
