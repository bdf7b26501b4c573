//! Wallet statistics records and the capability groups they expose
//!
//! Chains populate different subsets of statistics. Each subset is a capability
//! trait; a statistics variant opts into the groups it carries and the
//! normalizer and descriptor registry only ever see those groups.

use super::descriptors::{descriptors_for, DescriptorMap};
use super::intervals::IntervalBucket;
use super::valuator::{self, TokenBalanceValuation};
use serde::{Deserialize, Serialize, Serializer};

/// Stable statistic names, shared by serialization, weight tables and descriptors
pub mod names {
    pub const NATIVE_BALANCE: &str = "nativeBalance";
    pub const NATIVE_BALANCE_USD: &str = "nativeBalanceUsd";
    pub const HOLD_TOKENS_VALUE_USD: &str = "holdTokensValueUsd";
    pub const TOKEN_BALANCES: &str = "tokenBalances";
    pub const WALLET_AGE: &str = "walletAge";
    pub const TOTAL_TRANSACTIONS: &str = "totalTransactions";
    pub const TOTAL_REJECTED_TRANSACTIONS: &str = "totalRejectedTransactions";
    pub const AVERAGE_TRANSACTION_TIME: &str = "averageTransactionTime";
    pub const MAX_TRANSACTION_TIME: &str = "maxTransactionTime";
    pub const MIN_TRANSACTION_TIME: &str = "minTransactionTime";
    pub const WALLET_TURNOVER: &str = "walletTurnover";
    pub const TURNOVER_INTERVALS: &str = "turnoverIntervals";
    pub const BALANCE_CHANGE_IN_LAST_MONTH: &str = "balanceChangeInLastMonth";
    pub const BALANCE_CHANGE_IN_LAST_YEAR: &str = "balanceChangeInLastYear";
    pub const TIME_FROM_LAST_TRANSACTION: &str = "timeFromLastTransaction";
    pub const LAST_MONTH_TRANSACTIONS: &str = "lastMonthTransactions";
    pub const LAST_YEAR_TRANSACTIONS: &str = "lastYearTransactions";
    pub const TRANSACTIONS_PER_MONTH: &str = "transactionsPerMonth";
    pub const TOKENS_HOLDING: &str = "tokensHolding";
    pub const DEPLOYED_CONTRACTS: &str = "deployedContracts";
    pub const NO_DATA: &str = "noData";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StatGroup {
    NativeBalance,
    TokenBalance,
    Transaction,
    TokenHolding,
    Contract,
}

impl StatGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatGroup::NativeBalance => "native-balance",
            StatGroup::TokenBalance => "token-balance",
            StatGroup::Transaction => "transaction",
            StatGroup::TokenHolding => "token-holding",
            StatGroup::Contract => "contract",
        }
    }
}

/// Concrete statistics shapes the registry knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatsVariant {
    /// All five capability groups
    Full,
    /// Native balance, transactions and contracts (chains without token support)
    Basic,
}

impl StatsVariant {
    pub fn groups(&self) -> &'static [StatGroup] {
        match self {
            StatsVariant::Full => &[
                StatGroup::NativeBalance,
                StatGroup::TokenBalance,
                StatGroup::Transaction,
                StatGroup::TokenHolding,
                StatGroup::Contract,
            ],
            StatsVariant::Basic => &[
                StatGroup::NativeBalance,
                StatGroup::Transaction,
                StatGroup::Contract,
            ],
        }
    }
}

pub trait NativeBalanceStats {
    /// Coin units
    fn native_balance(&self) -> f64;
    fn native_balance_usd(&self) -> f64;
}

pub trait TokenBalanceStats {
    fn token_balances(&self) -> &[TokenBalanceValuation];

    fn hold_tokens_value_usd(&self) -> f64 {
        valuator::hold_tokens_value_usd(self.token_balances())
    }
}

pub trait TransactionStats {
    fn wallet_age(&self) -> u32;
    fn total_transactions(&self) -> u32;
    fn total_rejected_transactions(&self) -> u32;
    fn average_transaction_time(&self) -> f64;
    fn max_transaction_time(&self) -> f64;
    fn min_transaction_time(&self) -> f64;
    fn wallet_turnover(&self) -> f64;
    fn turnover_intervals(&self) -> &[IntervalBucket];
    fn balance_change_in_last_month(&self) -> f64;
    fn balance_change_in_last_year(&self) -> f64;
    fn time_from_last_transaction(&self) -> u32;
    fn last_month_transactions(&self) -> u32;
    fn last_year_transactions(&self) -> u32;

    fn transactions_per_month(&self) -> f64 {
        transactions_per_month(self.total_transactions(), self.wallet_age())
    }
}

pub trait TokenHoldingStats {
    fn tokens_holding(&self) -> u32;
}

pub trait ContractStats {
    fn deployed_contracts(&self) -> u32;
}

/// `total / age`, or 0 for a wallet younger than one month
pub fn transactions_per_month(total_transactions: u32, wallet_age: u32) -> f64 {
    if wallet_age == 0 {
        0.0
    } else {
        total_transactions as f64 / wallet_age as f64
    }
}

/// One scalar statistic ready for scoring
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatValue {
    pub name: &'static str,
    pub group: StatGroup,
    pub value: f64,
}

/// Common surface of every statistics variant
pub trait WalletStats: Send + Sync {
    fn variant(&self) -> StatsVariant;
    fn no_data(&self) -> bool;

    fn native_balance_stats(&self) -> Option<&dyn NativeBalanceStats> {
        None
    }
    fn token_balance_stats(&self) -> Option<&dyn TokenBalanceStats> {
        None
    }
    fn transaction_stats(&self) -> Option<&dyn TransactionStats> {
        None
    }
    fn token_holding_stats(&self) -> Option<&dyn TokenHoldingStats> {
        None
    }
    fn contract_stats(&self) -> Option<&dyn ContractStats> {
        None
    }

    /// Scalar statistics of the groups present, in fixed declaration order
    fn stat_values(&self) -> Vec<StatValue> {
        let mut values = Vec::with_capacity(20);
        let mut push = |name, group, value| values.push(StatValue { name, group, value });

        if let Some(s) = self.native_balance_stats() {
            let g = StatGroup::NativeBalance;
            push(names::NATIVE_BALANCE, g, s.native_balance());
            push(names::NATIVE_BALANCE_USD, g, s.native_balance_usd());
        }
        if let Some(s) = self.token_balance_stats() {
            push(names::HOLD_TOKENS_VALUE_USD, StatGroup::TokenBalance, s.hold_tokens_value_usd());
        }
        if let Some(s) = self.transaction_stats() {
            let g = StatGroup::Transaction;
            push(names::WALLET_AGE, g, s.wallet_age() as f64);
            push(names::TOTAL_TRANSACTIONS, g, s.total_transactions() as f64);
            push(names::TOTAL_REJECTED_TRANSACTIONS, g, s.total_rejected_transactions() as f64);
            push(names::AVERAGE_TRANSACTION_TIME, g, s.average_transaction_time());
            push(names::MAX_TRANSACTION_TIME, g, s.max_transaction_time());
            push(names::MIN_TRANSACTION_TIME, g, s.min_transaction_time());
            push(names::WALLET_TURNOVER, g, s.wallet_turnover());
            push(names::BALANCE_CHANGE_IN_LAST_MONTH, g, s.balance_change_in_last_month());
            push(names::BALANCE_CHANGE_IN_LAST_YEAR, g, s.balance_change_in_last_year());
            push(names::TIME_FROM_LAST_TRANSACTION, g, s.time_from_last_transaction() as f64);
            push(names::LAST_MONTH_TRANSACTIONS, g, s.last_month_transactions() as f64);
            push(names::LAST_YEAR_TRANSACTIONS, g, s.last_year_transactions() as f64);
            push(names::TRANSACTIONS_PER_MONTH, g, s.transactions_per_month());
        }
        if let Some(s) = self.token_holding_stats() {
            push(names::TOKENS_HOLDING, StatGroup::TokenHolding, s.tokens_holding() as f64);
        }
        if let Some(s) = self.contract_stats() {
            push(names::DEPLOYED_CONTRACTS, StatGroup::Contract, s.deployed_contracts() as f64);
        }

        values
    }

    fn descriptors(&self) -> &'static DescriptorMap {
        descriptors_for(self.variant())
    }
}

/// Canonical statistics record carrying every capability group
///
/// `holdTokensValueUsd` and `transactionsPerMonth` are not stored: they are
/// derived from `tokenBalances` and from `totalTransactions / walletAge` when
/// read or serialized, and ignored on deserialization.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletStatistics {
    pub no_data: bool,
    pub native_balance: f64,
    pub native_balance_usd: f64,
    pub wallet_age: u32,
    pub total_transactions: u32,
    pub total_rejected_transactions: u32,
    pub average_transaction_time: f64,
    pub max_transaction_time: f64,
    pub min_transaction_time: f64,
    pub wallet_turnover: f64,
    pub turnover_intervals: Vec<IntervalBucket>,
    pub balance_change_in_last_month: f64,
    pub balance_change_in_last_year: f64,
    pub time_from_last_transaction: u32,
    pub last_month_transactions: u32,
    pub last_year_transactions: u32,
    pub tokens_holding: u32,
    pub token_balances: Vec<TokenBalanceValuation>,
    pub deployed_contracts: u32,
}

impl NativeBalanceStats for WalletStatistics {
    fn native_balance(&self) -> f64 {
        self.native_balance
    }
    fn native_balance_usd(&self) -> f64 {
        self.native_balance_usd
    }
}

impl TokenBalanceStats for WalletStatistics {
    fn token_balances(&self) -> &[TokenBalanceValuation] {
        &self.token_balances
    }
}

impl TransactionStats for WalletStatistics {
    fn wallet_age(&self) -> u32 {
        self.wallet_age
    }
    fn total_transactions(&self) -> u32 {
        self.total_transactions
    }
    fn total_rejected_transactions(&self) -> u32 {
        self.total_rejected_transactions
    }
    fn average_transaction_time(&self) -> f64 {
        self.average_transaction_time
    }
    fn max_transaction_time(&self) -> f64 {
        self.max_transaction_time
    }
    fn min_transaction_time(&self) -> f64 {
        self.min_transaction_time
    }
    fn wallet_turnover(&self) -> f64 {
        self.wallet_turnover
    }
    fn turnover_intervals(&self) -> &[IntervalBucket] {
        &self.turnover_intervals
    }
    fn balance_change_in_last_month(&self) -> f64 {
        self.balance_change_in_last_month
    }
    fn balance_change_in_last_year(&self) -> f64 {
        self.balance_change_in_last_year
    }
    fn time_from_last_transaction(&self) -> u32 {
        self.time_from_last_transaction
    }
    fn last_month_transactions(&self) -> u32 {
        self.last_month_transactions
    }
    fn last_year_transactions(&self) -> u32 {
        self.last_year_transactions
    }
}

impl TokenHoldingStats for WalletStatistics {
    fn tokens_holding(&self) -> u32 {
        self.tokens_holding
    }
}

impl ContractStats for WalletStatistics {
    fn deployed_contracts(&self) -> u32 {
        self.deployed_contracts
    }
}

impl WalletStats for WalletStatistics {
    fn variant(&self) -> StatsVariant {
        StatsVariant::Full
    }
    fn no_data(&self) -> bool {
        self.no_data
    }
    fn native_balance_stats(&self) -> Option<&dyn NativeBalanceStats> {
        Some(self)
    }
    fn token_balance_stats(&self) -> Option<&dyn TokenBalanceStats> {
        Some(self)
    }
    fn transaction_stats(&self) -> Option<&dyn TransactionStats> {
        Some(self)
    }
    fn token_holding_stats(&self) -> Option<&dyn TokenHoldingStats> {
        Some(self)
    }
    fn contract_stats(&self) -> Option<&dyn ContractStats> {
        Some(self)
    }
}

/// Statistics for chains that expose no token data
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicWalletStatistics {
    pub no_data: bool,
    pub native_balance: f64,
    pub native_balance_usd: f64,
    pub wallet_age: u32,
    pub total_transactions: u32,
    pub total_rejected_transactions: u32,
    pub average_transaction_time: f64,
    pub max_transaction_time: f64,
    pub min_transaction_time: f64,
    pub wallet_turnover: f64,
    pub turnover_intervals: Vec<IntervalBucket>,
    pub balance_change_in_last_month: f64,
    pub balance_change_in_last_year: f64,
    pub time_from_last_transaction: u32,
    pub last_month_transactions: u32,
    pub last_year_transactions: u32,
    pub deployed_contracts: u32,
}

impl From<WalletStatistics> for BasicWalletStatistics {
    fn from(full: WalletStatistics) -> Self {
        Self {
            no_data: full.no_data,
            native_balance: full.native_balance,
            native_balance_usd: full.native_balance_usd,
            wallet_age: full.wallet_age,
            total_transactions: full.total_transactions,
            total_rejected_transactions: full.total_rejected_transactions,
            average_transaction_time: full.average_transaction_time,
            max_transaction_time: full.max_transaction_time,
            min_transaction_time: full.min_transaction_time,
            wallet_turnover: full.wallet_turnover,
            turnover_intervals: full.turnover_intervals,
            balance_change_in_last_month: full.balance_change_in_last_month,
            balance_change_in_last_year: full.balance_change_in_last_year,
            time_from_last_transaction: full.time_from_last_transaction,
            last_month_transactions: full.last_month_transactions,
            last_year_transactions: full.last_year_transactions,
            deployed_contracts: full.deployed_contracts,
        }
    }
}

impl NativeBalanceStats for BasicWalletStatistics {
    fn native_balance(&self) -> f64 {
        self.native_balance
    }
    fn native_balance_usd(&self) -> f64 {
        self.native_balance_usd
    }
}

impl TransactionStats for BasicWalletStatistics {
    fn wallet_age(&self) -> u32 {
        self.wallet_age
    }
    fn total_transactions(&self) -> u32 {
        self.total_transactions
    }
    fn total_rejected_transactions(&self) -> u32 {
        self.total_rejected_transactions
    }
    fn average_transaction_time(&self) -> f64 {
        self.average_transaction_time
    }
    fn max_transaction_time(&self) -> f64 {
        self.max_transaction_time
    }
    fn min_transaction_time(&self) -> f64 {
        self.min_transaction_time
    }
    fn wallet_turnover(&self) -> f64 {
        self.wallet_turnover
    }
    fn turnover_intervals(&self) -> &[IntervalBucket] {
        &self.turnover_intervals
    }
    fn balance_change_in_last_month(&self) -> f64 {
        self.balance_change_in_last_month
    }
    fn balance_change_in_last_year(&self) -> f64 {
        self.balance_change_in_last_year
    }
    fn time_from_last_transaction(&self) -> u32 {
        self.time_from_last_transaction
    }
    fn last_month_transactions(&self) -> u32 {
        self.last_month_transactions
    }
    fn last_year_transactions(&self) -> u32 {
        self.last_year_transactions
    }
}

impl ContractStats for BasicWalletStatistics {
    fn deployed_contracts(&self) -> u32 {
        self.deployed_contracts
    }
}

impl WalletStats for BasicWalletStatistics {
    fn variant(&self) -> StatsVariant {
        StatsVariant::Basic
    }
    fn no_data(&self) -> bool {
        self.no_data
    }
    fn native_balance_stats(&self) -> Option<&dyn NativeBalanceStats> {
        Some(self)
    }
    fn transaction_stats(&self) -> Option<&dyn TransactionStats> {
        Some(self)
    }
    fn contract_stats(&self) -> Option<&dyn ContractStats> {
        Some(self)
    }
}

/// Serialized form of a statistics variant, derived values included
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatsRecord<'a> {
    no_data: bool,
    native_balance: f64,
    native_balance_usd: f64,
    wallet_age: u32,
    total_transactions: u32,
    total_rejected_transactions: u32,
    average_transaction_time: f64,
    max_transaction_time: f64,
    min_transaction_time: f64,
    wallet_turnover: f64,
    turnover_intervals: &'a [IntervalBucket],
    balance_change_in_last_month: f64,
    balance_change_in_last_year: f64,
    time_from_last_transaction: u32,
    last_month_transactions: u32,
    last_year_transactions: u32,
    transactions_per_month: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    tokens_holding: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    token_balances: Option<&'a [TokenBalanceValuation]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    hold_tokens_value_usd: Option<f64>,
    deployed_contracts: u32,
}

impl<'a> StatsRecord<'a> {
    fn new<T>(stats: &'a T) -> Self
    where
        T: WalletStats + NativeBalanceStats + TransactionStats + ContractStats,
    {
        let tokens = stats.token_balance_stats();
        Self {
            no_data: stats.no_data(),
            native_balance: stats.native_balance(),
            native_balance_usd: stats.native_balance_usd(),
            wallet_age: stats.wallet_age(),
            total_transactions: stats.total_transactions(),
            total_rejected_transactions: stats.total_rejected_transactions(),
            average_transaction_time: stats.average_transaction_time(),
            max_transaction_time: stats.max_transaction_time(),
            min_transaction_time: stats.min_transaction_time(),
            wallet_turnover: stats.wallet_turnover(),
            turnover_intervals: stats.turnover_intervals(),
            balance_change_in_last_month: stats.balance_change_in_last_month(),
            balance_change_in_last_year: stats.balance_change_in_last_year(),
            time_from_last_transaction: stats.time_from_last_transaction(),
            last_month_transactions: stats.last_month_transactions(),
            last_year_transactions: stats.last_year_transactions(),
            transactions_per_month: stats.transactions_per_month(),
            tokens_holding: stats.token_holding_stats().map(|s| s.tokens_holding()),
            token_balances: tokens.map(|s| s.token_balances()),
            hold_tokens_value_usd: tokens.map(|s| s.hold_tokens_value_usd()),
            deployed_contracts: stats.deployed_contracts(),
        }
    }
}

impl Serialize for WalletStatistics {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        StatsRecord::new(self).serialize(serializer)
    }
}

impl Serialize for BasicWalletStatistics {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        StatsRecord::new(self).serialize(serializer)
    }
}
