//! Presentation metadata for each statistic
//!
//! Declared once per field and grouped by capability. Each statistics variant
//! gets its own map, built on first use and shared for the process lifetime.

use super::stats::{names, StatGroup, StatsVariant};
use lazy_static::lazy_static;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatDescriptor {
    pub label: &'static str,
    pub description: &'static str,
    /// `token` means the chain's native coin; presentation substitutes its symbol
    pub unit: &'static str,
    pub group: StatGroup,
}

pub type DescriptorMap = BTreeMap<&'static str, StatDescriptor>;

/// Fields never listed for flat display
pub const EXCLUDED_STAT_DESCRIPTIONS: &[&str] = &[
    names::NO_DATA,
    names::TURNOVER_INTERVALS,
    names::TOKEN_BALANCES,
];

const fn describe(
    label: &'static str,
    description: &'static str,
    unit: &'static str,
    group: StatGroup,
) -> StatDescriptor {
    StatDescriptor {
        label,
        description,
        unit,
        group,
    }
}

const DECLARED: &[(&str, StatDescriptor)] = &[
    (
        names::NATIVE_BALANCE,
        describe(
            "Native balance",
            "Wallet native token balance",
            "token",
            StatGroup::NativeBalance,
        ),
    ),
    (
        names::NATIVE_BALANCE_USD,
        describe(
            "Native balance (USD)",
            "Wallet native token balance",
            "USD",
            StatGroup::NativeBalance,
        ),
    ),
    (
        names::HOLD_TOKENS_VALUE_USD,
        describe(
            "Hold tokens value",
            "Wallet hold tokens total balance",
            "USD",
            StatGroup::TokenBalance,
        ),
    ),
    (
        names::TOKEN_BALANCES,
        describe("Token balances", "Hold tokens balances", "collection", StatGroup::TokenBalance),
    ),
    (
        names::WALLET_AGE,
        describe("Wallet age", "Wallet age", "months", StatGroup::Transaction),
    ),
    (
        names::TOTAL_TRANSACTIONS,
        describe(
            "Total transactions",
            "Total transactions on wallet",
            "number",
            StatGroup::Transaction,
        ),
    ),
    (
        names::TOTAL_REJECTED_TRANSACTIONS,
        describe(
            "Rejected transactions",
            "Total rejected transactions on wallet",
            "number",
            StatGroup::Transaction,
        ),
    ),
    (
        names::AVERAGE_TRANSACTION_TIME,
        describe(
            "Average transaction time",
            "Average time interval between transactions",
            "hours",
            StatGroup::Transaction,
        ),
    ),
    (
        names::MAX_TRANSACTION_TIME,
        describe(
            "Max transaction time",
            "Maximum time interval between transactions",
            "hours",
            StatGroup::Transaction,
        ),
    ),
    (
        names::MIN_TRANSACTION_TIME,
        describe(
            "Min transaction time",
            "Minimal time interval between transactions",
            "hours",
            StatGroup::Transaction,
        ),
    ),
    (
        names::WALLET_TURNOVER,
        describe(
            "Wallet turnover",
            "The movement of funds on the wallet",
            "token",
            StatGroup::Transaction,
        ),
    ),
    (
        names::TURNOVER_INTERVALS,
        describe(
            "Turnover intervals",
            "Monthly transaction turnover",
            "collection",
            StatGroup::Transaction,
        ),
    ),
    (
        names::BALANCE_CHANGE_IN_LAST_MONTH,
        describe(
            "Balance change (month)",
            "The balance change value in the last month",
            "token",
            StatGroup::Transaction,
        ),
    ),
    (
        names::BALANCE_CHANGE_IN_LAST_YEAR,
        describe(
            "Balance change (year)",
            "The balance change value in the last year",
            "token",
            StatGroup::Transaction,
        ),
    ),
    (
        names::TIME_FROM_LAST_TRANSACTION,
        describe(
            "Time from last transaction",
            "Time since last transaction",
            "months",
            StatGroup::Transaction,
        ),
    ),
    (
        names::LAST_MONTH_TRANSACTIONS,
        describe(
            "Last month transactions",
            "Last month transactions",
            "number",
            StatGroup::Transaction,
        ),
    ),
    (
        names::LAST_YEAR_TRANSACTIONS,
        describe(
            "Last year transactions",
            "Last year transactions on wallet",
            "number",
            StatGroup::Transaction,
        ),
    ),
    (
        names::TRANSACTIONS_PER_MONTH,
        describe(
            "Transactions per month",
            "Average transaction per months",
            "number",
            StatGroup::Transaction,
        ),
    ),
    (
        names::TOKENS_HOLDING,
        describe("Tokens holding", "Number of held tokens", "number", StatGroup::TokenHolding),
    ),
    (
        names::DEPLOYED_CONTRACTS,
        describe(
            "Deployed contracts",
            "Amount of deployed smart-contracts",
            "number",
            StatGroup::Contract,
        ),
    ),
];

lazy_static! {
    static ref FULL_DESCRIPTORS: DescriptorMap = build_descriptors(StatsVariant::Full);
    static ref BASIC_DESCRIPTORS: DescriptorMap = build_descriptors(StatsVariant::Basic);
}

fn build_descriptors(variant: StatsVariant) -> DescriptorMap {
    let groups = variant.groups();
    DECLARED
        .iter()
        .filter(|(name, d)| {
            groups.contains(&d.group) && !EXCLUDED_STAT_DESCRIPTIONS.contains(name)
        })
        .map(|(name, d)| (*name, *d))
        .collect()
}

/// Name → descriptor for every displayable statistic of `variant`
pub fn descriptors_for(variant: StatsVariant) -> &'static DescriptorMap {
    match variant {
        StatsVariant::Full => &FULL_DESCRIPTORS,
        StatsVariant::Basic => &BASIC_DESCRIPTORS,
    }
}
