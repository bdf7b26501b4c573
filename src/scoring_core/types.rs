//! Raw chain inputs handed to the scoring core by data collaborators

use serde::{Deserialize, Serialize};

/// Account-level snapshot as reported by the chain explorer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSnapshot {
    pub address: String,
    /// Native balance in the chain's smallest unit
    pub balance: u64,
    /// Epoch seconds of the first on-chain activity, when the explorer knows it
    pub first_activity: Option<i64>,
    /// Contract-creation transactions reported at the account level
    #[serde(default)]
    pub created_contracts: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransactionKind {
    Transfer,
    ContractCall,
    ContractCreate,
    Other,
}

/// One wallet transaction, amounts signed relative to the wallet
/// (positive = received, negative = sent), in native coin units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    /// Epoch seconds
    pub timestamp: i64,
    pub amount: f64,
    #[serde(default)]
    pub rejected: bool,
    pub kind: TransactionKind,
}

impl Transaction {
    pub fn is_contract_create(&self) -> bool {
        matches!(self.kind, TransactionKind::ContractCreate)
    }

    /// Funds that actually moved; rejected transactions move nothing
    pub fn moved_amount(&self) -> f64 {
        if self.rejected {
            0.0
        } else {
            self.amount.abs()
        }
    }

    pub fn signed_amount(&self) -> f64 {
        if self.rejected {
            0.0
        } else {
            self.amount
        }
    }
}

/// Token balance held by the wallet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenHolding {
    pub token_id: String,
    pub quantity: f64,
}
