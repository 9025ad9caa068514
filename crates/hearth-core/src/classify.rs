//! Account type classification
//!
//! Maps every account type onto the net-worth bucket it contributes to. Liability
//! accounts store the amount owed as a non-negative balance, so their polarity
//! comes from the bucket, not the stored number.

use serde::{Deserialize, Serialize};

use crate::models::AccountType;

/// Net-worth bucket an account contributes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bucket {
    Bank,
    Liability,
    Investment,
    Other,
}

impl Bucket {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bank => "bank",
            Self::Liability => "liability",
            Self::Investment => "investment",
            Self::Other => "other",
        }
    }

    /// Direction of the bucket's contribution to net worth
    pub fn sign(&self) -> f64 {
        match self {
            Self::Liability => -1.0,
            Self::Bank | Self::Investment | Self::Other => 1.0,
        }
    }
}

impl std::fmt::Display for Bucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Classify an account type into its bucket
pub fn classify(account_type: AccountType) -> Bucket {
    match account_type {
        AccountType::Checking | AccountType::Savings | AccountType::Depository => Bucket::Bank,
        AccountType::Credit
        | AccountType::CreditCard
        | AccountType::Loan
        | AccountType::Mortgage => Bucket::Liability,
        AccountType::Investment | AccountType::Brokerage => Bucket::Investment,
        AccountType::Other => Bucket::Other,
    }
}
