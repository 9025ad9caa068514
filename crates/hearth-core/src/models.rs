//! Domain models for Hearth

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// An account synced from a linked financial institution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub name: String,
    pub account_type: AccountType,
    /// Native balance; liabilities report the amount owed as a non-negative number
    pub balance: f64,
    pub institution_name: String,
    /// Connection this account was synced through. `None` for spreadsheet/manual feeds.
    pub item_id: Option<String>,
    /// Hidden accounts are excluded from every total and from insights
    pub is_hidden: bool,
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Where transactions owned by this account come from
    pub fn source(&self) -> TransactionSource {
        if self.item_id.is_some() {
            TransactionSource::Linked
        } else {
            TransactionSource::Manual
        }
    }
}

/// Account types as reported by the sync process
///
/// Unknown type strings never fail to parse; they fall back to `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AccountType {
    Checking,
    Savings,
    Depository,
    Credit,
    CreditCard,
    Loan,
    Mortgage,
    Investment,
    Brokerage,
    Other,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Checking => "checking",
            Self::Savings => "savings",
            Self::Depository => "depository",
            Self::Credit => "credit",
            Self::CreditCard => "credit_card",
            Self::Loan => "loan",
            Self::Mortgage => "mortgage",
            Self::Investment => "investment",
            Self::Brokerage => "brokerage",
            Self::Other => "other",
        }
    }

    /// Parse a type tag, accepting aggregator spellings like "credit card"
    pub fn parse(s: &str) -> Self {
        let normalized = s.trim().to_lowercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "checking" => Self::Checking,
            "savings" => Self::Savings,
            "depository" => Self::Depository,
            "credit" => Self::Credit,
            "credit_card" => Self::CreditCard,
            "loan" => Self::Loan,
            "mortgage" => Self::Mortgage,
            "investment" => Self::Investment,
            "brokerage" => Self::Brokerage,
            _ => Self::Other,
        }
    }

    /// Account types an asset may link to as its liability
    pub fn is_linkable_liability(&self) -> bool {
        matches!(self, Self::Loan | Self::Mortgage)
    }
}

impl From<String> for AccountType {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<AccountType> for String {
    fn from(t: AccountType) -> Self {
        t.as_str().to_string()
    }
}

impl std::fmt::Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where a transaction came from, derived from its owning account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionSource {
    /// Synced through an institution connection
    Linked,
    /// Entered or imported by the household
    Manual,
}

impl TransactionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Linked => "linked",
            Self::Manual => "manual",
        }
    }
}

impl std::fmt::Display for TransactionSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Manually tracked asset types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetType {
    RealEstate,
    Investment,
    Vehicle,
    Other,
}

impl AssetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RealEstate => "real_estate",
            Self::Investment => "investment",
            Self::Vehicle => "vehicle",
            Self::Other => "other",
        }
    }
}

impl std::str::FromStr for AssetType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "real_estate" | "realestate" | "property" => Ok(Self::RealEstate),
            "investment" => Ok(Self::Investment),
            "vehicle" => Ok(Self::Vehicle),
            "other" => Ok(Self::Other),
            _ => Err(format!(
                "Unknown asset type: {} (valid: real_estate, investment, vehicle, other)",
                s
            )),
        }
    }
}

impl std::fmt::Display for AssetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A manually tracked asset (property, private investment, vehicle)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asset {
    pub id: i64,
    pub name: String,
    pub asset_type: AssetType,
    /// Market value of the whole asset
    pub value: f64,
    /// Household's fractional claim, 0-100
    pub ownership_percentage: f64,
    /// Loan or mortgage account backing this asset
    pub linked_account_id: Option<i64>,
    /// Last recorded mortgage balance, used only without a linked account
    pub manual_mortgage_balance: Option<f64>,
    /// Informational only
    pub interest_rate: Option<f64>,
    /// Informational only
    pub monthly_payment: Option<f64>,
    pub created_at: DateTime<Utc>,
}

impl Asset {
    /// Ownership as a 0.0-1.0 weight
    pub fn ownership_weight(&self) -> f64 {
        self.ownership_percentage / 100.0
    }
}

fn default_ownership() -> f64 {
    100.0
}

/// A new or replacement asset as entered by the user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAsset {
    pub name: String,
    pub asset_type: AssetType,
    pub value: f64,
    #[serde(default = "default_ownership")]
    pub ownership_percentage: f64,
    #[serde(default)]
    pub linked_account_id: Option<i64>,
    #[serde(default)]
    pub manual_mortgage_balance: Option<f64>,
    #[serde(default)]
    pub interest_rate: Option<f64>,
    #[serde(default)]
    pub monthly_payment: Option<f64>,
}

impl NewAsset {
    /// Reject malformed numbers and clamp ownership into 0-100
    ///
    /// This runs before anything reaches the aggregation engine, which assumes
    /// finite inputs.
    pub fn validate(mut self) -> Result<Self> {
        if self.name.trim().is_empty() {
            return Err(Error::InvalidData("Asset name is required".into()));
        }
        if !self.value.is_finite() || self.value < 0.0 {
            return Err(Error::InvalidData(format!(
                "Asset value must be a non-negative number, got {}",
                self.value
            )));
        }
        if !self.ownership_percentage.is_finite() {
            return Err(Error::InvalidData(
                "Ownership percentage must be a number".into(),
            ));
        }
        self.ownership_percentage = self.ownership_percentage.clamp(0.0, 100.0);

        for (field, value) in [
            ("manual_mortgage_balance", self.manual_mortgage_balance),
            ("interest_rate", self.interest_rate),
            ("monthly_payment", self.monthly_payment),
        ] {
            if let Some(v) = value {
                if !v.is_finite() || v < 0.0 {
                    return Err(Error::InvalidData(format!(
                        "{} must be a non-negative number, got {}",
                        field, v
                    )));
                }
            }
        }

        self.name = self.name.trim().to_string();
        Ok(self)
    }
}

/// A financial transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub account_id: i64,
    pub date: NaiveDate,
    pub description: String,
    /// Positive = expense, negative = refund or income
    pub amount: f64,
    pub category: Option<String>,
    pub tax_deductible: bool,
    /// Free-form tags (e.g. "Work")
    pub tags: Option<String>,
    /// Fixed/recurring bill vs variable spend. `None` = not yet classified.
    pub is_fixed: Option<bool>,
    pub created_at: DateTime<Utc>,
}

/// A transaction arriving from sync, keyed by its dedup id
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub external_id: String,
    pub date: NaiveDate,
    pub description: String,
    pub amount: f64,
    pub category: Option<String>,
    pub tags: Option<String>,
    pub is_fixed: Option<bool>,
}

/// Fields the user or the categorization agent may change on a transaction
///
/// `None` leaves a field untouched. An empty (or blank) category or tags
/// string clears the stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransactionUpdate {
    pub category: Option<String>,
    pub tags: Option<String>,
    pub is_fixed: Option<bool>,
}

impl TransactionUpdate {
    pub fn is_empty(&self) -> bool {
        self.category.is_none() && self.tags.is_none() && self.is_fixed.is_none()
    }
}

/// All three collections read together, so aggregates never see a partial set
#[derive(Debug, Clone, Default, Serialize)]
pub struct Snapshot {
    pub accounts: Vec<Account>,
    pub assets: Vec<Asset>,
    pub transactions: Vec<Transaction>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_asset() -> NewAsset {
        NewAsset {
            name: "Lake House".to_string(),
            asset_type: AssetType::RealEstate,
            value: 500_000.0,
            ownership_percentage: 50.0,
            linked_account_id: None,
            manual_mortgage_balance: None,
            interest_rate: None,
            monthly_payment: None,
        }
    }

    #[test]
    fn test_account_type_parse_known() {
        assert_eq!(AccountType::parse("checking"), AccountType::Checking);
        assert_eq!(AccountType::parse("Credit Card"), AccountType::CreditCard);
        assert_eq!(AccountType::parse("credit-card"), AccountType::CreditCard);
        assert_eq!(AccountType::parse(" MORTGAGE "), AccountType::Mortgage);
    }

    #[test]
    fn test_account_type_parse_unknown_falls_back() {
        assert_eq!(AccountType::parse("crypto_wallet"), AccountType::Other);
        assert_eq!(AccountType::parse(""), AccountType::Other);
    }

    #[test]
    fn test_account_type_serde_lenient() {
        let t: AccountType = serde_json::from_str("\"hsa\"").unwrap();
        assert_eq!(t, AccountType::Other);
        let t: AccountType = serde_json::from_str("\"credit_card\"").unwrap();
        assert_eq!(t, AccountType::CreditCard);
        assert_eq!(
            serde_json::to_string(&AccountType::CreditCard).unwrap(),
            "\"credit_card\""
        );
    }

    #[test]
    fn test_asset_type_from_str() {
        assert_eq!(
            "real_estate".parse::<AssetType>().unwrap(),
            AssetType::RealEstate
        );
        assert!("boat".parse::<AssetType>().is_err());
    }

    #[test]
    fn test_new_asset_validate_clamps_ownership() {
        let mut asset = new_asset();
        asset.ownership_percentage = 140.0;
        assert_eq!(asset.validate().unwrap().ownership_percentage, 100.0);

        let mut asset = new_asset();
        asset.ownership_percentage = -5.0;
        assert_eq!(asset.validate().unwrap().ownership_percentage, 0.0);
    }

    #[test]
    fn test_new_asset_validate_rejects_nan() {
        let mut asset = new_asset();
        asset.value = f64::NAN;
        assert!(asset.validate().is_err());

        let mut asset = new_asset();
        asset.ownership_percentage = f64::NAN;
        assert!(asset.validate().is_err());

        let mut asset = new_asset();
        asset.manual_mortgage_balance = Some(f64::INFINITY);
        assert!(asset.validate().is_err());
    }

    #[test]
    fn test_new_asset_validate_requires_name() {
        let mut asset = new_asset();
        asset.name = "   ".to_string();
        assert!(asset.validate().is_err());
    }

    #[test]
    fn test_new_asset_default_ownership() {
        let asset: NewAsset =
            serde_json::from_str(r#"{"name":"Car","asset_type":"vehicle","value":20000}"#)
                .unwrap();
        assert_eq!(asset.ownership_percentage, 100.0);
    }

    #[test]
    fn test_account_source() {
        let mut account = Account {
            id: 1,
            name: "Checking".to_string(),
            account_type: AccountType::Checking,
            balance: 10.0,
            institution_name: "Chase".to_string(),
            item_id: Some("item-1".to_string()),
            is_hidden: false,
            created_at: Utc::now(),
        };
        assert_eq!(account.source(), TransactionSource::Linked);
        account.item_id = None;
        assert_eq!(account.source(), TransactionSource::Manual);
    }
}
