//! Per-asset liability and equity resolution
//!
//! An asset is backed by at most one liability source. A linked loan/mortgage
//! account wins outright; the manual mortgage fields only apply when nothing is
//! linked. A link that no longer resolves (account deleted or hidden) yields
//! zero liability and the `Unlinked` flag rather than an error.

use serde::{Deserialize, Serialize};

use crate::models::{Account, Asset};

/// Where an asset's current liability balance came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LiabilitySource {
    /// Balance of the linked, visible loan/mortgage account
    Linked,
    /// Link set but the account is missing or hidden
    Unlinked,
    /// Manually entered mortgage balance
    Manual,
    /// No liability
    None,
}

impl LiabilitySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Linked => "linked",
            Self::Unlinked => "unlinked",
            Self::Manual => "manual",
            Self::None => "none",
        }
    }
}

impl std::fmt::Display for LiabilitySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Derived values for one asset; computed on every read, never stored
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetEquity {
    pub asset_id: i64,
    /// Outstanding liability for the whole asset (not ownership-weighted)
    pub current_balance: f64,
    /// `(value - current_balance) * ownership / 100`
    pub equity_value: f64,
    pub liability_source: LiabilitySource,
}

/// Resolve the current liability balance and the household's equity in an asset
///
/// Expects `ownership_percentage` already clamped to 0-100 (see
/// [`NewAsset::validate`](crate::models::NewAsset::validate)). Non-finite inputs
/// propagate into the result instead of panicking.
pub fn resolve_equity(asset: &Asset, accounts: &[Account]) -> AssetEquity {
    let (current_balance, liability_source) = match asset.linked_account_id {
        Some(linked_id) => accounts
            .iter()
            .find(|a| a.id == linked_id && !a.is_hidden)
            .map(|a| (a.balance.abs(), LiabilitySource::Linked))
            .unwrap_or((0.0, LiabilitySource::Unlinked)),
        None => match asset.manual_mortgage_balance {
            Some(balance) if balance > 0.0 => (balance, LiabilitySource::Manual),
            _ => (0.0, LiabilitySource::None),
        },
    };

    let equity_value = (asset.value - current_balance) * asset.ownership_weight();

    AssetEquity {
        asset_id: asset.id,
        current_balance,
        equity_value,
        liability_source,
    }
}

/// Resolve every asset against the same account set
pub fn resolve_all(assets: &[Asset], accounts: &[Account]) -> Vec<AssetEquity> {
    assets
        .iter()
        .map(|asset| resolve_equity(asset, accounts))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AccountType, AssetType};
    use chrono::Utc;

    fn mortgage(id: i64, balance: f64) -> Account {
        Account {
            id,
            name: "Home Loan".to_string(),
            account_type: AccountType::Mortgage,
            balance,
            institution_name: "Wells Fargo".to_string(),
            item_id: Some("item-1".to_string()),
            is_hidden: false,
            created_at: Utc::now(),
        }
    }

    fn house(value: f64, ownership: f64, linked: Option<i64>, manual: Option<f64>) -> Asset {
        Asset {
            id: 7,
            name: "House".to_string(),
            asset_type: AssetType::RealEstate,
            value,
            ownership_percentage: ownership,
            linked_account_id: linked,
            manual_mortgage_balance: manual,
            interest_rate: Some(6.5),
            monthly_payment: Some(2400.0),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_linked_mortgage_half_ownership() {
        let accounts = vec![mortgage(42, 200_000.0)];
        let asset = house(500_000.0, 50.0, Some(42), None);

        let eq = resolve_equity(&asset, &accounts);
        assert_eq!(eq.current_balance, 200_000.0);
        assert_eq!(eq.equity_value, 150_000.0);
        assert_eq!(eq.liability_source, LiabilitySource::Linked);
    }

    #[test]
    fn test_linked_balance_uses_magnitude() {
        let accounts = vec![mortgage(42, -200_000.0)];
        let asset = house(500_000.0, 100.0, Some(42), None);

        let eq = resolve_equity(&asset, &accounts);
        assert_eq!(eq.current_balance, 200_000.0);
        assert_eq!(eq.equity_value, 300_000.0);
    }

    #[test]
    fn test_link_ignores_manual_fields() {
        let accounts = vec![mortgage(42, 100_000.0)];
        let asset = house(400_000.0, 100.0, Some(42), Some(250_000.0));

        let eq = resolve_equity(&asset, &accounts);
        assert_eq!(eq.current_balance, 100_000.0);
    }

    #[test]
    fn test_missing_link_is_unlinked_without_manual_fallback() {
        let asset = house(400_000.0, 100.0, Some(99), Some(250_000.0));

        let eq = resolve_equity(&asset, &[]);
        assert_eq!(eq.current_balance, 0.0);
        assert_eq!(eq.equity_value, 400_000.0);
        assert_eq!(eq.liability_source, LiabilitySource::Unlinked);
    }

    #[test]
    fn test_hidden_link_is_unlinked() {
        let mut account = mortgage(42, 100_000.0);
        account.is_hidden = true;
        let asset = house(400_000.0, 100.0, Some(42), None);

        let eq = resolve_equity(&asset, &[account]);
        assert_eq!(eq.current_balance, 0.0);
        assert_eq!(eq.liability_source, LiabilitySource::Unlinked);
    }

    #[test]
    fn test_manual_mortgage_balance() {
        let asset = house(300_000.0, 100.0, None, Some(120_000.0));

        let eq = resolve_equity(&asset, &[]);
        assert_eq!(eq.current_balance, 120_000.0);
        assert_eq!(eq.equity_value, 180_000.0);
        assert_eq!(eq.liability_source, LiabilitySource::Manual);
    }

    #[test]
    fn test_zero_manual_balance_is_none() {
        let asset = house(300_000.0, 100.0, None, Some(0.0));

        let eq = resolve_equity(&asset, &[]);
        assert_eq!(eq.current_balance, 0.0);
        assert_eq!(eq.liability_source, LiabilitySource::None);
    }

    #[test]
    fn test_equity_monotonicity() {
        let mut previous = f64::INFINITY;
        for balance in [0.0, 10_000.0, 150_000.0, 600_000.0] {
            let eq = resolve_equity(&house(500_000.0, 60.0, None, Some(balance)), &[]);
            assert!(eq.equity_value <= previous);
            previous = eq.equity_value;
        }

        let mut previous = f64::NEG_INFINITY;
        for ownership in [0.0, 25.0, 50.0, 100.0] {
            let eq = resolve_equity(&house(500_000.0, ownership, None, Some(100_000.0)), &[]);
            assert!(eq.equity_value >= previous);
            previous = eq.equity_value;
        }
    }

    #[test]
    fn test_nan_propagates_without_panic() {
        let asset = house(f64::NAN, 100.0, None, None);
        let eq = resolve_equity(&asset, &[]);
        assert!(eq.equity_value.is_nan());
    }

    #[test]
    fn test_resolve_all() {
        let accounts = vec![mortgage(42, 200_000.0)];
        let assets = vec![
            house(500_000.0, 50.0, Some(42), None),
            house(20_000.0, 100.0, None, None),
        ];
        let equities = resolve_all(&assets, &accounts);
        assert_eq!(equities.len(), 2);
        assert_eq!(equities[1].equity_value, 20_000.0);
    }
}
