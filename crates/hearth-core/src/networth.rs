//! Net worth aggregation
//!
//! Folds visible accounts and manual assets into household totals. An account
//! linked to an asset as its liability is counted only through that asset, so a
//! mortgage balance never appears twice.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::classify::{classify, Bucket};
use crate::equity::{resolve_all, AssetEquity};
use crate::models::{Account, Asset, AssetType};

/// Household totals
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NetWorthSummary {
    pub total_assets: f64,
    pub total_liabilities: f64,
    pub net_worth: f64,
}

/// Totals per bucket plus the per-asset equity they were built from
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetWorthBreakdown {
    /// Checking, savings and depository balances
    pub bank: f64,
    pub investment: f64,
    /// Accounts of unrecognized type, summed as reported
    pub other: f64,
    /// Credit cards and loans not backing any asset
    pub account_liabilities: f64,
    /// Ownership-weighted market value of manual assets
    pub asset_value: f64,
    /// Ownership-weighted liabilities backing manual assets
    pub asset_liabilities: f64,
    /// Ownership-weighted equity in real estate
    pub real_estate_equity: f64,
    pub assets: Vec<AssetEquity>,
    pub summary: NetWorthSummary,
}

/// Compute household totals from accounts and assets
pub fn summarize(accounts: &[Account], assets: &[Asset]) -> NetWorthSummary {
    breakdown(accounts, assets).summary
}

/// Compute totals per bucket along with each asset's equity
pub fn breakdown(accounts: &[Account], assets: &[Asset]) -> NetWorthBreakdown {
    let visible: Vec<Account> = accounts.iter().filter(|a| !a.is_hidden).cloned().collect();

    let linked_account_ids: HashSet<i64> =
        assets.iter().filter_map(|a| a.linked_account_id).collect();

    let mut result = NetWorthBreakdown::default();

    for account in visible
        .iter()
        .filter(|a| !linked_account_ids.contains(&a.id))
    {
        match classify(account.account_type) {
            Bucket::Bank => result.bank += account.balance,
            Bucket::Investment => result.investment += account.balance,
            Bucket::Other => result.other += account.balance,
            Bucket::Liability => result.account_liabilities += account.balance.abs(),
        }
    }

    result.assets = resolve_all(assets, &visible);

    for (asset, equity) in assets.iter().zip(&result.assets) {
        let weight = asset.ownership_weight();
        result.asset_value += asset.value * weight;
        result.asset_liabilities += equity.current_balance * weight;
        if asset.asset_type == AssetType::RealEstate {
            result.real_estate_equity += equity.equity_value;
        }
    }

    let total_assets = result.bank + result.investment + result.other + result.asset_value;
    let total_liabilities = result.account_liabilities + result.asset_liabilities;

    result.summary = NetWorthSummary {
        total_assets,
        total_liabilities,
        net_worth: total_assets - total_liabilities,
    };

    debug!(
        accounts = visible.len(),
        assets = assets.len(),
        excluded_linked = linked_account_ids.len(),
        net_worth = result.summary.net_worth,
        "Net worth computed"
    );

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AccountType;
    use chrono::Utc;

    fn account(id: i64, account_type: AccountType, balance: f64) -> Account {
        Account {
            id,
            name: format!("Account {}", id),
            account_type,
            balance,
            institution_name: "Bank".to_string(),
            item_id: Some("item".to_string()),
            is_hidden: false,
            created_at: Utc::now(),
        }
    }

    fn asset(id: i64, value: f64, ownership: f64, linked: Option<i64>) -> Asset {
        Asset {
            id,
            name: format!("Asset {}", id),
            asset_type: AssetType::RealEstate,
            value,
            ownership_percentage: ownership,
            linked_account_id: linked,
            manual_mortgage_balance: None,
            interest_rate: None,
            monthly_payment: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_empty_inputs() {
        let summary = summarize(&[], &[]);
        assert_eq!(summary, NetWorthSummary::default());
    }

    #[test]
    fn test_linked_mortgage_counted_once() {
        let accounts = vec![
            account(1, AccountType::Checking, 10_000.0),
            account(42, AccountType::Mortgage, 200_000.0),
        ];
        let assets = vec![asset(1, 500_000.0, 50.0, Some(42))];

        let summary = summarize(&accounts, &assets);
        assert_eq!(summary.total_assets, 10_000.0 + 250_000.0);
        assert_eq!(summary.total_liabilities, 100_000.0);
        assert_eq!(summary.net_worth, 160_000.0);
    }

    #[test]
    fn test_unlinked_credit_card_is_full_liability() {
        let accounts = vec![
            account(1, AccountType::Checking, 5_000.0),
            account(2, AccountType::CreditCard, 3_000.0),
        ];

        let summary = summarize(&accounts, &[]);
        assert_eq!(summary.total_liabilities, 3_000.0);
        assert_eq!(summary.net_worth, 2_000.0);
    }

    #[test]
    fn test_hidden_accounts_dropped() {
        let mut hidden = account(3, AccountType::Savings, 50_000.0);
        hidden.is_hidden = true;
        let accounts = vec![account(1, AccountType::Checking, 1_000.0), hidden];

        let summary = summarize(&accounts, &[]);
        assert_eq!(summary.total_assets, 1_000.0);
    }

    #[test]
    fn test_hidden_linked_mortgage_not_counted_anywhere() {
        let mut loan = account(42, AccountType::Mortgage, 200_000.0);
        loan.is_hidden = true;
        let assets = vec![asset(1, 500_000.0, 100.0, Some(42))];

        let result = breakdown(&[loan], &assets);
        assert_eq!(result.summary.total_liabilities, 0.0);
        assert_eq!(result.summary.net_worth, 500_000.0);
    }

    #[test]
    fn test_other_bucket_counted_as_asset() {
        let accounts = vec![account(1, AccountType::parse("hsa"), 4_000.0)];
        let result = breakdown(&accounts, &[]);
        assert_eq!(result.other, 4_000.0);
        assert_eq!(result.summary.total_assets, 4_000.0);
    }

    #[test]
    fn test_breakdown_buckets() {
        let accounts = vec![
            account(1, AccountType::Checking, 1_000.0),
            account(2, AccountType::Brokerage, 20_000.0),
            account(3, AccountType::Loan, 5_000.0),
            account(42, AccountType::Mortgage, 100_000.0),
        ];
        let assets = vec![asset(1, 300_000.0, 100.0, Some(42))];

        let result = breakdown(&accounts, &assets);
        assert_eq!(result.bank, 1_000.0);
        assert_eq!(result.investment, 20_000.0);
        assert_eq!(result.account_liabilities, 5_000.0);
        assert_eq!(result.asset_value, 300_000.0);
        assert_eq!(result.asset_liabilities, 100_000.0);
        assert_eq!(result.real_estate_equity, 200_000.0);
        assert_eq!(result.assets.len(), 1);
    }

    #[test]
    fn test_identity_holds_for_awkward_values() {
        let accounts = vec![
            account(1, AccountType::Checking, 0.1),
            account(2, AccountType::Savings, 0.2),
            account(3, AccountType::CreditCard, 0.3),
            account(4, AccountType::Investment, 1e-9),
        ];
        let assets = vec![asset(1, 333_333.33, 33.3, None)];

        let summary = summarize(&accounts, &assets);
        assert_eq!(
            summary.total_assets - summary.total_liabilities,
            summary.net_worth
        );
    }
}
