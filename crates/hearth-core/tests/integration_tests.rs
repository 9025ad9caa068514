//! Integration tests for hearth-core
//!
//! These tests exercise the full sync → net worth → insights → drill-down workflow.

use chrono::NaiveDate;
use hearth_core::{
    db::Database,
    export::transactions_csv,
    insights::{distribution, Period, SourceFilter, TimeRange},
    models::{AssetType, NewAsset},
    networth, HearthConfig, SyncBatch,
};

/// A household with a linked mortgage, a credit card, checking, and a
/// spreadsheet feed of manual transactions
fn household_batch() -> SyncBatch {
    serde_json::from_str(
        r#"{
            "accounts": [
                {"external_id": "chk", "name": "Joint Checking", "account_type": "checking",
                 "balance": 12000, "institution_name": "Chase", "item_id": "item-chase"},
                {"external_id": "card", "name": "Sapphire", "account_type": "credit card",
                 "balance": 3000, "institution_name": "Chase", "item_id": "item-chase"},
                {"external_id": "mtg", "name": "Home Loan", "account_type": "mortgage",
                 "balance": 200000, "institution_name": "Wells Fargo", "item_id": "item-wf"},
                {"external_id": "excel", "name": "Excel Import", "account_type": "other",
                 "balance": 0}
            ],
            "transactions": [
                {"external_id": "t1", "account_external_id": "card", "date": "2025-01-03",
                 "description": "NETFLIX.COM", "amount": 15.49, "category": "Subscriptions", "is_fixed": true},
                {"external_id": "t2", "account_external_id": "card", "date": "2025-01-12",
                 "description": "WHOLE FOODS", "amount": 182.40, "category": "Groceries", "is_fixed": false},
                {"external_id": "t3", "account_external_id": "chk", "date": "2025-01-15",
                 "description": "Payment to Chase card", "amount": 1500, "category": "Credit Card Payment"},
                {"external_id": "t4", "account_external_id": "chk", "date": "2025-02-01",
                 "description": "Mortgage", "amount": 2400, "category": "Housing", "is_fixed": true},
                {"external_id": "t5", "account_external_id": "chk", "date": "2025-02-03",
                 "description": "Grocery refund", "amount": -20, "category": "Groceries"},
                {"account_external_id": "excel", "date": "2025-02-10",
                 "description": "Landscaper", "amount": 300, "category": "Home"}
            ]
        }"#,
    )
    .expect("valid batch")
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
}

#[test]
fn test_net_worth_after_sync() {
    let db = Database::in_memory().expect("Failed to create in-memory database");
    hearth_core::apply_batch(&db, &household_batch()).unwrap();

    let mortgage_id = db.find_account_by_external_id("mtg").unwrap().unwrap();
    db.create_asset(NewAsset {
        name: "Primary Residence".to_string(),
        asset_type: AssetType::RealEstate,
        value: 500_000.0,
        ownership_percentage: 50.0,
        linked_account_id: Some(mortgage_id),
        manual_mortgage_balance: None,
        interest_rate: Some(6.25),
        monthly_payment: Some(2400.0),
    })
    .unwrap();

    let snapshot = db.snapshot().unwrap();
    let result = networth::breakdown(&snapshot.accounts, &snapshot.assets);

    // Mortgage only appears through the asset, at half ownership
    assert_eq!(result.bank, 12_000.0);
    assert_eq!(result.account_liabilities, 3_000.0);
    assert_eq!(result.asset_value, 250_000.0);
    assert_eq!(result.asset_liabilities, 100_000.0);
    assert_eq!(result.assets[0].equity_value, 150_000.0);
    assert_eq!(result.summary.net_worth, 262_000.0 - 103_000.0);

    // Hiding the mortgage turns the asset link into "unlinked"
    db.set_account_hidden(mortgage_id, true).unwrap();
    let snapshot = db.snapshot().unwrap();
    let result = networth::breakdown(&snapshot.accounts, &snapshot.assets);
    assert_eq!(result.asset_liabilities, 0.0);
    assert_eq!(
        result.assets[0].liability_source,
        hearth_core::LiabilitySource::Unlinked
    );
}

#[test]
fn test_insights_and_drill_down_agree() {
    let db = Database::in_memory().unwrap();
    hearth_core::apply_batch(&db, &household_batch()).unwrap();
    let snapshot = db.snapshot().unwrap();
    let config = HearthConfig::parse(
        r#"
        [insights]
        excluded_categories = ["Credit Card Payment"]
        excluded_description_patterns = ["payment to chase"]
        "#,
    )
    .unwrap();

    let filter = config
        .insight_filter(
            Some(TimeRange::TrailingDays(90)),
            None,
            None,
            SourceFilter::All,
            None,
        )
        .unwrap();

    let insights =
        hearth_core::aggregate(&snapshot.transactions, &snapshot.accounts, &filter, today());
    let rows = hearth_core::drill_down(&snapshot.transactions, &snapshot.accounts, &filter, today());

    // The card payment is excluded from both
    assert_eq!(rows.len(), 5);
    assert_eq!(insights.distribution, distribution(&rows));

    let periods: Vec<&str> = insights.trend.iter().map(|p| p.period.as_str()).collect();
    // The 90-day window runs from December through today
    assert_eq!(periods, vec!["Dec 2024", "Jan 2025", "Feb 2025", "Mar 2025"]);
    assert_eq!(insights.trend[0].fixed + insights.trend[0].variable, 0.0);
    assert_eq!(insights.trend[1].fixed, 15.49);
    assert_eq!(insights.trend[2].fixed, 2400.0);
    assert_eq!(insights.trend[2].variable, 280.0);
    assert_eq!(insights.trend[3].fixed + insights.trend[3].variable, 0.0);
}

#[test]
fn test_source_filter_splits_manual_feed() {
    let db = Database::in_memory().unwrap();
    hearth_core::apply_batch(&db, &household_batch()).unwrap();
    let snapshot = db.snapshot().unwrap();
    let config = HearthConfig::default();

    let manual = config
        .insight_filter(Some(TimeRange::All), None, None, SourceFilter::Manual, None)
        .unwrap();
    let rows = hearth_core::drill_down(&snapshot.transactions, &snapshot.accounts, &manual, today());
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].description, "Landscaper");

    let february = config
        .insight_filter(None, Some(2), Some(2025), SourceFilter::Linked, None)
        .unwrap();
    assert_eq!(february.period, Period::Month { year: 2025, month: 2 });
    let rows =
        hearth_core::drill_down(&snapshot.transactions, &snapshot.accounts, &february, today());
    assert_eq!(rows.len(), 2);

    let csv = transactions_csv(&rows, &snapshot.accounts).unwrap();
    assert_eq!(csv.lines().count(), 3);
}
