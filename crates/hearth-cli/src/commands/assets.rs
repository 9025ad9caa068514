//! Asset command implementations

use anyhow::{anyhow, bail, Context, Result};
use hearth_core::db::Database;
use hearth_core::equity::resolve_all;
use hearth_core::models::{AssetType, NewAsset};
use hearth_core::PrivacyGate;

use super::truncate;

/// Asset fields as given on the command line; `None` keeps the current value on update
#[derive(Debug, Default)]
pub struct AssetFields {
    pub name: Option<String>,
    pub asset_type: Option<String>,
    pub value: Option<f64>,
    pub ownership: Option<f64>,
    pub linked_account: Option<i64>,
    pub unlink: bool,
    pub mortgage_balance: Option<f64>,
    pub interest_rate: Option<f64>,
    pub monthly_payment: Option<f64>,
}

fn parse_asset_type(s: &str) -> Result<AssetType> {
    s.parse::<AssetType>().map_err(|e| anyhow!(e))
}

pub fn cmd_assets_list(db: &Database, gate: &PrivacyGate) -> Result<()> {
    let assets = db.list_assets()?;

    if assets.is_empty() {
        println!("No assets yet. Add one with:");
        println!("  hearth assets add --name Home --value 500000");
        return Ok(());
    }

    let accounts = db.list_accounts()?;
    let equities = resolve_all(&assets, &accounts);

    println!();
    println!("🏠 Assets");
    println!("   ─────────────────────────────────────────────────────────────");

    for (asset, equity) in assets.iter().zip(&equities) {
        println!(
            "   [{}] {:<24} │ {:<11} │ value {:>14} │ own {:>7} │ equity {:>14} ({})",
            asset.id,
            truncate(&asset.name, 24),
            asset.asset_type,
            gate.currency(asset.value),
            gate.percent(asset.ownership_percentage),
            gate.currency(equity.equity_value),
            equity.liability_source,
        );
    }

    Ok(())
}

pub fn cmd_assets_add(db: &Database, fields: AssetFields) -> Result<()> {
    let new_asset = NewAsset {
        name: fields.name.context("Asset name is required")?,
        asset_type: parse_asset_type(fields.asset_type.as_deref().unwrap_or("real_estate"))?,
        value: fields.value.context("Asset value is required")?,
        ownership_percentage: fields.ownership.unwrap_or(100.0),
        linked_account_id: fields.linked_account,
        manual_mortgage_balance: fields.mortgage_balance,
        interest_rate: fields.interest_rate,
        monthly_payment: fields.monthly_payment,
    };

    let asset = db.create_asset(new_asset).context("Failed to create asset")?;

    println!("✅ Created asset [{}] {}", asset.id, asset.name);
    if asset.linked_account_id.is_some() {
        println!("   Mortgage balance follows the linked account");
    }

    Ok(())
}

pub fn cmd_assets_update(db: &Database, id: i64, fields: AssetFields) -> Result<()> {
    let current = db
        .get_asset(id)?
        .ok_or_else(|| anyhow!("Asset {} not found", id))?;

    let asset_type = match fields.asset_type.as_deref() {
        Some(s) => parse_asset_type(s)?,
        None => current.asset_type,
    };
    let linked_account_id = if fields.unlink {
        None
    } else {
        fields.linked_account.or(current.linked_account_id)
    };

    let updated = NewAsset {
        name: fields.name.unwrap_or(current.name),
        asset_type,
        value: fields.value.unwrap_or(current.value),
        ownership_percentage: fields.ownership.unwrap_or(current.ownership_percentage),
        linked_account_id,
        manual_mortgage_balance: fields.mortgage_balance.or(current.manual_mortgage_balance),
        interest_rate: fields.interest_rate.or(current.interest_rate),
        monthly_payment: fields.monthly_payment.or(current.monthly_payment),
    };

    let asset = db
        .update_asset(id, updated)
        .context("Failed to update asset")?;
    println!("✅ Updated asset [{}] {}", asset.id, asset.name);

    Ok(())
}

pub fn cmd_assets_remove(db: &Database, id: i64) -> Result<()> {
    if !db.delete_asset(id)? {
        bail!("Asset {} not found", id);
    }
    println!("🗑  Removed asset {}", id);
    Ok(())
}
