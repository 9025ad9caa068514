//! Net worth and equity command implementations

use anyhow::{anyhow, Result};
use hearth_core::db::Database;
use hearth_core::{breakdown, resolve_equity, NetWorthBreakdown, PrivacyGate};

/// Render the net worth breakdown as table lines
pub fn render_networth(result: &NetWorthBreakdown, gate: &PrivacyGate) -> Vec<String> {
    let row = |label: &str, value: f64| format!("   {:<26} {:>16}", label, gate.currency(value));

    vec![
        row("Bank accounts", result.bank),
        row("Investments", result.investment),
        row("Other accounts", result.other),
        row("Assets (owned share)", result.asset_value),
        row("  of which real estate equity", result.real_estate_equity),
        "   ─────────────────────────────────────────────".to_string(),
        row("Total assets", result.summary.total_assets),
        row("Account liabilities", result.account_liabilities),
        row("Asset liabilities", result.asset_liabilities),
        row("Total liabilities", result.summary.total_liabilities),
        "   ─────────────────────────────────────────────".to_string(),
        row("Net worth", result.summary.net_worth),
    ]
}

pub fn cmd_networth(db: &Database, gate: &PrivacyGate, json: bool) -> Result<()> {
    let snapshot = db.snapshot()?;
    let result = breakdown(&snapshot.accounts, &snapshot.assets);

    if json {
        // Raw numbers bypass the overlay
        if !gate.is_unlocked() {
            return Err(anyhow!("--json requires the privacy PIN (--pin)"));
        }
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!();
    println!("💰 Net Worth");
    println!("   ─────────────────────────────────────────────");
    for line in render_networth(&result, gate) {
        println!("{}", line);
    }

    Ok(())
}

pub fn cmd_equity(db: &Database, gate: &PrivacyGate, asset_id: i64) -> Result<()> {
    let asset = db
        .get_asset(asset_id)?
        .ok_or_else(|| anyhow!("Asset {} not found", asset_id))?;
    let accounts = db.list_accounts()?;
    let equity = resolve_equity(&asset, &accounts);

    println!();
    println!("🏠 {}", asset.name);
    println!("   Value:            {:>16}", gate.currency(asset.value));
    println!(
        "   Ownership:        {:>16}",
        gate.percent(asset.ownership_percentage)
    );
    println!(
        "   Mortgage balance: {:>16} ({})",
        gate.currency(equity.current_balance),
        equity.liability_source
    );
    println!("   Your equity:      {:>16}", gate.currency(equity.equity_value));

    Ok(())
}
