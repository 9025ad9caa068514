//! Account command implementations

use anyhow::{bail, Result};
use hearth_core::db::Database;
use hearth_core::{classify, PrivacyGate};

use super::truncate;

pub fn cmd_accounts_list(db: &Database, gate: &PrivacyGate) -> Result<()> {
    let accounts = db.list_accounts()?;

    if accounts.is_empty() {
        println!("No accounts found. Sync some with:");
        println!("  hearth sync --file batch.json");
        return Ok(());
    }

    println!();
    println!("📁 Accounts");
    println!("   ─────────────────────────────────────────────────────────────");

    for account in accounts {
        println!(
            "   [{}] {:<28} │ {:<10} │ {:>14} │ {}{}",
            account.id,
            truncate(&account.name, 28),
            classify(account.account_type),
            gate.currency(account.balance),
            account.source(),
            if account.is_hidden { " (hidden)" } else { "" }
        );
    }

    Ok(())
}

pub fn cmd_accounts_set_hidden(db: &Database, id: i64, hidden: bool) -> Result<()> {
    if !db.set_account_hidden(id, hidden)? {
        bail!("Account {} not found", id);
    }

    if hidden {
        println!("🙈 Account {} hidden from net worth and insights", id);
    } else {
        println!("👁  Account {} visible again", id);
    }

    Ok(())
}
