//! Transaction command implementations

use anyhow::{bail, Result};
use hearth_core::db::Database;
use hearth_core::insights::category_label;
use hearth_core::models::TransactionUpdate;
use hearth_core::PrivacyGate;

use super::truncate;

pub fn cmd_transactions_list(
    db: &Database,
    gate: &PrivacyGate,
    limit: i64,
    account_id: Option<i64>,
) -> Result<()> {
    let transactions = db.list_transactions(account_id, limit, 0)?;

    if transactions.is_empty() {
        println!("No transactions found. Sync some with:");
        println!("  hearth sync --file batch.json");
        return Ok(());
    }

    println!();
    println!("📝 Recent Transactions");
    println!("   ─────────────────────────────────────────────────────────────");

    for tx in transactions {
        let flags = match (tx.is_fixed, tx.tax_deductible) {
            (Some(true), true) => " [fixed, deductible]",
            (Some(true), false) => " [fixed]",
            (_, true) => " [deductible]",
            _ => "",
        };
        println!(
            "   [{}] {} │ {:>12} │ {:<18} │ {}{}",
            tx.id,
            tx.date,
            gate.currency(tx.amount),
            truncate(category_label(&tx), 18),
            truncate(&tx.description, 36),
            flags
        );
    }

    Ok(())
}

pub fn cmd_transactions_update(
    db: &Database,
    id: i64,
    category: Option<String>,
    tags: Option<String>,
    fixed: Option<bool>,
    tax_deductible: Option<bool>,
) -> Result<()> {
    let update = TransactionUpdate {
        category,
        tags,
        is_fixed: fixed,
    };

    if update.is_empty() && tax_deductible.is_none() {
        bail!("Nothing to update (use --category, --tags, --fixed or --tax-deductible)");
    }

    if db.get_transaction(id)?.is_none() {
        bail!("Transaction {} not found", id);
    }

    if !update.is_empty() {
        db.update_transaction(id, &update)?;
    }
    if let Some(deductible) = tax_deductible {
        db.set_tax_deductible(id, deductible)?;
    }

    println!("✅ Updated transaction {}", id);
    Ok(())
}
