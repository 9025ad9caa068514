//! Sync command implementation

use std::path::Path;

use anyhow::{Context, Result};
use hearth_core::db::Database;
use hearth_core::sync::{apply_batch, load_batch};

pub fn cmd_sync(db: &Database, file: &Path) -> Result<()> {
    println!("🔄 Applying sync batch {}...", file.display());

    let batch = load_batch(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let stats = apply_batch(db, &batch).context("Failed to apply sync batch")?;

    println!("   Accounts synced: {}", stats.accounts);
    println!("   New transactions: {}", stats.inserted);
    println!("   Updated transactions: {}", stats.updated);
    if stats.skipped > 0 {
        println!(
            "   ⚠️  Skipped {} transaction(s) for unknown accounts",
            stats.skipped
        );
    }
    println!("✅ Sync complete");

    Ok(())
}
