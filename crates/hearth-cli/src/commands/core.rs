//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_db` - Shared utility to open the database
//! - `privacy_gate` - Build the privacy overlay from `--pin`
//! - `cmd_init` - Initialize the database

use std::path::Path;

use anyhow::{Context, Result};
use hearth_core::db::Database;
use hearth_core::{HearthConfig, PrivacyGate};
use tracing::debug;

/// Open database with encryption by default, or unencrypted if --no-encrypt
pub fn open_db(db_path: &Path, no_encrypt: bool) -> Result<Database> {
    let path_str = db_path
        .to_str()
        .context("Database path must be valid UTF-8")?;
    debug!(path = path_str, encrypted = !no_encrypt, "Opening database");
    if no_encrypt {
        Database::new_unencrypted(path_str).context("Failed to open database (unencrypted)")
    } else {
        Database::new(path_str).context("Failed to open database")
    }
}

/// Locked gate, unlocked when a PIN was given and matches
pub fn privacy_gate(config: &HearthConfig, pin: Option<&str>) -> Result<PrivacyGate> {
    let mut gate = config.privacy_gate();
    if let Some(pin) = pin {
        gate.unlock(pin).context("Privacy PIN rejected")?;
    }
    Ok(gate)
}

pub fn cmd_init(db_path: &Path, no_encrypt: bool) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    let db = open_db(db_path, no_encrypt)?;

    if no_encrypt {
        println!("   ⚠️  Encryption: DISABLED (--no-encrypt)");
    } else if db.is_encrypted()? {
        println!("   🔒 Encryption: ENABLED");
    }

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Sync accounts: hearth sync --file batch.json");
    println!("  2. Add your home: hearth assets add --name Home --value 500000");
    println!("  3. Start web UI: hearth serve");

    Ok(())
}
