//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Init and shared utilities (open_db, privacy_gate)
//! - `sync` - Sync batch ingestion
//! - `accounts` - Account listing and visibility
//! - `assets` - Manual asset management
//! - `networth` - Net worth and per-asset equity
//! - `insights` - Spending insights and drill-down (with CSV export)
//! - `transactions` - Transaction listing and edits
//! - `categorize` - External auto-categorization
//! - `serve` - Web server command

pub mod accounts;
pub mod assets;
pub mod categorize;
pub mod core;
pub mod insights;
pub mod networth;
pub mod serve;
pub mod sync;
pub mod transactions;

// Re-export command functions for main.rs
pub use accounts::*;
pub use assets::*;
pub use categorize::*;
pub use core::*;
pub use insights::*;
pub use networth::*;
pub use serve::*;
pub use sync::*;
pub use transactions::*;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
