//! Hearth Core Library
//!
//! Shared functionality for the Hearth household finance tracker:
//! - Account classification and net worth aggregation
//! - Asset equity resolution against linked loan/mortgage accounts
//! - Monthly spending insights and transaction drill-down
//! - Privacy overlay for rendered values
//! - Database access and migrations
//! - Sync batch ingestion and external auto-categorization

pub mod categorize;
pub mod classify;
pub mod config;
pub mod db;
pub mod equity;
pub mod error;
pub mod export;
pub mod insights;
pub mod models;
pub mod networth;
pub mod privacy;
pub mod sync;

/// Test utilities including a mock categorization agent
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use categorize::{
    run_categorization, CategorizationAgent, CategorizationResult, HttpCategorizationAgent,
};
pub use classify::{classify, Bucket};
pub use config::HearthConfig;
pub use db::{AuditAction, AuditEntity, AuditEntry, Database};
pub use equity::{resolve_equity, AssetEquity, LiabilitySource};
pub use error::{Error, Result};
pub use insights::{
    aggregate, drill_down, DrillDownPage, Filter, Period, SourceFilter, SpendingInsights,
    TimeRange,
};
pub use networth::{breakdown, summarize, NetWorthBreakdown, NetWorthSummary};
pub use privacy::{MaskKind, PrivacyGate};
pub use sync::{apply_batch, SyncBatch, SyncStats};
