//! Raw transactions behind an insight

use chrono::NaiveDate;
use serde::Serialize;

use super::filter::{Filter, Selection};
use crate::models::{Account, Transaction};

/// Default number of rows shown in a drill-down table
pub const DEFAULT_DISPLAY_LIMIT: usize = 50;

/// Transactions passing `filter`, newest first (ties broken by id, highest first)
///
/// Returns the complete matching set. Truncation for display is left to
/// [`DrillDownPage`].
pub fn drill_down(
    transactions: &[Transaction],
    accounts: &[Account],
    filter: &Filter,
    today: NaiveDate,
) -> Vec<Transaction> {
    let selection = Selection::new(filter, accounts, today);

    let mut rows: Vec<Transaction> = transactions
        .iter()
        .filter(|tx| selection.matches(tx))
        .cloned()
        .collect();
    rows.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.id.cmp(&a.id)));
    rows
}

/// A display-capped slice of a drill-down result that still reports the true count
#[derive(Debug, Clone, Serialize)]
pub struct DrillDownPage {
    pub total: usize,
    pub transactions: Vec<Transaction>,
}

impl DrillDownPage {
    pub fn new(mut rows: Vec<Transaction>, limit: usize) -> Self {
        let total = rows.len();
        rows.truncate(limit);
        Self {
            total,
            transactions: rows,
        }
    }

    pub fn is_truncated(&self) -> bool {
        self.total > self.transactions.len()
    }
}
