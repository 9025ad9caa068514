//! Drill-down CSV export

use std::collections::HashMap;
use std::io::Write;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::insights::category_label;
use crate::models::{Account, Transaction};

/// One exported row
#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    date: String,
    description: &'a str,
    amount: String,
    category: &'a str,
    account: &'a str,
    source: &'a str,
    fixed: &'a str,
    tax_deductible: bool,
    tags: &'a str,
}

/// Write drill-down rows as CSV (header included)
///
/// Amounts are written unmasked; callers decide whether export is allowed.
pub fn write_transactions_csv<W: Write>(
    writer: W,
    transactions: &[Transaction],
    accounts: &[Account],
) -> Result<()> {
    let accounts: HashMap<i64, &Account> = accounts.iter().map(|a| (a.id, a)).collect();
    let mut csv = csv::Writer::from_writer(writer);

    for tx in transactions {
        let account = accounts.get(&tx.account_id);
        csv.serialize(ExportRow {
            date: tx.date.to_string(),
            description: &tx.description,
            amount: format!("{:.2}", tx.amount),
            category: category_label(tx),
            account: account.map(|a| a.name.as_str()).unwrap_or(""),
            source: account
                .map(|a| a.source().as_str())
                .unwrap_or("manual"),
            fixed: match tx.is_fixed {
                Some(true) => "fixed",
                Some(false) => "variable",
                None => "",
            },
            tax_deductible: tx.tax_deductible,
            tags: tx.tags.as_deref().unwrap_or(""),
        })?;
    }

    csv.flush()?;
    Ok(())
}

/// Render drill-down rows to a CSV string
pub fn transactions_csv(transactions: &[Transaction], accounts: &[Account]) -> Result<String> {
    let mut buf = Vec::new();
    write_transactions_csv(&mut buf, transactions, accounts)?;
    String::from_utf8(buf).map_err(|e| Error::InvalidData(format!("CSV is not UTF-8: {}", e)))
}
