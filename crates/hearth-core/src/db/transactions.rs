//! Transaction operations

use chrono::NaiveDate;
use rusqlite::{params, types::Type, Connection, OptionalExtension, Row};

use super::{parse_datetime, Database};
use crate::error::Result;
use crate::models::{NewTransaction, Transaction, TransactionUpdate};

/// Result of upserting a synced transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionUpsert {
    /// New row, contains its ID
    Inserted(i64),
    /// Existing row refreshed, contains its ID
    Updated(i64),
}

impl TransactionUpsert {
    pub fn id(&self) -> i64 {
        match *self {
            Self::Inserted(id) | Self::Updated(id) => id,
        }
    }
}

const TRANSACTION_COLUMNS: &str = "id, account_id, date, description, amount, category, \
     tax_deductible, tags, is_fixed, created_at";

fn row_to_transaction(row: &Row) -> rusqlite::Result<Transaction> {
    let date_str: String = row.get(2)?;
    let date = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d")
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e)))?;
    let created_at_str: String = row.get(9)?;
    Ok(Transaction {
        id: row.get(0)?,
        account_id: row.get(1)?,
        date,
        description: row.get(3)?,
        amount: row.get(4)?,
        category: row.get(5)?,
        tax_deductible: row.get(6)?,
        tags: row.get(7)?,
        is_fixed: row.get(8)?,
        created_at: parse_datetime(&created_at_str),
    })
}

pub(super) fn query_all_transactions(conn: &Connection) -> Result<Vec<Transaction>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM transactions ORDER BY date DESC, id DESC",
        TRANSACTION_COLUMNS
    ))?;

    let transactions = stmt
        .query_map([], row_to_transaction)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(transactions)
}

impl Database {
    /// Insert a synced transaction, or refresh it if its external id is known
    ///
    /// On refresh the sync-owned fields (account, date, description, amount)
    /// are replaced. Category, tags and fixed/variable are only filled in where
    /// the stored row has none, so user and agent edits survive a re-sync.
    pub fn upsert_transaction(
        &self,
        account_id: i64,
        tx: &NewTransaction,
    ) -> Result<TransactionUpsert> {
        let conn = self.conn()?;

        let existing: Option<i64> = conn
            .query_row(
                "SELECT id FROM transactions WHERE external_id = ?",
                params![tx.external_id],
                |row| row.get(0),
            )
            .optional()?;

        if let Some(id) = existing {
            conn.execute(
                r#"
                UPDATE transactions SET
                    account_id = ?, date = ?, description = ?, amount = ?,
                    category = COALESCE(category, ?),
                    tags = COALESCE(tags, ?),
                    is_fixed = COALESCE(is_fixed, ?)
                WHERE id = ?
                "#,
                params![
                    account_id,
                    tx.date.to_string(),
                    tx.description,
                    tx.amount,
                    tx.category,
                    tx.tags,
                    tx.is_fixed,
                    id,
                ],
            )?;
            return Ok(TransactionUpsert::Updated(id));
        }

        conn.execute(
            r#"
            INSERT INTO transactions (account_id, external_id, date, description, amount, category, tags, is_fixed)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                account_id,
                tx.external_id,
                tx.date.to_string(),
                tx.description,
                tx.amount,
                tx.category,
                tx.tags,
                tx.is_fixed,
            ],
        )?;

        Ok(TransactionUpsert::Inserted(conn.last_insert_rowid()))
    }

    /// List transactions, newest first
    pub fn list_transactions(
        &self,
        account_id: Option<i64>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            r#"
            SELECT {} FROM transactions
            WHERE (?1 IS NULL OR account_id = ?1)
            ORDER BY date DESC, id DESC
            LIMIT ?2 OFFSET ?3
            "#,
            TRANSACTION_COLUMNS
        ))?;

        let transactions = stmt
            .query_map(params![account_id, limit, offset], row_to_transaction)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(transactions)
    }

    /// Transactions still waiting for a category
    pub fn list_uncategorized_transactions(&self) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            r#"
            SELECT {} FROM transactions
            WHERE category IS NULL OR TRIM(category) = ''
            ORDER BY date DESC, id DESC
            "#,
            TRANSACTION_COLUMNS
        ))?;

        let transactions = stmt
            .query_map([], row_to_transaction)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(transactions)
    }

    /// Count all transactions
    pub fn count_transactions(&self) -> Result<i64> {
        let conn = self.conn()?;
        let count = conn.query_row("SELECT COUNT(*) FROM transactions", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Get a transaction by ID
    pub fn get_transaction(&self, id: i64) -> Result<Option<Transaction>> {
        let conn = self.conn()?;
        let tx = conn
            .query_row(
                &format!("SELECT {} FROM transactions WHERE id = ?", TRANSACTION_COLUMNS),
                params![id],
                row_to_transaction,
            )
            .optional()?;
        Ok(tx)
    }

    /// Apply user or agent edits; fields left as `None` are unchanged
    ///
    /// Returns false if the transaction doesn't exist.
    pub fn update_transaction(&self, id: i64, update: &TransactionUpdate) -> Result<bool> {
        let conn = self.conn()?;
        let changed = conn.execute(
            r#"
            UPDATE transactions SET
                category = CASE WHEN ?1 IS NULL THEN category ELSE NULLIF(TRIM(?1), '') END,
                tags = CASE WHEN ?2 IS NULL THEN tags ELSE NULLIF(TRIM(?2), '') END,
                is_fixed = COALESCE(?3, is_fixed)
            WHERE id = ?4
            "#,
            params![update.category, update.tags, update.is_fixed, id],
        )?;
        Ok(changed > 0)
    }

    /// Mark a transaction tax deductible or not. Returns false if it doesn't exist.
    pub fn set_tax_deductible(&self, id: i64, tax_deductible: bool) -> Result<bool> {
        let conn = self.conn()?;
        let changed = conn.execute(
            "UPDATE transactions SET tax_deductible = ? WHERE id = ?",
            params![tax_deductible, id],
        )?;
        Ok(changed > 0)
    }
}
