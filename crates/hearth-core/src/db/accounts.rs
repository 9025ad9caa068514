//! Account operations

use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{parse_datetime, Database};
use crate::error::Result;
use crate::models::{Account, AccountType};
use crate::sync::SyncAccount;

const ACCOUNT_COLUMNS: &str =
    "id, name, account_type, balance, institution_name, item_id, is_hidden, created_at";

fn row_to_account(row: &Row) -> rusqlite::Result<Account> {
    let account_type: String = row.get(2)?;
    let created_at_str: String = row.get(7)?;
    Ok(Account {
        id: row.get(0)?,
        name: row.get(1)?,
        account_type: AccountType::parse(&account_type),
        balance: row.get(3)?,
        institution_name: row.get(4)?,
        item_id: row.get(5)?,
        is_hidden: row.get(6)?,
        created_at: parse_datetime(&created_at_str),
    })
}

pub(super) fn query_accounts(conn: &Connection, id: Option<i64>) -> Result<Vec<Account>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM accounts WHERE (?1 IS NULL OR id = ?1) ORDER BY institution_name, name",
        ACCOUNT_COLUMNS
    ))?;

    let accounts = stmt
        .query_map(params![id], row_to_account)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(accounts)
}

impl Database {
    /// Create or refresh an account from sync
    ///
    /// Matched by external id. Name, type, balance and connection are replaced;
    /// the user's visibility choice is kept.
    pub fn upsert_account(&self, account: &SyncAccount) -> Result<i64> {
        let conn = self.conn()?;

        conn.execute(
            r#"
            INSERT INTO accounts (external_id, name, account_type, balance, institution_name, item_id)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(external_id) DO UPDATE SET
                name = excluded.name,
                account_type = excluded.account_type,
                balance = excluded.balance,
                institution_name = excluded.institution_name,
                item_id = excluded.item_id,
                updated_at = CURRENT_TIMESTAMP
            "#,
            params![
                account.external_id,
                account.name,
                account.account_type.as_str(),
                account.balance,
                account.institution_name,
                account.item_id,
            ],
        )?;

        let id = conn.query_row(
            "SELECT id FROM accounts WHERE external_id = ?",
            params![account.external_id],
            |row| row.get(0),
        )?;

        Ok(id)
    }

    /// Look up an account's id by its sync external id
    pub fn find_account_by_external_id(&self, external_id: &str) -> Result<Option<i64>> {
        let conn = self.conn()?;
        let id = conn
            .query_row(
                "SELECT id FROM accounts WHERE external_id = ?",
                params![external_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id)
    }

    /// List all accounts, hidden ones included
    pub fn list_accounts(&self) -> Result<Vec<Account>> {
        let conn = self.conn()?;
        query_accounts(&conn, None)
    }

    /// Get an account by ID
    pub fn get_account(&self, id: i64) -> Result<Option<Account>> {
        let conn = self.conn()?;
        Ok(query_accounts(&conn, Some(id))?.into_iter().next())
    }

    /// Set an account's visibility. Returns false if the account doesn't exist.
    pub fn set_account_hidden(&self, id: i64, hidden: bool) -> Result<bool> {
        let conn = self.conn()?;
        let changed = conn.execute(
            "UPDATE accounts SET is_hidden = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
            params![hidden, id],
        )?;
        Ok(changed > 0)
    }

    /// Flip an account's visibility, returning the new `is_hidden` value
    pub fn toggle_account_hidden(&self, id: i64) -> Result<Option<bool>> {
        let conn = self.conn()?;
        let hidden = conn
            .query_row(
                r#"
                UPDATE accounts SET is_hidden = NOT is_hidden, updated_at = CURRENT_TIMESTAMP
                WHERE id = ?
                RETURNING is_hidden
                "#,
                params![id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(hidden)
    }
}
