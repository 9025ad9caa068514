//! Access audit trail
//!
//! Every read or write made through the REST surface is recorded with a typed
//! action and the kind of record it touched, so the trail can be filtered per
//! record kind (e.g. "who looked at net worth").

use std::str::FromStr;

use rusqlite::{params, types::Type, Row};
use serde::{Deserialize, Serialize};

use super::Database;
use crate::error::{Error, Result};

/// What was done
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    List,
    View,
    Create,
    Update,
    Delete,
    ToggleVisibility,
    SetTaxDeductible,
    ViewEquity,
    Sync,
    DrillDown,
    AutoCategorize,
    Unlock,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::List => "list",
            Self::View => "view",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::ToggleVisibility => "toggle_visibility",
            Self::SetTaxDeductible => "set_tax_deductible",
            Self::ViewEquity => "view_equity",
            Self::Sync => "sync",
            Self::DrillDown => "drill_down",
            Self::AutoCategorize => "auto_categorize",
            Self::Unlock => "unlock",
        }
    }
}

impl FromStr for AuditAction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s {
            "list" => Self::List,
            "view" => Self::View,
            "create" => Self::Create,
            "update" => Self::Update,
            "delete" => Self::Delete,
            "toggle_visibility" => Self::ToggleVisibility,
            "set_tax_deductible" => Self::SetTaxDeductible,
            "view_equity" => Self::ViewEquity,
            "sync" => Self::Sync,
            "drill_down" => Self::DrillDown,
            "auto_categorize" => Self::AutoCategorize,
            "unlock" => Self::Unlock,
            _ => return Err(Error::InvalidData(format!("Unknown audit action: {}", s))),
        })
    }
}

/// Kind of record an audited call touched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEntity {
    Account,
    Asset,
    Transaction,
    NetWorth,
    Insights,
    Privacy,
    AuditLog,
}

impl AuditEntity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Account => "account",
            Self::Asset => "asset",
            Self::Transaction => "transaction",
            Self::NetWorth => "net_worth",
            Self::Insights => "insights",
            Self::Privacy => "privacy",
            Self::AuditLog => "audit_log",
        }
    }
}

impl FromStr for AuditEntity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s.to_lowercase().as_str() {
            "account" => Self::Account,
            "asset" => Self::Asset,
            "transaction" => Self::Transaction,
            "net_worth" | "networth" => Self::NetWorth,
            "insights" => Self::Insights,
            "privacy" => Self::Privacy,
            "audit_log" => Self::AuditLog,
            _ => return Err(Error::InvalidData(format!("Unknown audit entity: {}", s))),
        })
    }
}

impl std::fmt::Display for AuditEntity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Audit log entry
#[derive(Debug, Clone, Serialize)]
pub struct AuditEntry {
    pub id: i64,
    pub timestamp: String,
    pub user_email: String,
    pub action: AuditAction,
    pub entity: AuditEntity,
    pub entity_id: Option<i64>,
    pub details: Option<String>,
}

fn parse_column<T: FromStr<Err = Error>>(row: &Row, idx: usize) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    raw.parse()
        .map_err(|e: Error| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

impl Database {
    /// Record an audited call
    pub fn log_audit(
        &self,
        user_email: &str,
        action: AuditAction,
        entity: AuditEntity,
        entity_id: Option<i64>,
        details: Option<&str>,
    ) -> Result<i64> {
        let conn = self.conn()?;

        conn.execute(
            r#"
            INSERT INTO audit_log (user_email, action, entity_type, entity_id, details)
            VALUES (?, ?, ?, ?, ?)
            "#,
            params![
                user_email,
                action.as_str(),
                entity.as_str(),
                entity_id,
                details
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// Newest entries first, optionally only those touching one kind of record
    pub fn list_audit_log(
        &self,
        limit: i64,
        entity: Option<AuditEntity>,
    ) -> Result<Vec<AuditEntry>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT id, timestamp, user_email, action, entity_type, entity_id, details
            FROM audit_log
            WHERE (?1 IS NULL OR entity_type = ?1)
            ORDER BY timestamp DESC, id DESC
            LIMIT ?2
            "#,
        )?;

        let entries = stmt
            .query_map(params![entity.map(|e| e.as_str()), limit], |row| {
                Ok(AuditEntry {
                    id: row.get(0)?,
                    timestamp: row.get(1)?,
                    user_email: row.get(2)?,
                    action: parse_column(row, 3)?,
                    entity: parse_column(row, 4)?,
                    entity_id: row.get(5)?,
                    details: row.get(6)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(entries)
    }
}
