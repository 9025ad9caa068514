//! Sync batch ingestion
//!
//! The aggregator sync itself runs outside Hearth and drops its results as a JSON
//! batch: account balances plus new transactions. Ingesting a batch is
//! idempotent; accounts are matched by their external id and transactions by
//! external id, or by a content hash when the feed has none (spreadsheet exports).

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use crate::db::{Database, TransactionUpsert};
use crate::error::{Error, Result};
use crate::models::{AccountType, NewTransaction};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncBatch {
    #[serde(default)]
    pub accounts: Vec<SyncAccount>,
    #[serde(default)]
    pub transactions: Vec<SyncTransaction>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncAccount {
    pub external_id: String,
    pub name: String,
    pub account_type: AccountType,
    pub balance: f64,
    #[serde(default)]
    pub institution_name: String,
    /// Connection id; absent for manual feeds
    #[serde(default)]
    pub item_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncTransaction {
    #[serde(default)]
    pub external_id: Option<String>,
    /// `external_id` of the owning account in the same or an earlier batch
    pub account_external_id: String,
    pub date: NaiveDate,
    pub description: String,
    pub amount: f64,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Option<String>,
    #[serde(default)]
    pub is_fixed: Option<bool>,
}

impl SyncTransaction {
    /// External id if present, else a SHA-256 of the identifying fields
    pub fn dedup_key(&self) -> String {
        if let Some(id) = self.external_id.as_deref().filter(|id| !id.is_empty()) {
            return id.to_string();
        }
        let mut hasher = Sha256::new();
        hasher.update(self.account_external_id.as_bytes());
        hasher.update(b"|");
        hasher.update(self.date.to_string().as_bytes());
        hasher.update(b"|");
        hasher.update(self.description.as_bytes());
        hasher.update(b"|");
        hasher.update(format!("{:.2}", self.amount).as_bytes());
        format!("sha256:{}", hex::encode(hasher.finalize()))
    }

    fn to_new(&self) -> NewTransaction {
        NewTransaction {
            external_id: self.dedup_key(),
            date: self.date,
            description: self.description.clone(),
            amount: self.amount,
            category: self.category.clone(),
            tags: self.tags.clone(),
            is_fixed: self.is_fixed,
        }
    }
}

/// Counts from one batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncStats {
    pub accounts: usize,
    pub inserted: usize,
    pub updated: usize,
    /// Transactions whose account could not be resolved
    pub skipped: usize,
}

/// Read a batch from a JSON file
pub fn load_batch(path: &Path) -> Result<SyncBatch> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Apply a batch to the store
pub fn apply_batch(db: &Database, batch: &SyncBatch) -> Result<SyncStats> {
    let mut stats = SyncStats::default();

    for account in &batch.accounts {
        if !account.balance.is_finite() {
            return Err(Error::InvalidData(format!(
                "Account {} has a non-numeric balance",
                account.external_id
            )));
        }
    }
    if let Some(tx) = batch.transactions.iter().find(|t| !t.amount.is_finite()) {
        return Err(Error::InvalidData(format!(
            "Transaction '{}' has a non-numeric amount",
            tx.description
        )));
    }

    let mut account_ids: HashMap<&str, i64> = HashMap::new();
    for account in &batch.accounts {
        let id = db.upsert_account(account)?;
        account_ids.insert(account.external_id.as_str(), id);
        stats.accounts += 1;
    }

    for tx in &batch.transactions {
        let account_id = match account_ids.get(tx.account_external_id.as_str()) {
            Some(id) => Some(*id),
            None => db.find_account_by_external_id(&tx.account_external_id)?,
        };
        let Some(account_id) = account_id else {
            warn!(
                account = %tx.account_external_id,
                "Skipping transaction for unknown account"
            );
            stats.skipped += 1;
            continue;
        };

        match db.upsert_transaction(account_id, &tx.to_new())? {
            TransactionUpsert::Inserted(_) => stats.inserted += 1,
            TransactionUpsert::Updated(_) => stats.updated += 1,
        }
    }

    info!(
        accounts = stats.accounts,
        inserted = stats.inserted,
        updated = stats.updated,
        skipped = stats.skipped,
        "Sync batch applied"
    );

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn batch() -> SyncBatch {
        serde_json::from_str(
            r#"{
                "accounts": [
                    {"external_id": "acc-chk", "name": "Everyday Checking", "account_type": "checking",
                     "balance": 5200.5, "institution_name": "Chase", "item_id": "item-chase"},
                    {"external_id": "acc-excel", "name": "Excel Import", "account_type": "other",
                     "balance": 0}
                ],
                "transactions": [
                    {"external_id": "tx-1", "account_external_id": "acc-chk", "date": "2025-01-05",
                     "description": "WHOLE FOODS", "amount": 82.1, "category": "Groceries"},
                    {"account_external_id": "acc-excel", "date": "2025-01-07",
                     "description": "Contractor", "amount": 450.0},
                    {"account_external_id": "acc-missing", "date": "2025-01-07",
                     "description": "Orphan", "amount": 1.0}
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_dedup_key_prefers_external_id() {
        let b = batch();
        assert_eq!(b.transactions[0].dedup_key(), "tx-1");

        let hashed = b.transactions[1].dedup_key();
        assert!(hashed.starts_with("sha256:"));
        assert_eq!(hashed, b.transactions[1].clone().dedup_key());

        let mut changed = b.transactions[1].clone();
        changed.amount = 451.0;
        assert_ne!(changed.dedup_key(), hashed);
    }

    #[test]
    fn test_apply_batch_is_idempotent() {
        let db = Database::in_memory().unwrap();

        let first = apply_batch(&db, &batch()).unwrap();
        assert_eq!(first.accounts, 2);
        assert_eq!(first.inserted, 2);
        assert_eq!(first.skipped, 1);

        let second = apply_batch(&db, &batch()).unwrap();
        assert_eq!(second.inserted, 0);
        assert_eq!(second.updated, 2);

        assert_eq!(db.list_accounts().unwrap().len(), 2);
        assert_eq!(db.list_transactions(None, 100, 0).unwrap().len(), 2);
    }

    #[test]
    fn test_manual_feed_has_no_item() {
        let db = Database::in_memory().unwrap();
        apply_batch(&db, &batch()).unwrap();

        let accounts = db.list_accounts().unwrap();
        let excel = accounts.iter().find(|a| a.name == "Excel Import").unwrap();
        assert!(excel.item_id.is_none());
        let checking = accounts
            .iter()
            .find(|a| a.name == "Everyday Checking")
            .unwrap();
        assert_eq!(checking.item_id.as_deref(), Some("item-chase"));
        assert_eq!(checking.balance, 5200.5);
    }

    #[test]
    fn test_transactions_can_reference_earlier_batch() {
        let db = Database::in_memory().unwrap();
        apply_batch(&db, &batch()).unwrap();

        let follow_up: SyncBatch = serde_json::from_str(
            r#"{"transactions": [{"external_id": "tx-2", "account_external_id": "acc-chk",
                "date": "2025-02-01", "description": "Netflix", "amount": 15.49}]}"#,
        )
        .unwrap();
        let stats = apply_batch(&db, &follow_up).unwrap();
        assert_eq!(stats.inserted, 1);
        assert_eq!(stats.skipped, 0);
    }

    #[test]
    fn test_non_finite_amount_rejected() {
        let db = Database::in_memory().unwrap();
        let mut b = batch();
        b.transactions[0].amount = f64::NAN;
        assert!(matches!(apply_batch(&db, &b), Err(Error::InvalidData(_))));
        assert!(db.list_accounts().unwrap().is_empty());
    }

    #[test]
    fn test_load_batch_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", serde_json::to_string(&batch()).unwrap()).unwrap();

        let loaded = load_batch(file.path()).unwrap();
        assert_eq!(loaded.accounts.len(), 2);
        assert_eq!(loaded.transactions.len(), 3);
    }
}
