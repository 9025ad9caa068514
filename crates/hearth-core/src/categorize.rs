//! Auto-categorization through an external agent
//!
//! The agent owns the categorization knowledge; Hearth only sends it the
//! transactions that still lack a category, applies whatever updates it returns,
//! and reports the agent's `{processed, updated, knowledge_size}` summary.
//! Callers re-read transactions afterwards.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::AgentConfig;
use crate::db::Database;
use crate::error::{Error, Result};
use crate::models::{Transaction, TransactionUpdate};

/// Summary reported by the agent after a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorizationResult {
    pub processed: u64,
    pub updated: u64,
    /// Size of the agent's learned rule set
    pub knowledge_size: u64,
}

/// Transaction fields the agent sees
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorizationItem {
    pub id: i64,
    pub description: String,
    pub amount: f64,
    pub category: Option<String>,
}

impl From<&Transaction> for CategorizationItem {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: tx.id,
            description: tx.description.clone(),
            amount: tx.amount,
            category: tx.category.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategorizationRequest {
    pub transactions: Vec<CategorizationItem>,
}

/// A change the agent wants applied to one transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryUpdate {
    pub transaction_id: i64,
    #[serde(flatten)]
    pub update: TransactionUpdate,
}

/// Agent response: its summary plus the updates to apply
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategorizationOutcome {
    #[serde(flatten)]
    pub result: CategorizationResult,
    #[serde(default)]
    pub updates: Vec<CategoryUpdate>,
}

/// One-shot categorization backend
#[async_trait]
pub trait CategorizationAgent: Send + Sync {
    async fn categorize(&self, request: &CategorizationRequest) -> Result<CategorizationOutcome>;
}

/// Agent reached over HTTP (`POST {base_url}/categorize`)
#[derive(Clone)]
pub struct HttpCategorizationAgent {
    http_client: Client,
    base_url: String,
}

impl HttpCategorizationAgent {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Build from config; `None` when no agent URL is configured
    pub fn from_config(config: &AgentConfig) -> Result<Option<Self>> {
        config
            .url
            .as_deref()
            .map(|url| Self::new(url, config.timeout))
            .transpose()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl CategorizationAgent for HttpCategorizationAgent {
    async fn categorize(&self, request: &CategorizationRequest) -> Result<CategorizationOutcome> {
        debug!(
            count = request.transactions.len(),
            url = %self.base_url,
            "Calling categorization agent"
        );

        let response = self
            .http_client
            .post(format!("{}/categorize", self.base_url))
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Agent(format!(
                "Agent returned HTTP {}",
                response.status()
            )));
        }

        Ok(response.json().await?)
    }
}

/// Send uncategorized transactions to the agent and apply its updates
///
/// Updates naming a transaction that no longer exists are skipped with a warning.
pub async fn run_categorization(
    db: &Database,
    agent: &dyn CategorizationAgent,
) -> Result<CategorizationResult> {
    let pending = db.list_uncategorized_transactions()?;
    let request = CategorizationRequest {
        transactions: pending.iter().map(CategorizationItem::from).collect(),
    };

    let outcome = agent.categorize(&request).await?;

    let mut applied = 0usize;
    for update in &outcome.updates {
        if update.update.is_empty() {
            continue;
        }
        if db.update_transaction(update.transaction_id, &update.update)? {
            applied += 1;
        } else {
            warn!(
                transaction_id = update.transaction_id,
                "Agent update for unknown transaction skipped"
            );
        }
    }

    info!(
        sent = request.transactions.len(),
        processed = outcome.result.processed,
        updated = outcome.result.updated,
        applied,
        knowledge_size = outcome.result.knowledge_size,
        "Auto-categorization complete"
    );

    Ok(outcome.result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::TransactionUpsert;
    use crate::models::{AccountType, NewTransaction};
    use crate::sync::SyncAccount;
    use crate::test_utils::MockCategorizationAgent;
    use chrono::NaiveDate;

    struct FixedAgent {
        outcome: CategorizationOutcome,
    }

    #[async_trait]
    impl CategorizationAgent for FixedAgent {
        async fn categorize(
            &self,
            _request: &CategorizationRequest,
        ) -> Result<CategorizationOutcome> {
            Ok(self.outcome.clone())
        }
    }

    fn seed(db: &Database) -> Vec<i64> {
        let account_id = db
            .upsert_account(&SyncAccount {
                external_id: "excel".to_string(),
                name: "Excel Import".to_string(),
                account_type: AccountType::Other,
                balance: 0.0,
                institution_name: String::new(),
                item_id: None,
            })
            .unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
        [
            ("NETFLIX.COM", 15.49, None),
            ("WHOLE FOODS #123", 82.10, None),
            ("Rent", 2000.0, Some("Housing")),
        ]
        .into_iter()
        .enumerate()
        .map(|(i, (description, amount, category))| {
            let new = NewTransaction {
                external_id: format!("tx-{}", i),
                date,
                description: description.to_string(),
                amount,
                category: category.map(str::to_string),
                tags: None,
                is_fixed: None,
            };
            match db.upsert_transaction(account_id, &new).unwrap() {
                TransactionUpsert::Inserted(id) | TransactionUpsert::Updated(id) => id,
            }
        })
        .collect()
    }

    #[test]
    fn test_outcome_parses_flat_result() {
        let outcome: CategorizationOutcome = serde_json::from_str(
            r#"{"processed": 10, "updated": 3, "knowledge_size": 120}"#,
        )
        .unwrap();
        assert_eq!(
            outcome.result,
            CategorizationResult {
                processed: 10,
                updated: 3,
                knowledge_size: 120
            }
        );
        assert!(outcome.updates.is_empty());
    }

    #[tokio::test]
    async fn test_run_applies_updates() {
        let db = Database::in_memory().unwrap();
        let ids = seed(&db);

        let agent = FixedAgent {
            outcome: CategorizationOutcome {
                result: CategorizationResult {
                    processed: 2,
                    updated: 1,
                    knowledge_size: 7,
                },
                updates: vec![
                    CategoryUpdate {
                        transaction_id: ids[0],
                        update: TransactionUpdate {
                            category: Some("Subscriptions".to_string()),
                            tags: None,
                            is_fixed: Some(true),
                        },
                    },
                    CategoryUpdate {
                        transaction_id: 9999,
                        update: TransactionUpdate {
                            category: Some("Ghost".to_string()),
                            ..Default::default()
                        },
                    },
                ],
            },
        };

        let result = run_categorization(&db, &agent).await.unwrap();
        assert_eq!(result.knowledge_size, 7);

        let tx = db.get_transaction(ids[0]).unwrap().unwrap();
        assert_eq!(tx.category.as_deref(), Some("Subscriptions"));
        assert_eq!(tx.is_fixed, Some(true));
    }

    #[tokio::test]
    async fn test_http_agent_against_mock() {
        let mut server = MockCategorizationAgent::start().await;
        let db = Database::in_memory().unwrap();
        let ids = seed(&db);

        let agent = HttpCategorizationAgent::new(&server.url(), Duration::from_secs(5)).unwrap();
        let result = run_categorization(&db, &agent).await.unwrap();

        // Only the two uncategorized transactions are sent
        assert_eq!(result.processed, 2);
        assert_eq!(result.updated, 2);

        let netflix = db.get_transaction(ids[0]).unwrap().unwrap();
        assert_eq!(netflix.category.as_deref(), Some("Subscriptions"));
        let groceries = db.get_transaction(ids[1]).unwrap().unwrap();
        assert_eq!(groceries.category.as_deref(), Some("Groceries"));
        let rent = db.get_transaction(ids[2]).unwrap().unwrap();
        assert_eq!(rent.category.as_deref(), Some("Housing"));

        server.stop();
    }

    #[tokio::test]
    async fn test_http_agent_error_status() {
        let server = MockCategorizationAgent::start().await;
        let agent = HttpCategorizationAgent::new(
            &format!("{}/missing", server.url()),
            Duration::from_secs(5),
        )
        .unwrap();

        let result = agent.categorize(&CategorizationRequest::default()).await;
        assert!(matches!(result, Err(Error::Agent(_))));
    }

    #[test]
    fn test_from_config_without_url() {
        let config = AgentConfig {
            url: None,
            timeout: Duration::from_secs(1),
        };
        assert!(HttpCategorizationAgent::from_config(&config)
            .unwrap()
            .is_none());
    }
}
