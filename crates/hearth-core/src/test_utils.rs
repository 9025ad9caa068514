//! Test utilities for hearth-core
//!
//! Provides a mock categorization agent that speaks the same HTTP protocol as
//! the real one, for unit and integration tests.

use axum::{extract::Json, routing::post, Router};
use std::net::SocketAddr;
use tokio::sync::oneshot;

use crate::categorize::{
    CategorizationOutcome, CategorizationRequest, CategorizationResult, CategoryUpdate,
};
use crate::models::TransactionUpdate;

/// Keyword rules the mock agent "knows": (description keyword, category, fixed)
const MOCK_RULES: &[(&str, &str, bool)] = &[
    ("NETFLIX", "Subscriptions", true),
    ("SPOTIFY", "Subscriptions", true),
    ("WHOLE FOODS", "Groceries", false),
    ("TRADER JOE", "Groceries", false),
    ("SHELL", "Gas", false),
    ("PG&E", "Utilities", true),
    ("MORTGAGE", "Housing", true),
];

/// Mock categorization agent for testing and development
pub struct MockCategorizationAgent {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockCategorizationAgent {
    /// Start the mock agent on an available port
    pub async fn start() -> Self {
        let app = Router::new().route("/categorize", post(handle_categorize));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the base URL for this mock agent
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Stop the mock agent
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockCategorizationAgent {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn handle_categorize(
    Json(request): Json<CategorizationRequest>,
) -> Json<CategorizationOutcome> {
    let updates: Vec<CategoryUpdate> = request
        .transactions
        .iter()
        .filter_map(|item| {
            let description = item.description.to_uppercase();
            MOCK_RULES
                .iter()
                .find(|(keyword, _, _)| description.contains(keyword))
                .map(|(_, category, fixed)| CategoryUpdate {
                    transaction_id: item.id,
                    update: TransactionUpdate {
                        category: Some(category.to_string()),
                        tags: None,
                        is_fixed: Some(*fixed),
                    },
                })
        })
        .collect();

    Json(CategorizationOutcome {
        result: CategorizationResult {
            processed: request.transactions.len() as u64,
            updated: updates.len() as u64,
            knowledge_size: MOCK_RULES.len() as u64,
        },
        updates,
    })
}
