//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area.

pub mod accounts;
pub mod assets;
pub mod audit;
pub mod insights;
pub mod networth;
pub mod privacy;
pub mod sync;
pub mod transactions;

// Re-export all handlers for use in router
pub use accounts::*;
pub use assets::*;
pub use audit::*;
pub use insights::*;
pub use networth::*;
pub use privacy::*;
pub use sync::*;
pub use transactions::*;

use axum::extract::Request;
use serde::de::DeserializeOwned;

use crate::AppError;

/// Read a JSON body after the caller has taken what it needs from the headers
pub(crate) async fn read_json<T: DeserializeOwned>(
    request: Request,
    limit: usize,
) -> Result<T, AppError> {
    let bytes = axum::body::to_bytes(request.into_body(), limit)
        .await
        .map_err(|_| AppError::bad_request("Invalid request body"))?;
    serde_json::from_slice(&bytes).map_err(|e| AppError::bad_request(&format!("Invalid JSON: {}", e)))
}

/// The date insight windows are resolved against
pub(crate) fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}
