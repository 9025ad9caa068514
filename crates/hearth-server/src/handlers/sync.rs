//! Sync batch ingestion handler

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    Json,
};

use super::read_json;
use crate::{get_user_email, AppError, AppState, MAX_SYNC_BODY};
use hearth_core::{apply_batch, AuditAction, AuditEntity, SyncBatch, SyncStats};

/// POST /api/sync - Apply a batch of aggregator accounts and transactions
pub async fn sync_batch(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<SyncStats>, AppError> {
    let user_email = get_user_email(request.headers());
    let batch: SyncBatch = read_json(request, MAX_SYNC_BODY).await?;

    let stats = apply_batch(&state.db, &batch).map_err(AppError::from_core)?;

    state.db.log_audit(
        &user_email,
        AuditAction::Sync,
        AuditEntity::Transaction,
        None,
        Some(&format!(
            "accounts={}, inserted={}, updated={}, skipped={}",
            stats.accounts, stats.inserted, stats.updated, stats.skipped
        )),
    )?;

    Ok(Json(stats))
}
