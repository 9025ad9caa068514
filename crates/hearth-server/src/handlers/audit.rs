//! Audit log handlers

use std::sync::Arc;

use axum::{
    extract::{Query, Request, State},
    Json,
};
use serde::Deserialize;

use crate::{get_user_email, AppError, AppState, MAX_PAGE_LIMIT};
use hearth_core::{AuditAction, AuditEntity, AuditEntry};

/// Query parameters for audit log
#[derive(Debug, Deserialize)]
pub struct AuditQuery {
    #[serde(default = "default_audit_limit")]
    pub limit: i64,
    /// Only entries touching this kind of record (e.g. "asset")
    pub entity: Option<String>,
}

fn default_audit_limit() -> i64 {
    100
}

/// GET /api/audit - List audit log entries, optionally for one record kind
pub async fn list_audit_log(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AuditQuery>,
    request: Request,
) -> Result<Json<Vec<AuditEntry>>, AppError> {
    let user_email = get_user_email(request.headers());
    let limit = params.limit.clamp(1, MAX_PAGE_LIMIT);

    let entity = params
        .entity
        .as_deref()
        .map(str::parse::<AuditEntity>)
        .transpose()
        .map_err(AppError::from_core)?;

    let entries = state.db.list_audit_log(limit, entity)?;

    // Viewing the audit log is itself audited
    state.db.log_audit(
        &user_email,
        AuditAction::List,
        AuditEntity::AuditLog,
        None,
        Some(&format!("limit={}, entity={:?}", limit, entity)),
    )?;

    Ok(Json(entries))
}
