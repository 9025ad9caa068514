//! Account handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Request, State},
    Json,
};
use serde::Serialize;

use crate::{get_user_email, AppError, AppState};
use hearth_core::{models::Account, AuditAction, AuditEntity};

#[derive(Serialize)]
pub struct VisibilityResponse {
    pub id: i64,
    pub is_hidden: bool,
}

/// GET /api/accounts - List all accounts (hidden ones included, flagged)
pub async fn list_accounts(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<Vec<Account>>, AppError> {
    let user_email = get_user_email(request.headers());

    let accounts = state.db.list_accounts()?;

    // Audit log - read access
    state.db.log_audit(
        &user_email,
        AuditAction::List,
        AuditEntity::Account,
        None,
        Some(&format!("count={}", accounts.len())),
    )?;

    Ok(Json(accounts))
}

/// POST /api/accounts/:id/toggle-visibility - Hide or unhide an account
pub async fn toggle_account_visibility(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<VisibilityResponse>, AppError> {
    let user_email = get_user_email(request.headers());

    let is_hidden = state
        .db
        .toggle_account_hidden(id)?
        .ok_or_else(|| AppError::not_found("Account not found"))?;

    state.db.log_audit(
        &user_email,
        AuditAction::ToggleVisibility,
        AuditEntity::Account,
        Some(id),
        Some(&format!("is_hidden={}", is_hidden)),
    )?;

    Ok(Json(VisibilityResponse { id, is_hidden }))
}
