//! Privacy overlay handler
//!
//! The overlay lives in the client; the server only checks the shared PIN so
//! it never has to be shipped to the browser.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    Json,
};
use serde::{Deserialize, Serialize};

use hearth_core::{AuditAction, AuditEntity};

use super::read_json;
use crate::{get_user_email, AppError, AppState, MAX_JSON_BODY};

#[derive(Debug, Deserialize)]
pub struct UnlockRequest {
    pub pin: String,
}

#[derive(Serialize)]
pub struct UnlockResponse {
    pub unlocked: bool,
}

/// POST /api/privacy/unlock - Verify the shared privacy PIN
pub async fn unlock_privacy(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<UnlockResponse>, AppError> {
    let user_email = get_user_email(request.headers());
    let req: UnlockRequest = read_json(request, MAX_JSON_BODY).await?;

    let mut gate = state.settings.privacy_gate();
    let result = gate.unlock(&req.pin);

    state.db.log_audit(
        &user_email,
        AuditAction::Unlock,
        AuditEntity::Privacy,
        None,
        Some(if result.is_ok() { "success" } else { "rejected" }),
    )?;

    result.map_err(AppError::from_core)?;

    Ok(Json(UnlockResponse {
        unlocked: gate.is_unlocked(),
    }))
}
