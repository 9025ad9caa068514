//! Net worth handler

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    Json,
};

use crate::{get_user_email, AppError, AppState};
use hearth_core::{breakdown, AuditAction, AuditEntity, NetWorthBreakdown};

/// GET /api/networth - Household totals with per-bucket and per-asset breakdown
pub async fn get_net_worth(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<NetWorthBreakdown>, AppError> {
    let user_email = get_user_email(request.headers());

    let snapshot = state.db.snapshot()?;
    let result = breakdown(&snapshot.accounts, &snapshot.assets);

    state.db.log_audit(
        &user_email,
        AuditAction::View,
        AuditEntity::NetWorth,
        None,
        Some(&format!(
            "accounts={}, assets={}",
            snapshot.accounts.len(),
            snapshot.assets.len()
        )),
    )?;

    Ok(Json(result))
}
