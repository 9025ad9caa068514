//! Transaction handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, Request, State},
    Json,
};
use serde::{Deserialize, Serialize};

use super::read_json;
use crate::{get_user_email, AppError, AppState, SuccessResponse, MAX_JSON_BODY, MAX_PAGE_LIMIT};
use hearth_core::models::{Transaction, TransactionUpdate};
use hearth_core::{AuditAction, AuditEntity};

/// Query parameters for listing transactions
#[derive(Debug, Deserialize)]
pub struct TransactionQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
    pub account_id: Option<i64>,
}

fn default_limit() -> i64 {
    50
}

#[derive(Serialize)]
pub struct TransactionResponse {
    pub transactions: Vec<Transaction>,
    pub limit: i64,
    pub offset: i64,
}

/// Request body for the tax-deductible toggle
#[derive(Debug, Deserialize)]
pub struct TaxDeductibleRequest {
    pub tax_deductible: bool,
}

/// GET /api/transactions - List transactions, newest first
pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TransactionQuery>,
    request: Request,
) -> Result<Json<TransactionResponse>, AppError> {
    let user_email = get_user_email(request.headers());
    let limit = params.limit.clamp(1, MAX_PAGE_LIMIT);
    let offset = params.offset.max(0);

    let transactions = state
        .db
        .list_transactions(params.account_id, limit, offset)?;

    state.db.log_audit(
        &user_email,
        AuditAction::List,
        AuditEntity::Transaction,
        None,
        Some(&format!(
            "account_id={:?}, limit={}, offset={}, count={}",
            params.account_id,
            limit,
            offset,
            transactions.len()
        )),
    )?;

    Ok(Json(TransactionResponse {
        transactions,
        limit,
        offset,
    }))
}

/// PUT /api/transactions/:id - Update category, tags and fixed/variable flag
///
/// Omitted fields keep their stored value.
pub async fn update_transaction(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<Transaction>, AppError> {
    let user_email = get_user_email(request.headers());
    let update: TransactionUpdate = read_json(request, MAX_JSON_BODY).await?;

    if update.is_empty() {
        return Err(AppError::bad_request("No fields to update"));
    }

    if !state.db.update_transaction(id, &update)? {
        return Err(AppError::not_found("Transaction not found"));
    }

    let transaction = state
        .db
        .get_transaction(id)?
        .ok_or_else(|| AppError::internal("Transaction missing after update"))?;

    state.db.log_audit(
        &user_email,
        AuditAction::Update,
        AuditEntity::Transaction,
        Some(id),
        Some(&format!(
            "category={:?}, tags={:?}, is_fixed={:?}",
            update.category, update.tags, update.is_fixed
        )),
    )?;

    Ok(Json(transaction))
}

/// PUT /api/transactions/:id/tax-deductible - Mark or unmark a transaction as deductible
pub async fn set_tax_deductible(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<SuccessResponse>, AppError> {
    let user_email = get_user_email(request.headers());
    let req: TaxDeductibleRequest = read_json(request, MAX_JSON_BODY).await?;

    if !state.db.set_tax_deductible(id, req.tax_deductible)? {
        return Err(AppError::not_found("Transaction not found"));
    }

    state.db.log_audit(
        &user_email,
        AuditAction::SetTaxDeductible,
        AuditEntity::Transaction,
        Some(id),
        Some(&format!("tax_deductible={}", req.tax_deductible)),
    )?;

    Ok(Json(SuccessResponse { success: true }))
}
