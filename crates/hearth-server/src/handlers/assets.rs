//! Manual asset handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Request, State},
    Json,
};

use super::read_json;
use crate::{get_user_email, AppError, AppState, SuccessResponse, MAX_JSON_BODY};
use hearth_core::models::{Asset, NewAsset};
use hearth_core::{resolve_equity, AssetEquity, AuditAction, AuditEntity};

/// GET /api/assets - List manual assets
pub async fn list_assets(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<Vec<Asset>>, AppError> {
    let user_email = get_user_email(request.headers());

    let assets = state.db.list_assets()?;

    state.db.log_audit(
        &user_email,
        AuditAction::List,
        AuditEntity::Asset,
        None,
        Some(&format!("count={}", assets.len())),
    )?;

    Ok(Json(assets))
}

/// GET /api/assets/:id - Get a single asset
pub async fn get_asset(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<Asset>, AppError> {
    let user_email = get_user_email(request.headers());

    let asset = state
        .db
        .get_asset(id)?
        .ok_or_else(|| AppError::not_found("Asset not found"))?;

    state
        .db
        .log_audit(&user_email, AuditAction::View, AuditEntity::Asset, Some(id), None)?;

    Ok(Json(asset))
}

/// POST /api/assets - Create a manual asset
///
/// A linked account must exist and be a loan or mortgage.
pub async fn create_asset(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<Asset>, AppError> {
    let user_email = get_user_email(request.headers());
    let req: NewAsset = read_json(request, MAX_JSON_BODY).await?;

    let asset = state.db.create_asset(req).map_err(AppError::from_core)?;

    state.db.log_audit(
        &user_email,
        AuditAction::Create,
        AuditEntity::Asset,
        Some(asset.id),
        Some(&format!(
            "name={}, type={}, linked_account_id={:?}",
            asset.name, asset.asset_type, asset.linked_account_id
        )),
    )?;

    Ok(Json(asset))
}

/// PUT /api/assets/:id - Replace an asset's fields
pub async fn update_asset(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<Asset>, AppError> {
    let user_email = get_user_email(request.headers());
    let req: NewAsset = read_json(request, MAX_JSON_BODY).await?;

    let asset = state.db.update_asset(id, req).map_err(AppError::from_core)?;

    state.db.log_audit(
        &user_email,
        AuditAction::Update,
        AuditEntity::Asset,
        Some(id),
        Some(&format!("name={}", asset.name)),
    )?;

    Ok(Json(asset))
}

/// DELETE /api/assets/:id - Remove an asset
pub async fn delete_asset(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<SuccessResponse>, AppError> {
    let user_email = get_user_email(request.headers());

    if !state.db.delete_asset(id)? {
        return Err(AppError::not_found("Asset not found"));
    }

    state
        .db
        .log_audit(&user_email, AuditAction::Delete, AuditEntity::Asset, Some(id), None)?;

    Ok(Json(SuccessResponse { success: true }))
}

/// GET /api/assets/:id/equity - Resolve an asset's owned equity
pub async fn get_asset_equity(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<AssetEquity>, AppError> {
    let user_email = get_user_email(request.headers());

    let asset = state
        .db
        .get_asset(id)?
        .ok_or_else(|| AppError::not_found("Asset not found"))?;

    let accounts = state.db.list_accounts()?;
    let equity = resolve_equity(&asset, &accounts);

    state.db.log_audit(
        &user_email,
        AuditAction::ViewEquity,
        AuditEntity::Asset,
        Some(id),
        Some(&format!("liability_source={}", equity.liability_source)),
    )?;

    Ok(Json(equity))
}
