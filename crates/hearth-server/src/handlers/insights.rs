//! Spending insight handlers

use std::sync::Arc;

use axum::{
    extract::{Query, Request, State},
    Json,
};
use serde::Deserialize;
use tracing::info;

use super::today;
use crate::{get_user_email, AppError, AppState, MAX_PAGE_LIMIT};
use hearth_core::insights::{DrillDownPage, Filter, SourceFilter, TimeRange};
use hearth_core::{
    aggregate, drill_down, run_categorization, AuditAction, AuditEntity, CategorizationResult,
    SpendingInsights,
};

/// Query parameters shared by the insight chart and its drill-down
#[derive(Debug, Default, Deserialize)]
pub struct InsightsQuery {
    /// Time range token: "30d", "90d", "365d", "ytd" or "all"
    pub range: Option<String>,
    /// Calendar month (1-12); requires `year`
    pub month: Option<u32>,
    pub year: Option<i32>,
    /// "all", "manual" or "linked"
    pub source: Option<String>,
    /// Single category, "All" for none
    pub category: Option<String>,
    /// Drill-down display cap
    pub limit: Option<i64>,
}

impl InsightsQuery {
    /// Resolve into a filter carrying the configured exclusions
    fn to_filter(&self, state: &AppState) -> Result<Filter, AppError> {
        let range = self
            .range
            .as_deref()
            .map(str::parse::<TimeRange>)
            .transpose()
            .map_err(|e| AppError::bad_request(&e))?;
        let source: SourceFilter = self
            .source
            .as_deref()
            .unwrap_or_default()
            .parse()
            .map_err(|e: String| AppError::bad_request(&e))?;

        state
            .settings
            .insight_filter(
                range,
                self.month,
                self.year,
                source,
                self.category.as_deref(),
            )
            .map_err(AppError::from_core)
    }

    fn describe(&self) -> String {
        format!(
            "range={}, month={:?}, year={:?}, source={}, category={}",
            self.range.as_deref().unwrap_or("default"),
            self.month,
            self.year,
            self.source.as_deref().unwrap_or("all"),
            self.category.as_deref().unwrap_or("All"),
        )
    }
}

/// GET /api/insights/spending - Monthly fixed/variable trend and category distribution
pub async fn get_spending_insights(
    State(state): State<Arc<AppState>>,
    Query(params): Query<InsightsQuery>,
    request: Request,
) -> Result<Json<SpendingInsights>, AppError> {
    let user_email = get_user_email(request.headers());
    let filter = params.to_filter(&state)?;

    let snapshot = state.db.snapshot()?;
    let insights = aggregate(&snapshot.transactions, &snapshot.accounts, &filter, today());

    state.db.log_audit(
        &user_email,
        AuditAction::View,
        AuditEntity::Insights,
        None,
        Some(&params.describe()),
    )?;

    Ok(Json(insights))
}

/// GET /api/insights/transactions - Raw transactions behind the current insight view
pub async fn get_insight_transactions(
    State(state): State<Arc<AppState>>,
    Query(params): Query<InsightsQuery>,
    request: Request,
) -> Result<Json<DrillDownPage>, AppError> {
    let user_email = get_user_email(request.headers());
    let filter = params.to_filter(&state)?;
    let limit = params
        .limit
        .unwrap_or(state.settings.insights.drilldown_display_limit as i64)
        .clamp(1, MAX_PAGE_LIMIT);

    let snapshot = state.db.snapshot()?;
    let rows = drill_down(&snapshot.transactions, &snapshot.accounts, &filter, today());
    let page = DrillDownPage::new(rows, limit as usize);

    state.db.log_audit(
        &user_email,
        AuditAction::DrillDown,
        AuditEntity::Insights,
        None,
        Some(&format!("{}, total={}", params.describe(), page.total)),
    )?;

    Ok(Json(page))
}

/// POST /api/insights/auto-categorize - Run the external categorization agent
pub async fn auto_categorize(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<CategorizationResult>, AppError> {
    let user_email = get_user_email(request.headers());

    let agent = state
        .agent
        .clone()
        .ok_or_else(|| AppError::service_unavailable("Categorization agent not configured"))?;

    info!(user = %user_email, "Auto-categorization requested");
    let result = run_categorization(&state.db, agent.as_ref())
        .await
        .map_err(AppError::from_core)?;

    state.db.log_audit(
        &user_email,
        AuditAction::AutoCategorize,
        AuditEntity::Transaction,
        None,
        Some(&format!(
            "processed={}, updated={}, knowledge_size={}",
            result.processed, result.updated, result.knowledge_size
        )),
    )?;

    Ok(Json(result))
}
