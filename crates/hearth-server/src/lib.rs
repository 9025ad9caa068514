//! Hearth Web Server
//!
//! Axum-based REST API for the Hearth household net worth tracker.
//!
//! Security features:
//! - API key bearer authentication (secure by default, use --no-auth for local dev)
//! - Restrictive CORS policy
//! - Input validation (pagination limits, body size limits)
//! - Full audit logging for all API access (reads and writes)
//! - Sanitized error responses

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::Serialize;
use tower_http::{
    cors::CorsLayer, services::ServeDir, set_header::SetResponseHeaderLayer, trace::TraceLayer,
};
use tracing::{error, info, warn};

use hearth_core::db::Database;
use hearth_core::{CategorizationAgent, HearthConfig, HttpCategorizationAgent};

mod handlers;

/// Maximum sync batch body size (10 MB)
pub const MAX_SYNC_BODY: usize = 10 * 1024 * 1024;

/// Maximum body size for small JSON requests (assets, transaction edits)
pub const MAX_JSON_BODY: usize = 64 * 1024;

/// Maximum pagination limit
pub const MAX_PAGE_LIMIT: i64 = 1000;

/// Authorization header for API key auth
const AUTHORIZATION_HEADER: &str = "authorization";

/// Server configuration
#[derive(Clone)]
pub struct ServerConfig {
    /// Whether authentication is required (secure by default)
    pub require_auth: bool,
    /// Allowed CORS origins (empty = same-origin only in production)
    pub allowed_origins: Vec<String>,
    /// API keys accepted as "Bearer <key>" in the Authorization header
    pub api_keys: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            require_auth: true,
            allowed_origins: vec![],
            api_keys: vec![],
        }
    }
}

/// Shared application state
pub struct AppState {
    pub db: Database,
    pub config: ServerConfig,
    /// Household settings (privacy PIN, insight exclusions, agent endpoint)
    pub settings: HearthConfig,
    /// Categorization agent, when one is configured
    pub agent: Option<Arc<dyn CategorizationAgent>>,
}

/// Authentication middleware - validates API keys
///
/// Keys are compared in constant time. With `require_auth` off every request passes.
async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    if !state.config.require_auth {
        return next.run(request).await;
    }

    let api_key_valid = request
        .headers()
        .get(AUTHORIZATION_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer "))
        .map(|key| validate_api_key(key, &state.config.api_keys))
        .unwrap_or(false);

    if api_key_valid {
        info!(user = "api-key", path = %request.uri().path(), "Authenticated via API key");
        return next.run(request).await;
    }

    warn!(path = %request.uri().path(), "Unauthorized request - no valid auth");
    (
        StatusCode::UNAUTHORIZED,
        Json(serde_json::json!({
            "error": "Authentication required"
        })),
    )
        .into_response()
}

/// Validate an API key against the configured keys using constant-time comparison
fn validate_api_key(provided: &str, valid_keys: &[String]) -> bool {
    use subtle::ConstantTimeEq;

    let provided_bytes = provided.as_bytes();

    for key in valid_keys {
        let key_bytes = key.as_bytes();
        // Only compare if lengths match (constant-time for same-length keys)
        if provided_bytes.len() == key_bytes.len() && provided_bytes.ct_eq(key_bytes).into() {
            return true;
        }
    }
    false
}

/// Parse a comma-separated list of API keys (e.g. from HEARTH_API_KEYS)
pub fn parse_api_keys(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Extract the caller identity from request headers (for audit logging)
/// Returns "api-key" for API key auth, or "local-dev" for unauthenticated
pub fn get_user_email(headers: &axum::http::HeaderMap) -> String {
    if headers
        .get(AUTHORIZATION_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer "))
        .is_some()
    {
        return "api-key".to_string();
    }

    "local-dev".to_string()
}

/// Success response
#[derive(Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Create the application router
///
/// The categorization agent is built from `settings.agent`; a bad agent URL
/// disables auto-categorization instead of failing startup.
pub fn create_router(
    db: Database,
    static_dir: Option<&str>,
    config: ServerConfig,
    settings: HearthConfig,
) -> Router {
    let agent: Option<Arc<dyn CategorizationAgent>> =
        match HttpCategorizationAgent::from_config(&settings.agent) {
            Ok(Some(agent)) => {
                info!(url = agent.base_url(), "Categorization agent configured");
                Some(Arc::new(agent))
            }
            Ok(None) => {
                info!("Categorization agent not configured (set HEARTH_AGENT_URL to enable)");
                None
            }
            Err(e) => {
                warn!(error = %e, "Categorization agent disabled");
                None
            }
        };

    create_router_with_agent(db, static_dir, config, settings, agent)
}

/// Create the application router with an explicit categorization agent (for testing)
pub fn create_router_with_agent(
    db: Database,
    static_dir: Option<&str>,
    config: ServerConfig,
    settings: HearthConfig,
    agent: Option<Arc<dyn CategorizationAgent>>,
) -> Router {
    let state = Arc::new(AppState {
        db,
        config: config.clone(),
        settings,
        agent,
    });

    let api_routes = Router::new()
        // Accounts
        .route("/accounts", get(handlers::list_accounts))
        .route(
            "/accounts/:id/toggle-visibility",
            post(handlers::toggle_account_visibility),
        )
        // Assets
        .route(
            "/assets",
            get(handlers::list_assets).post(handlers::create_asset),
        )
        .route(
            "/assets/:id",
            get(handlers::get_asset)
                .put(handlers::update_asset)
                .delete(handlers::delete_asset),
        )
        .route("/assets/:id/equity", get(handlers::get_asset_equity))
        // Net worth
        .route("/networth", get(handlers::get_net_worth))
        // Insights
        .route("/insights/spending", get(handlers::get_spending_insights))
        .route(
            "/insights/transactions",
            get(handlers::get_insight_transactions),
        )
        .route("/insights/auto-categorize", post(handlers::auto_categorize))
        // Transactions
        .route("/transactions", get(handlers::list_transactions))
        .route("/transactions/:id", put(handlers::update_transaction))
        .route(
            "/transactions/:id/tax-deductible",
            put(handlers::set_tax_deductible),
        )
        // Sync
        .route("/sync", post(handlers::sync_batch))
        // Privacy
        .route("/privacy/unlock", post(handlers::unlock_privacy))
        // Audit log
        .route("/audit", get(handlers::list_audit_log));

    // Build CORS layer
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ];
    let cors = if config.allowed_origins.is_empty() {
        // Restrictive default: only allow same-origin
        CorsLayer::new()
            .allow_methods(methods)
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
    };

    let csp_value = HeaderValue::from_static(
        "default-src 'self'; script-src 'self'; style-src 'self' 'unsafe-inline'; img-src 'self' data:; font-src 'self'; connect-src 'self'; frame-ancestors 'none'"
    );

    let mut app = Router::new()
        .nest("/api", api_routes)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Security headers
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CONTENT_SECURITY_POLICY,
            csp_value,
        ));

    // Serve static files if directory provided
    if let Some(dir) = static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app
}

/// Start the server
pub async fn serve(
    db: Database,
    host: &str,
    port: u16,
    static_dir: Option<&str>,
    config: ServerConfig,
    settings: HearthConfig,
) -> anyhow::Result<()> {
    if !config.require_auth {
        warn!("Authentication disabled - do not expose to network!");
    } else if config.api_keys.is_empty() {
        warn!("Authentication required but no API keys configured; every request will be rejected");
    }

    let app = create_router(db, static_dir, config, settings);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn not_found(msg: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn unauthorized(msg: &str) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn service_unavailable(msg: &str) -> Self {
        Self {
            status: StatusCode::SERVICE_UNAVAILABLE,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn internal(msg: &str) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.to_string(),
            internal: None,
        }
    }

    /// Map a core error onto a client-facing status
    ///
    /// Validation and lookup failures keep their message; storage failures are
    /// logged and reported generically.
    pub fn from_core(err: hearth_core::Error) -> Self {
        use hearth_core::Error;

        match err {
            Error::InvalidData(msg) => Self::bad_request(&msg),
            Error::NotFound(msg) => Self::not_found(&msg),
            Error::Privacy(msg) => Self::unauthorized(&msg),
            Error::Agent(msg) => {
                warn!(error = %msg, "Categorization agent failed");
                Self {
                    status: StatusCode::BAD_GATEWAY,
                    message: "Categorization agent failed".to_string(),
                    internal: None,
                }
            }
            other => Self::from(other),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let err = err.into();
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            // Return generic message to client
            message: "An internal error occurred".to_string(),
            // Keep full error for logging
            internal: Some(err),
        }
    }
}
