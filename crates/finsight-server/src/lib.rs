//! Finsight Web Server
//!
//! Axum-based REST API for the Finsight personal finance assistant.
//!
//! The server holds one user's financial snapshot (loaded from a JSON
//! document directory at startup), a process-wide response cache, an
//! in-memory session registry, and an optional AI advisor. Sessions are
//! identified by the `x-session-id` header; real authentication is out of
//! scope and should be layered in front.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{header, HeaderName, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};

use finsight_core::{
    Advisor, AiClient, AiProvider, DocumentStore, FinancialData, ResponseCache, SessionManager,
};

mod handlers;

/// Header carrying the caller's session identity.
pub const SESSION_ID_HEADER: &str = "x-session-id";

/// Identity used when a request carries no session header, so anonymous
/// callers still share one conversation and cache namespace.
pub const ANONYMOUS_IDENTITY: &str = "anonymous";

/// Overall deadline for one advisor request, covering retries and backoff.
const ADVISOR_DEADLINE: Duration = Duration::from_secs(60);

/// Server configuration
#[derive(Clone, Default)]
pub struct ServerConfig {
    /// Allowed CORS origins (empty = same-origin only)
    pub allowed_origins: Vec<String>,
}

/// Shared application state
pub struct AppState {
    /// Financial snapshot loaded from the document store at startup.
    pub data: FinancialData,
    pub store: DocumentStore,
    pub cache: ResponseCache,
    pub sessions: SessionManager,
    /// None when no AI backend is configured; query endpoints degrade to 503.
    pub advisor: Option<Advisor>,
}

/// Create the application router, configuring the AI backend from the
/// environment.
pub fn create_router(store: DocumentStore, config: ServerConfig) -> Router {
    let client = AiClient::from_env();
    if let Some(ref client) = client {
        info!(model = client.model(), "AI backend configured");
    } else {
        info!("AI backend not configured (set GEMINI_API_KEY to enable AI features)");
    }
    create_router_with_client(store, config, client)
}

/// Create the application router with an explicit AI client (for testing).
pub fn create_router_with_client(
    store: DocumentStore,
    config: ServerConfig,
    client: Option<AiClient>,
) -> Router {
    let data = store.load();
    let advisor = client.map(|c| Advisor::new(c).with_timeout(ADVISOR_DEADLINE));

    let state = Arc::new(AppState {
        data,
        store,
        cache: ResponseCache::new(),
        sessions: SessionManager::new(),
        advisor,
    });

    let api_routes = Router::new()
        // Health
        .route("/health", get(handlers::health_check))
        // Permissions
        .route(
            "/permissions",
            get(handlers::get_permissions).post(handlers::update_permissions),
        )
        // Data access
        .route(
            "/data/transactions/filter",
            get(handlers::filter_transactions),
        )
        .route("/data/summary", get(handlers::financial_summary))
        .route("/data/:data_type", get(handlers::get_data))
        // Analytics
        .route("/analytics/anomalies", get(handlers::spending_anomalies))
        .route("/analytics/trends", get(handlers::spending_trends))
        .route("/analytics/forecast", get(handlers::spending_forecast))
        .route(
            "/analytics/budget-recommendations",
            get(handlers::budget_recommendations),
        )
        .route(
            "/analytics/comprehensive",
            get(handlers::comprehensive_analytics),
        )
        // AI query
        .route("/query", post(handlers::ai_query))
        // Session management
        .route("/session/init", post(handlers::init_session))
        .route("/session/status", get(handlers::session_status))
        .route("/session/clear", post(handlers::clear_session))
        // Conversation and cache admin
        .route("/conversation/history", get(handlers::conversation_history))
        .route("/conversation/clear", post(handlers::clear_conversation))
        .route("/conversation/cache/clear", post(handlers::clear_cache))
        .route("/conversation/cache/status", get(handlers::cache_status));

    // Build CORS layer
    let cors = if config.allowed_origins.is_empty() {
        CorsLayer::new()
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([
                header::CONTENT_TYPE,
                HeaderName::from_static(SESSION_ID_HEADER),
            ])
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([
                header::CONTENT_TYPE,
                HeaderName::from_static(SESSION_ID_HEADER),
            ])
    };

    Router::new()
        .nest("/api", api_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Start the server
pub async fn serve(store: DocumentStore, addr: &str, config: ServerConfig) -> anyhow::Result<()> {
    let loaded = store.loaded_document_count();
    if loaded == 0 {
        warn!(dir = %store.data_dir().display(), "No financial documents found in data directory");
    } else {
        info!(loaded, "Financial documents loaded");
    }

    let app = create_router(store, config);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
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

    pub fn service_unavailable(msg: &str) -> Self {
        Self {
            status: StatusCode::SERVICE_UNAVAILABLE,
            message: msg.to_string(),
            internal: None,
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
            internal: Some(err),
        }
    }
}
