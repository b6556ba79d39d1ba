//! Session, conversation, and cache admin handlers

use std::sync::Arc;

use axum::{extract::State, http::HeaderMap, Json};
use serde_json::Value;
use tracing::info;

use finsight_core::CacheStatus;

use crate::{AppError, AppState};

use super::session_identity;

/// POST /api/session/init - Create a fresh session
///
/// Returns the new session id; the client sends it back in `x-session-id` on
/// subsequent requests.
pub async fn init_session(State(state): State<Arc<AppState>>) -> Json<Value> {
    let session = state.sessions.init();

    Json(serde_json::json!({
        "session_id": session.id,
        "permissions": session.permissions,
        "created_at": session.created_at
    }))
}

/// GET /api/session/status - Current session readout
pub async fn session_status(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Value>, AppError> {
    let identity = session_identity(&headers);
    let session = state
        .sessions
        .get(&identity)
        .ok_or_else(|| AppError::not_found("No active session"))?;

    Ok(Json(serde_json::json!({
        "session_id": session.id,
        "permissions": session.permissions,
        "conversation_count": session.conversation.len(),
        "created_at": session.created_at,
        "ai_available": state.advisor.is_some()
    })))
}

/// POST /api/session/clear - Drop the caller's session entirely
pub async fn clear_session(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Json<Value> {
    let identity = session_identity(&headers);
    state.sessions.clear(&identity);

    Json(serde_json::json!({ "message": "Session cleared successfully" }))
}

/// GET /api/conversation/history - Full conversation, oldest first
pub async fn conversation_history(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Json<Value> {
    let identity = session_identity(&headers);
    let history = state.sessions.conversation(&identity);

    Json(serde_json::json!({
        "conversation_history": history,
        "count": history.len()
    }))
}

/// POST /api/conversation/clear - Forget the conversation, keep the session
pub async fn clear_conversation(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Json<Value> {
    let identity = session_identity(&headers);
    state.sessions.clear_conversation(&identity);
    info!(session = %identity, "Conversation history cleared");

    Json(serde_json::json!({ "message": "Conversation history cleared successfully" }))
}

/// POST /api/conversation/cache/clear - Drop every cached AI response
pub async fn clear_cache(State(state): State<Arc<AppState>>) -> Json<Value> {
    let removed = state.cache.clear();

    Json(serde_json::json!({
        "message": format!("Response cache cleared successfully ({} entries removed)", removed)
    }))
}

/// GET /api/conversation/cache/status - Cache size and sample keys
pub async fn cache_status(State(state): State<Arc<AppState>>) -> Json<CacheStatus> {
    Json(state.cache.status())
}
