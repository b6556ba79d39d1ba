//! AI query handler
//!
//! The full advisor pipeline: cache consult, prompt assembly from the
//! permitted documents and recent conversation, advisor call with retry, and
//! conversation append. Degraded advisories travel in the same 200-shaped
//! response body as real answers; only real answers and retry-exhausted
//! advisories are cached.

use std::sync::Arc;

use axum::{extract::State, http::HeaderMap, Json};
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;
use tracing::{error, info};

use finsight_core::{build_prompt, classify_provider_error, CacheKey};

use crate::{AppError, AppState};

use super::session_identity;

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    #[serde(default)]
    pub query: Option<String>,
}

/// POST /api/query - Ask the AI advisor a question
pub async fn ai_query(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<QueryRequest>,
) -> Result<Json<Value>, AppError> {
    let Some(query) = payload.query else {
        return Err(AppError::bad_request("Query is required"));
    };
    let query = query.trim().to_string();
    if query.is_empty() {
        return Err(AppError::bad_request("Query cannot be empty"));
    }

    let Some(advisor) = &state.advisor else {
        return Err(AppError::service_unavailable(
            "AI service not available. Please check GEMINI_API_KEY configuration and available models.",
        ));
    };

    let identity = session_identity(&headers);
    let perms = state.sessions.permissions(&identity);
    let context_used = perms.allowed_sources();
    let cache_key = CacheKey::new(&identity, &query, &context_used);

    let response = match state.cache.get(&cache_key) {
        Some(cached) => cached,
        None => {
            let data = state.data.filtered(&perms);
            let history = state.sessions.recent_turns(&identity);
            let prompt = build_prompt(&query, &data, &history);

            match advisor.ask(&prompt).await {
                Ok(text) => {
                    state.cache.put(cache_key, text.clone());
                    text
                }
                Err(err) => {
                    error!(error = %err, "AI provider error");
                    classify_provider_error(&err)
                }
            }
        }
    };

    state.sessions.append_turn(&identity, &query, &response);
    info!(
        session = %identity,
        query = %query.chars().take(50).collect::<String>(),
        "AI query processed"
    );

    Ok(Json(serde_json::json!({
        "response": response,
        "timestamp": Utc::now().to_rfc3339(),
        "context_used": context_used
    })))
}
