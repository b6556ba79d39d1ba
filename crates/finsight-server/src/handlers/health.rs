//! Health check handler

use std::sync::Arc;

use axum::{extract::State, Json};
use chrono::Utc;

use crate::AppState;

/// GET /api/health - Service health and configuration readout
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let ai_service = match &state.advisor {
        Some(advisor) => format!("available ({})", advisor.model()),
        None => "unavailable".to_string(),
    };

    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339(),
        "ai_service": ai_service,
        "data_files_loaded": state.store.loaded_document_count(),
        "version": "1.0.0",
        "enhanced_analytics": "enabled"
    }))
}
