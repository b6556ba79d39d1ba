//! Analytics handlers
//!
//! Each endpoint runs a pure analysis from `finsight_core::analytics` over
//! the caller's permitted transactions. Insufficient-data outcomes are
//! descriptive 200 responses; only a missing transactions document is a 400.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    Json,
};
use serde::Deserialize;
use serde_json::Value;

use finsight_core::{
    analyze_trends, detect_anomalies, forecast_spending, recommend_budget, summarize, Transaction,
};

use crate::{AppError, AppState};

use super::session_identity;

/// Default number of months to forecast ahead.
const DEFAULT_FORECAST_MONTHS: u32 = 3;

/// The caller's permitted transactions, or a 400 when the transactions
/// document is denied or absent.
fn permitted_transactions(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<Vec<Transaction>, AppError> {
    let identity = session_identity(headers);
    let perms = state.sessions.permissions(&identity);
    let filtered = state.data.filtered(&perms);

    if filtered.transactions.get("transactions").is_none() {
        return Err(AppError::bad_request("No transaction data available"));
    }
    Ok(filtered.transaction_list())
}

/// GET /api/analytics/anomalies - Detect unusual spending
pub async fn spending_anomalies(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Value>, AppError> {
    let transactions = permitted_transactions(&state, &headers)?;
    Ok(Json(serde_json::to_value(detect_anomalies(&transactions))?))
}

/// GET /api/analytics/trends - Analyze spending trends
pub async fn spending_trends(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Value>, AppError> {
    let transactions = permitted_transactions(&state, &headers)?;
    Ok(Json(serde_json::to_value(analyze_trends(&transactions))?))
}

#[derive(Debug, Deserialize)]
pub struct ForecastQuery {
    #[serde(default)]
    pub months: Option<u32>,
}

/// GET /api/analytics/forecast - Forecast future spending
pub async fn spending_forecast(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<ForecastQuery>,
) -> Result<Json<Value>, AppError> {
    let months = params.months.unwrap_or(DEFAULT_FORECAST_MONTHS);
    let transactions = permitted_transactions(&state, &headers)?;
    Ok(Json(serde_json::to_value(forecast_spending(
        &transactions,
        months,
    ))?))
}

/// GET /api/analytics/budget-recommendations - Budget recommendations
pub async fn budget_recommendations(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Value>, AppError> {
    let transactions = permitted_transactions(&state, &headers)?;
    Ok(Json(serde_json::to_value(recommend_budget(&transactions))?))
}

/// GET /api/analytics/comprehensive - All analytics in one call
pub async fn comprehensive_analytics(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Value>, AppError> {
    let transactions = permitted_transactions(&state, &headers)?;

    Ok(Json(serde_json::json!({
        "anomalies": detect_anomalies(&transactions),
        "forecast": forecast_spending(&transactions, DEFAULT_FORECAST_MONTHS),
        "trends": analyze_trends(&transactions),
        "budget_recommendations": recommend_budget(&transactions),
        "summary": summarize(&transactions)
    })))
}
