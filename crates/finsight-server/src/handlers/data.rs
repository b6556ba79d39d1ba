//! Data access handlers - permissions, raw documents, filtered transactions,
//! and the dashboard summary.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use finsight_core::{filter_by_timeframe, summarize, DataType, Permissions, Timeframe};

use crate::{AppError, AppState};

use super::session_identity;

/// Partial permission update; absent fields keep their current value.
#[derive(Debug, Default, Deserialize)]
pub struct PermissionsUpdate {
    pub assets: Option<bool>,
    pub liabilities: Option<bool>,
    pub transactions: Option<bool>,
    pub epf: Option<bool>,
    pub credit_score: Option<bool>,
    pub investments: Option<bool>,
}

impl PermissionsUpdate {
    fn apply(&self, perms: &mut Permissions) {
        let fields = [
            (DataType::Assets, self.assets),
            (DataType::Liabilities, self.liabilities),
            (DataType::Transactions, self.transactions),
            (DataType::Epf, self.epf),
            (DataType::CreditScore, self.credit_score),
            (DataType::Investments, self.investments),
        ];
        for (dt, update) in fields {
            if let Some(allowed) = update {
                perms.set(dt, allowed);
            }
        }
    }
}

/// GET /api/permissions - Current permission set for the caller's session
pub async fn get_permissions(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Json<Permissions> {
    let identity = session_identity(&headers);
    Json(state.sessions.permissions(&identity))
}

/// POST /api/permissions - Update permissions; returns the resulting set
pub async fn update_permissions(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(update): Json<PermissionsUpdate>,
) -> Json<Permissions> {
    let identity = session_identity(&headers);
    let perms = state
        .sessions
        .update_permissions(&identity, |p| update.apply(p));
    debug!(session = %identity, "Permissions updated");
    Json(perms)
}

/// GET /api/data/:data_type - One raw document, permission-filtered
pub async fn get_data(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(data_type): Path<String>,
) -> Result<Json<Value>, AppError> {
    let data_type: DataType = data_type
        .parse()
        .map_err(|_| AppError::bad_request("Invalid data type"))?;

    let identity = session_identity(&headers);
    let perms = state.sessions.permissions(&identity);

    if perms.allows(data_type) {
        Ok(Json(state.data.get(data_type).clone()))
    } else {
        Ok(Json(Value::Object(Default::default())))
    }
}

#[derive(Debug, Deserialize)]
pub struct TimeframeQuery {
    #[serde(default)]
    pub timeframe: Option<String>,
}

/// GET /api/data/transactions/filter - Transactions within a timeframe
pub async fn filter_transactions(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<TimeframeQuery>,
) -> Result<Json<Value>, AppError> {
    let timeframe: Timeframe = params
        .timeframe
        .as_deref()
        .unwrap_or("all")
        .parse()
        .map_err(|_| AppError::bad_request("Invalid timeframe"))?;

    let identity = session_identity(&headers);
    let perms = state.sessions.permissions(&identity);
    let filtered = state.data.filtered(&perms);

    if filtered.transactions.get("transactions").is_none() {
        return Ok(Json(serde_json::json!({ "transactions": [] })));
    }

    let transactions = filter_by_timeframe(&filtered.transaction_list(), timeframe);

    Ok(Json(serde_json::json!({
        "transactions": transactions,
        "timeframe": timeframe.as_str()
    })))
}

/// GET /api/data/summary - Dashboard summary across permitted documents
pub async fn financial_summary(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Json<Value> {
    let identity = session_identity(&headers);
    let perms = state.sessions.permissions(&identity);
    let data = state.data.filtered(&perms);

    let mut summary = serde_json::Map::new();

    if has_content(&data.assets) && has_content(&data.liabilities) {
        summary.insert(
            "net_worth".to_string(),
            serde_json::to_value(data.net_worth()).unwrap_or(Value::Null),
        );
    }

    let transactions = data.transaction_list();
    if data.transactions.get("transactions").is_some() {
        summary.insert(
            "spending".to_string(),
            serde_json::to_value(summarize(&transactions)).unwrap_or(Value::Null),
        );
    }

    if let Some(portfolio) = data.investments.get("portfolio") {
        summary.insert("investments".to_string(), portfolio.clone());
    }

    // Frontend dashboard metrics over the trailing 30 days.
    let recent = filter_by_timeframe(&transactions, Timeframe::LastMonth);
    let monthly_income: f64 = recent.iter().filter(|t| t.is_income()).map(|t| t.amount).sum();
    let monthly_expenses: f64 = recent
        .iter()
        .filter(|t| t.is_expense())
        .map(|t| t.amount.abs())
        .sum();
    let savings_rate = if monthly_income > 0.0 {
        ((monthly_income - monthly_expenses) / monthly_income * 100.0 * 10.0).round() / 10.0
    } else {
        0.0
    };
    let credit_score = data
        .credit_score
        .get("current_score")
        .cloned()
        .unwrap_or(Value::Null);

    summary.insert("monthlyIncome".to_string(), monthly_income.into());
    summary.insert("monthlyExpenses".to_string(), monthly_expenses.into());
    summary.insert("savingsRate".to_string(), savings_rate.into());
    summary.insert("creditScore".to_string(), credit_score);

    Json(Value::Object(summary))
}

fn has_content(doc: &Value) -> bool {
    doc.as_object().map(|o| !o.is_empty()).unwrap_or(false)
}
