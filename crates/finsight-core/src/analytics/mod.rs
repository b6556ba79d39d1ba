//! Transaction analytics engine
//!
//! Descriptive statistics over a user's transaction history. Every function
//! here is pure: it takes a transaction slice and returns a serializable
//! report. Insufficient-data conditions come back as structured results, not
//! errors, so the API layer can pass them through unchanged.

mod anomaly;
mod budget;
mod filter;
mod forecast;
mod summary;
mod trends;

pub use anomaly::{detect_anomalies, AnomalousTransaction, AnomalyReport};
pub use budget::{
    recommend_budget, BudgetRecommendation, BudgetReport, BudgetStatus, FinancialHealth,
};
pub use filter::{filter_by_timeframe, Timeframe};
pub use forecast::{forecast_spending, Confidence, DataQuality, ForecastReport, MonthForecast};
pub use summary::{summarize, SpendingSummary};
pub use trends::{analyze_trends, CategoryTrend, OverallTrend, TrendDirection, TrendReport};
