//! Finsight Core Library
//!
//! Shared functionality for the Finsight personal finance assistant:
//! - Financial document store backed by JSON files
//! - Transaction analytics (summaries, anomalies, trends, forecasts, budgets)
//! - Per-session permission gating over data categories
//! - AI advisor with pluggable providers, retry, and response caching

pub mod ai;
pub mod analytics;
pub mod cache;
pub mod error;
pub mod models;
pub mod session;
pub mod store;

pub use ai::{
    build_prompt, classify_provider_error, Advisor, AiClient, AiProvider, GeminiProvider,
    MockProvider, EMPTY_RESPONSE_MESSAGE, RATE_LIMIT_MESSAGE,
};
pub use analytics::{
    analyze_trends, detect_anomalies, filter_by_timeframe, forecast_spending, recommend_budget,
    summarize, AnomalyReport, BudgetReport, FinancialHealth, ForecastReport, SpendingSummary,
    Timeframe, TrendReport,
};
pub use cache::{CacheKey, CacheStatus, ResponseCache};
pub use error::{Error, ProviderError, Result};
pub use models::{
    ConversationEntry, DataType, FinancialData, NetWorth, Permissions, Transaction,
};
pub use session::{Session, SessionManager};
pub use store::DocumentStore;
