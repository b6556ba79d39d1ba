//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area.

pub mod analytics;
pub mod data;
pub mod health;
pub mod query;
pub mod session;

// Re-export all handlers for use in router
pub use analytics::*;
pub use data::*;
pub use health::*;
pub use query::*;
pub use session::*;

use axum::http::HeaderMap;

use crate::{ANONYMOUS_IDENTITY, SESSION_ID_HEADER};

/// Resolve the caller's session identity from request headers.
pub fn session_identity(headers: &HeaderMap) -> String {
    headers
        .get(SESSION_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .unwrap_or(ANONYMOUS_IDENTITY)
        .to_string()
}
