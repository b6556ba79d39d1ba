//! Finsight server binary
//!
//! Environment:
//!   FINSIGHT_DATA_DIR   Directory holding the six JSON documents (default: data)
//!   FINSIGHT_ADDR       Listen address (default: 127.0.0.1:8000)
//!   FINSIGHT_ORIGINS    Comma-separated allowed CORS origins (default: none)
//!   GEMINI_API_KEY      Enables the Gemini advisor when set
//!   RUST_LOG            Log filter (default: info)

use anyhow::Result;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use finsight_core::DocumentStore;
use finsight_server::{serve, ServerConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let data_dir = std::env::var("FINSIGHT_DATA_DIR").unwrap_or_else(|_| "data".to_string());
    let addr = std::env::var("FINSIGHT_ADDR").unwrap_or_else(|_| "127.0.0.1:8000".to_string());
    let allowed_origins = std::env::var("FINSIGHT_ORIGINS")
        .map(|s| {
            s.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default();

    let store = DocumentStore::new(data_dir);
    let config = ServerConfig { allowed_origins };

    serve(store, &addr, config).await
}
