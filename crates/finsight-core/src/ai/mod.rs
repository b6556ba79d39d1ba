//! Pluggable AI provider abstraction
//!
//! Backend-agnostic interface for text generation. The provider boundary is
//! where transport failures become typed [`ProviderError`] variants; nothing
//! above this layer inspects error message text.
//!
//! # Configuration
//!
//! Environment variables:
//! - `AI_BACKEND`: Backend to use (gemini, mock). Default: gemini
//! - `GEMINI_API_KEY`: API key (required for the gemini backend)
//! - `GEMINI_MODEL`: Model name (default: gemini-1.5-flash)

pub mod advisor;
mod gemini;
mod mock;
pub mod prompt;

pub use advisor::{
    classify_provider_error, Advisor, EMPTY_RESPONSE_MESSAGE, RATE_LIMIT_MESSAGE,
};
pub use gemini::GeminiProvider;
pub use mock::MockProvider;
pub use prompt::build_prompt;

use async_trait::async_trait;

use crate::error::ProviderError;

/// Trait defining the interface for AI providers.
///
/// `generate` is the single capability the advisor needs: prompt in, text
/// out, with failures classified at this boundary.
#[async_trait]
pub trait AiProvider: Send + Sync {
    /// Generate advice text for a prompt.
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError>;

    /// Get the model name (for logging and the health endpoint).
    fn model(&self) -> &str;
}

/// Concrete AI client enum.
///
/// Provides Clone and compile-time dispatch without `Box<dyn>` overhead.
#[derive(Clone)]
pub enum AiClient {
    /// Google Gemini REST backend
    Gemini(GeminiProvider),
    /// Mock backend for testing
    Mock(MockProvider),
}

impl AiClient {
    /// Create an AI client from environment variables.
    ///
    /// Returns None when the selected backend is not configured; AI features
    /// are disabled in that case rather than failing startup.
    pub fn from_env() -> Option<Self> {
        let backend = std::env::var("AI_BACKEND").unwrap_or_else(|_| "gemini".to_string());

        match backend.to_lowercase().as_str() {
            "gemini" => GeminiProvider::from_env().map(AiClient::Gemini),
            "mock" => Some(AiClient::Mock(MockProvider::new())),
            _ => {
                tracing::warn!(backend = %backend, "Unknown AI_BACKEND, falling back to gemini");
                GeminiProvider::from_env().map(AiClient::Gemini)
            }
        }
    }

    /// Create a mock backend for testing.
    pub fn mock() -> Self {
        AiClient::Mock(MockProvider::new())
    }
}

#[async_trait]
impl AiProvider for AiClient {
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        match self {
            AiClient::Gemini(p) => p.generate(prompt).await,
            AiClient::Mock(p) => p.generate(prompt).await,
        }
    }

    fn model(&self) -> &str {
        match self {
            AiClient::Gemini(p) => p.model(),
            AiClient::Mock(p) => p.model(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_client_model() {
        let client = AiClient::mock();
        assert_eq!(client.model(), "mock");
    }

    #[tokio::test]
    async fn test_mock_client_generates() {
        let client = AiClient::mock();
        let text = client.generate("hello").await.unwrap();
        assert!(!text.is_empty());
    }
}
