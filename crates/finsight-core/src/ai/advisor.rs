//! AI request orchestration
//!
//! Wraps the provider call with bounded retry on rate-limiting and turns
//! failures into user-facing advisory strings. Backoff runs on the async
//! runtime (`tokio::time::sleep`), so a rate-limited request never blocks a
//! worker thread and an overall deadline can cancel the whole attempt chain.

use std::time::Duration;

use tracing::{info, warn};

use crate::error::ProviderError;

use super::{AiClient, AiProvider};

/// Total generate attempts before giving up on a rate-limited provider.
pub const MAX_RETRIES: u32 = 3;

/// Returned when retries were exhausted under rate-limiting.
pub const RATE_LIMIT_MESSAGE: &str =
    "AI service rate limit exceeded. Please wait a few minutes before trying again.";

/// Returned when the provider produced empty content.
pub const EMPTY_RESPONSE_MESSAGE: &str = "Sorry, no response from AI now.";

const MODEL_UNAVAILABLE_MESSAGE: &str = "AI model configuration error: The selected model is not available. Please check your API configuration.";

const ACCESS_DENIED_MESSAGE: &str =
    "AI service access denied: Please verify your API key permissions.";

/// Orchestrates provider calls: retry with exponential backoff on
/// rate-limiting, immediate propagation of everything else.
pub struct Advisor {
    client: AiClient,
    max_retries: u32,
    /// Optional overall deadline across all attempts and backoff sleeps.
    timeout: Option<Duration>,
}

impl Advisor {
    pub fn new(client: AiClient) -> Self {
        Self {
            client,
            max_retries: MAX_RETRIES,
            timeout: None,
        }
    }

    /// Impose an overall request deadline. Expiry cancels any in-flight
    /// attempt or backoff sleep.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[cfg(test)]
    fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn model(&self) -> &str {
        self.client.model()
    }

    /// Ask the provider for advice text.
    ///
    /// `Ok` values are final response texts safe to cache: real answers, the
    /// empty-content fallback, and the rate-limit advisory after exhausted
    /// retries. `Err` carries non-retryable provider failures for the caller
    /// to classify with [`classify_provider_error`] (and not cache).
    pub async fn ask(&self, prompt: &str) -> Result<String, ProviderError> {
        match self.timeout {
            Some(deadline) => tokio::time::timeout(deadline, self.ask_with_retry(prompt))
                .await
                .unwrap_or_else(|_| {
                    warn!("AI request deadline exceeded");
                    Err(ProviderError::Other("request deadline exceeded".to_string()))
                }),
            None => self.ask_with_retry(prompt).await,
        }
    }

    async fn ask_with_retry(&self, prompt: &str) -> Result<String, ProviderError> {
        for attempt in 0..self.max_retries {
            match self.client.generate(prompt).await {
                Ok(text) if text.trim().is_empty() => {
                    return Ok(EMPTY_RESPONSE_MESSAGE.to_string());
                }
                Ok(text) => return Ok(text),
                Err(ProviderError::RateLimited) => {
                    warn!(attempt = attempt + 1, "AI request rate limited");
                    if attempt + 1 < self.max_retries {
                        // Exponential backoff: 2^attempt seconds.
                        let wait = Duration::from_secs(1 << attempt);
                        info!(wait_secs = wait.as_secs(), "Backing off before retry");
                        tokio::time::sleep(wait).await;
                    } else {
                        return Ok(RATE_LIMIT_MESSAGE.to_string());
                    }
                }
                Err(err) => {
                    warn!(error = %err, "AI request failed, not retrying");
                    return Err(err);
                }
            }
        }
        // max_retries == 0; treat like exhausted retries.
        Ok(RATE_LIMIT_MESSAGE.to_string())
    }
}

/// Classify a non-retryable provider failure into a user-facing message.
///
/// These messages travel in a 200-shaped response body; callers must not
/// cache them.
pub fn classify_provider_error(err: &ProviderError) -> String {
    match err {
        ProviderError::NotFound => MODEL_UNAVAILABLE_MESSAGE.to_string(),
        ProviderError::Forbidden => ACCESS_DENIED_MESSAGE.to_string(),
        ProviderError::RateLimited => RATE_LIMIT_MESSAGE.to_string(),
        ProviderError::Other(msg) => {
            format!("Technical difficulties with AI service: {}", msg)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::MockProvider;
    use tokio::time::Instant;

    fn advisor_with(mock: MockProvider) -> Advisor {
        Advisor::new(AiClient::Mock(mock))
    }

    #[tokio::test]
    async fn test_success_on_first_attempt() {
        let mock = MockProvider::with_script(vec![Ok("advice".to_string())]);
        let advisor = advisor_with(mock.clone());
        assert_eq!(advisor.ask("q").await.unwrap(), "advice");
        assert_eq!(mock.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_retries_with_doubling_backoff() {
        let mock = MockProvider::with_script(vec![
            Err(ProviderError::RateLimited),
            Err(ProviderError::RateLimited),
            Ok("third time lucky".to_string()),
        ]);
        let advisor = advisor_with(mock.clone());

        let start = Instant::now();
        let response = advisor.ask("q").await.unwrap();
        let elapsed = start.elapsed();

        assert_eq!(response, "third time lucky");
        assert_eq!(mock.calls(), 3);
        // Two backoff sleeps: 1s after the first failure, 2s after the
        // second. Paused time advances exactly through the sleeps.
        assert_eq!(elapsed.as_secs(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_exhaustion_returns_advisory() {
        let mock = MockProvider::with_script(vec![
            Err(ProviderError::RateLimited),
            Err(ProviderError::RateLimited),
            Err(ProviderError::RateLimited),
        ]);
        let advisor = advisor_with(mock.clone());

        let response = advisor.ask("q").await.unwrap();
        assert_eq!(response, RATE_LIMIT_MESSAGE);
        // No fourth attempt.
        assert_eq!(mock.calls(), 3);
    }

    #[tokio::test]
    async fn test_non_retryable_error_propagates_immediately() {
        let mock = MockProvider::with_script(vec![Err(ProviderError::Forbidden)]);
        let advisor = advisor_with(mock.clone());

        let err = advisor.ask("q").await.unwrap_err();
        assert_eq!(err, ProviderError::Forbidden);
        assert_eq!(mock.calls(), 1);
    }

    #[tokio::test]
    async fn test_empty_response_falls_back() {
        let mock = MockProvider::with_script(vec![Ok("   ".to_string())]);
        let advisor = advisor_with(mock);
        assert_eq!(advisor.ask("q").await.unwrap(), EMPTY_RESPONSE_MESSAGE);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_cancels_retry_chain() {
        let mock = MockProvider::with_script(vec![
            Err(ProviderError::RateLimited),
            Err(ProviderError::RateLimited),
            Ok("too late".to_string()),
        ]);
        // Deadline expires during the second backoff sleep (1s + 2s > 2.5s).
        let advisor = advisor_with(mock.clone()).with_timeout(Duration::from_millis(2500));

        let err = advisor.ask("q").await.unwrap_err();
        assert!(matches!(err, ProviderError::Other(ref msg) if msg.contains("deadline")));
        assert_eq!(mock.calls(), 2);
    }

    #[tokio::test]
    async fn test_zero_retries_degrades_to_advisory() {
        let mock = MockProvider::with_script(vec![Ok("unused".to_string())]);
        let advisor = advisor_with(mock.clone()).with_max_retries(0);
        assert_eq!(advisor.ask("q").await.unwrap(), RATE_LIMIT_MESSAGE);
        assert_eq!(mock.calls(), 0);
    }

    #[test]
    fn test_error_classification() {
        assert!(classify_provider_error(&ProviderError::NotFound).contains("not available"));
        assert!(classify_provider_error(&ProviderError::Forbidden).contains("access denied"));
        assert_eq!(
            classify_provider_error(&ProviderError::RateLimited),
            RATE_LIMIT_MESSAGE
        );
        assert!(
            classify_provider_error(&ProviderError::Other("socket closed".to_string()))
                .contains("socket closed")
        );
    }
}
