//! Mock provider for testing
//!
//! Returns a canned response by default, or replays a scripted sequence of
//! outcomes. Call counts are recorded so tests can assert retry behavior.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::ProviderError;

use super::AiProvider;

/// Mock AI provider.
///
/// Clones share the same script and call counter, so a test can hand one
/// clone to the advisor and keep another for assertions.
#[derive(Clone, Default)]
pub struct MockProvider {
    inner: Arc<MockInner>,
}

#[derive(Default)]
struct MockInner {
    script: Mutex<VecDeque<Result<String, ProviderError>>>,
    calls: AtomicUsize,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with a scripted sequence of outcomes, replayed in order. Once
    /// the script runs out, the default canned response is returned.
    pub fn with_script(outcomes: Vec<Result<String, ProviderError>>) -> Self {
        Self {
            inner: Arc::new(MockInner {
                script: Mutex::new(outcomes.into()),
                calls: AtomicUsize::new(0),
            }),
        }
    }

    /// How many times `generate` has been called.
    pub fn calls(&self) -> usize {
        self.inner.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AiProvider for MockProvider {
    async fn generate(&self, _prompt: &str) -> Result<String, ProviderError> {
        self.inner.calls.fetch_add(1, Ordering::SeqCst);
        let scripted = self
            .inner
            .script
            .lock()
            .expect("mock script mutex poisoned")
            .pop_front();
        match scripted {
            Some(outcome) => outcome,
            None => Ok("• Mock financial advice".to_string()),
        }
    }

    fn model(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_default_response() {
        let mock = MockProvider::new();
        let text = mock.generate("anything").await.unwrap();
        assert!(text.contains("Mock"));
        assert_eq!(mock.calls(), 1);
    }

    #[tokio::test]
    async fn test_script_replays_in_order() {
        let mock = MockProvider::with_script(vec![
            Err(ProviderError::RateLimited),
            Ok("second".to_string()),
        ]);
        assert_eq!(
            mock.generate("q").await.unwrap_err(),
            ProviderError::RateLimited
        );
        assert_eq!(mock.generate("q").await.unwrap(), "second");
        // Script exhausted: back to the canned response.
        assert!(mock.generate("q").await.is_ok());
        assert_eq!(mock.calls(), 3);
    }
}
