//! Mock provider implementation for testing.

use super::{ProviderError, TextProvider};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Canned-response text provider that records how often it was invoked.
pub struct MockTextProvider {
    response: Mutex<Result<String, ProviderError>>,
    calls: AtomicUsize,
}

impl MockTextProvider {
    pub fn with_response(response: &str) -> Self {
        Self {
            response: Mutex::new(Ok(response.to_string())),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_error(error: ProviderError) -> Self {
        Self {
            response: Mutex::new(Err(error)),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of `complete` invocations so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextProvider for MockTextProvider {
    async fn complete(&self, _prompt: &str) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &*self.response.lock().unwrap() {
            Ok(text) => Ok(text.clone()),
            Err(ProviderError::NotConfigured(msg)) => {
                Err(ProviderError::NotConfigured(msg.clone()))
            }
            Err(ProviderError::ApiError(msg)) => Err(ProviderError::ApiError(msg.clone())),
            Err(ProviderError::NetworkError(msg)) => Err(ProviderError::NetworkError(msg.clone())),
            Err(ProviderError::RateLimited) => Err(ProviderError::RateLimited),
            Err(ProviderError::EmptyResponse) => Err(ProviderError::EmptyResponse),
        }
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
