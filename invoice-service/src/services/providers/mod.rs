//! LLM provider abstractions and implementations.
//!
//! One capability — send a prompt, get raw text back — with two
//! interchangeable backends (Gemini, Groq) plus a mock for tests.

pub mod gemini;
pub mod groq;
pub mod mock;

pub use gemini::{GeminiConfig, GeminiProvider};
pub use groq::{GroqConfig, GroqProvider};
pub use mock::MockTextProvider;

use crate::config::ProviderConfig;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Error type for provider operations.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Empty response from provider")]
    EmptyResponse,
}

/// The caller-selectable model backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Gemini,
    Groq,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Gemini => "gemini",
            ProviderKind::Groq => "groq",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A text completion backend. Request shaping (model name, temperature,
/// message roles) is each implementation's own business; the output contract
/// is a single text blob expected to contain one JSON object, possibly
/// surrounded by other text.
#[async_trait]
pub trait TextProvider: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, ProviderError>;

    fn name(&self) -> &'static str;
}

/// Provider handles, built once at startup. A provider is present only when
/// its API key is configured; selecting an absent one fails instead of
/// crashing at startup or initializing lazily behind the caller's back.
pub struct ProviderRegistry {
    gemini: Option<Arc<dyn TextProvider>>,
    groq: Option<Arc<dyn TextProvider>>,
}

impl ProviderRegistry {
    pub fn new(
        gemini: Option<Arc<dyn TextProvider>>,
        groq: Option<Arc<dyn TextProvider>>,
    ) -> Self {
        Self { gemini, groq }
    }

    pub fn from_config(config: &ProviderConfig) -> Self {
        let gemini = config.gemini_api_key.as_ref().map(|key| {
            tracing::info!(model = %config.gemini_model, "Gemini provider configured");
            Arc::new(GeminiProvider::new(GeminiConfig {
                api_key: key.clone(),
                model: config.gemini_model.clone(),
            })) as Arc<dyn TextProvider>
        });
        if gemini.is_none() {
            tracing::warn!("GEMINI_API_KEY not set; gemini extraction disabled");
        }

        let groq = config.groq_api_key.as_ref().map(|key| {
            tracing::info!(model = %config.groq_model, "Groq provider configured");
            Arc::new(GroqProvider::new(GroqConfig {
                api_key: key.clone(),
                model: config.groq_model.clone(),
            })) as Arc<dyn TextProvider>
        });
        if groq.is_none() {
            tracing::warn!("GROQ_API_KEY not set; groq extraction disabled");
        }

        Self::new(gemini, groq)
    }

    pub fn select(&self, kind: ProviderKind) -> Result<Arc<dyn TextProvider>, ProviderError> {
        let provider = match kind {
            ProviderKind::Gemini => self.gemini.as_ref(),
            ProviderKind::Groq => self.groq.as_ref(),
        };
        provider.cloned().ok_or_else(|| {
            ProviderError::NotConfigured(format!("{} API key not configured", kind))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selecting_an_absent_provider_fails_with_not_configured() {
        let registry = ProviderRegistry::new(None, None);
        let err = registry.select(ProviderKind::Gemini).err().unwrap();
        assert!(matches!(err, ProviderError::NotConfigured(_)));
        assert!(err.to_string().contains("gemini"));
    }

    #[tokio::test]
    async fn selecting_a_present_provider_returns_it() {
        let mock = Arc::new(MockTextProvider::with_response("hello"));
        let registry = ProviderRegistry::new(None, Some(mock));
        let provider = registry.select(ProviderKind::Groq).unwrap();
        assert_eq!(provider.complete("hi").await.unwrap(), "hello");
    }

    #[test]
    fn provider_kind_serde_uses_lowercase() {
        assert_eq!(
            serde_json::from_str::<ProviderKind>("\"gemini\"").unwrap(),
            ProviderKind::Gemini
        );
        assert_eq!(serde_json::to_string(&ProviderKind::Groq).unwrap(), "\"groq\"");
    }
}
