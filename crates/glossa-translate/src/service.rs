//! The translation service boundary.
//!
//! The engine only ever sees the [`Translator`] trait and its typed failure
//! set; concrete backends live behind it.

use async_trait::async_trait;

use glossa_core::error::GlossaError;
use glossa_core::types::{Translation, TranslationRequest};

/// Typed failures a translation backend can produce.
///
/// Each variant maps 1:1 to a user-facing message via
/// [`user_message`](TranslateError::user_message). Failures are never
/// retried automatically; a repeated keypress is the only retry mechanism.
#[derive(Debug, thiserror::Error)]
pub enum TranslateError {
    #[error("No API credential configured")]
    NoCredential,
    #[error("Network error: {0}")]
    Network(String),
    #[error("Invalid response from translation backend: {0}")]
    InvalidResponse(String),
    #[error("Rate limit exceeded")]
    RateLimited,
    #[error("Text too long: {chars} characters exceeds limit of {limit}")]
    TextTooLong { chars: usize, limit: usize },
}

impl TranslateError {
    /// The message shown to the user when a sequence fails.
    pub fn user_message(&self) -> String {
        match self {
            TranslateError::NoCredential => {
                "No API key configured. Set one to translate.".to_string()
            }
            TranslateError::Network(_) => "Translation failed: network error.".to_string(),
            TranslateError::InvalidResponse(_) => {
                "Translation failed: unexpected response from the backend.".to_string()
            }
            TranslateError::RateLimited => {
                "Translation rate limit reached. Try again shortly.".to_string()
            }
            TranslateError::TextTooLong { .. } => {
                "The selection is too long to translate.".to_string()
            }
        }
    }
}

impl From<TranslateError> for GlossaError {
    fn from(err: TranslateError) -> Self {
        GlossaError::Translation(err.to_string())
    }
}

/// A backend that translates text asynchronously.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(
        &self,
        request: &TranslationRequest,
    ) -> Result<Translation, TranslateError>;
}
