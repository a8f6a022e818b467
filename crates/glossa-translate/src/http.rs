//! HTTP translation backend.
//!
//! Talks to a Google-v2-shaped translate endpoint: POST `{q, target,
//! format}` with a bearer key, response
//! `{data: {translations: [{translatedText, detectedSourceLanguage}]}}`.
//! The endpoint URL, timeout, and client-side length bound come from
//! [`TranslatorConfig`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use glossa_core::config::TranslatorConfig;
use glossa_core::error::{GlossaError, Result};
use glossa_core::types::{Translation, TranslationRequest};

use crate::credential::CredentialStore;
use crate::service::{TranslateError, Translator};

#[derive(Serialize)]
struct TranslateBody<'a> {
    q: &'a str,
    target: &'a str,
    format: &'a str,
}

#[derive(Deserialize)]
struct ApiResponse {
    data: ApiData,
}

#[derive(Deserialize)]
struct ApiData {
    translations: Vec<ApiTranslation>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiTranslation {
    translated_text: String,
    #[serde(default)]
    detected_source_language: Option<String>,
}

/// Map a non-success HTTP status to a typed failure.
fn classify_status(status: u16, body: &str) -> TranslateError {
    match status {
        429 => TranslateError::RateLimited,
        401 | 403 => TranslateError::NoCredential,
        _ => TranslateError::Network(format!("HTTP {}: {}", status, body)),
    }
}

fn parse_response(body: &str) -> std::result::Result<Translation, TranslateError> {
    let parsed: ApiResponse = serde_json::from_str(body)
        .map_err(|e| TranslateError::InvalidResponse(e.to_string()))?;
    let first = parsed
        .data
        .translations
        .into_iter()
        .next()
        .ok_or_else(|| TranslateError::InvalidResponse("empty translations list".to_string()))?;
    Ok(Translation {
        translated_text: first.translated_text,
        detected_source_language: first.detected_source_language,
    })
}

/// Translator backed by an HTTP JSON API.
pub struct HttpTranslator {
    client: reqwest::Client,
    endpoint: String,
    credentials: Arc<dyn CredentialStore>,
    max_chars: usize,
}

impl HttpTranslator {
    pub fn new(config: &TranslatorConfig, credentials: Arc<dyn CredentialStore>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GlossaError::Translation(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            credentials,
            max_chars: config.max_chars,
        })
    }
}

#[async_trait]
impl Translator for HttpTranslator {
    async fn translate(
        &self,
        request: &TranslationRequest,
    ) -> std::result::Result<Translation, TranslateError> {
        let chars = request.source_text.chars().count();
        if chars > self.max_chars {
            return Err(TranslateError::TextTooLong {
                chars,
                limit: self.max_chars,
            });
        }

        let key = self
            .credentials
            .retrieve()
            .ok_or(TranslateError::NoCredential)?;

        let body = TranslateBody {
            q: &request.source_text,
            target: request.target_language.code(),
            format: "text",
        };

        tracing::debug!(
            chars,
            target = request.target_language.code(),
            "Sending translation request"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(key)
            .json(&body)
            .send()
            .await
            .map_err(|e| TranslateError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| TranslateError::Network(e.to_string()))?;

        if !(200..300).contains(&status) {
            return Err(classify_status(status, &text));
        }

        let translation = parse_response(&text)?;
        tracing::info!(
            translated_len = translation.translated_text.len(),
            detected = translation.detected_source_language.as_deref().unwrap_or("?"),
            "Translation received"
        );
        Ok(translation)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use glossa_core::types::TargetLanguage;

    struct NoKey;
    impl CredentialStore for NoKey {
        fn retrieve(&self) -> Option<String> {
            None
        }
    }

    struct FixedKey;
    impl CredentialStore for FixedKey {
        fn retrieve(&self) -> Option<String> {
            Some("key".to_string())
        }
    }

    #[test]
    fn test_classify_status_rate_limited() {
        assert!(matches!(
            classify_status(429, ""),
            TranslateError::RateLimited
        ));
    }

    #[test]
    fn test_classify_status_auth_failures() {
        assert!(matches!(
            classify_status(401, "unauthorized"),
            TranslateError::NoCredential
        ));
        assert!(matches!(
            classify_status(403, "forbidden"),
            TranslateError::NoCredential
        ));
    }

    #[test]
    fn test_classify_status_other_is_network() {
        match classify_status(500, "internal error") {
            TranslateError::Network(msg) => {
                assert!(msg.contains("500"));
                assert!(msg.contains("internal error"));
            }
            other => panic!("Expected Network, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_response_full() {
        let body = r#"{
            "data": {
                "translations": [
                    {"translatedText": "Hola", "detectedSourceLanguage": "en"}
                ]
            }
        }"#;
        let translation = parse_response(body).unwrap();
        assert_eq!(translation.translated_text, "Hola");
        assert_eq!(translation.detected_source_language.as_deref(), Some("en"));
    }

    #[test]
    fn test_parse_response_without_detected_language() {
        let body = r#"{"data": {"translations": [{"translatedText": "Hola"}]}}"#;
        let translation = parse_response(body).unwrap();
        assert_eq!(translation.translated_text, "Hola");
        assert_eq!(translation.detected_source_language, None);
    }

    #[test]
    fn test_parse_response_empty_list() {
        let body = r#"{"data": {"translations": []}}"#;
        assert!(matches!(
            parse_response(body),
            Err(TranslateError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_parse_response_wrong_shape() {
        let body = r#"{"translations": ["Hola"]}"#;
        assert!(matches!(
            parse_response(body),
            Err(TranslateError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_translate_without_credential_short_circuits() {
        let translator =
            HttpTranslator::new(&TranslatorConfig::default(), Arc::new(NoKey)).unwrap();
        let request = TranslationRequest {
            source_text: "Hello".to_string(),
            target_language: TargetLanguage::Spanish,
        };
        // Fails before any network activity.
        let err = translator.translate(&request).await.unwrap_err();
        assert!(matches!(err, TranslateError::NoCredential));
    }

    #[tokio::test]
    async fn test_translate_too_long_short_circuits() {
        let config = TranslatorConfig {
            max_chars: 10,
            ..TranslatorConfig::default()
        };
        let translator = HttpTranslator::new(&config, Arc::new(FixedKey)).unwrap();
        let request = TranslationRequest {
            source_text: "x".repeat(11),
            target_language: TargetLanguage::English,
        };
        let err = translator.translate(&request).await.unwrap_err();
        assert!(matches!(
            err,
            TranslateError::TextTooLong {
                chars: 11,
                limit: 10
            }
        ));
    }
}
