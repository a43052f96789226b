use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use super::endpoints::{GenerateContentRequest, GenerateContentResponse, GEMINI_API_BASE};

#[derive(Debug, Error)]
pub enum ApiConnectionError {
    #[error("Network error: {0}")]
    NetworkError(#[source] reqwest::Error),
    #[error("Provider did not answer within {0:?}")]
    Timeout(Duration),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("API error {status}: {error_body}")]
    ApiError {
        status: reqwest::StatusCode,
        error_body: String,
    },
}

/// A generative backend able to run one `generateContent` call.
///
/// Implementations hold configuration only; every call is independent.
#[async_trait]
pub trait GenerativeProvider: Send + Sync {
    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, ApiConnectionError>;
}

pub struct GeminiProvider {
    api_key: String,
    api_base: String,
    timeout: Duration,
    http: Client,
}

impl GeminiProvider {
    pub fn new(api_key: String, api_base: Option<String>, timeout: Duration) -> Result<Self, ApiConnectionError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ApiConnectionError::NetworkError)?;
        let api_base = api_base
            .map(|base| base.trim().trim_end_matches('/').to_string())
            .filter(|base| !base.is_empty())
            .unwrap_or_else(|| GEMINI_API_BASE.to_string());
        Ok(Self {
            api_key,
            api_base,
            timeout,
            http,
        })
    }

    pub fn endpoint_for_model(&self, model: &str) -> String {
        let trimmed = model.trim();
        let model_path = if trimmed.starts_with("models/") {
            trimmed.to_string()
        } else {
            format!("models/{trimmed}")
        };
        format!("{}/{}:generateContent", self.api_base, model_path)
    }

    fn classify(&self, err: reqwest::Error) -> ApiConnectionError {
        if err.is_timeout() {
            ApiConnectionError::Timeout(self.timeout)
        } else {
            ApiConnectionError::NetworkError(err)
        }
    }
}

#[async_trait]
impl GenerativeProvider for GeminiProvider {
    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, ApiConnectionError> {
        let url = self.endpoint_for_model(model);
        debug!(%url, "calling provider");

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        if response.status().is_success() {
            let body = response.text().await.map_err(|e| self.classify(e))?;
            Ok(serde_json::from_str(&body)?)
        } else {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            Err(ApiConnectionError::ApiError { status, error_body })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(base: Option<&str>) -> GeminiProvider {
        GeminiProvider::new(
            "test-key".to_string(),
            base.map(str::to_string),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn endpoint_defaults_to_public_api() {
        assert_eq!(
            provider(None).endpoint_for_model("gemini-2.5-flash"),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn endpoint_respects_custom_base_and_model_prefix() {
        let provider = provider(Some("http://127.0.0.1:9999/v1beta/ "));
        assert_eq!(
            provider.endpoint_for_model("models/gemini-2.5-flash-image"),
            "http://127.0.0.1:9999/v1beta/models/gemini-2.5-flash-image:generateContent"
        );
    }
}
