use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use crate::config::StudioConfig;
use crate::errors::{GeminiError, GeminiResult};
use crate::types::*;

/// Sends one request and returns the decoded reply
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(
        &self,
        model: &str,
        api_key: &str,
        request: &GenerateContentRequest,
    ) -> GeminiResult<GenerateContentResponse>;
}

/// Client for interacting with the Gemini API
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    base_url: String,
}

impl GeminiClient {
    /// Create a new Gemini API client
    pub fn new(config: &StudioConfig) -> GeminiResult<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        let client = builder.build().map_err(|e| {
            GeminiError::ConfigError(format!("Failed to build HTTP client: {}", e))
        })?;

        Ok(Self {
            client,
            base_url: config.api_base_url().trim_end_matches('/').to_string(),
        })
    }

    /// Get the generateContent URL for a model
    fn get_endpoint_url(&self, model: &str, api_key: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, model, api_key
        )
    }
}

#[async_trait]
impl Transport for GeminiClient {
    /// Generate content using the Gemini API
    async fn send(
        &self,
        model: &str,
        api_key: &str,
        request: &GenerateContentRequest,
    ) -> GeminiResult<GenerateContentResponse> {
        let url = self.get_endpoint_url(model, api_key);
        debug!(model, turns = request.contents.len(), "Sending generateContent request");

        // `.json()` sets `Content-Type: application/json`
        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                GeminiError::RequestError(format!("Failed to send request: {}", e.without_url()))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.map_err(|e| {
                GeminiError::RequestError(format!(
                    "Failed to read error response: {}",
                    e.without_url()
                ))
            })?;

            return Err(GeminiError::HttpError {
                status_code: status.as_u16(),
                message: error_body,
            });
        }

        let response_body = response.json::<GenerateContentResponse>().await.map_err(|e| {
            GeminiError::ParsingError(format!("Failed to parse response: {}", e.without_url()))
        })?;

        Ok(response_body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_url() {
        let mut config = StudioConfig::default();
        config.api_base_url = Some("http://127.0.0.1:9000/".to_string());
        let client = GeminiClient::new(&config).unwrap();

        assert_eq!(
            client.get_endpoint_url("gemini-1.5-flash", "abc"),
            "http://127.0.0.1:9000/v1beta/models/gemini-1.5-flash:generateContent?key=abc"
        );
    }

    #[test]
    fn test_default_endpoint() {
        let client = GeminiClient::new(&StudioConfig::default()).unwrap();
        assert!(client
            .get_endpoint_url("gemini-1.5-pro", "k")
            .starts_with("https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-pro:"));
    }
}
