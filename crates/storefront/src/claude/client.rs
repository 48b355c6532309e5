//! Claude API client.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use tracing::{debug, instrument};

use crate::config::ClaudeConfig;

use super::TextGenerator;
use super::error::{ClaudeError, ErrorEnvelope};
use super::types::{ChatRequest, ChatResponse, Message};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Claude API client.
///
/// Cheaply cloneable; clones share one connection pool.
#[derive(Clone)]
pub struct ClaudeClient {
    inner: Arc<ClaudeClientInner>,
}

struct ClaudeClientInner {
    client: reqwest::Client,
    endpoint: String,
    model: String,
}

impl std::fmt::Debug for ClaudeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClaudeClient")
            .field("endpoint", &self.inner.endpoint)
            .field("model", &self.inner.model)
            .finish_non_exhaustive()
    }
}

impl ClaudeClient {
    /// Create a new Claude client.
    ///
    /// # Errors
    ///
    /// Returns [`ClaudeError::Config`] if the API key contains characters
    /// that cannot be sent in a header, or if the HTTP client fails to build.
    pub fn new(config: &ClaudeConfig) -> Result<Self, ClaudeError> {
        Self::with_endpoint(config, ANTHROPIC_API_URL)
    }

    /// Create a client that talks to a custom endpoint (e.g. a proxy).
    ///
    /// # Errors
    ///
    /// See [`ClaudeClient::new`].
    pub fn with_endpoint(config: &ClaudeConfig, endpoint: &str) -> Result<Self, ClaudeError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(config.api_key.expose_secret())
                .map_err(|e| ClaudeError::Config(format!("Invalid API key for header: {e}")))?,
        );
        headers.insert(
            "anthropic-version",
            HeaderValue::from_static(ANTHROPIC_VERSION),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| ClaudeError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            inner: Arc::new(ClaudeClientInner {
                client,
                endpoint: endpoint.to_owned(),
                model: config.model.clone(),
            }),
        })
    }

    /// Send a chat request and get a complete response.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or returns an error response.
    #[instrument(skip(self, messages, system), fields(model = %self.inner.model, messages = messages.len()))]
    pub async fn chat(
        &self,
        messages: &[Message],
        system: Option<&str>,
    ) -> Result<ChatResponse, ClaudeError> {
        let request = ChatRequest {
            model: &self.inner.model,
            max_tokens: DEFAULT_MAX_TOKENS,
            messages,
            system,
        };

        let response = self
            .inner
            .client
            .post(&self.inner.endpoint)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(handle_error_status(status, response).await);
        }

        let body = response.text().await?;
        let parsed: ChatResponse = serde_json::from_str(&body)
            .map_err(|e| ClaudeError::Parse(format!("Failed to parse response: {e}")))?;
        debug!(
            input_tokens = parsed.usage.input_tokens,
            output_tokens = parsed.usage.output_tokens,
            "Claude response received"
        );
        Ok(parsed)
    }
}

#[async_trait]
impl TextGenerator for ClaudeClient {
    async fn generate(
        &self,
        system: Option<&str>,
        messages: &[Message],
    ) -> Result<String, ClaudeError> {
        Ok(self.chat(messages, system).await?.text())
    }
}

/// Map an error status code to a [`ClaudeError`].
async fn handle_error_status(
    status: reqwest::StatusCode,
    response: reqwest::Response,
) -> ClaudeError {
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get("Retry-After")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse().ok())
            .unwrap_or(60);
        return ClaudeError::RateLimited(retry_after);
    }

    if status == reqwest::StatusCode::UNAUTHORIZED {
        return ClaudeError::Unauthorized("Invalid API key".to_string());
    }

    match response.text().await {
        Ok(body) => parse_error_body(&body),
        Err(e) => ClaudeError::Http(e),
    }
}

/// Parse an API error body, falling back to the raw text.
fn parse_error_body(body: &str) -> ClaudeError {
    serde_json::from_str::<ErrorEnvelope>(body).map_or_else(
        |_| ClaudeError::Api {
            error_type: "unknown".to_string(),
            message: body.to_owned(),
        },
        |envelope| ClaudeError::Api {
            error_type: envelope.error.error_type,
            message: envelope.error.message,
        },
    )
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use secrecy::SecretString;

    use super::*;

    fn config(key: &str) -> ClaudeConfig {
        ClaudeConfig {
            api_key: SecretString::from(key),
            model: "claude-test".to_string(),
            timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn test_parse_error_body_structured() {
        let err = parse_error_body(
            r#"{"type":"error","error":{"type":"overloaded_error","message":"Overloaded"}}"#,
        );
        assert!(matches!(
            err,
            ClaudeError::Api { ref error_type, .. } if error_type == "overloaded_error"
        ));
    }

    #[test]
    fn test_parse_error_body_raw() {
        let err = parse_error_body("<html>bad gateway</html>");
        assert!(matches!(
            err,
            ClaudeError::Api { ref error_type, ref message }
                if error_type == "unknown" && message.contains("bad gateway")
        ));
    }

    #[test]
    fn test_new_rejects_unsendable_key() {
        assert!(matches!(
            ClaudeClient::new(&config("bad\nkey")),
            Err(ClaudeError::Config(_))
        ));
    }

    #[test]
    fn test_debug_hides_key() {
        let client = ClaudeClient::new(&config("sk-ant-abcdef")).expect("client");
        let debug = format!("{client:?}");
        assert!(debug.contains("claude-test"));
        assert!(!debug.contains("sk-ant-abcdef"));
    }

    #[test]
    fn test_claude_client_is_send_sync() {
        fn assert_send_sync<T: Send + Sync + Clone>() {}
        assert_send_sync::<ClaudeClient>();
    }
}
