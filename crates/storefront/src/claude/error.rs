//! Errors from the text generation service.

use serde::Deserialize;
use thiserror::Error;

/// Why a generation request produced no text.
///
/// Translation treats every variant as a soft failure; the curator turns
/// them into a friendly "unavailable" reply.
#[derive(Debug, Error)]
pub enum ClaudeError {
    /// Connection, TLS or timeout failure before a status arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status with an error body.
    #[error("API error ({error_type}): {message}")]
    Api { error_type: String, message: String },

    /// HTTP 429; seconds to wait, from `Retry-After` when present.
    #[error("rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// HTTP 401.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Success status but the body was not a Messages response.
    #[error("parse error: {0}")]
    Parse(String),

    /// The key or HTTP client could not be set up.
    #[error("configuration error: {0}")]
    Config(String),
}

/// `{"type": "error", "error": {"type": ..., "message": ...}}`
#[derive(Debug, Deserialize)]
pub(super) struct ErrorEnvelope {
    pub error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
pub(super) struct ErrorDetail {
    #[serde(rename = "type")]
    pub error_type: String,
    pub message: String,
}
