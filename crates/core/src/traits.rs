use crate::models::*;
use async_trait::async_trait;
use serde_json::Value;

// ---------------------------------------------------------------------------
// Failure taxonomy
// ---------------------------------------------------------------------------

/// Longest upstream body excerpt echoed back in an error message.
pub const MAX_BODY_EXCERPT: usize = 200;

/// Classified failure of a gateway operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    /// Upstream rejected the request as malformed (HTTP 400).
    #[error("Bad Request: {0}")]
    InvalidRequest(String),
    /// Credential missing or rejected upstream.
    #[error("Invalid API Key")]
    Unauthorized,
    #[error("Rate limit exceeded. Please try again later.")]
    RateLimited,
    /// Any other non-200 upstream status.
    #[error("Unexpected upstream error ({status}): {message}")]
    Upstream { status: u16, message: String },
    /// Upstream could not be reached (DNS, connect, timeout).
    #[error("Connection Error: {0}")]
    Connection(String),
    /// Caller input rejected locally before any outbound call.
    #[error("Validation error: {0}")]
    Validation(String),
}

impl GatewayError {
    /// Stable code for programmatic handling by callers.
    pub fn error_code(&self) -> &'static str {
        match self {
            GatewayError::InvalidRequest(_) => "INVALID_REQUEST",
            GatewayError::Unauthorized => "UNAUTHORIZED",
            GatewayError::RateLimited => "RATE_LIMITED",
            GatewayError::Upstream { .. } => "UPSTREAM_ERROR",
            GatewayError::Connection(_) => "CONNECTION_ERROR",
            GatewayError::Validation(_) => "VALIDATION_ERROR",
        }
    }

    /// Missing required query parameter.
    pub fn missing(name: &str) -> Self {
        GatewayError::Validation(format!("missing required parameter `{}`", name))
    }
}

/// Cut `text` down to at most `max` characters.
pub fn excerpt(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

// ---------------------------------------------------------------------------
// Upstream trait
// ---------------------------------------------------------------------------

/// Performs exactly one outbound call per invocation and classifies the result.
#[async_trait]
pub trait Upstream: Send + Sync {
    /// Issue `request` upstream. Success payloads are returned untouched.
    async fn call(&self, request: UpstreamRequest) -> Result<Value, GatewayError>;
}
