use cryptogate_core::Credential;
use std::time::Duration;

/// Default CryptoCompare REST base.
pub const DEFAULT_BASE_URL: &str = "https://min-api.cryptocompare.com/data";

/// Configuration for connecting to CryptoCompare.
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    /// Base URL every endpoint path is appended to.
    pub base_url: String,
    /// API key. `None` makes every call fail as unauthorized.
    pub credential: Option<Credential>,
    /// Whole-request timeout. `None` leaves the transport default.
    pub timeout: Option<Duration>,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            credential: None,
            timeout: None,
        }
    }
}

