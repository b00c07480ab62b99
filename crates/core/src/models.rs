use serde::Serialize;
use std::fmt;

/// Text substituted for the credential wherever it could otherwise surface.
pub const REDACTED: &str = "***";

// ---------------------------------------------------------------------------
// Credential
// ---------------------------------------------------------------------------

/// The server-side upstream API key.
///
/// Read once at startup and never mutated. `Debug` and `Display` are
/// redacted so the key cannot leak through logs or formatted errors.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Returns `None` for an empty or whitespace-only key.
    pub fn new(key: impl Into<String>) -> Option<Self> {
        let key = key.into();
        let trimmed = key.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// The raw key, for building the outbound authorization header only.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Value of the `authorization` header sent upstream.
    pub fn header_value(&self) -> String {
        format!("Apikey {}", self.0)
    }

    /// Replace every occurrence of the key in `text`.
    pub fn scrub(&self, text: &str) -> String {
        text.replace(&self.0, REDACTED)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Credential").field(&REDACTED).finish()
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

// ---------------------------------------------------------------------------
// Endpoints
// ---------------------------------------------------------------------------

/// Upstream endpoints the gateway is allowed to reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
    Price,
    PriceMulti,
    HistoDay,
    HistoHour,
    TopPairs,
    News,
}

impl Endpoint {
    /// Path relative to the upstream base URL.
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Price => "/price",
            Endpoint::PriceMulti => "/pricemulti",
            Endpoint::HistoDay => "/v2/histoday",
            Endpoint::HistoHour => "/v2/histohour",
            Endpoint::TopPairs => "/top/pairs",
            Endpoint::News => "/v2/news/",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

// ---------------------------------------------------------------------------
// Outbound request descriptor
// ---------------------------------------------------------------------------

/// One outbound call: target endpoint plus query parameters in insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamRequest {
    pub endpoint: Endpoint,
    pub params: Vec<(String, String)>,
}

impl UpstreamRequest {
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            params: Vec::new(),
        }
    }

    /// Add a parameter.
    pub fn param(mut self, name: &str, value: impl ToString) -> Self {
        self.params.push((name.to_string(), value.to_string()));
        self
    }

    /// Add a parameter only when it is present and non-empty.
    pub fn param_opt(self, name: &str, value: Option<&str>) -> Self {
        match value {
            Some(v) if !v.is_empty() => self.param(name, v),
            _ => self,
        }
    }

    /// Look up a parameter value by name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}
