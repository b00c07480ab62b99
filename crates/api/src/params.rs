//! Query parameters accepted by each route and their normalization into
//! upstream requests.
//!
//! Validation is local and synchronous: a missing required parameter fails
//! here, before any outbound call exists.

use cryptogate_core::{Endpoint, GatewayError, UpstreamRequest};
use serde::Deserialize;

pub const HISTORY_LIMIT_MAX: i64 = 2000;
pub const TOP_PAIRS_LIMIT_MAX: i64 = 100;
pub const NEWS_LIMIT_MAX: i64 = 20;

pub const DEFAULT_DAILY_LIMIT: i64 = 30;
pub const DEFAULT_HOURLY_LIMIT: i64 = 24;
pub const DEFAULT_TOP_PAIRS_LIMIT: i64 = 10;
pub const DEFAULT_NEWS_LIMIT: i64 = 5;
pub const DEFAULT_AGGREGATE: i64 = 1;
pub const DEFAULT_LANG: &str = "EN";

/// Cap `limit` at `ceiling`. Negative values pass through for upstream to judge.
pub fn clamp_limit(limit: i64, ceiling: i64) -> i64 {
    limit.min(ceiling)
}

fn required<'a>(name: &str, value: &'a Option<String>) -> Result<&'a str, GatewayError> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(GatewayError::missing(name)),
    }
}

fn symbols(name: &str, value: &Option<String>) -> Result<String, GatewayError> {
    required(name, value).map(str::to_uppercase)
}

// ---------------------------------------------------------------------------
// Prices
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct PriceQuery {
    pub fsym: Option<String>,
    /// Comma separated target symbols.
    pub tsyms: Option<String>,
    /// Exchange.
    pub e: Option<String>,
}

impl PriceQuery {
    pub fn to_request(&self) -> Result<UpstreamRequest, GatewayError> {
        Ok(UpstreamRequest::new(Endpoint::Price)
            .param("fsym", symbols("fsym", &self.fsym)?)
            .param("tsyms", symbols("tsyms", &self.tsyms)?)
            .param_opt("e", self.e.as_deref()))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PriceMultiQuery {
    pub fsyms: Option<String>,
    pub tsyms: Option<String>,
    pub e: Option<String>,
}

impl PriceMultiQuery {
    pub fn to_request(&self) -> Result<UpstreamRequest, GatewayError> {
        Ok(UpstreamRequest::new(Endpoint::PriceMulti)
            .param("fsyms", symbols("fsyms", &self.fsyms)?)
            .param("tsyms", symbols("tsyms", &self.tsyms)?)
            .param_opt("e", self.e.as_deref()))
    }
}

/// The fixed BTC→USD lookup used to probe the API key.
pub fn key_check_request() -> UpstreamRequest {
    UpstreamRequest::new(Endpoint::Price)
        .param("fsym", "BTC")
        .param("tsyms", "USD")
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

/// Shared by the daily and hourly OHLCV routes.
#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    pub fsym: Option<String>,
    pub tsym: Option<String>,
    pub limit: Option<i64>,
    pub aggregate: Option<i64>,
    pub e: Option<String>,
}

impl HistoryQuery {
    pub fn to_request(
        &self,
        endpoint: Endpoint,
        default_limit: i64,
    ) -> Result<UpstreamRequest, GatewayError> {
        let limit = clamp_limit(self.limit.unwrap_or(default_limit), HISTORY_LIMIT_MAX);
        Ok(UpstreamRequest::new(endpoint)
            .param("fsym", symbols("fsym", &self.fsym)?)
            .param("tsym", symbols("tsym", &self.tsym)?)
            .param("limit", limit)
            .param("aggregate", self.aggregate.unwrap_or(DEFAULT_AGGREGATE))
            .param_opt("e", self.e.as_deref()))
    }
}

// ---------------------------------------------------------------------------
// Top pairs
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct TopPairsQuery {
    pub fsym: Option<String>,
    pub limit: Option<i64>,
}

impl TopPairsQuery {
    pub fn to_request(&self) -> Result<UpstreamRequest, GatewayError> {
        let limit = clamp_limit(
            self.limit.unwrap_or(DEFAULT_TOP_PAIRS_LIMIT),
            TOP_PAIRS_LIMIT_MAX,
        );
        Ok(UpstreamRequest::new(Endpoint::TopPairs)
            .param("fsym", symbols("fsym", &self.fsym)?)
            .param("limit", limit))
    }
}

// ---------------------------------------------------------------------------
// News
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct NewsQuery {
    pub categories: Option<String>,
    pub limit: Option<i64>,
    pub lang: Option<String>,
}

impl NewsQuery {
    /// Limit as requested by the caller, before clamping. Applied again to
    /// the upstream result when reshaping.
    pub fn requested_limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_NEWS_LIMIT)
    }

    pub fn to_request(&self) -> Result<UpstreamRequest, GatewayError> {
        let lang = match self.lang.as_deref().map(str::trim) {
            Some(l) if !l.is_empty() => l.to_uppercase(),
            _ => DEFAULT_LANG.to_string(),
        };
        Ok(UpstreamRequest::new(Endpoint::News)
            .param("limit", clamp_limit(self.requested_limit(), NEWS_LIMIT_MAX))
            .param("lang", lang)
            .param_opt("categories", self.categories.as_deref()))
    }
}
