use crate::error::ApiResult;
use crate::params::*;
use crate::state::AppState;
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use cryptogate_core::{reshape_news, Endpoint, NewsEnvelope, Upstream, UpstreamRequest};
use serde_json::Value;
use std::sync::Arc;

/// Routes exposed by the gateway, with a one-line summary each.
pub const ROUTES: &[(&str, &str)] = &[
    ("/", "Liveness banner"),
    ("/price", "Current price of fsym in tsyms"),
    ("/pricemulti", "Prices of fsyms in tsyms"),
    ("/histoday", "Daily OHLCV history (limit <= 2000)"),
    ("/histohour", "Hourly OHLCV history (limit <= 2000)"),
    ("/top-pairs", "Top trading pairs of fsym (limit <= 100)"),
    ("/news", "Latest news, reshaped (limit <= 20)"),
    ("/test-api-key", "Probe the configured API key"),
];

pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(home))
        // Prices
        .route("/price", get(price))
        .route("/pricemulti", get(price_multi))
        // History
        .route("/histoday", get(histoday))
        .route("/histohour", get(histohour))
        // Market
        .route("/top-pairs", get(top_pairs))
        .route("/news", get(news))
        // Diagnostics
        .route("/test-api-key", get(test_api_key))
}

/// Every proxied route funnels through here: one upstream call, failures
/// mapped by `ApiError` at the boundary.
async fn forward(state: &AppState, request: UpstreamRequest) -> ApiResult<Value> {
    Ok(state.upstream.call(request).await?)
}

async fn home() -> impl IntoResponse {
    Json(serde_json::json!({
        "message": "CryptoCompare gateway is running!",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

// ---------------------------------------------------------------------------
// Prices
// ---------------------------------------------------------------------------

async fn price(
    State(state): State<Arc<AppState>>,
    query: Result<Query<PriceQuery>, QueryRejection>,
) -> ApiResult<Json<Value>> {
    let Query(query) = query?;
    let request = query.to_request()?;
    Ok(Json(forward(&state, request).await?))
}

async fn price_multi(
    State(state): State<Arc<AppState>>,
    query: Result<Query<PriceMultiQuery>, QueryRejection>,
) -> ApiResult<Json<Value>> {
    let Query(query) = query?;
    let request = query.to_request()?;
    Ok(Json(forward(&state, request).await?))
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

async fn histoday(
    State(state): State<Arc<AppState>>,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> ApiResult<Json<Value>> {
    let Query(query) = query?;
    let request = query.to_request(Endpoint::HistoDay, DEFAULT_DAILY_LIMIT)?;
    Ok(Json(forward(&state, request).await?))
}

async fn histohour(
    State(state): State<Arc<AppState>>,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> ApiResult<Json<Value>> {
    let Query(query) = query?;
    let request = query.to_request(Endpoint::HistoHour, DEFAULT_HOURLY_LIMIT)?;
    Ok(Json(forward(&state, request).await?))
}

// ---------------------------------------------------------------------------
// Market
// ---------------------------------------------------------------------------

async fn top_pairs(
    State(state): State<Arc<AppState>>,
    query: Result<Query<TopPairsQuery>, QueryRejection>,
) -> ApiResult<Json<Value>> {
    let Query(query) = query?;
    let request = query.to_request()?;
    Ok(Json(forward(&state, request).await?))
}

async fn news(
    State(state): State<Arc<AppState>>,
    query: Result<Query<NewsQuery>, QueryRejection>,
) -> ApiResult<Json<NewsEnvelope>> {
    let Query(query) = query?;
    let request = query.to_request()?;
    let payload = forward(&state, request).await?;
    Ok(Json(reshape_news(&payload, query.requested_limit())))
}

// ---------------------------------------------------------------------------
// Diagnostics
// ---------------------------------------------------------------------------

async fn test_api_key(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(probe_api_key(state.upstream.as_ref()).await)
}

/// Run the fixed BTC→USD lookup and report the outcome in-band.
///
/// Never fails: upstream failures become `{"status": "error", ...}`.
pub async fn probe_api_key(upstream: &dyn Upstream) -> Value {
    match upstream.call(key_check_request()).await {
        Ok(price) => serde_json::json!({
            "status": "success",
            "message": "API key is valid and connection to CryptoCompare is established",
            "price": price,
        }),
        Err(err) => {
            tracing::warn!(error = %err, error_code = err.error_code(), "API key check failed");
            serde_json::json!({
                "status": "error",
                "message": format!("API key check failed: {}", err),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use cryptogate_core::GatewayError;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tower::ServiceExt;

    const KEY: &str = "secret-key-abc";

    struct MockUpstream {
        calls: AtomicUsize,
        last: Mutex<Option<UpstreamRequest>>,
        outcome: Result<Value, GatewayError>,
    }

    impl MockUpstream {
        fn new(outcome: Result<Value, GatewayError>) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                last: Mutex::new(None),
                outcome,
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn last(&self) -> UpstreamRequest {
            self.last.lock().unwrap().clone().expect("no upstream call recorded")
        }
    }

    #[async_trait]
    impl Upstream for MockUpstream {
        async fn call(&self, request: UpstreamRequest) -> Result<Value, GatewayError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last.lock().unwrap() = Some(request);
            self.outcome.clone()
        }
    }

    async fn fetch(mock: &Arc<MockUpstream>, uri: &str) -> (StatusCode, Value) {
        let app = crate::build_router(mock.clone());
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_home_banner() {
        let mock = MockUpstream::new(Ok(json!({})));
        let (status, body) = fetch(&mock, "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
        assert!(body["message"].is_string());
        assert_eq!(mock.calls(), 0);
    }

    #[tokio::test]
    async fn test_price_passthrough_uppercases() {
        let mock = MockUpstream::new(Ok(json!({"USD": 64000.1, "EUR": 59000.2})));
        let (status, body) = fetch(&mock, "/price?fsym=btc&tsyms=usd,eur").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"USD": 64000.1, "EUR": 59000.2}));
        let req = mock.last();
        assert_eq!(req.endpoint, Endpoint::Price);
        assert_eq!(req.get("fsym"), Some("BTC"));
        assert_eq!(req.get("tsyms"), Some("USD,EUR"));
        assert_eq!(req.get("e"), None);
    }

    #[tokio::test]
    async fn test_missing_required_param_makes_no_call() {
        let mock = MockUpstream::new(Ok(json!({})));
        let (status, body) = fetch(&mock, "/price?fsym=btc").await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error_code"], "VALIDATION_ERROR");
        assert!(body["detail"].as_str().unwrap().contains("tsyms"));
        assert_eq!(mock.calls(), 0);

        let (status, _) = fetch(&mock, "/top-pairs").await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(mock.calls(), 0);
    }

    #[tokio::test]
    async fn test_non_numeric_limit_is_validation_error() {
        let mock = MockUpstream::new(Ok(json!({})));
        let (status, body) = fetch(&mock, "/histoday?fsym=btc&tsym=usd&limit=lots").await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error_code"], "VALIDATION_ERROR");
        assert_eq!(mock.calls(), 0);
    }

    #[tokio::test]
    async fn test_histoday_clamps_limit() {
        let mock = MockUpstream::new(Ok(json!({"Response": "Success"})));
        let (status, _) = fetch(&mock, "/histoday?fsym=btc&tsym=usd&limit=5000&e=Kraken").await;

        assert_eq!(status, StatusCode::OK);
        let req = mock.last();
        assert_eq!(req.endpoint, Endpoint::HistoDay);
        assert_eq!(req.get("limit"), Some("2000"));
        assert_eq!(req.get("aggregate"), Some("1"));
        assert_eq!(req.get("e"), Some("Kraken"));
    }

    #[tokio::test]
    async fn test_histohour_defaults() {
        let mock = MockUpstream::new(Ok(json!({"Response": "Success"})));
        fetch(&mock, "/histohour?fsym=eth&tsym=btc&limit=100").await;

        let req = mock.last();
        assert_eq!(req.endpoint, Endpoint::HistoHour);
        assert_eq!(req.get("fsym"), Some("ETH"));
        assert_eq!(req.get("tsym"), Some("BTC"));
        assert_eq!(req.get("limit"), Some("100"));
    }

    #[tokio::test]
    async fn test_top_pairs_and_pricemulti() {
        let mock = MockUpstream::new(Ok(json!({"Data": []})));
        fetch(&mock, "/top-pairs?fsym=sol&limit=250").await;
        let req = mock.last();
        assert_eq!(req.endpoint, Endpoint::TopPairs);
        assert_eq!(req.get("limit"), Some("100"));

        fetch(&mock, "/pricemulti?fsyms=btc,eth&tsyms=usd").await;
        let req = mock.last();
        assert_eq!(req.endpoint, Endpoint::PriceMulti);
        assert_eq!(req.get("fsyms"), Some("BTC,ETH"));
        assert_eq!(mock.calls(), 2);
    }

    #[tokio::test]
    async fn test_news_reshapes_and_limits() {
        let items: Vec<Value> = (0..10)
            .map(|i| {
                json!({
                    "id": i.to_string(),
                    "title": "t",
                    "url": "u",
                    "source": "s",
                    "published_on": 1700000000,
                    "categories": "BTC|Regulation",
                    "body": "dropped"
                })
            })
            .collect();
        let mock = MockUpstream::new(Ok(json!({"Type": 100, "Data": items})));
        let (status, body) = fetch(&mock, "/news?limit=3&lang=es").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "success");
        assert_eq!(body["count"], 3);
        assert_eq!(body["news"].as_array().unwrap().len(), 3);
        assert_eq!(body["news"][0]["categories"], json!(["BTC", "Regulation"]));
        assert_eq!(body["news"][0]["tags"], json!([]));
        assert!(body["news"][0].get("body").is_none());

        let req = mock.last();
        assert_eq!(req.get("lang"), Some("ES"));
        assert_eq!(req.get("limit"), Some("3"));
    }

    #[tokio::test]
    async fn test_upstream_unauthorized_hides_key() {
        let mock = MockUpstream::new(Err(GatewayError::Unauthorized));
        let (status, body) = fetch(&mock, "/price?fsym=btc&tsyms=usd").await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error_code"], "UNAUTHORIZED");
        assert!(!body.to_string().contains(KEY));
    }

    #[tokio::test]
    async fn test_upstream_failures_map_to_status() {
        let mock = MockUpstream::new(Err(GatewayError::RateLimited));
        let (status, _) = fetch(&mock, "/price?fsym=btc&tsyms=usd").await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);

        let mock = MockUpstream::new(Err(GatewayError::Upstream {
            status: 503,
            message: "maintenance".into(),
        }));
        let (status, body) = fetch(&mock, "/news").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(body["detail"].as_str().unwrap().contains("maintenance"));

        let mock = MockUpstream::new(Err(GatewayError::Connection("timed out".into())));
        let (status, body) = fetch(&mock, "/top-pairs?fsym=btc").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error_code"], "CONNECTION_ERROR");
    }

    #[tokio::test]
    async fn test_api_key_probe_success() {
        let mock = MockUpstream::new(Ok(json!({"USD": 64000})));
        let (status, body) = fetch(&mock, "/test-api-key").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "success");
        assert_eq!(body["price"], json!({"USD": 64000}));
        let req = mock.last();
        assert_eq!(req.get("fsym"), Some("BTC"));
        assert_eq!(req.get("tsyms"), Some("USD"));
    }

    #[tokio::test]
    async fn test_api_key_probe_never_errors() {
        let failures = [
            GatewayError::Unauthorized,
            GatewayError::RateLimited,
            GatewayError::Connection("dns failure".into()),
            GatewayError::Upstream {
                status: 500,
                message: "boom".into(),
            },
        ];
        for failure in failures {
            let mock = MockUpstream::new(Err(failure));
            let (status, body) = fetch(&mock, "/test-api-key").await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["status"], "error");
            assert!(body["message"].is_string());
        }
    }
}
