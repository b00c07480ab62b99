pub mod error;
pub mod params;
pub mod routes;
pub mod state;

use axum::Router;
use cryptogate_core::Upstream;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use error::{ApiError, ApiResult};
pub use routes::{probe_api_key, ROUTES};

/// Build the Axum application router.
pub fn build_router(upstream: Arc<dyn Upstream>) -> Router {
    let app_state = Arc::new(state::AppState::new(upstream));

    Router::new()
        .merge(routes::api_routes())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

/// Start the gateway.
///
/// A caller that disconnects mid-request drops the handler future, which
/// aborts the in-flight upstream call.
pub async fn start_server(upstream: Arc<dyn Upstream>, bind_addr: &str) -> anyhow::Result<()> {
    let app = build_router(upstream);
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    tracing::info!("Gateway listening on {}", bind_addr);
    axum::serve(listener, app).await?;
    Ok(())
}
