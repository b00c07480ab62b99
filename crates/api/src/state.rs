use cryptogate_core::Upstream;
use std::sync::Arc;

/// Shared application state accessible by all route handlers.
///
/// Read-only: the upstream client carries the credential and nothing here is
/// mutated after startup.
pub struct AppState {
    pub upstream: Arc<dyn Upstream>,
}

impl AppState {
    pub fn new(upstream: Arc<dyn Upstream>) -> Self {
        Self { upstream }
    }
}
