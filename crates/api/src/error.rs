use axum::{
    extract::rejection::QueryRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use cryptogate_core::GatewayError;
use serde_json::json;

pub type ApiResult<T> = Result<T, ApiError>;

/// Boundary wrapper mapping a [`GatewayError`] onto an HTTP response.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub GatewayError);

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError(GatewayError::Validation(rejection.body_text()))
    }
}

impl ApiError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match &self.0 {
            GatewayError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::Unauthorized => StatusCode::UNAUTHORIZED,
            GatewayError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            GatewayError::Upstream { status, .. } => StatusCode::from_u16(*status)
                .ok()
                .filter(|s| s.is_client_error() || s.is_server_error())
                .unwrap_or(StatusCode::BAD_GATEWAY),
            GatewayError::Connection(_) => StatusCode::INTERNAL_SERVER_ERROR,
            GatewayError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    fn log(&self) {
        let status = self.status_code();
        let code = self.0.error_code();

        if status.is_server_error() {
            tracing::error!(
                error = %self.0,
                error_code = %code,
                status = %status.as_u16(),
                "Upstream failure"
            );
        } else {
            tracing::debug!(
                error = %self.0,
                error_code = %code,
                status = %status.as_u16(),
                "Request rejected"
            );
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.log();

        let status = self.status_code();
        let body = json!({
            "detail": self.0.to_string(),
            "error_code": self.0.error_code(),
        });

        (status, Json(body)).into_response()
    }
}
