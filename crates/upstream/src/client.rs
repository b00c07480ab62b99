use crate::config::UpstreamConfig;
use async_trait::async_trait;
use cryptogate_core::*;
use reqwest::header::AUTHORIZATION;
use reqwest::StatusCode;
use serde_json::Value;
use tracing::{debug, warn};

/// CryptoCompare client.
///
/// Holds the immutable credential and a pooled `reqwest::Client`; cheap to
/// share behind an `Arc` across request handlers.
pub struct CryptoCompareClient {
    http: reqwest::Client,
    base_url: String,
    credential: Option<Credential>,
}

impl CryptoCompareClient {
    pub fn new(config: UpstreamConfig) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self::with_client(builder.build()?, config))
    }

    pub fn with_client(http: reqwest::Client, config: UpstreamConfig) -> Self {
        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            credential: config.credential,
        }
    }

    pub fn has_credential(&self) -> bool {
        self.credential.is_some()
    }

    fn url(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.base_url, endpoint.path())
    }

    /// Render a transport error with its whole source chain.
    fn describe(&self, err: &reqwest::Error) -> String {
        let mut text = err.to_string();
        let mut source = std::error::Error::source(err);
        while let Some(cause) = source {
            text.push_str(": ");
            text.push_str(&cause.to_string());
            source = std::error::Error::source(cause);
        }
        match &self.credential {
            Some(key) => key.scrub(&text),
            None => text,
        }
    }
}

#[async_trait]
impl Upstream for CryptoCompareClient {
    async fn call(&self, request: UpstreamRequest) -> Result<Value, GatewayError> {
        let url = self.url(request.endpoint);

        let Some(credential) = &self.credential else {
            warn!(url = %url, "No API key configured, refusing upstream call");
            return Err(GatewayError::Unauthorized);
        };

        debug!(
            url = %url,
            authorization = "Apikey ***",
            params = ?request.params,
            "Sending upstream request"
        );

        let response = self
            .http
            .get(&url)
            .header(AUTHORIZATION, credential.header_value())
            .query(&request.params)
            .send()
            .await
            .map_err(|e| {
                let message = self.describe(&e);
                warn!(url = %url, error = %message, "Upstream request failed");
                GatewayError::Connection(message)
            })?;

        let status = response.status();
        debug!(url = %url, status = status.as_u16(), "Upstream responded");

        let body = response.text().await.map_err(|e| {
            let message = self.describe(&e);
            warn!(url = %url, error = %message, "Reading upstream body failed");
            GatewayError::Connection(message)
        })?;

        let outcome = classify(status, &body, Some(credential));
        if let Err(err) = &outcome {
            warn!(
                url = %url,
                status = status.as_u16(),
                error_code = err.error_code(),
                "Upstream call failed"
            );
        }
        outcome
    }
}

/// Classify an upstream response into a JSON payload or a [`GatewayError`].
///
/// Echoed bodies are scrubbed of the credential and cut to
/// [`MAX_BODY_EXCERPT`] characters.
pub fn classify(
    status: StatusCode,
    body: &str,
    credential: Option<&Credential>,
) -> Result<Value, GatewayError> {
    let echo = || {
        let scrubbed = match credential {
            Some(key) => key.scrub(body),
            None => body.to_string(),
        };
        excerpt(&scrubbed, MAX_BODY_EXCERPT).to_string()
    };

    match status {
        StatusCode::OK => serde_json::from_str(body).map_err(|e| GatewayError::Upstream {
            status: status.as_u16(),
            message: format!("invalid JSON body ({}): {}", e, echo()),
        }),
        StatusCode::BAD_REQUEST => Err(GatewayError::InvalidRequest(echo())),
        StatusCode::UNAUTHORIZED => Err(GatewayError::Unauthorized),
        StatusCode::TOO_MANY_REQUESTS => Err(GatewayError::RateLimited),
        other => Err(GatewayError::Upstream {
            status: other.as_u16(),
            message: echo(),
        }),
    }
}
