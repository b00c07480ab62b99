//! CryptoCompare upstream client.
//!
//! One outbound GET per call, `authorization: Apikey <key>` injected from
//! server-side configuration, responses classified into [`GatewayError`]s.
//!
//! [`GatewayError`]: cryptogate_core::GatewayError

pub mod client;
pub mod config;

pub use client::{classify, CryptoCompareClient};
pub use config::UpstreamConfig;
