use anyhow::Result;
use clap::{Parser, Subcommand};
use cryptogate_core::{Credential, Upstream};
use cryptogate_upstream::config::DEFAULT_BASE_URL;
use cryptogate_upstream::{CryptoCompareClient, UpstreamConfig};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "cryptogate")]
#[command(about = "CryptoCompare gateway that keeps the API key on the server")]
#[command(version)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// CryptoCompare API key
    #[arg(long, env = "CRYPTOCOMPARE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Upstream base URL
    #[arg(long, env = "CRYPTOCOMPARE_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Upstream request timeout in seconds (unset: no timeout)
    #[arg(long, env = "CRYPTOCOMPARE_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,

    /// Listen host
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    /// Listen port
    #[arg(short, long, env = "PORT", default_value = "8085")]
    port: u16,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the gateway (default)
    Serve,

    /// Probe the API key once and print the result
    CheckKey,

    /// List the routes the gateway exposes
    Routes,
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            let upstream = build_upstream(cli.api_key, cli.base_url, cli.timeout_secs)?;
            let bind = format!("{}:{}", cli.host, cli.port);
            tracing::info!(bind = %bind, "Starting CryptoCompare gateway");
            cryptogate_api::start_server(upstream, &bind).await?;
        }
        Commands::CheckKey => {
            let upstream = build_upstream(cli.api_key, cli.base_url, cli.timeout_secs)?;
            let report = cryptogate_api::probe_api_key(upstream.as_ref()).await;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Routes => {
            println!("Exposed routes (all GET):");
            for (path, summary) in cryptogate_api::ROUTES {
                println!("  {:<14} - {}", path, summary);
            }
        }
    }

    Ok(())
}

fn build_upstream(
    api_key: Option<String>,
    base_url: String,
    timeout_secs: Option<u64>,
) -> Result<Arc<dyn Upstream>> {
    let credential = api_key.and_then(Credential::new);
    if credential.is_none() {
        tracing::warn!(
            "CRYPTOCOMPARE_API_KEY is not set; every upstream call will fail as unauthorized"
        );
    }

    let config = UpstreamConfig {
        base_url,
        credential,
        timeout: timeout_secs.map(Duration::from_secs),
    };
    let client = CryptoCompareClient::new(config)?;
    Ok(Arc::new(client))
}
