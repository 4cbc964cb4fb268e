//! hookhttp: issue one HTTP request through the plugin-driven client.

use std::time::Duration;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

use hookhttp_client::HttpClient;
use hookhttp_core::config::{ClientConfig, LoggingConfig};
use hookhttp_core::error::HttpError;
use hookhttp_core::types::{Method, RequestDescriptor};

/// Plugin-driven HTTP client
#[derive(Debug, Parser)]
#[command(name = "hookhttp", version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// HTTP method
    method: Method,

    /// Absolute URL, or a path joined with the configured base URL
    url: String,

    /// JSON request body
    #[arg(short, long)]
    data: Option<String>,

    /// Service key selecting a configured base URL
    #[arg(short, long)]
    service: Option<String>,

    /// Cancel the request after this many milliseconds
    #[arg(long)]
    cancel_after_ms: Option<u64>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match ClientConfig::load(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config.logging);

    if let Err(e) = run(cli, config).await {
        tracing::error!("Request failed: {}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .with_writer(std::io::stderr)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

async fn run(cli: Cli, config: ClientConfig) -> Result<(), HttpError> {
    let client = HttpClient::new(config)?;

    let mut request = RequestDescriptor::new(cli.method, cli.url);
    if let Some(service) = cli.service {
        request = request.with_base_url(service);
    }
    if let Some(data) = cli.data {
        request = request.with_body(serde_json::from_str(&data)?);
    }

    let pending = match cli.cancel_after_ms {
        Some(ms) => {
            let cancel_id = client.create_cancel_id();
            let pending = client.request(request.with_cancel_id(cancel_id.clone()));
            let canceller = client.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(ms)).await;
                if let Err(e) = canceller.apply_cancel(&cancel_id, Some("timer elapsed")) {
                    tracing::warn!(error = %e, "Cancel failed");
                }
            });
            pending
        }
        None => client.request(request),
    };

    let response = pending.await;
    client.destroy().await?;
    let response = response?;

    tracing::info!(status = response.status, "Request complete");
    println!("{}", serde_json::to_string_pretty(&response.data)?);
    Ok(())
}
