//! captureorder: order capture service.
//!
//! Application entry point. Parses CLI flags, loads configuration, initializes
//! tracing, connects the order store, wires telemetry and event hub
//! notifications, and serves the HTTP API until a shutdown signal arrives.

use std::time::Duration;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use captureorder::config::{
    AppConfig, DEFAULT_CONFIG_PATH, DEFAULT_LOG_FILTER, OUTBOUND_HTTP_TIMEOUT_SECS,
};
use captureorder::http::start_server;
use captureorder::routes::create_router;
use captureorder::service::OrderService;
use captureorder::state::AppState;
use captureorder::store;

/// captureorder: accepts orders and forwards them to the event hub
#[derive(Parser, Debug)]
#[command(name = "captureorder", version, about)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    /// Log level filter (e.g., "captureorder=debug,mongodb=info")
    #[arg(short, long)]
    log_level: Option<String>,
}

fn init_tracing(filter: &str, format: &str) {
    let registry = tracing_subscriber::registry().with(EnvFilter::new(filter));
    if format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Log format lives in the config file, so load it before tracing starts
    let config = AppConfig::load(&args.config)?;

    // Priority: CLI > env > default
    let log_filter = args
        .log_level
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());
    init_tracing(&log_filter, &config.logging.format);

    tracing::info!(path = %args.config, "Loaded configuration");

    let store = store::connect(&config.database).await?;
    match store.ping().await {
        Ok(()) => tracing::info!(backend = store.backend(), "Order store reachable"),
        Err(e) => tracing::warn!(
            error = %e,
            backend = store.backend(),
            "Order store not reachable yet; captures will fail until it is"
        ),
    }

    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(OUTBOUND_HTTP_TIMEOUT_SECS))
        .build()?;

    let orders = OrderService::from_config(&config, store, http_client);
    let app = create_router(AppState::new(orders));

    start_server(app, &config.http).await?;

    Ok(())
}
