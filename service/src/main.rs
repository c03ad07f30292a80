#![deny(
    clippy::expect_used,
    clippy::panic,
    clippy::print_stdout,
    clippy::todo,
    clippy::unimplemented,
    clippy::unwrap_used
)]

use std::net::SocketAddr;

use docverify::{
    config::Config,
    http::{router, AppState},
    ledger::LedgerHandle,
};
use tracing_subscriber::EnvFilter;

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Load and validate configuration first (fail-fast)
    let config = Config::load().map_err(|e| anyhow::anyhow!("{e}"))?;

    // Set up logging from config
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.logging.level)?)
        .init();

    // Init banner so container logs clearly show startup
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "docverify starting up"
    );

    // Credentials are normalized once here; the client itself is built on first lookup
    let key = config.ledger.service_account()?;
    tracing::info!(
        client_email = %key.client_email,
        spreadsheet_id = %config.ledger.spreadsheet_id,
        range = %config.ledger.sheet_range,
        "ledger configured"
    );

    let state = AppState {
        ledger: LedgerHandle::from_config(config.ledger.clone(), key),
        base_url: config.site.base_url.clone(),
    };

    if config.security_headers.enabled {
        tracing::info!("Security headers enabled");
    } else {
        tracing::info!("Security headers disabled");
    }

    let app = router(state, &config.security_headers);

    // Start the server
    let ip = config.server.host.parse::<std::net::IpAddr>()?;
    let addr = SocketAddr::from((ip, config.server.port));
    tracing::info!(base_url = %config.site.base_url, "Starting server at http://{}/", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
