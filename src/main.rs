use std::future::ready;
use std::net::SocketAddr;
use std::path::PathBuf;

use axum::routing::get;
use tracing_subscriber::EnvFilter;
use travel_booking::config::Configuration;
use travel_booking::{app, initialize_state, telemetry};

const CONFIG_PATH: &str = "CONFIG_PATH";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // `.env` is optional.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .init();

    let path = std::env::var(CONFIG_PATH).map(PathBuf::from).unwrap_or_default();
    let config = Configuration::default().path(path).read()?;
    let port = config.port;

    let recorder_handle = telemetry::setup_metrics_recorder()?;

    let state = initialize_state(config).await?;
    let app = app(state)
        .route("/metrics", get(move || ready(recorder_handle.render())));

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server started");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(%err, "cannot listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
