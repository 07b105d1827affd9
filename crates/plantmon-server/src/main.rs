use anyhow::Result;
use chrono::Utc;
use plantmon_alert::engine::AlertEngine;
use plantmon_server::app;
use plantmon_server::config::ServerConfig;
use plantmon_server::state::AppState;
use plantmon_storage::engine::SqliteStore;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokio::signal;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("plantmon_server=info".parse()?),
        )
        .init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config/server.toml".to_string());
    let config = ServerConfig::load(&config_path)?;

    tracing::info!(
        http_port = config.http_port,
        db = %config.database.path,
        "plantmon-server starting"
    );

    let store = Arc::new(SqliteStore::open(Path::new(&config.database.path))?);
    let engine = Arc::new(Mutex::new(AlertEngine::new()));

    let state = AppState {
        store,
        engine,
        start_time: Utc::now(),
        config: Arc::new(config.clone()),
    };

    let http_addr: SocketAddr = format!("0.0.0.0:{}", config.http_port).parse()?;
    let app = app::build_http_app(state);
    let listener = tokio::net::TcpListener::bind(http_addr).await?;

    tracing::info!(http = %http_addr, "Server started");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            signal::ctrl_c().await.ok();
            tracing::info!("Shutting down gracefully");
        })
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}
