use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use common::media::FilesystemMediaStore;
use tracing::info;
use tracing_subscriber::EnvFilter;

use recipebook_server::config::AppConfig;
use recipebook_server::state::AppState;
use recipebook_server::{build_router, database, seed};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let db = database::init_db(&config.database.url)
        .await
        .context("Failed to initialise database")?;
    seed::ensure_indexes(&db).await?;

    let media = FilesystemMediaStore::new(config.media.root.clone())
        .await
        .with_context(|| format!("Failed to open media root {}", config.media.root.display()))?;

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server.host / server.port")?;

    let state = AppState {
        db,
        config,
        media: Arc::new(media),
    };
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server running at http://{}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
