use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use haruspex::config::Config;
use haruspex::server::{self, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();

    std::fs::create_dir_all(&config.upload_dir).with_context(|| {
        format!("failed to create upload dir {:?}", config.upload_dir)
    })?;

    let state = Arc::new(AppState {
        upload_dir: config.upload_dir.clone(),
    });
    let app = server::app(state, config.max_upload_bytes);

    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!(%addr, "haruspex listening");

    axum::serve(listener, app).await?;

    Ok(())
}
