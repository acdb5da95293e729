use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use common::storage::filesystem::FilesystemUploadStore;
use tracing::info;
use tracing_subscriber::EnvFilter;

use inventory_server::config::AppConfig;
use inventory_server::services::vision::OpenAiVisionClient;
use inventory_server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let db = inventory_server::database::init_db(&config.database)
        .await
        .context("Failed to initialize database")?;

    let uploads = FilesystemUploadStore::new(
        config.storage.upload_dir.clone(),
        config.storage.max_upload_size,
    )
    .await
    .with_context(|| {
        format!(
            "Failed to prepare upload directory {}",
            config.storage.upload_dir.display()
        )
    })?;

    let vision =
        OpenAiVisionClient::new(config.llm.clone()).context("Failed to build LLM client")?;
    if config.llm.enabled {
        info!(api_url = %config.llm.api_url, model = %config.llm.model, "Vision backend configured");
    } else {
        info!("Vision backend disabled");
    }

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    let state = AppState {
        db,
        config,
        uploads: Arc::new(uploads),
        vision: Arc::new(vision),
    };
    let app = inventory_server::build_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Server running at http://{}", addr);
    info!("API docs at http://{}/scalar", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
