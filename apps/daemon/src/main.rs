//! Veritas Daemon - HTTP 编排守护进程

mod config;

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vt_cognitive::CompletionService;
use vt_core::UuidIdGenerator;
use vt_durable::{InteractionStore, MemoryInteractionStore, SqliteInteractionStore};
use vt_gateway::{GatewayServer, GatewayServerConfig};
use vt_llm::{ResponderClient, ReviewerClient};

use crate::config::{AppConfig, CONFIG_PATH_ENV, DEFAULT_CONFIG_PATH};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "veritas_daemon=debug,vt_cognitive=debug,vt_gateway=debug,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Veritas Daemon starting...");

    let config_path =
        std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let config = AppConfig::load(&config_path)?;
    tracing::info!(path = %config_path, "Configuration loaded");
    tracing::info!("Responder API URL: {}", config.responder.api_url);
    tracing::info!("Reviewer API URL: {}", config.reviewer.api_url);

    let responder = Arc::new(ResponderClient::new(config.responder_config())?);
    let reviewer = Arc::new(ReviewerClient::new(config.reviewer_config())?);

    let store: Arc<dyn InteractionStore> = if config.database.is_in_memory() {
        tracing::warn!("Using in-memory interaction store, data is lost on shutdown");
        Arc::new(MemoryInteractionStore::new())
    } else {
        let store = SqliteInteractionStore::connect(&config.store_config()).await?;
        tracing::info!(url = %config.database.url, "Interaction store initialized");
        Arc::new(store)
    };

    let service = Arc::new(CompletionService::new(
        responder,
        reviewer,
        store,
        Arc::new(UuidIdGenerator),
    ));

    let server = GatewayServer::new(
        GatewayServerConfig {
            addr: config.listen_addr()?,
        },
        service,
    );
    tracing::info!("Veritas Daemon is ready on {}", server.config().addr);
    tracing::info!("Press Ctrl+C to shutdown...");

    server.start().await?;
    tracing::info!("Shutting down...");

    Ok(())
}
