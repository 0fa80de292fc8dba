//! Gateway 服务器

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use vt_cognitive::CompletionService;

use crate::handlers::{self, AppState};

/// Gateway 服务器配置
#[derive(Debug, Clone)]
pub struct GatewayServerConfig {
    /// 监听地址
    pub addr: SocketAddr,
}

impl Default for GatewayServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
        }
    }
}

/// 构建 Axum 路由
pub fn build_router(service: AppState) -> Router {
    Router::new()
        .route("/v1/completions", post(handlers::completions))
        .route("/v1/analyze", post(handlers::analyze))
        .route("/v1/feedback", post(handlers::feedback))
        .route("/v1/test-llama", post(handlers::test_reviewer))
        .route("/v1/unresolved", get(handlers::unresolved))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

/// Gateway 服务器
pub struct GatewayServer {
    config: GatewayServerConfig,
    service: AppState,
}

impl GatewayServer {
    /// 创建新服务器
    pub fn new(config: GatewayServerConfig, service: Arc<CompletionService>) -> Self {
        Self { config, service }
    }

    pub fn build_router(&self) -> Router {
        build_router(Arc::clone(&self.service))
    }

    /// 启动服务器，Ctrl+C 时优雅退出
    pub async fn start(&self) -> vt_core::Result<()> {
        self.serve_with_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for shutdown signal");
            }
        })
        .await
    }

    /// 启动服务器，`shutdown` 完成时优雅退出
    pub async fn serve_with_shutdown<F>(&self, shutdown: F) -> vt_core::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = self.build_router();
        let listener = tokio::net::TcpListener::bind(&self.config.addr).await?;
        tracing::info!(addr = %self.config.addr, "gateway listening");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("gateway stopped");
        Ok(())
    }

    /// 获取配置
    pub fn config(&self) -> &GatewayServerConfig {
        &self.config
    }
}
