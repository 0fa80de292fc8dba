//! # vt_gateway - Veritas HTTP Gateway
//!
//! 边界层：把 HTTP 请求翻译为编排服务调用，并整形响应。

pub mod handlers;
pub mod models;
pub mod server;

pub use handlers::ApiError;
pub use server::{GatewayServer, GatewayServerConfig};
