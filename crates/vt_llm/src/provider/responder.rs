//! Responder Provider (chat-completions 形态)
//!
//! 认证方式: `Authorization: Bearer <auth_key>`
//! 路由 header: `X-Client-ID`、`X-RQ-UID`、`X-API-Scope`

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::http::{build_client, send_json};
use super::Responder;
use crate::limiter::{CallLimiter, CallLimiterConfig};

// ── 常量 ────────────────────────────────────────────────────────────────────────
const BACKEND: &str = "responder";
const DEFAULT_TEMPERATURE: f32 = 0.7;

// ── 数据结构 ────────────────────────────────────────────────────────────────────
/// Responder 配置
#[derive(Debug, Clone)]
pub struct ResponderConfig {
    /// 完整的 chat-completions 端点
    pub api_url: String,
    /// Bearer token
    pub auth_key: String,
    pub client_id: String,
    /// 固定的请求关联 ID；为空时每次请求生成新的 UUID
    pub rq_uid: Option<String>,
    pub api_scope: String,
    pub model: String,
    pub temperature: f32,
    /// 单次调用超时
    pub timeout: Duration,
    /// 每个主机保留的空闲连接上限
    pub max_idle_per_host: usize,
    pub limiter: CallLimiterConfig,
}

impl Default for ResponderConfig {
    fn default() -> Self {
        Self {
            api_url: String::new(),
            auth_key: String::new(),
            client_id: String::new(),
            rq_uid: None,
            api_scope: String::new(),
            model: String::new(),
            temperature: DEFAULT_TEMPERATURE,
            timeout: Duration::from_secs(60),
            max_idle_per_host: 8,
            limiter: CallLimiterConfig::default(),
        }
    }
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}

/// Responder 客户端
pub struct ResponderClient {
    config: ResponderConfig,
    client: reqwest::Client,
    limiter: CallLimiter,
}

// ── 主实现 ───────────────────────────────────────────────────────────────────────
impl ResponderClient {
    pub fn new(config: ResponderConfig) -> crate::Result<Self> {
        let client = build_client(config.timeout, config.max_idle_per_host)?;
        let limiter = CallLimiter::new(config.limiter.clone());
        Ok(Self {
            config,
            client,
            limiter,
        })
    }

    /// 本次请求使用的关联 ID
    fn request_uid(&self) -> String {
        match &self.config.rq_uid {
            Some(uid) if !uid.is_empty() => uid.clone(),
            _ => Uuid::new_v4().to_string(),
        }
    }

    fn compile_request<'a>(&'a self, prompt: &'a str) -> CompletionRequest<'a> {
        CompletionRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.config.temperature,
        }
    }

    pub fn config(&self) -> &ResponderConfig {
        &self.config
    }
}

#[async_trait]
impl Responder for ResponderClient {
    async fn get_completion(&self, prompt: &str) -> crate::Result<String> {
        let _permit = self.limiter.acquire().await?;
        let rq_uid = self.request_uid();
        tracing::debug!(model = %self.config.model, %rq_uid, "sending responder completion request");

        let request = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.auth_key)
            .header("X-Client-ID", &self.config.client_id)
            .header("X-RQ-UID", rq_uid)
            .header("X-API-Scope", &self.config.api_scope)
            .json(&self.compile_request(prompt));

        let body: CompletionResponse = send_json(BACKEND, request).await?;

        body.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| {
                crate::VeritasError::EmptyResponse(format!("{BACKEND}: no choices in response"))
            })
    }
}
