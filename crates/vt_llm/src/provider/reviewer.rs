//! Reviewer Provider (generate 形态，Ollama 兼容)
//!
//! 请求体: `{ "model", "prompt", "stream": false }`，响应体: `{ "response" }`。

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::http::{build_client, send_json};
use super::{AnalysisResult, Reviewer};
use crate::limiter::{CallLimiter, CallLimiterConfig};
use crate::prompt::{analysis_prompt, training_prompt};
use crate::verdict::{AlwaysCorrect, VerdictStrategy};

const BACKEND: &str = "reviewer";
const DEFAULT_MODEL: &str = "llama2";
const ANALYSIS_FEEDBACK: &str = "Response analyzed successfully";

/// Reviewer 配置
#[derive(Debug, Clone)]
pub struct ReviewerConfig {
    /// 完整的 generate 端点
    pub api_url: String,
    pub api_key: String,
    pub model: String,
    pub timeout: Duration,
    pub max_idle_per_host: usize,
    pub limiter: CallLimiterConfig,
}

impl Default for ReviewerConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:11434/api/generate".to_string(),
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(60),
            max_idle_per_host: 8,
            limiter: CallLimiterConfig::default(),
        }
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Reviewer 客户端
pub struct ReviewerClient {
    config: ReviewerConfig,
    client: reqwest::Client,
    limiter: CallLimiter,
    verdict: Arc<dyn VerdictStrategy>,
}

impl ReviewerClient {
    /// 使用默认裁决策略 ([`AlwaysCorrect`]) 创建
    pub fn new(config: ReviewerConfig) -> crate::Result<Self> {
        Self::with_verdict(config, Arc::new(AlwaysCorrect))
    }

    pub fn with_verdict(
        config: ReviewerConfig,
        verdict: Arc<dyn VerdictStrategy>,
    ) -> crate::Result<Self> {
        let client = build_client(config.timeout, config.max_idle_per_host)?;
        let limiter = CallLimiter::new(config.limiter.clone());
        Ok(Self {
            config,
            client,
            limiter,
            verdict,
        })
    }

    pub fn config(&self) -> &ReviewerConfig {
        &self.config
    }
}

#[async_trait]
impl Reviewer for ReviewerClient {
    async fn simple_chat(&self, message: &str) -> crate::Result<String> {
        let _permit = self.limiter.acquire().await?;
        tracing::debug!(model = %self.config.model, len = message.len(), "sending reviewer generate request");

        let request = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&GenerateRequest {
                model: &self.config.model,
                prompt: message,
                stream: false,
            });

        let body: GenerateResponse = send_json(BACKEND, request).await?;
        Ok(body.response)
    }

    async fn analyze_response(
        &self,
        prompt: &str,
        responder_answer: &str,
    ) -> crate::Result<AnalysisResult> {
        let analysis = self
            .simple_chat(&analysis_prompt(prompt, responder_answer))
            .await?;
        let is_correct = self.verdict.judge(&analysis);
        tracing::debug!(strategy = self.verdict.name(), is_correct, "reviewer verdict derived");

        Ok(AnalysisResult {
            analysis,
            is_correct,
            feedback: ANALYSIS_FEEDBACK.to_string(),
        })
    }

    async fn train_model(
        &self,
        prompt: &str,
        responder_answer: &str,
        is_correct: bool,
        feedback: &str,
    ) -> crate::Result<()> {
        self.simple_chat(&training_prompt(prompt, responder_answer, is_correct, feedback))
            .await?;
        Ok(())
    }
}
