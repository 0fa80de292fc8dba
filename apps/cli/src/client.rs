//! Gateway HTTP 客户端

use anyhow::{bail, Context};
use reqwest::{RequestBuilder, StatusCode};
use serde_json::{json, Value};

pub struct GatewayClient {
    base_url: String,
    http: reqwest::Client,
}

impl GatewayClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn ask(&self, prompt: &str) -> anyhow::Result<Value> {
        self.post("/v1/completions", json!({ "prompt": prompt })).await
    }

    pub async fn analyze(&self, id: &str) -> anyhow::Result<Value> {
        self.post("/v1/analyze", json!({ "id": id })).await
    }

    pub async fn feedback(&self, id: &str, is_correct: bool, feedback: &str) -> anyhow::Result<()> {
        self.post(
            "/v1/feedback",
            json!({ "id": id, "is_correct": is_correct, "feedback": feedback }),
        )
        .await?;
        Ok(())
    }

    pub async fn unresolved(&self) -> anyhow::Result<Value> {
        let url = format!("{}/v1/unresolved", self.base_url);
        send(self.http.get(url)).await
    }

    pub async fn ping(&self, message: &str) -> anyhow::Result<Value> {
        self.post("/v1/test-llama", json!({ "message": message })).await
    }

    async fn post(&self, path: &str, body: Value) -> anyhow::Result<Value> {
        let url = format!("{}{path}", self.base_url);
        send(self.http.post(url).json(&body)).await
    }
}

async fn send(request: RequestBuilder) -> anyhow::Result<Value> {
    let response = request.send().await.context("gateway unreachable")?;
    let status = response.status();
    let text = response.text().await.context("reading gateway response")?;

    if !status.is_success() {
        bail!("{}", error_message(status, &text));
    }
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&text).context("gateway returned invalid JSON")
}

/// 优先取错误体中的 `error` 字段
fn error_message(status: StatusCode, body: &str) -> String {
    let detail = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| body.to_string());
    format!("{status}: {detail}")
}
