//! 客户端共用的 HTTP 收发与错误翻译

use std::time::Duration;

use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;

use vt_core::VeritasError;

/// 构建带超时与有界空闲连接池的 reqwest 客户端
pub(crate) fn build_client(timeout: Duration, max_idle_per_host: usize) -> crate::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .pool_max_idle_per_host(max_idle_per_host)
        .build()
        .map_err(|e| VeritasError::Config(format!("failed to build http client: {e}")))
}

/// 发送请求并解码 JSON 响应
///
/// 传输失败 → `BackendUnavailable`；非 2xx → `BackendBadResponse`；
/// 解码失败 → `MalformedPayload`。
pub(crate) async fn send_json<T: DeserializeOwned>(
    backend: &str,
    request: RequestBuilder,
) -> crate::Result<T> {
    let resp = request.send().await.map_err(|e| {
        VeritasError::BackendUnavailable(format!("{backend}: request failed: {e}"))
    })?;

    let status = resp.status();
    let raw_text = resp.text().await.map_err(|e| {
        VeritasError::BackendUnavailable(format!("{backend}: reading body failed: {e}"))
    })?;

    if !status.is_success() {
        return Err(VeritasError::BackendBadResponse {
            status: status.as_u16(),
            body: format!("{backend}: {}", raw_text.trim()),
        });
    }

    serde_json::from_str(&raw_text)
        .map_err(|e| VeritasError::MalformedPayload(format!("{backend}: decode failed: {e}")))
}
