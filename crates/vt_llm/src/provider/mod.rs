//! 模型后端客户端
//!
//! 编排服务只依赖 [`Responder`] 与 [`Reviewer`] 两个 trait，
//! 具体 HTTP 客户端在构造时注入。

mod http;
pub mod responder;
pub mod reviewer;

use async_trait::async_trait;

pub use responder::{ResponderClient, ResponderConfig};
pub use reviewer::{ReviewerClient, ReviewerConfig};

/// 主模型后端：回答用户提问
#[async_trait]
pub trait Responder: Send + Sync {
    /// 单轮补全，返回第一个候选的文本
    async fn get_completion(&self, prompt: &str) -> crate::Result<String>;
}

/// 评审模型后端：评判回答并接收人工反馈
#[async_trait]
pub trait Reviewer: Send + Sync {
    /// 底层对话原语
    async fn simple_chat(&self, message: &str) -> crate::Result<String>;

    /// 评判一组 提问/回答
    async fn analyze_response(
        &self,
        prompt: &str,
        responder_answer: &str,
    ) -> crate::Result<AnalysisResult>;

    /// 回灌人工确认的裁决，忽略返回文本
    async fn train_model(
        &self,
        prompt: &str,
        responder_answer: &str,
        is_correct: bool,
        feedback: &str,
    ) -> crate::Result<()>;
}

/// Reviewer 的结构化评判结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisResult {
    /// Reviewer 返回的原始分析文本
    pub analysis: String,
    /// 裁决 (由 [`crate::VerdictStrategy`] 推导)
    pub is_correct: bool,
    /// 评审反馈
    pub feedback: String,
}
