//! # vt_llm - Veritas LLM Clients
//!
//! 模型客户端层：Responder (chat-completions 形态) 与 Reviewer (generate 形态)，
//! 以及并发限流器、裁决策略、提示词构建器。

pub mod limiter;
pub mod prompt;
pub mod provider;
pub mod verdict;

pub use limiter::{CallLimiter, CallLimiterConfig};
pub use prompt::PromptBuilder;
pub use provider::{
    AnalysisResult, Responder, ResponderClient, ResponderConfig, Reviewer, ReviewerClient,
    ReviewerConfig,
};
pub use verdict::{AlwaysCorrect, VerdictStrategy};

pub use vt_core::{Result, VeritasError};
