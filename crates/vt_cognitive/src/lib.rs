//! # vt_cognitive - Veritas Orchestration
//!
//! 编排 Responder、Reviewer 与 InteractionStore，提供三条工作流：
//! 补全、复审、反馈训练。每条工作流严格顺序执行，任一步失败即终止。

pub mod service;

pub use service::{CompletionOutcome, CompletionService};
