//! 核心实体定义

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Interaction ID 类型别名 (不透明字符串)
pub type InteractionId = String;

/// 一次 提问 / 回答 / 评审 / 反馈 的完整记录
///
/// `prompt`、`responder_answer`、`reviewer_notes`、`created_at` 创建后不可变；
/// `is_correct` 与 `feedback` 只能通过反馈工作流修改。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    /// 唯一 ID，持久化前分配
    pub id: InteractionId,
    /// 用户原始输入
    pub prompt: String,
    /// Responder 的回答
    pub responder_answer: String,
    /// Reviewer 的分析文本
    pub reviewer_notes: String,
    /// 正确性裁决
    pub is_correct: bool,
    /// 人工 (或评审) 反馈
    pub feedback: String,
    /// 创建时间
    pub created_at: DateTime<Utc>,
}

impl Interaction {
    /// 创建新的 Interaction，裁决默认为 false，反馈为空
    pub fn new(
        id: impl Into<InteractionId>,
        prompt: impl Into<String>,
        responder_answer: impl Into<String>,
        reviewer_notes: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            prompt: prompt.into(),
            responder_answer: responder_answer.into(),
            reviewer_notes: reviewer_notes.into(),
            is_correct: false,
            feedback: String::new(),
            created_at: Utc::now(),
        }
    }

    /// 附带评审裁决
    pub fn with_verdict(mut self, is_correct: bool, feedback: impl Into<String>) -> Self {
        self.is_correct = is_correct;
        self.feedback = feedback.into();
        self
    }

    /// 检查持久化前必须满足的不变量
    pub fn validate(&self) -> crate::Result<()> {
        if self.id.trim().is_empty() {
            return Err(crate::VeritasError::InvalidInput(
                "interaction id must not be empty".to_string(),
            ));
        }
        if self.prompt.trim().is_empty() {
            return Err(crate::VeritasError::InvalidInput(
                "interaction prompt must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// 是否仍处于未解决状态
    pub fn is_unresolved(&self) -> bool {
        !self.is_correct
    }
}
