//! 编排服务

use std::sync::Arc;

use serde::Serialize;

use vt_core::{IdGenerator, Interaction, InteractionId, Result, ResultExt, VeritasError};
use vt_durable::InteractionStore;
use vt_llm::{Responder, Reviewer};

/// 补全工作流的结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionOutcome {
    /// 新建 Interaction 的 ID
    pub id: InteractionId,
    /// Responder 的回答
    pub text: String,
    /// Reviewer 裁决
    pub is_correct: bool,
    /// Reviewer 反馈
    pub feedback: String,
}

/// 编排服务
///
/// 所有协作方在构造时注入；服务本身不持有可变状态，可跨任务共享。
pub struct CompletionService {
    responder: Arc<dyn Responder>,
    reviewer: Arc<dyn Reviewer>,
    store: Arc<dyn InteractionStore>,
    ids: Arc<dyn IdGenerator>,
}

impl CompletionService {
    pub fn new(
        responder: Arc<dyn Responder>,
        reviewer: Arc<dyn Reviewer>,
        store: Arc<dyn InteractionStore>,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        Self {
            responder,
            reviewer,
            store,
            ids,
        }
    }

    /// 补全工作流
    ///
    /// Responder → Reviewer 分析 → 分配 ID → 持久化。
    /// 任一后端失败都不会写入记录；持久化失败时回答已算出但不返回。
    pub async fn get_completion(&self, prompt: &str) -> Result<CompletionOutcome> {
        if prompt.trim().is_empty() {
            return Err(VeritasError::InvalidInput("prompt must not be empty".to_string()));
        }

        let answer = self
            .responder
            .get_completion(prompt)
            .await
            .responder_context()
            .inspect_err(|e| tracing::warn!(error = %e, "completion aborted at responder"))?;

        let analysis = self
            .reviewer
            .analyze_response(prompt, &answer)
            .await
            .reviewer_context()
            .inspect_err(|e| tracing::warn!(error = %e, "completion aborted at reviewer"))?;

        let id = self.ids.next_id();
        let entry = Interaction::new(id.clone(), prompt, answer.clone(), analysis.analysis)
            .with_verdict(analysis.is_correct, analysis.feedback.clone());

        self.store
            .create(&entry)
            .await
            .persistence_context()
            .inspect_err(|e| tracing::warn!(%id, error = %e, "completion computed but not persisted"))?;

        tracing::info!(%id, is_correct = analysis.is_correct, "interaction created");
        Ok(CompletionOutcome {
            id,
            text: answer,
            is_correct: analysis.is_correct,
            feedback: analysis.feedback,
        })
    }

    /// 复审工作流
    ///
    /// 对已存记录重新调用 Reviewer，只返回新的分析文本，不回写存储。
    pub async fn get_analysis(&self, id: &str) -> Result<String> {
        let entry = self.store.get(id).await?;

        let analysis = self
            .reviewer
            .analyze_response(&entry.prompt, &entry.responder_answer)
            .await
            .reviewer_context()
            .inspect_err(|e| tracing::warn!(%id, error = %e, "re-analysis failed"))?;

        tracing::info!(%id, "interaction re-analyzed");
        Ok(analysis.analysis)
    }

    /// 反馈训练工作流
    ///
    /// 先持久化反馈，再回读记录并训练 Reviewer。训练失败不回滚已保存的反馈。
    pub async fn update_feedback(&self, id: &str, is_correct: bool, feedback: &str) -> Result<()> {
        self.store.update_feedback(id, is_correct, feedback).await?;
        tracing::info!(%id, is_correct, "feedback saved");

        let entry = self.store.get(id).await?;

        self.reviewer
            .train_model(&entry.prompt, &entry.responder_answer, is_correct, feedback)
            .await
            .training_context()
            .inspect_err(|e| tracing::warn!(%id, error = %e, "feedback saved but training failed"))?;

        tracing::info!(%id, "reviewer trained with feedback");
        Ok(())
    }

    /// 直接与 Reviewer 对话 (连通性检查)
    pub async fn test_reviewer(&self, message: &str) -> Result<String> {
        self.reviewer.simple_chat(message).await.reviewer_context()
    }

    /// 所有未解决的记录，最新的在前
    pub async fn list_unresolved(&self) -> Result<Vec<Interaction>> {
        self.store.list_unresolved().await
    }
}
