//! 请求与响应体

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use vt_core::Interaction;

/// `POST /v1/completions`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub prompt: String,
}

/// `POST /v1/analyze`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub id: String,
}

/// `POST /v1/feedback`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackRequest {
    pub id: String,
    pub is_correct: bool,
    #[serde(default)]
    pub feedback: String,
}

/// `POST /v1/test-llama`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestReviewerRequest {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionAnalysis {
    pub is_correct: bool,
    pub feedback: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub id: String,
    pub text: String,
    pub analysis: CompletionAnalysis,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub analysis: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestReviewerResponse {
    pub response: String,
}

/// 对外展示的 Interaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionView {
    pub id: String,
    pub prompt: String,
    pub responder_answer: String,
    pub reviewer_notes: String,
    pub is_correct: bool,
    pub feedback: String,
    pub created_at: DateTime<Utc>,
}

impl From<Interaction> for InteractionView {
    fn from(entry: Interaction) -> Self {
        Self {
            id: entry.id,
            prompt: entry.prompt,
            responder_answer: entry.responder_answer,
            reviewer_notes: entry.reviewer_notes,
            is_correct: entry.is_correct,
            feedback: entry.feedback,
            created_at: entry.created_at,
        }
    }
}

/// `GET /v1/unresolved`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnresolvedResponse {
    pub interactions: Vec<InteractionView>,
}

/// 错误响应体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
