//! HTTP 处理器

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use vt_cognitive::CompletionService;
use vt_core::{ErrorKind, VeritasError};

use crate::models::{
    AnalysisRequest, AnalysisResponse, CompletionAnalysis, CompletionRequest, CompletionResponse,
    ErrorResponse, FeedbackRequest, InteractionView, TestReviewerRequest, TestReviewerResponse,
    UnresolvedResponse,
};

/// 路由共享状态
pub type AppState = Arc<CompletionService>;

/// 工作流错误到 HTTP 响应的映射
#[derive(Debug)]
pub struct ApiError(pub VeritasError);

impl From<VeritasError> for ApiError {
    fn from(err: VeritasError) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0.kind() {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
            ErrorKind::UpstreamResponder | ErrorKind::UpstreamReviewer | ErrorKind::Training => {
                StatusCode::BAD_GATEWAY
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }
        let body = ErrorResponse {
            error: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

pub async fn completions(
    State(service): State<AppState>,
    Json(req): Json<CompletionRequest>,
) -> Result<Json<CompletionResponse>, ApiError> {
    let outcome = service.get_completion(&req.prompt).await?;
    Ok(Json(CompletionResponse {
        id: outcome.id,
        text: outcome.text,
        analysis: CompletionAnalysis {
            is_correct: outcome.is_correct,
            feedback: outcome.feedback,
        },
    }))
}

pub async fn analyze(
    State(service): State<AppState>,
    Json(req): Json<AnalysisRequest>,
) -> Result<Json<AnalysisResponse>, ApiError> {
    let analysis = service.get_analysis(&req.id).await?;
    Ok(Json(AnalysisResponse { analysis }))
}

pub async fn feedback(
    State(service): State<AppState>,
    Json(req): Json<FeedbackRequest>,
) -> Result<StatusCode, ApiError> {
    service
        .update_feedback(&req.id, req.is_correct, &req.feedback)
        .await?;
    Ok(StatusCode::OK)
}

pub async fn test_reviewer(
    State(service): State<AppState>,
    Json(req): Json<TestReviewerRequest>,
) -> Result<Json<TestReviewerResponse>, ApiError> {
    let response = service.test_reviewer(&req.message).await?;
    Ok(Json(TestReviewerResponse { response }))
}

pub async fn unresolved(
    State(service): State<AppState>,
) -> Result<Json<UnresolvedResponse>, ApiError> {
    let interactions = service
        .list_unresolved()
        .await?
        .into_iter()
        .map(InteractionView::from)
        .collect();
    Ok(Json(UnresolvedResponse { interactions }))
}
