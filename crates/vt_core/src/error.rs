//! 全局错误处理机制
//!
//! 三层错误分类：客户端层、存储层、编排层。
//! 编排层变体包裹下层错误，原始类别可通过 [`VeritasError::root_cause`] 取回。

use thiserror::Error;

/// Veritas 统一错误类型
#[derive(Error, Debug)]
pub enum VeritasError {
    // ── 客户端层 ──
    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("Backend returned status {status}: {body}")]
    BackendBadResponse { status: u16, body: String },

    #[error("Empty response: {0}")]
    EmptyResponse(String),

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    // ── 存储层 ──
    #[error("Interaction not found: {0}")]
    NotFound(String),

    #[error("Duplicate interaction id: {0}")]
    DuplicateKey(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    // ── 编排层 ──
    #[error("Responder call failed: {0}")]
    UpstreamResponder(#[source] Box<VeritasError>),

    #[error("Reviewer call failed: {0}")]
    UpstreamReviewer(#[source] Box<VeritasError>),

    #[error("Reviewer training failed: {0}")]
    Training(#[source] Box<VeritasError>),

    #[error("Storing interaction failed: {0}")]
    StoreWrite(#[source] Box<VeritasError>),

    // ── 运行环境 ──
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// 错误类别 (不携带上下文，便于匹配与映射状态码)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    BackendUnavailable,
    BackendBadResponse,
    EmptyResponse,
    MalformedPayload,
    NotFound,
    DuplicateKey,
    StoreUnavailable,
    Persistence,
    UpstreamResponder,
    UpstreamReviewer,
    Training,
    StoreWrite,
    InvalidInput,
    Config,
    Io,
    Serialization,
}

impl VeritasError {
    /// 当前层的错误类别
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::BackendUnavailable(_) => ErrorKind::BackendUnavailable,
            Self::BackendBadResponse { .. } => ErrorKind::BackendBadResponse,
            Self::EmptyResponse(_) => ErrorKind::EmptyResponse,
            Self::MalformedPayload(_) => ErrorKind::MalformedPayload,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::DuplicateKey(_) => ErrorKind::DuplicateKey,
            Self::StoreUnavailable(_) => ErrorKind::StoreUnavailable,
            Self::Persistence(_) => ErrorKind::Persistence,
            Self::UpstreamResponder(_) => ErrorKind::UpstreamResponder,
            Self::UpstreamReviewer(_) => ErrorKind::UpstreamReviewer,
            Self::Training(_) => ErrorKind::Training,
            Self::StoreWrite(_) => ErrorKind::StoreWrite,
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::Config(_) => ErrorKind::Config,
            Self::Io(_) => ErrorKind::Io,
            Self::Serialization(_) => ErrorKind::Serialization,
        }
    }

    /// 剥离编排层包装，返回最底层的错误
    pub fn root_cause(&self) -> &VeritasError {
        match self {
            Self::UpstreamResponder(inner)
            | Self::UpstreamReviewer(inner)
            | Self::Training(inner)
            | Self::StoreWrite(inner) => inner.root_cause(),
            other => other,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}

/// 编排层包装辅助
pub trait ResultExt<T> {
    /// 将错误包装为 `UpstreamResponder`
    fn responder_context(self) -> Result<T>;
    /// 将错误包装为 `UpstreamReviewer`
    fn reviewer_context(self) -> Result<T>;
    /// 将错误包装为 `Training`
    fn training_context(self) -> Result<T>;
    /// 将存储写入错误包装为 `StoreWrite`
    fn persistence_context(self) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn responder_context(self) -> Result<T> {
        self.map_err(|e| VeritasError::UpstreamResponder(Box::new(e)))
    }

    fn reviewer_context(self) -> Result<T> {
        self.map_err(|e| VeritasError::UpstreamReviewer(Box::new(e)))
    }

    fn training_context(self) -> Result<T> {
        self.map_err(|e| VeritasError::Training(Box::new(e)))
    }

    fn persistence_context(self) -> Result<T> {
        self.map_err(|e| VeritasError::StoreWrite(Box::new(e)))
    }
}

/// 统一 Result 类型别名
pub type Result<T> = std::result::Result<T, VeritasError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_cause_unwraps_orchestration_layers() {
        let err: Result<()> = Err(VeritasError::EmptyResponse("no choices".to_string()));
        let err = err.responder_context().unwrap_err();

        assert_eq!(err.kind(), ErrorKind::UpstreamResponder);
        assert_eq!(err.root_cause().kind(), ErrorKind::EmptyResponse);
        assert!(err.to_string().contains("no choices"));
    }

    #[test]
    fn test_persistence_context_keeps_store_kind() {
        let err: Result<()> = Err(VeritasError::DuplicateKey("abc".to_string()));
        let err = err.persistence_context().unwrap_err();

        assert_eq!(err.kind(), ErrorKind::StoreWrite);
        assert_eq!(err.root_cause().kind(), ErrorKind::DuplicateKey);
        assert!(err.to_string().contains("abc"));

        let err: Result<()> = Err(VeritasError::StoreUnavailable("disk gone".to_string()));
        let err = err.persistence_context().unwrap_err();
        assert_eq!(err.root_cause().kind(), ErrorKind::StoreUnavailable);
    }

    #[test]
    fn test_not_found_passthrough() {
        let err = VeritasError::NotFound("nonexistent".to_string());
        assert!(err.is_not_found());
        assert!(!VeritasError::StoreUnavailable("down".to_string()).is_not_found());
    }
}
