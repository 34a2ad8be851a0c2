use thiserror::Error;

/// 领域层错误类型
#[derive(Error, Debug)]
pub enum DomainError {
    /// 本地校验错误（不会发送到服务端）
    #[error("Validation error on {field}: {message}")]
    Validation { field: String, message: String },

    /// 网络错误（没有收到任何HTTP响应）
    #[error("Network error: {0}")]
    Network(String),

    /// 服务端返回的错误
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// 剪贴板操作失败
    #[error("Clipboard error: {0}")]
    Clipboard(String),

    /// 响应格式无效
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// 资源未找到
    #[error("Not found: {0}")]
    NotFound(String),

    /// 序列化错误
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// 配置错误
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// 内部错误
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        DomainError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// 展示给用户的错误信息
    pub fn user_message(&self) -> String {
        match self {
            DomainError::Validation { message, .. } => message.clone(),
            DomainError::Network(message)
            | DomainError::Api { message, .. }
            | DomainError::Clipboard(message)
            | DomainError::Internal(message) => message.clone(),
            other => other.to_string(),
        }
    }

    /// 用户是否可以直接重试
    pub fn is_retryable(&self) -> bool {
        matches!(self, DomainError::Network(_) | DomainError::Api { .. })
    }
}

/// 领域结果类型
pub type DomainResult<T> = Result<T, DomainError>;
