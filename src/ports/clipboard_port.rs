use crate::domain::errors::DomainResult;
use async_trait::async_trait;

/// 剪贴板端口，平台不支持时返回 `DomainError::Clipboard`
#[async_trait]
pub trait ClipboardPort: Send + Sync {
    async fn write_text(&self, text: &str) -> DomainResult<()>;

    async fn write_png(&self, png: Vec<u8>) -> DomainResult<()>;
}
