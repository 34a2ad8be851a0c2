use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::{Money, PaymentResult, PaymentStatus};
use crate::ports::{ClipboardPort, NotificationPort, OrderPaymentPort};
use base64::Engine;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

const PNG_DATA_URI_PREFIX: &str = "data:image/png;base64,";
const ACTION_AT_FORMAT: &str = "%d/%m/%Y %H:%M";

/// 二维码来源
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum QrSource {
    /// 内嵌的 PNG（data URI）
    InlinePng(String),
    /// 图片地址
    Url(String),
    /// 二维码原文，由前端自行生成图片
    Text(String),
}

/// 付款结果展示
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentReceipt {
    pub payment_code: Option<String>,
    pub status: PaymentStatus,
    pub status_label: String,
    pub amount: Money,
    pub amount_display: String,
    pub content: Option<String>,
    pub qr: Option<QrSource>,
    pub action_at_display: Option<String>,
}

impl From<&PaymentResult> for PaymentReceipt {
    fn from(result: &PaymentResult) -> Self {
        PaymentReceipt {
            payment_code: result.payment_code.clone(),
            status: result.status,
            status_label: result.status.label().to_string(),
            amount: result.amount,
            amount_display: result.amount.to_string(),
            content: result.content.clone(),
            qr: qr_source(result),
            action_at_display: result
                .action_at
                .map(|at| at.format(ACTION_AT_FORMAT).to_string()),
        }
    }
}

/// 付款结果展示和复制
pub struct ResultPresenter<A: OrderPaymentPort, C: ClipboardPort, N: NotificationPort> {
    api: Arc<A>,
    clipboard: Arc<C>,
    notifier: Arc<N>,
}

impl<A: OrderPaymentPort, C: ClipboardPort, N: NotificationPort> ResultPresenter<A, C, N> {
    pub fn new(api: Arc<A>, clipboard: Arc<C>, notifier: Arc<N>) -> Self {
        Self {
            api,
            clipboard,
            notifier,
        }
    }

    /// 纯渲染，没有副作用
    pub fn render(result: &PaymentResult) -> PaymentReceipt {
        PaymentReceipt::from(result)
    }

    /// 复制转账内容，失败只提示不返回错误
    pub async fn copy_text(&self, result: &PaymentResult) -> bool {
        let outcome = match copy_text_of(result) {
            Some(text) => self.clipboard.write_text(&text).await,
            None => Err(DomainError::Clipboard("Nothing to copy".to_string())),
        };
        self.report(outcome, "Copied to clipboard")
    }

    /// 复制二维码图片
    pub async fn copy_qr_image(&self, result: &PaymentResult) -> bool {
        let outcome = match self.qr_png(result).await {
            Ok(png) => self.clipboard.write_png(png).await,
            Err(e) => Err(e),
        };
        self.report(outcome, "QR code copied to clipboard")
    }

    async fn qr_png(&self, result: &PaymentResult) -> DomainResult<Vec<u8>> {
        match qr_source(result) {
            Some(QrSource::InlinePng(data_uri)) => {
                let encoded = data_uri.trim_start_matches(PNG_DATA_URI_PREFIX);
                base64::engine::general_purpose::STANDARD
                    .decode(encoded.trim())
                    .map_err(|e| DomainError::Clipboard(format!("Invalid QR image data: {}", e)))
            }
            Some(QrSource::Url(url)) => {
                debug!("Fetching QR image {}", url);
                self.api.fetch_image(&url).await.map_err(|e| {
                    DomainError::Clipboard(format!("Cannot load QR image: {}", e.user_message()))
                })
            }
            Some(QrSource::Text(_)) | None => Err(DomainError::Clipboard(
                "No QR image available".to_string(),
            )),
        }
    }

    fn report(&self, outcome: DomainResult<()>, success_message: &str) -> bool {
        match outcome {
            Ok(()) => {
                self.notifier.success(success_message);
                true
            }
            Err(e) => {
                warn!("Clipboard action failed: {}", e);
                self.notifier.error(&e.user_message(), None);
                false
            }
        }
    }
}

fn qr_source(result: &PaymentResult) -> Option<QrSource> {
    let non_empty = |value: &Option<String>| {
        value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };

    if let Some(code) = non_empty(&result.qr_code) {
        if code.starts_with(PNG_DATA_URI_PREFIX) {
            return Some(QrSource::InlinePng(code));
        }
        if code.starts_with("http://") || code.starts_with("https://") {
            return Some(QrSource::Url(code));
        }
        if let Some(url) = non_empty(&result.qr_url) {
            return Some(QrSource::Url(url));
        }
        return Some(QrSource::Text(code));
    }
    non_empty(&result.qr_url).map(QrSource::Url)
}

fn copy_text_of(result: &PaymentResult) -> Option<String> {
    result
        .content
        .as_deref()
        .or(result.payment_code.as_deref())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}
