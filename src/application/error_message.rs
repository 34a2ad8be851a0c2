//! 从服务端错误响应中提取可读的提示信息

use crate::domain::errors::DomainError;
use serde_json::{Map, Value};

/// 没有收到任何响应时的固定提示
pub const NETWORK_ERROR_MESSAGE: &str = "Cannot reach server. Please check your connection.";

/// 依次尝试的结构化字段
const MESSAGE_FIELDS: [&str; 3] = ["error", "message", "detail"];

/// 一次失败的API调用
#[derive(Debug, Clone, PartialEq)]
pub enum ApiFailure {
    /// 收到了HTTP响应
    Response {
        status: u16,
        status_text: String,
        body: Option<Value>,
    },
    /// 请求已发出，但没有收到响应
    NoResponse,
    /// 请求没有发出
    Other { message: String },
}

impl ApiFailure {
    pub fn into_error(self) -> DomainError {
        let message = extract_error_message(&self);
        match self {
            ApiFailure::Response { status, .. } => DomainError::Api { status, message },
            ApiFailure::NoResponse => DomainError::Network(message),
            ApiFailure::Other { .. } => DomainError::Internal(message),
        }
    }
}

/// 优先级：error → message → detail → errors → 其余字段 → "状态码: 状态文本"
pub fn extract_error_message(failure: &ApiFailure) -> String {
    match failure {
        ApiFailure::Response {
            status,
            status_text,
            body,
        } => body
            .as_ref()
            .and_then(message_from_body)
            .unwrap_or_else(|| format!("{}: {}", status, status_text)),
        ApiFailure::NoResponse => NETWORK_ERROR_MESSAGE.to_string(),
        ApiFailure::Other { message } => message.clone(),
    }
}

fn message_from_body(body: &Value) -> Option<String> {
    match body {
        Value::Object(map) => {
            for field in MESSAGE_FIELDS {
                if let Some(message) = map.get(field).and_then(render_value) {
                    return Some(message);
                }
            }
            if let Some(message) = map.get("errors").and_then(render_value) {
                return Some(message);
            }
            render_pairs(map)
        }
        other => render_value(other),
    }
}

fn render_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Array(values) => {
            let parts: Vec<String> = values.iter().filter_map(render_value).collect();
            (!parts.is_empty()).then(|| parts.join(", "))
        }
        Value::Object(map) => render_pairs(map),
        Value::Bool(_) | Value::Number(_) => Some(value.to_string()),
    }
}

/// 按服务端返回的字段顺序拼接
fn render_pairs(map: &Map<String, Value>) -> Option<String> {
    let parts: Vec<String> = map
        .iter()
        .filter_map(|(field, value)| render_value(value).map(|message| format!("{}: {}", field, message)))
        .collect();
    (!parts.is_empty()).then(|| parts.join(", "))
}
