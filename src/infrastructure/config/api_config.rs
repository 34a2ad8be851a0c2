use crate::domain::errors::{DomainError, DomainResult};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

/// 登录凭证，显式传入而不是从全局读取
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    pub bearer_token: Option<String>,
}

impl AuthContext {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            bearer_token: Some(token.into()),
        }
    }

    pub fn authorization(&self) -> Option<String> {
        self.bearer_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .map(|t| format!("Bearer {}", t))
    }
}

/// 订单/付款服务配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// 订单服务基础URL
    pub base_url: String,

    /// 请求超时
    pub timeout: Duration,

    /// 列表每页条数
    pub page_size: u32,

    /// 搜索防抖延迟
    pub search_debounce: Duration,

    /// 默认客户运输码
    pub default_ship_code: String,

    /// 网关监听地址
    pub server_host: String,

    pub server_port: u16,
}

fn optional_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_var<T: FromStr>(name: &str, default: T) -> DomainResult<T> {
    match optional_var(name) {
        Some(raw) => raw.trim().parse::<T>().map_err(|_| {
            DomainError::Configuration(format!("{} has an invalid value: {}", name, raw))
        }),
        None => Ok(default),
    }
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(30),
            page_size: 50,
            search_debounce: Duration::from_millis(300),
            default_ship_code: String::new(),
            server_host: "0.0.0.0".to_string(),
            server_port: 3000,
        }
    }

    pub fn from_env() -> DomainResult<(Arc<Self>, AuthContext)> {
        let base_url = optional_var("ORDER_API_BASE_URL").ok_or_else(|| {
            DomainError::Configuration("ORDER_API_BASE_URL must be set".to_string())
        })?;

        let config = Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(parse_var("ORDER_API_TIMEOUT_SECS", 30u64)?),
            page_size: parse_var("LIST_PAGE_SIZE", 50u32)?,
            search_debounce: Duration::from_millis(parse_var("SEARCH_DEBOUNCE_MS", 300u64)?),
            default_ship_code: optional_var("DEFAULT_SHIP_CODE").unwrap_or_default(),
            server_host: optional_var("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            server_port: parse_var("SERVER_PORT", 3000u16)?,
        };

        if config.page_size == 0 {
            return Err(DomainError::Configuration(
                "LIST_PAGE_SIZE must be greater than 0".to_string(),
            ));
        }

        let auth = AuthContext {
            bearer_token: optional_var("ORDER_API_TOKEN"),
        };

        Ok((Arc::new(config), auth))
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}
