use std::time::Duration;

/// 提示选项
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotifyOptions {
    /// 显示时长，None 使用默认值
    pub duration: Option<Duration>,
    /// 相同 key 的提示只保留最新一条
    pub dedupe_key: Option<String>,
}

/// 提示消息端口（成功/失败 toast），调用方不关心返回值
pub trait NotificationPort: Send + Sync {
    fn success(&self, message: &str);

    fn error(&self, message: &str, options: Option<NotifyOptions>);
}
