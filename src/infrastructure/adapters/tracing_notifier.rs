use crate::ports::{NotificationPort, NotifyOptions};
use tracing::{info, warn};

/// 没有前端时把提示写入日志
#[derive(Debug, Clone, Default)]
pub struct TracingNotifier;

impl TracingNotifier {
    pub fn new() -> Self {
        Self
    }
}

impl NotificationPort for TracingNotifier {
    fn success(&self, message: &str) {
        info!(notification = "success", "{}", message);
    }

    fn error(&self, message: &str, options: Option<NotifyOptions>) {
        let dedupe_key = options.and_then(|o| o.dedupe_key).unwrap_or_default();
        warn!(notification = "error", dedupe_key = %dedupe_key, "{}", message);
    }
}
