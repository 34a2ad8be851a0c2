use std::future::Future;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::AbortHandle;
use tracing::debug;

/// 防抖：延迟执行任务，新的调用会取消尚未执行的上一次调用
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: Mutex<Option<AbortHandle>>,
}

/// 一次防抖调用的句柄
#[derive(Debug)]
pub struct DebounceHandle {
    abort: AbortHandle,
}

impl DebounceHandle {
    pub fn cancel(&self) {
        self.abort.abort();
    }
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Mutex::new(None),
        }
    }

    fn lock_pending(&self) -> MutexGuard<'_, Option<AbortHandle>> {
        self.pending.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// 必须在 tokio 运行时内调用
    pub fn call<F>(&self, task: F) -> DebounceHandle
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let delay = self.delay;
        let join = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            task.await;
        });
        let abort = join.abort_handle();

        if let Some(previous) = self.lock_pending().replace(join.abort_handle()) {
            debug!("Debounced call superseded");
            previous.abort();
        }

        DebounceHandle { abort }
    }

    /// 取消尚未执行的调用
    pub fn cancel(&self) {
        if let Some(pending) = self.lock_pending().take() {
            pending.abort();
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
