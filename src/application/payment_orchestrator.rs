use crate::application::dto::{PaymentRequest, PaymentTarget};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::PaymentResult;
use crate::ports::{NotificationPort, OrderPaymentPort, PaymentParams};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// 付款成功后通知列表所有者重新拉取
pub type RefreshHook = Arc<dyn Fn() + Send + Sync>;

/// 编排器状态，同一时刻只有一个
#[derive(Debug, Clone, PartialEq)]
pub enum OrchestratorState {
    /// 空闲，可以编辑配置
    Idle,
    /// 同步校验中
    Validating,
    /// 请求进行中，提交按钮应禁用
    Submitting { request: PaymentRequest },
    /// 成功，正在展示结果
    Succeeded { result: PaymentResult },
}

/// 一次提交的结果
#[derive(Debug)]
pub enum SubmitOutcome {
    /// 已有请求进行中或结果尚未关闭，本次调用被忽略
    Ignored,
    /// 本地校验失败，没有调用API
    Rejected(DomainError),
    Succeeded(PaymentResult),
    Failed(DomainError),
    /// 编排器已销毁，结果被丢弃
    Discarded,
}

impl SubmitOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SubmitOutcome::Succeeded(_))
    }
}

/// 请求途中 submit 的 future 被丢弃（例如客户端断开）时把状态恢复为 Idle
struct SubmittingGuard<'a> {
    state: &'a Mutex<OrchestratorState>,
    armed: bool,
}

impl<'a> SubmittingGuard<'a> {
    fn arm(state: &'a Mutex<OrchestratorState>) -> Self {
        Self { state, armed: true }
    }

    /// 请求已经完成，由调用方写入最终状态
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for SubmittingGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut state = self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if matches!(*state, OrchestratorState::Submitting { .. }) {
            warn!("Payment submission dropped mid-request, back to idle");
            *state = OrchestratorState::Idle;
        }
    }
}

/// 付款提交编排器
///
/// 每个实例同时最多一个请求在途；不同实例互相独立。
pub struct PaymentOrchestrator<A: OrderPaymentPort, N: NotificationPort> {
    id: Uuid,
    api: Arc<A>,
    notifier: Arc<N>,
    state: Mutex<OrchestratorState>,
    alive: AtomicBool,
    refresh_hook: Option<RefreshHook>,
}

impl<A: OrderPaymentPort, N: NotificationPort> PaymentOrchestrator<A, N> {
    pub fn new(api: Arc<A>, notifier: Arc<N>) -> Self {
        Self {
            id: Uuid::new_v4(),
            api,
            notifier,
            state: Mutex::new(OrchestratorState::Idle),
            alive: AtomicBool::new(true),
            refresh_hook: None,
        }
    }

    pub fn with_refresh_hook(mut self, hook: RefreshHook) -> Self {
        self.refresh_hook = Some(hook);
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    fn lock_state(&self) -> MutexGuard<'_, OrchestratorState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn set_state(&self, next: OrchestratorState) {
        *self.lock_state() = next;
    }

    pub fn state(&self) -> OrchestratorState {
        self.lock_state().clone()
    }

    pub fn is_submitting(&self) -> bool {
        matches!(*self.lock_state(), OrchestratorState::Submitting { .. })
    }

    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// 校验并提交付款请求
    pub async fn submit(&self, request: PaymentRequest) -> SubmitOutcome {
        if !self.is_alive() {
            return SubmitOutcome::Discarded;
        }

        // Idle -> Validating 必须是一次原子的检查并设置
        {
            let mut state = self.lock_state();
            if *state != OrchestratorState::Idle {
                debug!(orchestrator = %self.id, "Submit ignored, state is {:?}", *state);
                return SubmitOutcome::Ignored;
            }
            *state = OrchestratorState::Validating;
        }

        let params = match request.validate() {
            Ok(params) => params,
            Err(e) => {
                self.set_state(OrchestratorState::Idle);
                warn!(orchestrator = %self.id, "Payment request rejected: {}", e);
                self.notifier.error(&e.user_message(), None);
                return SubmitOutcome::Rejected(e);
            }
        };

        info!(
            orchestrator = %self.id,
            targets = request.target.len(),
            "Submitting payment"
        );
        self.set_state(OrchestratorState::Submitting {
            request: request.clone(),
        });

        let guard = SubmittingGuard::arm(&self.state);
        let result = self.dispatch(&params, &request.target).await;
        guard.disarm();

        if !self.is_alive() {
            debug!(orchestrator = %self.id, "Orchestrator torn down, discarding result");
            return SubmitOutcome::Discarded;
        }

        match result {
            Ok(payment) => {
                info!(
                    orchestrator = %self.id,
                    status = %payment.status,
                    "Payment created: {}",
                    payment.amount
                );
                self.set_state(OrchestratorState::Succeeded {
                    result: payment.clone(),
                });
                self.notifier.success(&format!(
                    "Payment request created ({})",
                    payment.amount
                ));
                if let Some(hook) = &self.refresh_hook {
                    hook();
                }
                SubmitOutcome::Succeeded(payment)
            }
            Err(e) => {
                error!(orchestrator = %self.id, "Payment submission failed: {}", e);
                self.set_state(OrchestratorState::Idle);
                self.notifier.error(&e.user_message(), None);
                SubmitOutcome::Failed(e)
            }
        }
    }

    async fn dispatch(
        &self,
        params: &PaymentParams,
        target: &PaymentTarget,
    ) -> DomainResult<PaymentResult> {
        match target {
            PaymentTarget::Shipments(codes) => self.api.create_partial_payment(params, codes).await,
            PaymentTarget::ShipCode(code) => {
                self.api.create_ship_code_payment(code.trim(), params).await
            }
            PaymentTarget::Orders(codes) => self.api.create_merged_payment(params, codes).await,
        }
    }

    /// 关闭结果展示，回到 Idle
    pub fn dismiss(&self) -> Option<PaymentResult> {
        let mut state = self.lock_state();
        match std::mem::replace(&mut *state, OrchestratorState::Idle) {
            OrchestratorState::Succeeded { result } => Some(result),
            other => {
                *state = other;
                None
            }
        }
    }

    /// 销毁后在途请求的结果不再写回
    pub fn teardown(&self) {
        self.alive.store(false, Ordering::SeqCst);
        debug!(orchestrator = %self.id, "Orchestrator torn down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::dto::PaymentConfig;
    use crate::application::test_support::{FakeOrderApi, RecordedCall, RecordingNotifier};
    use crate::domain::Money;
    use rust_decimal::Decimal;
    use std::sync::atomic::AtomicUsize;

    fn config() -> PaymentConfig {
        PaymentConfig {
            use_balance: false,
            bank_account_id: Some("7".to_string()),
            voucher_id: Some("v1".to_string()),
            domestic_shipping_price: Some(Money::new(Decimal::from(30_000))),
        }
    }

    fn divided() -> PaymentRequest {
        PaymentRequest::divided(vec!["SHP-A".into(), "SHP-B".into()], config())
    }

    #[tokio::test]
    async fn test_missing_bank_account_never_calls_api() {
        let api = FakeOrderApi::new();
        let notifier = RecordingNotifier::new();
        let orchestrator = PaymentOrchestrator::new(api.clone(), notifier.clone());

        let mut request = divided();
        request.config.bank_account_id = None;

        let outcome = orchestrator.submit(request).await;
        assert!(matches!(
            outcome,
            SubmitOutcome::Rejected(DomainError::Validation { .. })
        ));
        assert_eq!(api.payments(), 0);
        assert_eq!(orchestrator.state(), OrchestratorState::Idle);
        assert_eq!(notifier.errors(), vec!["Please choose a bank account".to_string()]);
    }

    #[tokio::test]
    async fn test_success_stores_result_and_refreshes() {
        let api = FakeOrderApi::new();
        let notifier = RecordingNotifier::new();
        let refreshed = Arc::new(AtomicUsize::new(0));
        let counter = refreshed.clone();
        let orchestrator = PaymentOrchestrator::new(api.clone(), notifier.clone())
            .with_refresh_hook(Arc::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }));

        let outcome = orchestrator.submit(divided()).await;
        assert!(outcome.is_success());
        assert!(matches!(
            orchestrator.state(),
            OrchestratorState::Succeeded { .. }
        ));
        assert_eq!(refreshed.load(Ordering::SeqCst), 1);
        assert_eq!(notifier.successes().len(), 1);

        match &api.recorded()[0] {
            RecordedCall::Partial(params, codes) => {
                assert_eq!(codes, &vec!["SHP-A".to_string(), "SHP-B".to_string()]);
                assert_eq!(params.voucher_id.as_deref(), Some("v1"));
            }
            other => panic!("unexpected call: {:?}", other),
        }

        // 结果未关闭前不能再次提交
        assert!(matches!(
            orchestrator.submit(divided()).await,
            SubmitOutcome::Ignored
        ));
        assert!(orchestrator.dismiss().is_some());
        assert_eq!(orchestrator.state(), OrchestratorState::Idle);
        assert!(orchestrator.dismiss().is_none());
    }

    #[tokio::test]
    async fn test_at_most_one_submission_in_flight() {
        let api = FakeOrderApi::holding();
        let notifier = RecordingNotifier::new();
        let orchestrator = Arc::new(PaymentOrchestrator::new(api.clone(), notifier.clone()));

        let first = {
            let orchestrator = orchestrator.clone();
            tokio::spawn(async move { orchestrator.submit(divided()).await })
        };
        api.entered.notified().await;
        assert!(orchestrator.is_submitting());

        let second = orchestrator.submit(divided()).await;
        assert!(matches!(second, SubmitOutcome::Ignored));

        api.release.notify_one();
        let first = first.await.unwrap();
        assert!(first.is_success());
        assert_eq!(api.payments(), 1);
    }

    #[tokio::test]
    async fn test_failure_returns_to_idle_and_notifies() {
        let api = FakeOrderApi::failing(400, "a, b");
        let notifier = RecordingNotifier::new();
        let refreshed = Arc::new(AtomicUsize::new(0));
        let counter = refreshed.clone();
        let orchestrator = PaymentOrchestrator::new(api.clone(), notifier.clone())
            .with_refresh_hook(Arc::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }));

        let outcome = orchestrator.submit(divided()).await;
        assert!(matches!(outcome, SubmitOutcome::Failed(DomainError::Api { .. })));
        assert_eq!(orchestrator.state(), OrchestratorState::Idle);
        assert_eq!(notifier.errors(), vec!["a, b".to_string()]);
        assert_eq!(refreshed.load(Ordering::SeqCst), 0);

        // 可以直接重试
        let retry = orchestrator.submit(divided()).await;
        assert!(matches!(retry, SubmitOutcome::Failed(_)));
        assert_eq!(api.payments(), 2);
    }

    #[tokio::test]
    async fn test_dropped_submit_returns_to_idle() {
        let api = FakeOrderApi::holding();
        let notifier = RecordingNotifier::new();
        let orchestrator = Arc::new(PaymentOrchestrator::new(api.clone(), notifier.clone()));

        let pending = {
            let orchestrator = orchestrator.clone();
            tokio::spawn(async move { orchestrator.submit(divided()).await })
        };
        api.entered.notified().await;
        assert!(orchestrator.is_submitting());

        pending.abort();
        assert!(pending.await.unwrap_err().is_cancelled());
        assert_eq!(orchestrator.state(), OrchestratorState::Idle);

        *api.hold.lock().unwrap() = false;
        let retry = orchestrator.submit(divided()).await;
        assert!(retry.is_success());
        assert_eq!(api.payments(), 2);
    }

    #[tokio::test]
    async fn test_result_discarded_after_teardown() {
        let api = FakeOrderApi::holding();
        let notifier = RecordingNotifier::new();
        let refreshed = Arc::new(AtomicUsize::new(0));
        let counter = refreshed.clone();
        let orchestrator = Arc::new(
            PaymentOrchestrator::new(api.clone(), notifier.clone()).with_refresh_hook(Arc::new(
                move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                },
            )),
        );

        let pending = {
            let orchestrator = orchestrator.clone();
            tokio::spawn(async move { orchestrator.submit(divided()).await })
        };
        api.entered.notified().await;
        orchestrator.teardown();
        api.release.notify_one();

        assert!(matches!(pending.await.unwrap(), SubmitOutcome::Discarded));
        assert!(notifier.successes().is_empty());
        assert_eq!(refreshed.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_independent_orchestrators() {
        let api = FakeOrderApi::new();
        let notifier = RecordingNotifier::new();
        let a = PaymentOrchestrator::new(api.clone(), notifier.clone());
        let b = PaymentOrchestrator::new(api.clone(), notifier.clone());
        assert_ne!(a.id(), b.id());

        let (ra, rb) = tokio::join!(
            a.submit(PaymentRequest::by_ship_code("VN123", config())),
            b.submit(PaymentRequest::merged(vec!["ORD-1".into()], config()))
        );
        assert!(ra.is_success());
        assert!(rb.is_success());
        assert_eq!(api.payments(), 2);
    }
}
