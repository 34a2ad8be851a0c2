use crate::application::dto::ExchangeDraft;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::{ExchangeOrder, ExchangeQuote};
use crate::ports::{MoneyExchangeBody, NotificationPort, OrderPaymentPort};
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, info};

/// 请求结束（包括 future 被丢弃）时清除在途标记
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// 换汇订单服务
pub struct ExchangeOrderService<A: OrderPaymentPort, N: NotificationPort> {
    api: Arc<A>,
    notifier: Arc<N>,
    in_flight: AtomicBool,
}

impl<A: OrderPaymentPort, N: NotificationPort> ExchangeOrderService<A, N> {
    pub fn new(api: Arc<A>, notifier: Arc<N>) -> Self {
        Self {
            api,
            notifier,
            in_flight: AtomicBool::new(false),
        }
    }

    /// 根据表单计算报价，字段缺失或超出范围时给出对应字段的错误
    pub fn quote(draft: &ExchangeDraft) -> DomainResult<ExchangeQuote> {
        let rate = draft
            .exchange_rate
            .ok_or_else(|| DomainError::validation("exchangeRate", "Please enter the exchange rate"))?;
        let principal = draft
            .source_amount
            .ok_or_else(|| DomainError::validation("moneyExChange", "Please enter the amount to exchange"))?;
        let fee = draft.fee.unwrap_or(Decimal::ZERO);

        let quote = ExchangeQuote::compute(principal, rate, fee)?;
        if quote.is_ready() {
            return Ok(quote);
        }

        if rate <= Decimal::ZERO {
            Err(DomainError::validation("exchangeRate", "Exchange rate must be greater than 0"))
        } else if principal <= Decimal::ZERO {
            Err(DomainError::validation("moneyExChange", "Amount must be greater than 0"))
        } else {
            Err(DomainError::validation("fee", "Fee must not be negative"))
        }
    }

    /// 创建换汇订单
    pub async fn create_exchange_order(
        &self,
        customer_code: &str,
        route_id: &str,
        draft: ExchangeDraft,
    ) -> DomainResult<ExchangeOrder> {
        let result = self.try_create(customer_code, route_id, draft).await;
        match &result {
            Ok(order) => self
                .notifier
                .success(&format!("Exchange order {} created", order.order_code)),
            Err(e) => self.notifier.error(&e.user_message(), None),
        }
        result
    }

    async fn try_create(
        &self,
        customer_code: &str,
        route_id: &str,
        draft: ExchangeDraft,
    ) -> DomainResult<ExchangeOrder> {
        if customer_code.trim().is_empty() {
            return Err(DomainError::validation("customerCode", "Please choose a customer"));
        }
        if route_id.trim().is_empty() {
            return Err(DomainError::validation("routeId", "Please choose a route"));
        }
        let quote = Self::quote(&draft)?;

        if self.in_flight.swap(true, Ordering::SeqCst) {
            return Err(DomainError::validation(
                "submit",
                "An exchange order is already being created",
            ));
        }
        let _guard = InFlightGuard(&self.in_flight);

        let body = MoneyExchangeBody {
            exchange_rate: quote.exchange_rate,
            money_exchange: quote.source_amount,
            image: draft.image.filter(|url| !url.trim().is_empty()),
            fee: quote.fee,
            note: draft.note.filter(|note| !note.trim().is_empty()),
        };

        info!(
            "Creating exchange order for {} on route {}: total {}",
            customer_code, route_id, quote.total_with_fee
        );
        let result = self
            .api
            .create_money_exchange(customer_code.trim(), route_id.trim(), &body)
            .await;

        if let Err(e) = &result {
            error!("Exchange order creation failed: {}", e);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::{FakeOrderApi, RecordedCall, RecordingNotifier};
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn draft() -> ExchangeDraft {
        ExchangeDraft {
            exchange_rate: Some(dec("25000.5")),
            source_amount: Some(dec("100")),
            fee: Some(dec("50000")),
            image: Some(String::new()),
            note: Some("first order".to_string()),
        }
    }

    #[test]
    fn test_quote_field_errors() {
        let mut d = draft();
        d.exchange_rate = Some(Decimal::ZERO);
        match ExchangeOrderService::<FakeOrderApi, RecordingNotifier>::quote(&d) {
            Err(DomainError::Validation { field, .. }) => assert_eq!(field, "exchangeRate"),
            other => panic!("unexpected: {:?}", other),
        }

        let mut d = draft();
        d.fee = Some(dec("-1"));
        match ExchangeOrderService::<FakeOrderApi, RecordingNotifier>::quote(&d) {
            Err(DomainError::Validation { field, .. }) => assert_eq!(field, "fee"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_quote_overflow_rejected() {
        let mut d = draft();
        d.source_amount = Some(dec("10000000000000000000000000"));
        d.exchange_rate = Some(dec("100000"));
        match ExchangeOrderService::<FakeOrderApi, RecordingNotifier>::quote(&d) {
            Err(DomainError::Validation { field, .. }) => assert_eq!(field, "moneyExChange"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_create_exchange_order() {
        let api = FakeOrderApi::new();
        let notifier = RecordingNotifier::new();
        let service = ExchangeOrderService::new(api.clone(), notifier.clone());

        let order = service
            .create_exchange_order("KH01", "3", draft())
            .await
            .unwrap();
        assert_eq!(order.order_code, "EX-001");
        assert_eq!(notifier.successes(), vec!["Exchange order EX-001 created".to_string()]);

        match &api.recorded()[0] {
            RecordedCall::Exchange(customer, route, body) => {
                assert_eq!(customer, "KH01");
                assert_eq!(route, "3");
                assert_eq!(body.money_exchange, dec("100"));
                assert_eq!(body.image, None);
                assert_eq!(body.note.as_deref(), Some("first order"));
            }
            other => panic!("unexpected call: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_invalid_draft_never_calls_api() {
        let api = FakeOrderApi::new();
        let notifier = RecordingNotifier::new();
        let service = ExchangeOrderService::new(api.clone(), notifier.clone());

        let mut d = draft();
        d.source_amount = None;
        assert!(service.create_exchange_order("KH01", "3", d).await.is_err());
        assert_eq!(api.payments(), 0);
        assert_eq!(notifier.errors().len(), 1);
    }

    #[tokio::test]
    async fn test_api_failure_surfaces_message() {
        let api = FakeOrderApi::failing(422, "route: not found");
        let notifier = RecordingNotifier::new();
        let service = ExchangeOrderService::new(api.clone(), notifier.clone());

        assert!(service.create_exchange_order("KH01", "3", draft()).await.is_err());
        assert_eq!(notifier.errors(), vec!["route: not found".to_string()]);

        // 失败后可以再次提交
        assert!(service.create_exchange_order("KH01", "3", draft()).await.is_err());
        assert_eq!(api.payments(), 2);
    }
}
