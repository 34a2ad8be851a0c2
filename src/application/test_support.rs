//! 测试用的端口假实现

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::{
    BankAccount, ExchangeOrder, LineItem, Money, Page, PaymentResult, PaymentStatus,
    ShipCodePayment, Voucher,
};
use crate::ports::{
    ClipboardPort, ListQuery, MoneyExchangeBody, NotificationPort, NotifyOptions,
    OrderPaymentPort, PaymentParams,
};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

pub fn sample_result() -> PaymentResult {
    PaymentResult {
        payment_code: Some("PAY-001".to_string()),
        status: PaymentStatus::PendingPayment,
        amount: Money::new(Decimal::from(380_000)),
        qr_code: None,
        qr_url: Some("https://qr.example/pay-001.png".to_string()),
        content: Some("PAY-001 VN123".to_string()),
        action_at: None,
    }
}

/// 记录到的付款调用
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    Partial(PaymentParams, Vec<String>),
    ShipCode(String, PaymentParams),
    Merged(PaymentParams, Vec<String>),
    Exchange(String, String, MoneyExchangeBody),
}

#[derive(Default)]
pub struct FakeOrderApi {
    pub payment_calls: AtomicUsize,
    pub list_calls: AtomicUsize,
    pub bank_calls: AtomicUsize,
    pub voucher_calls: AtomicUsize,
    pub recorded: Mutex<Vec<RecordedCall>>,
    pub lists: Mutex<Vec<Vec<LineItem>>>,
    pub fail_with: Mutex<Option<(u16, String)>>,
    /// 进入付款调用时通知
    pub entered: Notify,
    /// 设置后付款调用会一直等到 `release` 被通知
    pub hold: Mutex<bool>,
    pub release: Notify,
    /// 接下来这么多次列表拉取会等到 `list_release`
    pub held_lists: Mutex<usize>,
    pub list_entered: Notify,
    pub list_release: Notify,
    /// 该客户的优惠券拉取会等到 `voucher_release`
    pub held_voucher_customer: Mutex<Option<String>>,
    pub voucher_entered: Notify,
    pub voucher_release: Notify,
    pub image: Mutex<Option<Vec<u8>>>,
}

impl FakeOrderApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn holding() -> Arc<Self> {
        let api = Self::default();
        *api.hold.lock().unwrap() = true;
        Arc::new(api)
    }

    pub fn failing(status: u16, message: &str) -> Arc<Self> {
        let api = Self::default();
        *api.fail_with.lock().unwrap() = Some((status, message.to_string()));
        Arc::new(api)
    }

    /// 依次返回的列表
    pub fn push_list(&self, items: Vec<LineItem>) {
        self.lists.lock().unwrap().push(items);
    }

    pub fn payments(&self) -> usize {
        self.payment_calls.load(Ordering::SeqCst)
    }

    pub fn lists_fetched(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn recorded(&self) -> Vec<RecordedCall> {
        self.recorded.lock().unwrap().clone()
    }

    async fn pay(&self, call: RecordedCall) -> DomainResult<PaymentResult> {
        self.payment_calls.fetch_add(1, Ordering::SeqCst);
        self.recorded.lock().unwrap().push(call);
        self.entered.notify_one();

        let hold = *self.hold.lock().unwrap();
        if hold {
            self.release.notified().await;
        }

        let failure = self.fail_with.lock().unwrap().clone();
        match failure {
            Some((status, message)) => Err(DomainError::Api { status, message }),
            None => Ok(sample_result()),
        }
    }
}

#[async_trait]
impl OrderPaymentPort for FakeOrderApi {
    async fn list_ship_code_payments(
        &self,
        query: &ListQuery,
    ) -> DomainResult<Page<ShipCodePayment>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let items = {
            let mut lists = self.lists.lock().unwrap();
            if lists.len() > 1 {
                lists.remove(0)
            } else {
                lists.first().cloned().unwrap_or_default()
            }
        };

        let held = {
            let mut held_lists = self.held_lists.lock().unwrap();
            let held = *held_lists > 0;
            if held {
                *held_lists -= 1;
            }
            held
        };
        if held {
            self.list_entered.notify_one();
            self.list_release.notified().await;
        }

        Ok(Page {
            total_elements: 1,
            content: vec![ShipCodePayment {
                ship_code: query.ship_code.clone(),
                customer_name: None,
                items,
            }],
            page: query.page,
            size: query.size,
        })
    }

    async fn create_partial_payment(
        &self,
        params: &PaymentParams,
        shipment_codes: &[String],
    ) -> DomainResult<PaymentResult> {
        self.pay(RecordedCall::Partial(params.clone(), shipment_codes.to_vec()))
            .await
    }

    async fn create_ship_code_payment(
        &self,
        ship_code: &str,
        params: &PaymentParams,
    ) -> DomainResult<PaymentResult> {
        self.pay(RecordedCall::ShipCode(ship_code.to_string(), params.clone()))
            .await
    }

    async fn create_merged_payment(
        &self,
        params: &PaymentParams,
        order_codes: &[String],
    ) -> DomainResult<PaymentResult> {
        self.pay(RecordedCall::Merged(params.clone(), order_codes.to_vec()))
            .await
    }

    async fn create_money_exchange(
        &self,
        customer_code: &str,
        route_id: &str,
        body: &MoneyExchangeBody,
    ) -> DomainResult<ExchangeOrder> {
        self.payment_calls.fetch_add(1, Ordering::SeqCst);
        self.recorded.lock().unwrap().push(RecordedCall::Exchange(
            customer_code.to_string(),
            route_id.to_string(),
            body.clone(),
        ));

        let failure = self.fail_with.lock().unwrap().clone();
        match failure {
            Some((status, message)) => Err(DomainError::Api { status, message }),
            None => Ok(ExchangeOrder {
                order_code: "EX-001".to_string(),
                status: Some("PENDING".to_string()),
                exchange_rate: Some(body.exchange_rate),
                total: None,
            }),
        }
    }

    async fn list_bank_accounts(&self) -> DomainResult<Vec<BankAccount>> {
        self.bank_calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![BankAccount {
            id: "7".to_string(),
            bank_name: "VCB".to_string(),
            account_number: "0011".to_string(),
            account_holder: None,
        }])
    }

    async fn list_vouchers(&self, customer_code: &str) -> DomainResult<Vec<Voucher>> {
        self.voucher_calls.fetch_add(1, Ordering::SeqCst);
        let held = self.held_voucher_customer.lock().unwrap().as_deref() == Some(customer_code);
        if held {
            self.voucher_entered.notify_one();
            self.voucher_release.notified().await;
        }
        Ok(vec![Voucher {
            id: "v1".to_string(),
            code: format!("{}-SALE", customer_code),
            description: None,
        }])
    }

    async fn fetch_image(&self, url: &str) -> DomainResult<Vec<u8>> {
        self.image
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| DomainError::Network(format!("cannot fetch {}", url)))
    }
}

/// 记录所有提示
#[derive(Default)]
pub struct RecordingNotifier {
    pub successes: Mutex<Vec<String>>,
    pub errors: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn successes(&self) -> Vec<String> {
        self.successes.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }
}

impl NotificationPort for RecordingNotifier {
    fn success(&self, message: &str) {
        self.successes.lock().unwrap().push(message.to_string());
    }

    fn error(&self, message: &str, _options: Option<NotifyOptions>) {
        self.errors.lock().unwrap().push(message.to_string());
    }
}

/// 可配置是否可用的剪贴板
#[derive(Default)]
pub struct FakeClipboard {
    pub unsupported: bool,
    pub texts: Mutex<Vec<String>>,
    pub images: Mutex<Vec<Vec<u8>>>,
}

impl FakeClipboard {
    pub fn available() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn unsupported() -> Arc<Self> {
        Arc::new(Self {
            unsupported: true,
            ..Self::default()
        })
    }
}

#[async_trait]
impl ClipboardPort for FakeClipboard {
    async fn write_text(&self, text: &str) -> DomainResult<()> {
        if self.unsupported {
            return Err(DomainError::Clipboard(
                "Clipboard requires a secure (HTTPS) context".to_string(),
            ));
        }
        self.texts.lock().unwrap().push(text.to_string());
        Ok(())
    }

    async fn write_png(&self, png: Vec<u8>) -> DomainResult<()> {
        if self.unsupported {
            return Err(DomainError::Clipboard(
                "Clipboard requires a secure (HTTPS) context".to_string(),
            ));
        }
        self.images.lock().unwrap().push(png);
        Ok(())
    }
}
