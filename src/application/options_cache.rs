use crate::domain::errors::DomainResult;
use crate::domain::PaymentOptions;
use crate::ports::OrderPaymentPort;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell};
use tracing::debug;

type Entry = Arc<OnceCell<Arc<PaymentOptions>>>;

/// 按客户缓存银行账户和优惠券，多个付款窗口共享（只读）
pub struct PaymentOptionsCache<A: OrderPaymentPort> {
    api: Arc<A>,
    /// 表锁只在取出条目时持有，拉取在条目自己的 OnceCell 上等待
    entries: Mutex<HashMap<String, Entry>>,
}

impl<A: OrderPaymentPort> PaymentOptionsCache<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self {
            api,
            entries: Mutex::new(HashMap::new()),
        }
    }

    async fn entry(&self, customer_code: &str) -> Entry {
        self.entries
            .lock()
            .await
            .entry(customer_code.to_string())
            .or_default()
            .clone()
    }

    /// 命中直接返回，否则拉取一次；同一客户的并发请求只会拉取一次，拉取失败下次重试
    pub async fn get(&self, customer_code: &str) -> DomainResult<Arc<PaymentOptions>> {
        let entry = self.entry(customer_code).await;
        let options = entry
            .get_or_try_init(|| async {
                debug!("Prefetching payment options for {}", customer_code);
                let (bank_accounts, vouchers) = tokio::try_join!(
                    self.api.list_bank_accounts(),
                    self.api.list_vouchers(customer_code)
                )?;
                DomainResult::Ok(Arc::new(PaymentOptions {
                    bank_accounts,
                    vouchers,
                }))
            })
            .await?;
        Ok(options.clone())
    }

    pub async fn invalidate(&self, customer_code: &str) {
        self.entries.lock().await.remove(customer_code);
    }

    pub async fn clear(&self) {
        self.entries.lock().await.clear();
    }
}
