use crate::domain::errors::DomainResult;
use crate::domain::{BankAccount, ExchangeOrder, Money, Page, PaymentResult, ShipCodePayment, Voucher};
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 待付款列表查询条件
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub page: u32,
    pub size: u32,
    /// 客户运输码过滤条件，空串表示不过滤
    pub ship_code: String,
}

impl ListQuery {
    pub fn new(ship_code: impl Into<String>, page: u32, size: u32) -> Self {
        Self {
            page,
            size,
            ship_code: ship_code.into(),
        }
    }
}

/// 已校验的付款参数，对应URL路径中的各段
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentParams {
    pub use_balance: bool,
    pub bank_account_id: String,
    pub domestic_shipping_price: Money,
    pub voucher_id: Option<String>,
}

/// 创建换汇订单的请求体
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoneyExchangeBody {
    #[serde(with = "rust_decimal::serde::float")]
    pub exchange_rate: Decimal,

    /// 兑换的本金（服务端字段名就是 moneyExChange）
    #[serde(rename = "moneyExChange", with = "rust_decimal::serde::float")]
    pub money_exchange: Decimal,

    /// 已上传的凭证图片地址
    pub image: Option<String>,

    #[serde(with = "rust_decimal::serde::float")]
    pub fee: Decimal,

    pub note: Option<String>,
}

/// 订单/付款 REST 服务端口接口
#[async_trait]
pub trait OrderPaymentPort: Send + Sync {
    /// 按客户运输码分页查询待付款记录
    async fn list_ship_code_payments(&self, query: &ListQuery)
        -> DomainResult<Page<ShipCodePayment>>;

    /// 分批付款：选中的若干运单 + 一笔国内段运费
    async fn create_partial_payment(
        &self,
        params: &PaymentParams,
        shipment_codes: &[String],
    ) -> DomainResult<PaymentResult>;

    /// 按客户运输码整单付款
    async fn create_ship_code_payment(
        &self,
        ship_code: &str,
        params: &PaymentParams,
    ) -> DomainResult<PaymentResult>;

    /// 合并多个订单一起付款
    async fn create_merged_payment(
        &self,
        params: &PaymentParams,
        order_codes: &[String],
    ) -> DomainResult<PaymentResult>;

    /// 创建换汇订单
    async fn create_money_exchange(
        &self,
        customer_code: &str,
        route_id: &str,
        body: &MoneyExchangeBody,
    ) -> DomainResult<ExchangeOrder>;

    /// 收款银行账户列表
    async fn list_bank_accounts(&self) -> DomainResult<Vec<BankAccount>>;

    /// 客户可用优惠券
    async fn list_vouchers(&self, customer_code: &str) -> DomainResult<Vec<Voucher>>;

    /// 下载图片（二维码）
    async fn fetch_image(&self, url: &str) -> DomainResult<Vec<u8>>;
}
