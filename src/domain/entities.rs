use crate::domain::value_objects::{LineItemId, LineItemStatus, Money, PaymentStatus};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 可付款的行项目（一个可发货单元）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    /// 选择键，在同一次拉取的列表中唯一
    pub id: LineItemId,

    /// 运单号，多个行项目可能共用一个物理包裹，可能为空
    pub shipment_code: String,

    /// 国际段运费（越南盾），缺失时按0计算
    pub shipping_fee: Option<Money>,

    /// 重量（公斤），缺失时按0计算
    pub weight: Option<Decimal>,

    /// 状态（仅展示，已取消不可选择）
    pub status: LineItemStatus,
}

impl LineItem {
    pub fn new(id: impl Into<LineItemId>, shipment_code: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            shipment_code: shipment_code.into(),
            shipping_fee: None,
            weight: None,
            status: LineItemStatus::AwaitingPayment,
        }
    }

    pub fn with_fee(mut self, fee: Decimal) -> Self {
        self.shipping_fee = Some(Money::new(fee));
        self
    }

    pub fn with_weight(mut self, weight: Decimal) -> Self {
        self.weight = Some(weight);
        self
    }

    pub fn with_status(mut self, status: LineItemStatus) -> Self {
        self.status = status;
        self
    }

    /// 运费，缺失或为负时按0
    pub fn fee_or_zero(&self) -> Money {
        match self.shipping_fee {
            Some(fee) if !fee.is_negative() => fee,
            _ => Money::ZERO,
        }
    }

    /// 重量，缺失或为负时按0
    pub fn weight_or_zero(&self) -> Decimal {
        match self.weight {
            Some(w) if w.is_sign_positive() => w,
            _ => Decimal::ZERO,
        }
    }

    pub fn is_selectable(&self) -> bool {
        self.status.is_selectable()
    }
}

/// 按客户运输码汇总的待付款记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipCodePayment {
    pub ship_code: String,
    pub customer_name: Option<String>,
    pub items: Vec<LineItem>,
}

/// 分页结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page: u32,
    pub size: u32,
    pub total_elements: u64,
}

/// 服务端返回的支付结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResult {
    pub payment_code: Option<String>,
    pub status: PaymentStatus,
    pub amount: Money,
    /// 二维码内容（可能是 data URI）
    pub qr_code: Option<String>,
    /// 二维码图片地址
    pub qr_url: Option<String>,
    /// 转账备注等展示文字
    pub content: Option<String>,
    pub action_at: Option<DateTime<Utc>>,
}

/// 换汇订单
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeOrder {
    pub order_code: String,
    pub status: Option<String>,
    pub exchange_rate: Option<Decimal>,
    pub total: Option<Money>,
}

/// 收款银行账户
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankAccount {
    pub id: String,
    pub bank_name: String,
    pub account_number: String,
    pub account_holder: Option<String>,
}

/// 客户优惠券（服务端结算时抵扣）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Voucher {
    pub id: String,
    pub code: String,
    pub description: Option<String>,
}

/// 某个客户可用的付款选项
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentOptions {
    pub bank_accounts: Vec<BankAccount>,
    pub vouchers: Vec<Voucher>,
}
