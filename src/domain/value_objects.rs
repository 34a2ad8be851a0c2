use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 金额保留的小数位
pub const MONEY_DECIMAL_PLACES: u32 = 2;

/// 四舍五入到分（远离零方向），每一步运算后都要调用
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// 货币金额（越南盾）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Money(#[serde(with = "rust_decimal::serde::float")] Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);

    pub fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    pub fn amount(&self) -> Decimal {
        self.0
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    pub fn rounded(&self) -> Self {
        Self(round2(self.0))
    }

    /// 溢出时返回 None
    pub fn checked_add(self, rhs: Money) -> Option<Money> {
        self.0.checked_add(rhs.0).map(Money)
    }

    pub fn checked_sum<I: IntoIterator<Item = Money>>(amounts: I) -> Option<Money> {
        amounts
            .into_iter()
            .try_fold(Money::ZERO, |acc, m| acc.checked_add(m))
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", crate::domain::format::format_currency_vnd(Some(self.0)))
    }
}

/// 行项目标识（服务端可能返回数字或字符串）
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineItemId(String);

impl LineItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for LineItemId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<u64> for LineItemId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for LineItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 行项目状态（仅用于展示，已取消的项目不可选择）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineItemStatus {
    /// 已入库
    InWarehouse,
    /// 待付款
    AwaitingPayment,
    /// 已付款
    Paid,
    /// 已取消
    Cancelled,
    /// 其他未识别状态
    Other(String),
}

impl LineItemStatus {
    /// 解析服务端状态标签，大小写和分隔符不敏感
    pub fn parse(raw: &str) -> Self {
        let key: String = raw
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();

        match key.as_str() {
            "inwarehouse" | "warehouse" | "instock" => LineItemStatus::InWarehouse,
            "awaitingpayment" | "waitpayment" | "pendingpayment" | "unpaid" => {
                LineItemStatus::AwaitingPayment
            }
            "paid" => LineItemStatus::Paid,
            "cancelled" | "canceled" | "cancel" => LineItemStatus::Cancelled,
            _ => LineItemStatus::Other(raw.to_string()),
        }
    }

    pub fn is_selectable(&self) -> bool {
        !matches!(self, LineItemStatus::Cancelled)
    }
}

impl fmt::Display for LineItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineItemStatus::InWarehouse => write!(f, "in_warehouse"),
            LineItemStatus::AwaitingPayment => write!(f, "awaiting_payment"),
            LineItemStatus::Paid => write!(f, "paid"),
            LineItemStatus::Cancelled => write!(f, "cancelled"),
            LineItemStatus::Other(raw) => write!(f, "{}", raw),
        }
    }
}

/// 支付结果状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// 待支付
    PendingPayment,
    /// 已支付
    Paid,
    /// 已取消
    Cancelled,
}

impl PaymentStatus {
    pub fn parse(raw: &str) -> Option<Self> {
        let key: String = raw
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();

        match key.as_str() {
            "pendingpayment" | "pending" | "waitpayment" | "unpaid" => {
                Some(PaymentStatus::PendingPayment)
            }
            "paid" | "success" | "completed" => Some(PaymentStatus::Paid),
            "cancelled" | "canceled" | "cancel" => Some(PaymentStatus::Cancelled),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PaymentStatus::PendingPayment => "Pending payment",
            PaymentStatus::Paid => "Paid",
            PaymentStatus::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentStatus::PendingPayment => write!(f, "pending_payment"),
            PaymentStatus::Paid => write!(f, "paid"),
            PaymentStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}
