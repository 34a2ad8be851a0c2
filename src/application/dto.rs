use crate::domain::aggregate::SelectionAggregate;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::{LineItem, LineItemId, Money, SelectionSet};
use crate::ports::PaymentParams;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 付款配置子表单（银行账户/优惠券/余额/国内段运费）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentConfig {
    #[serde(default)]
    pub use_balance: bool,

    /// 收款银行账户，必填
    pub bank_account_id: Option<String>,

    /// 优惠券，可选
    pub voucher_id: Option<String>,

    /// 国内段运费（固定一笔），必填且不能为负
    pub domestic_shipping_price: Option<Money>,
}

impl PaymentConfig {
    /// 校验并转换为URL参数
    pub fn validate(&self) -> DomainResult<PaymentParams> {
        let bank_account_id = self
            .bank_account_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                DomainError::validation("bankAccountId", "Please choose a bank account")
            })?;

        let domestic_shipping_price = self.domestic_shipping_price.ok_or_else(|| {
            DomainError::validation(
                "domesticShippingPrice",
                "Please enter the domestic shipping price",
            )
        })?;

        if domestic_shipping_price.is_negative() {
            return Err(DomainError::validation(
                "domesticShippingPrice",
                "Domestic shipping price must not be negative",
            ));
        }

        let voucher_id = self
            .voucher_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string);

        Ok(PaymentParams {
            use_balance: self.use_balance,
            bank_account_id: bank_account_id.to_string(),
            domestic_shipping_price,
            voucher_id,
        })
    }
}

/// 付款目标，使用服务端认识的运单号/订单号而不是行id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "codes", rename_all = "snake_case")]
pub enum PaymentTarget {
    /// 分批付款：若干运单
    Shipments(Vec<String>),
    /// 按客户运输码整单付款
    ShipCode(String),
    /// 合并订单付款
    Orders(Vec<String>),
}

impl PaymentTarget {
    pub fn validate(&self) -> DomainResult<()> {
        match self {
            PaymentTarget::Shipments(codes) if codes.is_empty() => Err(DomainError::validation(
                "selection",
                "Please select at least one shipment",
            )),
            PaymentTarget::Orders(codes) if codes.is_empty() => Err(DomainError::validation(
                "selection",
                "Please select at least one order",
            )),
            PaymentTarget::ShipCode(code) if code.trim().is_empty() => Err(
                DomainError::validation("shipCode", "Ship code is required"),
            ),
            _ => Ok(()),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            PaymentTarget::Shipments(codes) | PaymentTarget::Orders(codes) => codes.len(),
            PaymentTarget::ShipCode(_) => 1,
        }
    }
}

/// 提交时刻的付款请求快照
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub config: PaymentConfig,
    pub target: PaymentTarget,
}

impl PaymentRequest {
    pub fn divided(shipment_codes: Vec<String>, config: PaymentConfig) -> Self {
        Self {
            config,
            target: PaymentTarget::Shipments(shipment_codes),
        }
    }

    pub fn by_ship_code(ship_code: impl Into<String>, config: PaymentConfig) -> Self {
        Self {
            config,
            target: PaymentTarget::ShipCode(ship_code.into()),
        }
    }

    pub fn merged(order_codes: Vec<String>, config: PaymentConfig) -> Self {
        Self {
            config,
            target: PaymentTarget::Orders(order_codes),
        }
    }

    /// 先校验选择再校验配置，与表单上的提示顺序一致
    pub fn validate(&self) -> DomainResult<PaymentParams> {
        self.target.validate()?;
        self.config.validate()
    }
}

/// 换汇表单草稿
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeDraft {
    pub exchange_rate: Option<Decimal>,
    pub source_amount: Option<Decimal>,
    pub fee: Option<Decimal>,
    pub image: Option<String>,
    pub note: Option<String>,
}

/// 工作区汇总（给前端展示）
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceSummary {
    pub ship_code: String,
    pub item_count: usize,
    pub all_selected: bool,
    pub aggregate: SelectionAggregate,
    pub shipment_codes: Vec<String>,
    pub final_payable: Option<Money>,
    pub selected_total_display: String,
    pub selected_weight_display: String,
    pub final_payable_display: Option<String>,
}

/// 工作区快照
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceView {
    pub ship_code: String,
    pub items: Vec<LineItem>,
    pub selection: SelectionSet,
}

/// 切换客户
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchCustomerRequest {
    pub ship_code: String,
}

/// 合并订单付款
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedPaymentRequest {
    pub order_codes: Vec<String>,

    #[serde(flatten)]
    pub config: PaymentConfig,
}

/// 勾选/取消勾选
#[derive(Debug, Deserialize)]
pub struct ToggleRequest {
    pub id: LineItemId,
}

/// 汇总查询参数
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryQuery {
    pub domestic_shipping_price: Option<String>,
}

/// 错误响应
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }
}
