//! 已选行项目的汇总计算和换汇报价
//!
//! 这里只有纯函数；优惠券和余额抵扣由服务端结算，客户端只透传选项。

use crate::domain::entities::LineItem;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::selection::SelectionSet;
use crate::domain::value_objects::{round2, Money};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// 已选行项目的汇总
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionAggregate {
    pub selected_count: usize,
    pub selected_total: Money,
    pub selected_weight: Decimal,
}

impl SelectionAggregate {
    /// 金额或重量累加溢出时返回校验错误
    pub fn compute(items: &[LineItem], selection: &SelectionSet) -> DomainResult<Self> {
        let mut selected_total = Money::ZERO;
        let mut selected_weight = Decimal::ZERO;

        for item in items.iter().filter(|item| selection.contains(&item.id)) {
            selected_total = selected_total
                .checked_add(item.fee_or_zero())
                .ok_or_else(|| {
                    DomainError::validation("selection", "Selected amounts are too large to add up")
                })?;
            selected_weight = selected_weight
                .checked_add(item.weight_or_zero())
                .ok_or_else(|| {
                    DomainError::validation("selection", "Selected weights are too large to add up")
                })?;
        }

        Ok(Self {
            selected_count: selection.len(),
            selected_total,
            selected_weight,
        })
    }

    /// 国际段运费合计加上一笔固定的国内段运费
    pub fn final_payable(&self, domestic_shipping_price: Money) -> DomainResult<Money> {
        self.selected_total
            .checked_add(domestic_shipping_price)
            .ok_or_else(|| {
                DomainError::validation(
                    "domesticShippingPrice",
                    "Domestic shipping price is too large",
                )
            })
    }
}

/// 已选行项目对应的运单号，去重、去空，保持列表顺序
pub fn selected_shipment_codes(items: &[LineItem], selection: &SelectionSet) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .iter()
        .filter(|item| selection.contains(&item.id))
        .map(|item| item.shipment_code.trim())
        .filter(|code| !code.is_empty())
        .filter(|code| seen.insert(code.to_string()))
        .map(str::to_string)
        .collect()
}

/// 换汇报价
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeQuote {
    pub source_amount: Decimal,
    pub exchange_rate: Decimal,
    pub fee: Decimal,
    pub converted_amount: Decimal,
    pub total_with_fee: Decimal,
    pub fee_percent: Decimal,
}

impl ExchangeQuote {
    /// 每一步乘法/加法之后都四舍五入到分，与服务端复算保持一致
    ///
    /// 任何一步溢出都返回对应字段的校验错误
    pub fn compute(
        source_amount: Decimal,
        exchange_rate: Decimal,
        fee: Decimal,
    ) -> DomainResult<Self> {
        let converted_amount = source_amount
            .checked_mul(exchange_rate)
            .map(round2)
            .ok_or_else(|| {
                DomainError::validation(
                    "moneyExChange",
                    "Amount is too large for this exchange rate",
                )
            })?;
        let fee_too_large = || DomainError::validation("fee", "Fee is too large");
        let total_with_fee = converted_amount
            .checked_add(fee)
            .map(round2)
            .ok_or_else(fee_too_large)?;
        let fee_percent = if converted_amount > Decimal::ZERO {
            fee.checked_div(converted_amount)
                .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
                .map(round2)
                .ok_or_else(fee_too_large)?
        } else {
            Decimal::ZERO
        };

        Ok(Self {
            source_amount,
            exchange_rate,
            fee,
            converted_amount,
            total_with_fee,
            fee_percent,
        })
    }

    pub fn is_ready(&self) -> bool {
        self.exchange_rate > Decimal::ZERO
            && self.source_amount > Decimal::ZERO
            && self.fee >= Decimal::ZERO
    }
}
