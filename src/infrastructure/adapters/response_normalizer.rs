//! 把服务端格式不统一的 JSON 规整成强类型
//!
//! 服务端有时直接返回数组，有时包在 `{content: [...]}` 或 `{data: {...}}` 里，
//! id 和金额也可能是数字或字符串。所有这些差异只在这里处理。

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::{
    BankAccount, ExchangeOrder, LineItem, LineItemId, LineItemStatus, Money, Page, PaymentResult,
    PaymentStatus, ShipCodePayment, Voucher,
};
use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;

const LIST_KEYS: [&str; 4] = ["content", "items", "list", "data"];

/// 去掉 `{data: ...}` 外壳
fn unwrap_envelope(value: &Value) -> &Value {
    let mut current = value;
    while let Some(inner) = current.get("data").filter(|inner| !inner.is_null()) {
        if inner.is_object() || inner.is_array() {
            current = inner;
        } else {
            break;
        }
    }
    current
}

/// 取出列表：数组本身，或 `content`/`items`/`list`/`data` 字段
fn list_of(value: &Value) -> Option<&Vec<Value>> {
    if let Some(array) = value.as_array() {
        return Some(array);
    }
    LIST_KEYS
        .iter()
        .find_map(|key| value.get(*key).and_then(Value::as_array))
        .or_else(|| {
            let inner = unwrap_envelope(value);
            if std::ptr::eq(inner, value) {
                None
            } else {
                list_of(inner)
            }
        })
}

fn field<'a>(value: &'a Value, names: &[&str]) -> Option<&'a Value> {
    names
        .iter()
        .find_map(|name| value.get(*name).filter(|v| !v.is_null()))
}

fn string_field(value: &Value, names: &[&str]) -> Option<String> {
    field(value, names).and_then(|v| match v {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// 数字或数字字符串转 Decimal，非数字返回 None
fn decimal_of(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => {
            let raw = n.to_string();
            Decimal::from_str(&raw)
                .or_else(|_| Decimal::from_scientific(&raw))
                .ok()
        }
        Value::String(s) => Decimal::from_str(s.trim()).ok(),
        _ => None,
    }
}

fn decimal_field(value: &Value, names: &[&str]) -> Option<Decimal> {
    field(value, names).and_then(decimal_of)
}

fn u64_field(value: &Value, names: &[&str]) -> Option<u64> {
    field(value, names).and_then(|v| match v {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

fn datetime_of(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Some(at.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
}

pub fn line_item(value: &Value) -> DomainResult<LineItem> {
    let id = string_field(value, &["id"])
        .filter(|id| !id.is_empty())
        .ok_or_else(|| DomainError::InvalidResponse("line item without id".to_string()))?;

    Ok(LineItem {
        id: LineItemId::new(id),
        shipment_code: string_field(value, &["shipmentCode", "trackingCode"]).unwrap_or_default(),
        shipping_fee: decimal_field(value, &["shippingFee", "fee", "totalPrice"]).map(Money::new),
        weight: decimal_field(value, &["weight", "weightKg"]),
        status: string_field(value, &["status"])
            .map(|raw| LineItemStatus::parse(&raw))
            .unwrap_or(LineItemStatus::AwaitingPayment),
    })
}

fn ship_code_payment(value: &Value) -> DomainResult<ShipCodePayment> {
    let items = field(value, &["items", "lineItems", "draftDomestics", "shipments"])
        .and_then(Value::as_array)
        .map(|items| items.iter().map(line_item).collect::<DomainResult<Vec<_>>>())
        .transpose()?
        .unwrap_or_default();

    Ok(ShipCodePayment {
        ship_code: string_field(value, &["shipCode", "customerCode"]).unwrap_or_default(),
        customer_name: string_field(value, &["customerName", "fullName"]),
        items,
    })
}

pub fn ship_code_payment_page(
    value: &Value,
    page: u32,
    size: u32,
) -> DomainResult<Page<ShipCodePayment>> {
    let envelope = unwrap_envelope(value);
    let entries = list_of(envelope).ok_or_else(|| {
        DomainError::InvalidResponse("expected a list of ship code payments".to_string())
    })?;

    let content = entries
        .iter()
        .map(ship_code_payment)
        .collect::<DomainResult<Vec<_>>>()?;
    let total_elements = u64_field(envelope, &["totalElements", "total", "totalItems"])
        .unwrap_or(content.len() as u64);

    Ok(Page {
        content,
        page: u64_field(envelope, &["number", "page"])
            .and_then(|p| u32::try_from(p).ok())
            .unwrap_or(page),
        size: u64_field(envelope, &["size"])
            .and_then(|s| u32::try_from(s).ok())
            .unwrap_or(size),
        total_elements,
    })
}

pub fn payment_result(value: &Value) -> DomainResult<PaymentResult> {
    let body = unwrap_envelope(value);
    if !body.is_object() {
        return Err(DomainError::InvalidResponse(
            "expected a payment object".to_string(),
        ));
    }

    let status = match string_field(body, &["status"]) {
        Some(raw) => PaymentStatus::parse(&raw).ok_or_else(|| {
            DomainError::InvalidResponse(format!("unknown payment status: {}", raw))
        })?,
        None => PaymentStatus::PendingPayment,
    };

    let amount = decimal_field(body, &["amount", "totalAmount", "total"]).ok_or_else(|| {
        DomainError::InvalidResponse("payment object without amount".to_string())
    })?;

    Ok(PaymentResult {
        payment_code: string_field(body, &["paymentCode", "code"]),
        status,
        amount: Money::new(amount),
        qr_code: string_field(body, &["qrCode"]),
        qr_url: string_field(body, &["qrUrl", "qrImageUrl"]),
        content: string_field(body, &["content", "description"]),
        action_at: string_field(body, &["actionAt"]).and_then(|raw| datetime_of(&raw)),
    })
}

pub fn exchange_order(value: &Value) -> DomainResult<ExchangeOrder> {
    let body = unwrap_envelope(value);
    let order_code = string_field(body, &["orderCode", "code"])
        .filter(|code| !code.is_empty())
        .ok_or_else(|| DomainError::InvalidResponse("exchange order without orderCode".to_string()))?;

    Ok(ExchangeOrder {
        order_code,
        status: string_field(body, &["status"]),
        exchange_rate: decimal_field(body, &["exchangeRate"]),
        total: decimal_field(body, &["total", "totalAmount"]).map(Money::new),
    })
}

pub fn bank_accounts(value: &Value) -> DomainResult<Vec<BankAccount>> {
    let entries = list_of(unwrap_envelope(value))
        .ok_or_else(|| DomainError::InvalidResponse("expected a list of bank accounts".to_string()))?;

    entries
        .iter()
        .map(|entry| {
            let id = string_field(entry, &["id"]).ok_or_else(|| {
                DomainError::InvalidResponse("bank account without id".to_string())
            })?;
            Ok(BankAccount {
                id,
                bank_name: string_field(entry, &["bankName", "name"]).unwrap_or_default(),
                account_number: string_field(entry, &["accountNumber"]).unwrap_or_default(),
                account_holder: string_field(entry, &["accountHolder", "accountName"]),
            })
        })
        .collect()
}

pub fn vouchers(value: &Value) -> DomainResult<Vec<Voucher>> {
    let entries = list_of(unwrap_envelope(value))
        .ok_or_else(|| DomainError::InvalidResponse("expected a list of vouchers".to_string()))?;

    entries
        .iter()
        .map(|entry| {
            let id = string_field(entry, &["id", "voucherId"]).ok_or_else(|| {
                DomainError::InvalidResponse("voucher without id".to_string())
            })?;
            Ok(Voucher {
                code: string_field(entry, &["code"]).unwrap_or_else(|| id.clone()),
                id,
                description: string_field(entry, &["description", "name"]),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_page_from_spring_style_body() {
        let body = json!({
            "content": [{
                "shipCode": "VN123",
                "customerName": "Nguyen Van A",
                "items": [
                    { "id": 1, "shipmentCode": "SHP-A", "shippingFee": 100000, "weight": "1.5", "status": "IN_WAREHOUSE" },
                    { "id": "2", "shipmentCode": null, "shippingFee": "abc", "status": "CANCELLED" }
                ]
            }],
            "totalElements": 7,
            "number": 0,
            "size": 20
        });

        let page = ship_code_payment_page(&body, 0, 50).unwrap();
        assert_eq!(page.total_elements, 7);
        assert_eq!(page.size, 20);

        let items = &page.content[0].items;
        assert_eq!(items[0].id, LineItemId::from("1"));
        assert_eq!(items[0].shipping_fee, Some(Money::new(Decimal::from(100_000))));
        assert_eq!(items[0].weight, Some(Decimal::from_str("1.5").unwrap()));
        assert_eq!(items[0].status, LineItemStatus::InWarehouse);

        assert_eq!(items[1].shipment_code, "");
        assert_eq!(items[1].shipping_fee, None);
        assert_eq!(items[1].status, LineItemStatus::Cancelled);
    }

    #[test]
    fn test_page_from_bare_array_and_data_envelope() {
        let bare = json!([{ "shipCode": "VN1", "items": [] }]);
        let page = ship_code_payment_page(&bare, 2, 10).unwrap();
        assert_eq!(page.content.len(), 1);
        assert_eq!(page.page, 2);
        assert_eq!(page.total_elements, 1);

        let wrapped = json!({ "data": { "content": [{ "shipCode": "VN2" }], "total": 3 } });
        let page = ship_code_payment_page(&wrapped, 0, 10).unwrap();
        assert_eq!(page.content[0].ship_code, "VN2");
        assert_eq!(page.total_elements, 3);

        assert!(ship_code_payment_page(&json!({ "ok": true }), 0, 10).is_err());
    }

    #[test]
    fn test_payment_result() {
        let body = json!({
            "data": {
                "paymentCode": "PAY-9",
                "status": "PENDING_PAYMENT",
                "amount": "380000",
                "qrCode": "data:image/png;base64,iVBORw==",
                "content": "PAY-9 VN123",
                "actionAt": "2024-05-01T09:30:00"
            }
        });

        let result = payment_result(&body).unwrap();
        assert_eq!(result.status, PaymentStatus::PendingPayment);
        assert_eq!(result.amount, Money::new(Decimal::from(380_000)));
        assert_eq!(result.qr_url, None);
        assert!(result.action_at.is_some());
    }

    #[test]
    fn test_payment_result_rejects_garbage() {
        assert!(payment_result(&json!({ "status": "WHAT", "amount": 1 })).is_err());
        assert!(payment_result(&json!({ "status": "PAID" })).is_err());
        assert!(payment_result(&json!([1, 2])).is_err());
    }

    #[test]
    fn test_exchange_order_and_options() {
        let order = exchange_order(&json!({ "orderCode": "EX-1", "exchangeRate": 25000.5 })).unwrap();
        assert_eq!(order.order_code, "EX-1");
        assert_eq!(order.exchange_rate, Some(Decimal::from_str("25000.5").unwrap()));
        assert!(exchange_order(&json!({})).is_err());

        let accounts = bank_accounts(&json!({ "data": [{ "id": 7, "bankName": "VCB", "accountNumber": "0011" }] })).unwrap();
        assert_eq!(accounts[0].id, "7");

        let list = vouchers(&json!({ "content": [{ "id": "v1" }] })).unwrap();
        assert_eq!(list[0].code, "v1");
    }
}
