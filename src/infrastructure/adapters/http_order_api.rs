use super::response_normalizer;
use crate::application::ApiFailure;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::{BankAccount, ExchangeOrder, Page, PaymentResult, ShipCodePayment, Voucher};
use crate::infrastructure::config::{ApiConfig, AuthContext};
use crate::ports::{ListQuery, MoneyExchangeBody, OrderPaymentPort, PaymentParams};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Url};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, error};

/// 订单/付款 REST 服务适配器
#[derive(Clone)]
pub struct HttpOrderApi {
    config: Arc<ApiConfig>,
    auth: AuthContext,
    client: Client,
}

impl HttpOrderApi {
    pub fn new(config: Arc<ApiConfig>, auth: AuthContext) -> DomainResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| DomainError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            config,
            auth,
            client,
        })
    }

    /// 拼接URL，每一段都会被转义
    fn endpoint<S: AsRef<str>>(&self, segments: &[S]) -> DomainResult<Url> {
        let mut url = Url::parse(&self.config.base_url).map_err(|e| {
            DomainError::Configuration(format!("Invalid ORDER_API_BASE_URL: {}", e))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                DomainError::Configuration("ORDER_API_BASE_URL cannot be a base".to_string())
            })?
            .pop_if_empty()
            .extend(segments.iter().map(AsRef::<str>::as_ref));
        Ok(url)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.auth.authorization() {
            Some(value) => builder.header("Authorization", value),
            None => builder,
        }
    }

    /// 发送请求并读取JSON，非 2xx 响应转换为 ApiFailure
    async fn send_json(&self, builder: RequestBuilder) -> DomainResult<Value> {
        let response = self
            .authorized(builder)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| failure_of(e).into_error())?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            error!("Order API returned {}: {}", status, text);
            let failure = ApiFailure::Response {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
                body: serde_json::from_str(&text).ok(),
            };
            return Err(failure.into_error());
        }

        let text = response
            .text()
            .await
            .map_err(|e| failure_of(e).into_error())?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        let body: Value = serde_json::from_str(&text)?;
        debug!("Order API response: {}", body);
        Ok(body)
    }

    /// 付款参数对应的URL段：useBalance / bankId / priceShipDos
    fn payment_segments(params: &PaymentParams) -> Vec<String> {
        vec![
            params.use_balance.to_string(),
            params.bank_account_id.clone(),
            params
                .domestic_shipping_price
                .amount()
                .normalize()
                .to_string(),
        ]
    }

    fn voucher_or_null(params: &PaymentParams) -> String {
        params
            .voucher_id
            .clone()
            .unwrap_or_else(|| "null".to_string())
    }
}

fn failure_of(e: reqwest::Error) -> ApiFailure {
    if let Some(status) = e.status() {
        return ApiFailure::Response {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            body: None,
        };
    }
    if e.is_connect() || e.is_timeout() || e.is_request() {
        error!("Order API unreachable: {}", e);
        return ApiFailure::NoResponse;
    }
    ApiFailure::Other {
        message: e.to_string(),
    }
}

#[async_trait]
impl OrderPaymentPort for HttpOrderApi {
    async fn list_ship_code_payments(
        &self,
        query: &ListQuery,
    ) -> DomainResult<Page<ShipCodePayment>> {
        let url = self.endpoint(&[
            "draft-domestics".to_string(),
            "ship-code".to_string(),
            "payment".to_string(),
            query.page.to_string(),
            query.size.to_string(),
        ])?;
        debug!("Listing ship code payments: {}", url);

        let body = self
            .send_json(self.client.get(url).query(&[("shipCode", query.ship_code.as_str())]))
            .await?;
        response_normalizer::ship_code_payment_page(&body, query.page, query.size)
    }

    async fn create_partial_payment(
        &self,
        params: &PaymentParams,
        shipment_codes: &[String],
    ) -> DomainResult<PaymentResult> {
        let mut segments = vec![
            "partial-shipment".to_string(),
            "partial-shipment".to_string(),
        ];
        segments.extend(Self::payment_segments(params));
        segments.push(Self::voucher_or_null(params));
        let url = self.endpoint(&segments)?;

        let body = self
            .send_json(
                self.client
                    .post(url)
                    .json(&json!({ "selectedShipmentCodes": shipment_codes })),
            )
            .await?;
        response_normalizer::payment_result(&body)
    }

    async fn create_ship_code_payment(
        &self,
        ship_code: &str,
        params: &PaymentParams,
    ) -> DomainResult<PaymentResult> {
        let mut segments = vec![
            "partial-shipment".to_string(),
            "by-ship-code".to_string(),
            ship_code.to_string(),
        ];
        segments.extend(Self::payment_segments(params));
        if let Some(voucher_id) = &params.voucher_id {
            segments.push(voucher_id.clone());
        }
        let url = self.endpoint(&segments)?;

        let body = self.send_json(self.client.post(url)).await?;
        response_normalizer::payment_result(&body)
    }

    async fn create_merged_payment(
        &self,
        params: &PaymentParams,
        order_codes: &[String],
    ) -> DomainResult<PaymentResult> {
        let mut segments = vec!["orders".to_string(), "merged-payment".to_string()];
        segments.extend(Self::payment_segments(params));
        segments.push(Self::voucher_or_null(params));
        let url = self.endpoint(&segments)?;

        let body = self
            .send_json(
                self.client
                    .post(url)
                    .json(&json!({ "orderCodes": order_codes })),
            )
            .await?;
        response_normalizer::payment_result(&body)
    }

    async fn create_money_exchange(
        &self,
        customer_code: &str,
        route_id: &str,
        body: &MoneyExchangeBody,
    ) -> DomainResult<ExchangeOrder> {
        let url = self.endpoint(&["orders", "money-exchange", customer_code, route_id])?;
        let response = self.send_json(self.client.post(url).json(body)).await?;
        response_normalizer::exchange_order(&response)
    }

    async fn list_bank_accounts(&self) -> DomainResult<Vec<BankAccount>> {
        let url = self.endpoint(&["bank-accounts"])?;
        let body = self.send_json(self.client.get(url)).await?;
        response_normalizer::bank_accounts(&body)
    }

    async fn list_vouchers(&self, customer_code: &str) -> DomainResult<Vec<Voucher>> {
        let url = self.endpoint(&["vouchers", "customer", customer_code])?;
        let body = self.send_json(self.client.get(url)).await?;
        response_normalizer::vouchers(&body)
    }

    async fn fetch_image(&self, url: &str) -> DomainResult<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| failure_of(e).into_error())?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiFailure::Response {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
                body: None,
            }
            .into_error());
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| failure_of(e).into_error())?;
        Ok(bytes.to_vec())
    }
}
