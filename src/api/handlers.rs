use crate::application::{
    ErrorResponse, ExchangeDraft, ExchangeOrderService, MergedPaymentRequest, PaymentConfig,
    PaymentOptionsCache, PaymentOrchestrator, PaymentReceipt, PaymentRequest, PaymentWorkspace,
    SubmitOutcome, SummaryQuery, SwitchCustomerRequest, ToggleRequest,
};
use crate::domain::errors::DomainError;
use crate::domain::format::parse_grouped;
use crate::domain::Money;
use crate::ports::{NotificationPort, OrderPaymentPort};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;
use tracing::{error, info, warn};

type ApiError = (StatusCode, Json<ErrorResponse>);

/// 应用状态
pub struct AppState<A: OrderPaymentPort + 'static, N: NotificationPort + 'static> {
    pub api: Arc<A>,
    pub notifier: Arc<N>,
    pub workspace: Arc<PaymentWorkspace<A, N>>,
    pub exchange: Arc<ExchangeOrderService<A, N>>,
    pub options: Arc<PaymentOptionsCache<A>>,
}

impl<A: OrderPaymentPort + 'static, N: NotificationPort + 'static> Clone for AppState<A, N> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            notifier: self.notifier.clone(),
            workspace: self.workspace.clone(),
            exchange: self.exchange.clone(),
            options: self.options.clone(),
        }
    }
}

fn status_of(e: &DomainError) -> StatusCode {
    match e {
        DomainError::Validation { .. } => StatusCode::BAD_REQUEST,
        DomainError::NotFound(_) => StatusCode::NOT_FOUND,
        DomainError::Api { .. } | DomainError::InvalidResponse(_) => StatusCode::BAD_GATEWAY,
        DomainError::Network(_) => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_code(e: &DomainError) -> &'static str {
    match e {
        DomainError::Validation { .. } => "VALIDATION_ERROR",
        DomainError::NotFound(_) => "NOT_FOUND",
        DomainError::Api { .. } => "UPSTREAM_ERROR",
        DomainError::Network(_) => "NETWORK_ERROR",
        DomainError::InvalidResponse(_) => "INVALID_RESPONSE",
        _ => "INTERNAL_ERROR",
    }
}

fn api_error(e: DomainError) -> ApiError {
    if e.is_retryable() {
        warn!("Upstream call failed: {}", e);
    }
    (
        status_of(&e),
        Json(ErrorResponse::new(error_code(&e), e.user_message())),
    )
}

/// 付款提交结果转换为HTTP响应
fn outcome_response(outcome: SubmitOutcome) -> Result<Response, ApiError> {
    match outcome {
        SubmitOutcome::Succeeded(result) => {
            Ok((StatusCode::CREATED, Json(PaymentReceipt::from(&result))).into_response())
        }
        SubmitOutcome::Rejected(e) | SubmitOutcome::Failed(e) => Err(api_error(e)),
        SubmitOutcome::Ignored => Err((
            StatusCode::CONFLICT,
            Json(ErrorResponse::new(
                "PAYMENT_IN_PROGRESS",
                "A payment is already in progress or awaiting dismissal",
            )),
        )),
        SubmitOutcome::Discarded => Err((
            StatusCode::GONE,
            Json(ErrorResponse::new("DISCARDED", "The payment window was closed")),
        )),
    }
}

/// 健康检查
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" })))
}

/// 工作区快照
pub async fn workspace_view<A: OrderPaymentPort + 'static, N: NotificationPort + 'static>(
    State(state): State<AppState<A, N>>,
) -> impl IntoResponse {
    Json(state.workspace.view().await)
}

/// 重新拉取列表
pub async fn refresh_workspace<A: OrderPaymentPort + 'static, N: NotificationPort + 'static>(
    State(state): State<AppState<A, N>>,
) -> Result<impl IntoResponse, ApiError> {
    state.workspace.refresh().await.map_err(|e| {
        error!("Workspace refresh error: {}", e);
        api_error(e)
    })?;
    Ok(Json(state.workspace.view().await))
}

/// 切换客户（立即生效）
pub async fn switch_customer<A: OrderPaymentPort + 'static, N: NotificationPort + 'static>(
    State(state): State<AppState<A, N>>,
    Json(request): Json<SwitchCustomerRequest>,
) -> Result<impl IntoResponse, ApiError> {
    info!("Switching workspace customer to {}", request.ship_code);
    state
        .workspace
        .switch_customer(request.ship_code)
        .await
        .map_err(api_error)?;
    Ok(Json(state.workspace.view().await))
}

/// 搜索框输入，防抖后再拉取
pub async fn search_customer<A: OrderPaymentPort + 'static, N: NotificationPort + 'static>(
    State(state): State<AppState<A, N>>,
    Json(request): Json<SwitchCustomerRequest>,
) -> impl IntoResponse {
    // 句柄丢弃不会取消，下一次输入会覆盖
    let _ = state.workspace.schedule_search(request.ship_code);
    StatusCode::ACCEPTED
}

pub async fn toggle_selection<A: OrderPaymentPort + 'static, N: NotificationPort + 'static>(
    State(state): State<AppState<A, N>>,
    Json(request): Json<ToggleRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .workspace
        .toggle(&request.id)
        .await
        .map(Json)
        .map_err(api_error)
}

pub async fn select_all<A: OrderPaymentPort + 'static, N: NotificationPort + 'static>(
    State(state): State<AppState<A, N>>,
) -> impl IntoResponse {
    Json(state.workspace.select_all().await)
}

pub async fn clear_selection<A: OrderPaymentPort + 'static, N: NotificationPort + 'static>(
    State(state): State<AppState<A, N>>,
) -> impl IntoResponse {
    Json(state.workspace.clear_selection().await)
}

/// 选中汇总，国内段运费按显示格式输入（如 "30.000"）
pub async fn workspace_summary<A: OrderPaymentPort + 'static, N: NotificationPort + 'static>(
    State(state): State<AppState<A, N>>,
    Query(query): Query<SummaryQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let price = match query.domestic_shipping_price.as_deref() {
        Some(raw) => parse_grouped(raw).map_err(|e| {
            api_error(DomainError::validation("domesticShippingPrice", e.to_string()))
        })?,
        None => None,
    };
    state
        .workspace
        .summary(price.map(Money::new))
        .await
        .map(Json)
        .map_err(api_error)
}

/// 分批付款（当前选择）
pub async fn submit_divided<A: OrderPaymentPort + 'static, N: NotificationPort + 'static>(
    State(state): State<AppState<A, N>>,
    Json(config): Json<PaymentConfig>,
) -> Result<Response, ApiError> {
    info!("Received divided payment request");
    outcome_response(state.workspace.submit_divided(config).await)
}

/// 当前客户整单付款
pub async fn submit_ship_code<A: OrderPaymentPort + 'static, N: NotificationPort + 'static>(
    State(state): State<AppState<A, N>>,
    Json(config): Json<PaymentConfig>,
) -> Result<Response, ApiError> {
    info!("Received ship code payment request");
    outcome_response(state.workspace.submit_ship_code(config).await)
}

/// 合并订单付款，每个请求使用独立的编排器
pub async fn submit_merged<A: OrderPaymentPort + 'static, N: NotificationPort + 'static>(
    State(state): State<AppState<A, N>>,
    Json(request): Json<MergedPaymentRequest>,
) -> Result<Response, ApiError> {
    info!("Received merged payment request for {} orders", request.order_codes.len());
    let orchestrator = PaymentOrchestrator::new(state.api.clone(), state.notifier.clone());
    let outcome = orchestrator
        .submit(PaymentRequest::merged(request.order_codes, request.config))
        .await;
    outcome_response(outcome)
}

/// 关闭结果窗口
pub async fn dismiss_result<A: OrderPaymentPort + 'static, N: NotificationPort + 'static>(
    State(state): State<AppState<A, N>>,
) -> Response {
    match state.workspace.dismiss_result() {
        Some(result) => Json(PaymentReceipt::from(&result)).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

/// 换汇报价（不下单）
pub async fn exchange_quote<A: OrderPaymentPort + 'static, N: NotificationPort + 'static>(
    State(_state): State<AppState<A, N>>,
    Json(draft): Json<ExchangeDraft>,
) -> Result<impl IntoResponse, ApiError> {
    ExchangeOrderService::<A, N>::quote(&draft)
        .map(Json)
        .map_err(api_error)
}

/// 创建换汇订单
pub async fn create_exchange_order<A: OrderPaymentPort + 'static, N: NotificationPort + 'static>(
    State(state): State<AppState<A, N>>,
    Path((customer_code, route_id)): Path<(String, String)>,
    Json(draft): Json<ExchangeDraft>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .exchange
        .create_exchange_order(&customer_code, &route_id, draft)
        .await
        .map(|order| (StatusCode::CREATED, Json(order)))
        .map_err(|e| {
            warn!("Exchange order error: {}", e);
            api_error(e)
        })
}

/// 丢弃客户的付款选项缓存
pub async fn invalidate_payment_options<
    A: OrderPaymentPort + 'static,
    N: NotificationPort + 'static,
>(
    State(state): State<AppState<A, N>>,
    Path(customer_code): Path<String>,
) -> StatusCode {
    state.options.invalidate(&customer_code).await;
    StatusCode::NO_CONTENT
}

/// 客户的银行账户和优惠券
pub async fn payment_options<A: OrderPaymentPort + 'static, N: NotificationPort + 'static>(
    State(state): State<AppState<A, N>>,
    Path(customer_code): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .options
        .get(&customer_code)
        .await
        .map(|options| Json(options.as_ref().clone()))
        .map_err(api_error)
}
