use super::handlers::*;
use crate::ports::{NotificationPort, OrderPaymentPort};
use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub fn create_router<A: OrderPaymentPort + 'static, N: NotificationPort + 'static>(
    state: AppState<A, N>,
) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/workspace", get(workspace_view::<A, N>))
        .route("/api/workspace/refresh", post(refresh_workspace::<A, N>))
        .route("/api/workspace/customer", put(switch_customer::<A, N>))
        .route("/api/workspace/search", post(search_customer::<A, N>))
        .route("/api/workspace/selection", delete(clear_selection::<A, N>))
        .route(
            "/api/workspace/selection/toggle",
            post(toggle_selection::<A, N>),
        )
        .route("/api/workspace/selection/all", post(select_all::<A, N>))
        .route("/api/workspace/summary", get(workspace_summary::<A, N>))
        .route(
            "/api/workspace/payments/divided",
            post(submit_divided::<A, N>),
        )
        .route(
            "/api/workspace/payments/ship-code",
            post(submit_ship_code::<A, N>),
        )
        .route("/api/workspace/result/dismiss", post(dismiss_result::<A, N>))
        .route("/api/payments/merged", post(submit_merged::<A, N>))
        .route("/api/exchange/quote", post(exchange_quote::<A, N>))
        .route(
            "/api/exchange/orders/:customer_code/:route_id",
            post(create_exchange_order::<A, N>),
        )
        .route(
            "/api/options/:customer_code",
            get(payment_options::<A, N>).delete(invalidate_payment_options::<A, N>),
        )
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
