use shipment_payment::api::{self, AppState};
use shipment_payment::application::{ExchangeOrderService, PaymentOptionsCache, PaymentWorkspace};
use shipment_payment::infrastructure::{ApiConfig, HttpOrderApi, TracingNotifier};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载环境变量
    dotenvy::dotenv().ok();

    // 初始化日志，RUST_LOG 可覆盖
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    info!("Starting Shipment Payment gateway...");

    let (config, auth) = ApiConfig::from_env()?;
    info!("Order API: {}", config.base_url);

    let order_api = Arc::new(HttpOrderApi::new(config.clone(), auth)?);
    let notifier = Arc::new(TracingNotifier::new());

    let workspace = PaymentWorkspace::new(
        order_api.clone(),
        notifier.clone(),
        config.default_ship_code.clone(),
        config.page_size,
        config.search_debounce,
    );
    if let Err(e) = workspace.refresh().await {
        // 上游暂时不可用时仍然启动，稍后可以手动刷新
        warn!("Initial list fetch failed: {}", e);
    }

    let app_state = AppState {
        api: order_api.clone(),
        notifier: notifier.clone(),
        workspace: workspace.clone(),
        exchange: Arc::new(ExchangeOrderService::new(order_api.clone(), notifier.clone())),
        options: Arc::new(PaymentOptionsCache::new(order_api)),
    };

    let app = api::create_router(app_state);

    let addr = config.listen_addr();
    info!("Server listening on {}", addr);
    info!("Available endpoints:");
    info!("  GET  /health - Health check");
    info!("  GET  /api/workspace - Line items and selection");
    info!("  POST /api/workspace/payments/divided - Pay selected shipments");
    info!("  POST /api/workspace/payments/ship-code - Pay the whole ship code");
    info!("  POST /api/payments/merged - Pay merged orders");
    info!("  POST /api/exchange/orders/:customer_code/:route_id - Create exchange order");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    workspace.teardown();
    Ok(())
}
