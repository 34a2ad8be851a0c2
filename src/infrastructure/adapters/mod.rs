pub mod http_order_api;
pub mod response_normalizer;
pub mod tracing_notifier;

pub use http_order_api::HttpOrderApi;
pub use tracing_notifier::TracingNotifier;
