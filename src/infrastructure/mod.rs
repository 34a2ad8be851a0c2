pub mod adapters;
pub mod config;

pub use adapters::{HttpOrderApi, TracingNotifier};
pub use config::{ApiConfig, AuthContext};
