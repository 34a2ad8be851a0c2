pub mod debounce;
pub mod dto;
pub mod error_message;
pub mod exchange_service;
pub mod options_cache;
pub mod payment_orchestrator;
pub mod result_presenter;
pub mod workspace;

#[cfg(test)]
pub(crate) mod test_support;

pub use debounce::{DebounceHandle, Debouncer};
pub use dto::*;
pub use error_message::{extract_error_message, ApiFailure, NETWORK_ERROR_MESSAGE};
pub use exchange_service::ExchangeOrderService;
pub use options_cache::PaymentOptionsCache;
pub use payment_orchestrator::{OrchestratorState, PaymentOrchestrator, RefreshHook, SubmitOutcome};
pub use result_presenter::{PaymentReceipt, QrSource, ResultPresenter};
pub use workspace::PaymentWorkspace;
