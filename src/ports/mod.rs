pub mod clipboard_port;
pub mod notification_port;
pub mod order_api_port;

pub use clipboard_port::ClipboardPort;
pub use notification_port::{NotificationPort, NotifyOptions};
pub use order_api_port::{ListQuery, MoneyExchangeBody, OrderPaymentPort, PaymentParams};
