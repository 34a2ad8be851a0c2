pub mod aggregate;
pub mod entities;
pub mod errors;
pub mod format;
pub mod selection;
pub mod value_objects;

pub use aggregate::{selected_shipment_codes, ExchangeQuote, SelectionAggregate};
pub use entities::{
    BankAccount, ExchangeOrder, LineItem, Page, PaymentOptions, PaymentResult, ShipCodePayment,
    Voucher,
};
pub use errors::{DomainError, DomainResult};
pub use selection::SelectionSet;
pub use value_objects::{LineItemId, LineItemStatus, Money, PaymentStatus};
