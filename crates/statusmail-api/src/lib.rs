// statusmail-api: Async client for the HTTP mail relay that delivers status reports

pub mod error;
pub mod message;
pub mod relay;
pub mod transport;

pub use error::Error;
pub use message::{DeliveryReceipt, MailMessage};
pub use relay::RelayClient;
pub use transport::{TlsMode, TransportConfig};
