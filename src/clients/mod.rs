pub mod api;
pub mod fault;
pub mod http_client;
pub mod retry;

pub use api::{AccountingApi, AttachableEntity};
pub use fault::{ApiFault, FaultDetail, RATE_LIMIT_CODE};
pub use http_client::HttpAccountingClient;
pub use retry::{RetryPolicy, Retrying};
