//! Minimal Exchange Web Services client: SOAP over HTTPS with basic auth
//! and a bounded retry policy.

mod error;
pub mod models;
mod retry;
mod session;
pub mod soap;

pub use error::EwsError;
pub use models::{DistinguishedFolder, Folder, MessageSummary};
pub use retry::{Backoff, RetryPolicy};
pub use session::{Credentials, Session};
