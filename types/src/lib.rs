pub mod api;
pub mod casino;

pub use api::{Credentials, ErrorResponse, LedgerRecord, Session, UserId};
