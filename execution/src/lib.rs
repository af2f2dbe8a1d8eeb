pub mod casino;
pub mod config;
pub mod session;

#[cfg(any(test, feature = "mocks"))]
pub mod mocks;

mod ledger;
mod sync;
mod table;

pub use casino::{GameRng, ValidationError};
pub use config::{Config, ConfigError, Timing, ValidatedConfig};
pub use ledger::Ledger;
pub use sync::{LedgerStore, MemoryStore, SyncError};
pub use table::Table;
