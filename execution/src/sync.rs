use houseedge_types::casino::LedgerSnapshot;
use std::{
    collections::HashMap,
    future::Future,
    sync::{Arc, RwLock},
};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    #[error("ledger store unavailable: {0}")]
    Unavailable(String),
    #[error("ledger store rejected the request: {0}")]
    Rejected(String),
}

/// Remote home of per-user ledger snapshots.
///
/// Writes are keyed by user id and overwrite whatever was stored before
/// (last write wins).
pub trait LedgerStore: Clone + Send + Sync + 'static {
    fn upsert_ledger(
        &self,
        user_id: &str,
        snapshot: LedgerSnapshot,
    ) -> impl Future<Output = Result<(), SyncError>> + Send;

    fn fetch_ledger(
        &self,
        user_id: &str,
    ) -> impl Future<Output = Result<Option<LedgerSnapshot>, SyncError>> + Send;
}

/// In-process store, used for offline play and tests.
#[derive(Clone, Default)]
pub struct MemoryStore {
    records: Arc<RwLock<HashMap<String, LedgerSnapshot>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a record without going through the async interface.
    pub fn get(&self, user_id: &str) -> Option<LedgerSnapshot> {
        let records = self.records.read().unwrap_or_else(|e| e.into_inner());
        records.get(user_id).copied()
    }

    pub fn len(&self) -> usize {
        self.records.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl LedgerStore for MemoryStore {
    async fn upsert_ledger(
        &self,
        user_id: &str,
        snapshot: LedgerSnapshot,
    ) -> Result<(), SyncError> {
        let mut records = self.records.write().unwrap_or_else(|e| e.into_inner());
        records.insert(user_id.to_string(), snapshot);
        Ok(())
    }

    async fn fetch_ledger(&self, user_id: &str) -> Result<Option<LedgerSnapshot>, SyncError> {
        Ok(self.get(user_id))
    }
}
