use crate::{
    config::{Config, Timing},
    ledger::Ledger,
    sync::{LedgerStore, MemoryStore, SyncError},
    table::Table,
};
use houseedge_types::casino::LedgerSnapshot;
use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

const SYNC_POLL_INTERVAL: Duration = Duration::from_millis(5);
const SYNC_POLL_ATTEMPTS: usize = 400;

/// A store whose every request fails.
#[derive(Clone, Copy, Default)]
pub struct FailingStore;

impl LedgerStore for FailingStore {
    async fn upsert_ledger(&self, _: &str, _: LedgerSnapshot) -> Result<(), SyncError> {
        Err(SyncError::Unavailable("store offline".to_string()))
    }

    async fn fetch_ledger(&self, _: &str) -> Result<Option<LedgerSnapshot>, SyncError> {
        Err(SyncError::Unavailable("store offline".to_string()))
    }
}

/// A store that keeps every write it receives, in arrival order.
#[derive(Clone, Default)]
pub struct RecordingStore {
    inner: MemoryStore,
    writes: Arc<Mutex<Vec<(String, LedgerSnapshot)>>>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn writes(&self) -> Vec<(String, LedgerSnapshot)> {
        self.writes.lock().unwrap().clone()
    }
}

impl LedgerStore for RecordingStore {
    async fn upsert_ledger(
        &self,
        user_id: &str,
        snapshot: LedgerSnapshot,
    ) -> Result<(), SyncError> {
        self.writes.lock().unwrap().push((user_id.to_string(), snapshot));
        self.inner.upsert_ledger(user_id, snapshot).await
    }

    async fn fetch_ledger(&self, user_id: &str) -> Result<Option<LedgerSnapshot>, SyncError> {
        self.inner.fetch_ledger(user_id).await
    }
}

/// Creates a ledger at the starting balance, bound to `user_id`
pub fn create_ledger<S: LedgerStore>(store: S, user_id: &str) -> Ledger<S> {
    let ledger = Ledger::new(store);
    ledger.bind(user_id);
    ledger
}

/// Creates a table with default rules, a fixed seed, and no delays
pub fn create_table<S: LedgerStore>(store: S, seed: u64) -> Table<S> {
    let config = Config {
        seed: Some(seed),
        ..Config::default()
    };
    let mut config = config.validate().unwrap();
    config.timing = Timing::instant();
    let ledger = Ledger::with_snapshot(store, config.starting_funds());
    Table::new(config, ledger)
}

/// Waits until `store` holds `expected` for `user_id`
pub async fn wait_for_sync(store: &MemoryStore, user_id: &str, expected: LedgerSnapshot) -> bool {
    for _ in 0..SYNC_POLL_ATTEMPTS {
        if store.get(user_id) == Some(expected) {
            return true;
        }
        tokio::time::sleep(SYNC_POLL_INTERVAL).await;
    }
    false
}
