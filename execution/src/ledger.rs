use crate::{
    casino::{validate_bet, ValidationError},
    sync::{LedgerStore, SyncError},
};
use houseedge_types::{
    casino::{BetRequest, LedgerSnapshot},
    UserId,
};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::{runtime::Handle, task::JoinHandle};
use tracing::{debug, warn};

/// Funds plus the bookkeeping that decides whether a stored record may
/// replace them.
struct Funds {
    snapshot: LedgerSnapshot,
    /// Bumped by every local mutation
    revision: u64,
    /// Revision at the last [Ledger::bind]
    bound_at: u64,
}

/// Shared handle to a player's virtual balance.
///
/// Clones share the same funds. Every mutation schedules a background write
/// of the full snapshot to `S` for the bound user; local state never waits
/// on (or is reverted by) that write.
#[derive(Clone)]
pub struct Ledger<S: LedgerStore> {
    funds: Arc<RwLock<Funds>>,
    user: Arc<RwLock<Option<UserId>>>,
    store: S,
}

impl<S: LedgerStore> Ledger<S> {
    /// Create a ledger holding the starting balance.
    pub fn new(store: S) -> Self {
        Self::with_snapshot(store, LedgerSnapshot::default())
    }

    pub fn with_snapshot(store: S, snapshot: LedgerSnapshot) -> Self {
        Self {
            funds: Arc::new(RwLock::new(Funds {
                snapshot,
                revision: 0,
                bound_at: 0,
            })),
            user: Arc::new(RwLock::new(None)),
            store,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        self.funds
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .snapshot
    }

    pub fn balance(&self) -> u64 {
        self.snapshot().virtual_balance
    }

    pub fn total_lost(&self) -> u64 {
        self.snapshot().total_lost
    }

    /// Remove `amount` from the balance, refusing to overdraw.
    pub fn debit(&self, amount: u64) -> Result<LedgerSnapshot, ValidationError> {
        let snapshot = self.update(|funds| {
            if amount > funds.virtual_balance {
                return Err(ValidationError::InsufficientBalance {
                    balance: funds.virtual_balance,
                    amount,
                });
            }
            funds.virtual_balance -= amount;
            Ok(())
        })?;
        self.schedule_sync();
        Ok(snapshot)
    }

    /// Add `amount` to the balance (saturating).
    pub fn credit(&self, amount: u64) -> LedgerSnapshot {
        let snapshot = self.apply(|funds| {
            funds.virtual_balance = funds.virtual_balance.saturating_add(amount);
        });
        self.schedule_sync();
        snapshot
    }

    /// Add `amount` to the running loss counter (saturating).
    pub fn record_loss(&self, amount: u64) -> LedgerSnapshot {
        let snapshot = self.apply(|funds| {
            funds.total_lost = funds.total_lost.saturating_add(amount);
        });
        self.schedule_sync();
        snapshot
    }

    /// Validate `request` and take its stake in one step.
    ///
    /// The stake leaves the balance and is counted as lost; any later
    /// payout is returned with [Ledger::credit].
    pub fn stake(
        &self,
        request: &BetRequest,
        min_bet: u64,
    ) -> Result<LedgerSnapshot, ValidationError> {
        let snapshot = self.update(|funds| {
            validate_bet(request, funds.virtual_balance, min_bet)?;
            funds.virtual_balance -= request.amount;
            funds.total_lost = funds.total_lost.saturating_add(request.amount);
            Ok(())
        })?;
        self.schedule_sync();
        Ok(snapshot)
    }

    /// Replace local funds with a stored snapshot (not written back).
    pub fn restore(&self, snapshot: LedgerSnapshot) {
        self.funds
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .snapshot = snapshot;
    }

    /// Attach the ledger to `user_id`; later mutations sync under that id.
    ///
    /// Switching to a different user lets the next [Ledger::hydrate] replace
    /// the funds again. Binding the same user twice does not.
    pub fn bind(&self, user_id: &str) {
        let mut funds = self.funds.write().unwrap_or_else(PoisonError::into_inner);
        let mut user = self.user.write().unwrap_or_else(PoisonError::into_inner);
        if user.as_deref() != Some(user_id) {
            funds.bound_at = funds.revision;
            *user = Some(user_id.to_string());
        }
    }

    pub fn unbind(&self) {
        *self.user.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    pub fn user(&self) -> Option<UserId> {
        self.user
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Load the stored snapshot for `user_id` and return it if it was applied.
    ///
    /// A stored record only replaces funds that have not changed since the
    /// last [Ledger::bind]. Once a round has touched the ledger, local funds
    /// win and `None` is returned, as it is when nothing is stored.
    pub async fn hydrate(&self, user_id: &str) -> Result<Option<LedgerSnapshot>, SyncError> {
        let Some(stored) = self.store.fetch_ledger(user_id).await? else {
            debug!(user_id, "no stored ledger");
            return Ok(None);
        };

        let mut funds = self.funds.write().unwrap_or_else(PoisonError::into_inner);
        if funds.revision != funds.bound_at {
            debug!(user_id, ?stored, local = ?funds.snapshot, "keeping local ledger");
            return Ok(None);
        }
        funds.snapshot = stored;
        debug!(user_id, ?stored, "restored ledger");
        Ok(Some(stored))
    }

    /// Write the current snapshot to the store in the background.
    ///
    /// The snapshot is read when the write is sent, so a late write still
    /// carries the newest funds.
    pub fn schedule_sync(&self) -> Option<JoinHandle<()>> {
        let Some(user_id) = self.user() else {
            debug!("skipping ledger sync: no user bound");
            return None;
        };
        let Ok(handle) = Handle::try_current() else {
            debug!(user_id = %user_id, "skipping ledger sync: no runtime");
            return None;
        };

        let funds = self.funds.clone();
        let store = self.store.clone();
        Some(handle.spawn(async move {
            let snapshot = funds.read().unwrap_or_else(PoisonError::into_inner).snapshot;
            if let Err(e) = store.upsert_ledger(&user_id, snapshot).await {
                warn!(user_id = %user_id, error = %e, "failed to sync ledger");
            }
        }))
    }

    fn apply(&self, f: impl FnOnce(&mut LedgerSnapshot)) -> LedgerSnapshot {
        let mut funds = self.funds.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut funds.snapshot);
        funds.revision += 1;
        funds.snapshot
    }

    fn update(
        &self,
        f: impl FnOnce(&mut LedgerSnapshot) -> Result<(), ValidationError>,
    ) -> Result<LedgerSnapshot, ValidationError> {
        let mut funds = self.funds.write().unwrap_or_else(PoisonError::into_inner);
        let mut next = funds.snapshot;
        f(&mut next)?;
        funds.snapshot = next;
        funds.revision += 1;
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        mocks::{create_ledger, wait_for_sync, FailingStore},
        sync::MemoryStore,
    };
    use houseedge_types::casino::{GameKind, INITIAL_BALANCE};

    #[test]
    fn test_new_ledger_defaults() {
        let ledger = Ledger::new(MemoryStore::new());
        assert_eq!(ledger.balance(), INITIAL_BALANCE);
        assert_eq!(ledger.total_lost(), 0);
        assert!(ledger.user().is_none());
    }

    #[test]
    fn test_debit_rejects_overdraw() {
        let ledger = Ledger::with_snapshot(MemoryStore::new(), LedgerSnapshot::new(50, 7));
        assert_eq!(
            ledger.debit(51),
            Err(ValidationError::InsufficientBalance {
                balance: 50,
                amount: 51
            })
        );
        assert_eq!(ledger.snapshot(), LedgerSnapshot::new(50, 7));

        assert_eq!(ledger.debit(50).unwrap().virtual_balance, 0);
    }

    #[test]
    fn test_credit_and_loss_saturate() {
        let ledger = Ledger::with_snapshot(
            MemoryStore::new(),
            LedgerSnapshot::new(u64::MAX - 1, u64::MAX),
        );
        assert_eq!(ledger.credit(10).virtual_balance, u64::MAX);
        assert_eq!(ledger.record_loss(10).total_lost, u64::MAX);
    }

    #[test]
    fn test_stake_is_atomic() {
        let ledger = Ledger::new(MemoryStore::new());
        let request = BetRequest::new(GameKind::PlinkoDrop, 100);
        let snapshot = ledger.stake(&request, 1).unwrap();
        assert_eq!(snapshot, LedgerSnapshot::new(9_900, 100));

        let too_much = BetRequest::new(GameKind::PlinkoDrop, 10_000);
        assert!(ledger.stake(&too_much, 1).is_err());
        let zero = BetRequest::new(GameKind::PlinkoDrop, 0);
        assert!(ledger.stake(&zero, 1).is_err());
        assert_eq!(ledger.snapshot(), snapshot);
    }

    #[test]
    fn test_clones_share_funds() {
        let ledger = Ledger::new(MemoryStore::new());
        let other = ledger.clone();
        ledger.debit(1_000).unwrap();
        assert_eq!(other.balance(), 9_000);
    }

    #[test]
    fn test_sync_skipped_without_runtime() {
        let store = MemoryStore::new();
        let ledger = Ledger::new(store.clone());
        ledger.bind("alice");
        assert!(ledger.schedule_sync().is_none());
        ledger.credit(5);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_sync_skipped_without_user() {
        let store = MemoryStore::new();
        let ledger = Ledger::new(store.clone());
        assert!(ledger.schedule_sync().is_none());
        ledger.debit(100).unwrap();
        tokio::task::yield_now().await;
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_mutations_sync_latest_snapshot() {
        let store = MemoryStore::new();
        let ledger = Ledger::new(store.clone());
        ledger.bind("alice");

        ledger.stake(&BetRequest::new(GameKind::MinesReveal, 100), 1).unwrap();
        ledger.credit(144);

        let expected = LedgerSnapshot::new(10_044, 100);
        assert!(wait_for_sync(&store, "alice", expected).await);
    }

    #[tokio::test]
    async fn test_failing_store_does_not_touch_local_state() {
        let ledger = Ledger::new(FailingStore);
        ledger.bind("alice");

        let handle = ledger.schedule_sync().unwrap();
        handle.await.unwrap();
        ledger.debit(300).unwrap();
        assert_eq!(ledger.snapshot(), LedgerSnapshot::new(9_700, 0));

        assert!(ledger.hydrate("alice").await.is_err());
        assert_eq!(ledger.balance(), 9_700);
    }

    #[tokio::test]
    async fn test_hydrate_restores_without_echo() {
        let store = MemoryStore::new();
        store
            .upsert_ledger("alice", LedgerSnapshot::new(4_200, 5_800))
            .await
            .unwrap();

        let ledger = Ledger::new(store.clone());
        let restored = ledger.hydrate("alice").await.unwrap();
        assert_eq!(restored, Some(LedgerSnapshot::new(4_200, 5_800)));
        assert_eq!(ledger.balance(), 4_200);

        // Missing records leave local funds alone
        assert_eq!(ledger.hydrate("bob").await.unwrap(), None);
        assert_eq!(ledger.balance(), 4_200);
        assert!(store.get("bob").is_none());
    }

    #[tokio::test]
    async fn test_hydrate_does_not_undo_a_stake() {
        let store = MemoryStore::new();
        store
            .upsert_ledger("alice", LedgerSnapshot::default())
            .await
            .unwrap();
        let ledger = create_ledger(store.clone(), "alice");

        // The fetch is still pending when the stake is taken
        let pending = tokio::spawn({
            let ledger = ledger.clone();
            async move { ledger.hydrate("alice").await }
        });
        ledger
            .stake(&BetRequest::new(GameKind::PlinkoDrop, 100), 1)
            .unwrap();

        assert_eq!(pending.await.unwrap().unwrap(), None);
        assert_eq!(ledger.snapshot(), LedgerSnapshot::new(9_900, 100));
        assert!(wait_for_sync(&store, "alice", LedgerSnapshot::new(9_900, 100)).await);
    }

    #[tokio::test]
    async fn test_bind_accepts_stored_funds_again() {
        let store = MemoryStore::new();
        store
            .upsert_ledger("alice", LedgerSnapshot::new(4_200, 5_800))
            .await
            .unwrap();

        // Local play before signing in does not block the stored record
        let ledger = Ledger::new(store.clone());
        ledger.debit(100).unwrap();
        ledger.bind("alice");
        assert_eq!(
            ledger.hydrate("alice").await.unwrap(),
            Some(LedgerSnapshot::new(4_200, 5_800))
        );

        // Play after the bind does, even across a repeated sign-in
        ledger.credit(10);
        ledger.bind("alice");
        assert_eq!(ledger.hydrate("alice").await.unwrap(), None);
        assert_eq!(ledger.balance(), 4_210);

        // A different user starts from their own record
        store
            .upsert_ledger("bob", LedgerSnapshot::new(700, 0))
            .await
            .unwrap();
        ledger.bind("bob");
        assert_eq!(
            ledger.hydrate("bob").await.unwrap(),
            Some(LedgerSnapshot::new(700, 0))
        );
    }

    #[tokio::test]
    async fn test_unbind_stops_syncing() {
        let store = MemoryStore::new();
        let ledger = Ledger::new(store.clone());
        ledger.bind("alice");
        ledger.unbind();
        assert!(ledger.schedule_sync().is_none());
    }
}
