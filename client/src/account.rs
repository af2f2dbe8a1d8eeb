//! Keeping a ledger attached to whoever is signed in.

use crate::auth::Authenticator;
use houseedge_execution::{Ledger, LedgerStore};
use houseedge_types::Session;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Bind `ledger` to `session` and load its stored funds.
///
/// With no session the ledger is unbound and keeps playing locally. When no
/// stored record was applied (none exists, or rounds were played meanwhile)
/// the local funds are written for the user.
pub async fn apply_session<S: LedgerStore>(ledger: &Ledger<S>, session: Option<&Session>) {
    let Some(session) = session else {
        ledger.unbind();
        return;
    };

    ledger.bind(&session.user_id);
    match ledger.hydrate(&session.user_id).await {
        Ok(Some(snapshot)) => info!(
            user_id = %session.user_id,
            virtual_balance = snapshot.virtual_balance,
            total_lost = snapshot.total_lost,
            "loaded ledger"
        ),
        Ok(None) => {
            ledger.schedule_sync();
        }
        Err(e) => warn!(user_id = %session.user_id, error = %e, "failed to load ledger"),
    }
}

/// Apply every later session change from `auth` to `ledger` until `auth` is
/// dropped.
///
/// The session current at subscription is left to the caller.
pub fn follow_sessions<A, S>(auth: &A, ledger: Ledger<S>) -> JoinHandle<()>
where
    A: Authenticator,
    S: LedgerStore,
{
    let mut sessions = auth.subscribe();
    tokio::spawn(async move {
        while sessions.changed().await.is_ok() {
            let session = sessions.borrow_and_update().as_ref().cloned();
            apply_session(&ledger, session.as_ref()).await;
        }
    })
}
