use serde::{Deserialize, Serialize};

use super::INITIAL_BALANCE;

/// Point-in-time view of a player's virtual funds.
///
/// Always transmitted whole: the remote store keeps the most recent snapshot
/// it received, so out-of-order writes converge once the last one lands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub virtual_balance: u64,
    pub total_lost: u64,
}

impl LedgerSnapshot {
    pub fn new(virtual_balance: u64, total_lost: u64) -> Self {
        Self {
            virtual_balance,
            total_lost,
        }
    }
}

impl Default for LedgerSnapshot {
    fn default() -> Self {
        Self::new(INITIAL_BALANCE, 0)
    }
}
