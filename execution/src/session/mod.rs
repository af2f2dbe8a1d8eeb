//! Per-game round state machines.
//!
//! Every game walks `Idle -> Active -> Resolved -> Idle`. The stake is taken
//! from the [Ledger] when a round starts and any payout is credited back when
//! it resolves. A game only runs one round at a time: new bets are refused
//! until the previous round has been finished.

pub mod mines;
pub mod plinko;
pub mod sports;

pub use mines::MinesSession;
pub use plinko::PlinkoSession;
pub use sports::SportsSession;

use crate::{casino::ValidationError, ledger::Ledger, sync::LedgerStore};
use houseedge_types::casino::{BetRequest, GameKind, GameOutcome, BET_STEP, DEFAULT_BET};
use tracing::info;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Phase {
    Idle,
    Active,
    Resolved(GameOutcome),
}

impl Phase {
    pub fn is_idle(&self) -> bool {
        matches!(self, Phase::Idle)
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Phase::Active)
    }

    pub fn outcome(&self) -> Option<GameOutcome> {
        match self {
            Phase::Resolved(outcome) => Some(*outcome),
            _ => None,
        }
    }

    /// Refuse a new round unless idle.
    fn ensure_idle(&self, kind: GameKind) -> Result<(), ValidationError> {
        if self.is_idle() {
            Ok(())
        } else {
            Err(ValidationError::GameInProgress(kind))
        }
    }

    fn ensure_active(&self, kind: GameKind) -> Result<(), ValidationError> {
        if self.is_active() {
            Ok(())
        } else {
            Err(ValidationError::NoActiveGame(kind))
        }
    }
}

/// The wager a game will place next, adjusted in fixed steps.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BetSize {
    amount: u64,
    step: u64,
}

impl Default for BetSize {
    fn default() -> Self {
        Self::new(DEFAULT_BET, BET_STEP)
    }
}

impl BetSize {
    pub fn new(amount: u64, step: u64) -> Self {
        Self {
            amount,
            step: step.max(1),
        }
    }

    pub fn amount(&self) -> u64 {
        self.amount
    }

    pub fn step(&self) -> u64 {
        self.step
    }

    /// Move the amount by `delta`, keeping it within `[step, balance]`.
    ///
    /// A balance below one step pins the amount at `step`.
    pub fn adjust(&mut self, delta: i64, balance: u64) -> u64 {
        let moved = if delta >= 0 {
            self.amount.saturating_add(delta.unsigned_abs())
        } else {
            self.amount.saturating_sub(delta.unsigned_abs())
        };
        self.amount = moved.min(balance).max(self.step);
        self.amount
    }
}

/// Build the outcome of a finished round and pay it out.
fn settle<S: LedgerStore>(
    ledger: &Ledger<S>,
    request: &BetRequest,
    multiplier: f64,
) -> GameOutcome {
    let outcome = GameOutcome::new(request.kind, request.amount, multiplier);
    if outcome.payout > 0 {
        ledger.credit(outcome.payout);
    }
    info!(
        game = %request.kind,
        amount = request.amount,
        multiplier = outcome.multiplier,
        payout = outcome.payout,
        balance = ledger.balance(),
        "round resolved"
    );
    outcome
}
