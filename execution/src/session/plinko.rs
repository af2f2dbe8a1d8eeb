use super::{settle, BetSize, Phase};
use crate::{
    casino::{
        plinko::{self, Board, PathPoint},
        GameRng, ValidationError,
    },
    ledger::Ledger,
    sync::LedgerStore,
};
use houseedge_types::casino::{BetRequest, GameKind, GameOutcome, MIN_BET};
use tracing::debug;

const KIND: GameKind = GameKind::PlinkoDrop;

struct Round {
    request: BetRequest,
    drop: plinko::BallDrop,
    cursor: usize,
}

/// A Plinko table.
///
/// The landing bucket is fixed as soon as the ball is dropped; the round
/// then walks the path one row at a time before it can land.
pub struct PlinkoSession {
    board: Board,
    min_bet: u64,
    bet: BetSize,
    phase: Phase,
    round: Option<Round>,
}

impl Default for PlinkoSession {
    fn default() -> Self {
        Self::new(Board::default(), BetSize::default(), MIN_BET)
    }
}

impl PlinkoSession {
    pub fn new(board: Board, bet: BetSize, min_bet: u64) -> Self {
        Self {
            board,
            min_bet,
            bet,
            phase: Phase::Idle,
            round: None,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn bet_amount(&self) -> u64 {
        self.bet.amount()
    }

    pub fn adjust_bet_amount(&mut self, delta: i64, balance: u64) -> u64 {
        self.bet.adjust(delta, balance)
    }

    /// The drop in play, if any.
    pub fn current_drop(&self) -> Option<&plinko::BallDrop> {
        self.round.as_ref().map(|round| &round.drop)
    }

    /// Take the stake and drop a ball.
    pub fn drop_ball<S: LedgerStore>(
        &mut self,
        ledger: &Ledger<S>,
        rng: &mut GameRng,
    ) -> Result<&plinko::BallDrop, ValidationError> {
        self.phase.ensure_idle(KIND)?;
        let request = BetRequest::new(KIND, self.bet.amount());
        ledger.stake(&request, self.min_bet)?;

        let drop = plinko::simulate(&self.board, rng);
        debug!(bucket = drop.bucket, steps = ?drop.steps, "ball dropped");
        self.phase = Phase::Active;
        let round = self.round.insert(Round {
            request,
            drop,
            cursor: 0,
        });
        Ok(&round.drop)
    }

    /// Next point on the path, or `None` once the ball reached the bottom row.
    pub fn advance(&mut self) -> Option<PathPoint> {
        if !self.phase.is_active() {
            return None;
        }
        let round = self.round.as_mut()?;
        let point = round.drop.path.get(round.cursor).copied()?;
        round.cursor += 1;
        Some(point)
    }

    /// Rows the ball still has to fall through.
    pub fn remaining_steps(&self) -> usize {
        match (&self.phase, &self.round) {
            (Phase::Active, Some(round)) => round.drop.path.len().saturating_sub(round.cursor),
            _ => 0,
        }
    }

    /// Settle the drop once the whole path has been walked.
    pub fn land<S: LedgerStore>(
        &mut self,
        ledger: &Ledger<S>,
    ) -> Result<GameOutcome, ValidationError> {
        self.phase.ensure_active(KIND)?;
        if self.remaining_steps() > 0 {
            return Err(ValidationError::StillPlaying(KIND));
        }
        let round = self.round.as_ref().ok_or(ValidationError::NoActiveGame(KIND))?;
        let outcome = settle(ledger, &round.request, round.drop.multiplier);
        self.phase = Phase::Resolved(outcome);
        Ok(outcome)
    }

    /// Return to idle after a resolved drop.
    pub fn finish(&mut self) -> Option<GameOutcome> {
        let outcome = self.phase.outcome()?;
        self.phase = Phase::Idle;
        self.round = None;
        Some(outcome)
    }
}
