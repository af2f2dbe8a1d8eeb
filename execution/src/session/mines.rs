use super::{settle, BetSize, Phase};
use crate::{
    casino::{
        mines::{Board, Reveal, Rules},
        GameRng, ValidationError,
    },
    ledger::Ledger,
    sync::LedgerStore,
};
use houseedge_types::casino::{BetRequest, GameKind, GameOutcome, MIN_BET};
use tracing::debug;

const KIND: GameKind = GameKind::MinesReveal;

/// A Mines table.
pub struct MinesSession {
    rules: Rules,
    min_bet: u64,
    bet: BetSize,
    phase: Phase,
    board: Option<Board>,
    request: Option<BetRequest>,
}

impl Default for MinesSession {
    fn default() -> Self {
        Self::new(Rules::default(), BetSize::default(), MIN_BET)
    }
}

impl MinesSession {
    pub fn new(rules: Rules, bet: BetSize, min_bet: u64) -> Self {
        Self {
            rules,
            min_bet,
            bet,
            phase: Phase::Idle,
            board: None,
            request: None,
        }
    }

    pub fn rules(&self) -> Rules {
        self.rules
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

    /// The board of the current (or just resolved) round.
    pub fn board(&self) -> Option<&Board> {
        self.board.as_ref()
    }

    /// Running multiplier (1.0 when no round is in play).
    pub fn multiplier(&self) -> f64 {
        self.board.as_ref().map_or(1.0, Board::multiplier)
    }

    /// What cashing out right now would pay.
    pub fn cash_out_value(&self) -> u64 {
        match (&self.phase, &self.request) {
            (Phase::Active, Some(request)) => {
                GameOutcome::new(KIND, request.amount, self.multiplier()).payout
            }
            _ => 0,
        }
    }

    /// Take the stake and lay out a new board.
    pub fn start<S: LedgerStore>(
        &mut self,
        ledger: &Ledger<S>,
        rng: &mut GameRng,
    ) -> Result<(), ValidationError> {
        self.phase.ensure_idle(KIND)?;
        let request = BetRequest::new(KIND, self.bet.amount());
        ledger.stake(&request, self.min_bet)?;

        let board = Board::new(self.rules, rng);
        debug!(mines = ?board.mines(), "mines placed");
        self.board = Some(board);
        self.request = Some(request);
        self.phase = Phase::Active;
        Ok(())
    }

    /// Reveal `cell`, resolving the round on a mine or a cleared board.
    pub fn reveal<S: LedgerStore>(
        &mut self,
        ledger: &Ledger<S>,
        cell: usize,
    ) -> Result<Reveal, ValidationError> {
        self.phase.ensure_active(KIND)?;
        let board = self.board.as_mut().ok_or(ValidationError::NoActiveGame(KIND))?;
        let reveal = board.reveal(cell)?;
        debug!(cell, ?reveal, "cell revealed");
        match reveal {
            Reveal::Safe { .. } => {}
            Reveal::Cleared { multiplier } => self.resolve(ledger, multiplier)?,
            Reveal::Mine => self.resolve(ledger, 0.0)?,
        }
        Ok(reveal)
    }

    /// Stop and collect the running multiplier.
    pub fn cash_out<S: LedgerStore>(
        &mut self,
        ledger: &Ledger<S>,
    ) -> Result<GameOutcome, ValidationError> {
        self.phase.ensure_active(KIND)?;
        let board = self.board.as_mut().ok_or(ValidationError::NoActiveGame(KIND))?;
        let multiplier = board.cash_out()?;
        self.resolve(ledger, multiplier)?;
        self.phase.outcome().ok_or(ValidationError::NoActiveGame(KIND))
    }

    /// Return to idle after a resolved round.
    pub fn finish(&mut self) -> Option<GameOutcome> {
        let outcome = self.phase.outcome()?;
        self.phase = Phase::Idle;
        self.board = None;
        self.request = None;
        Some(outcome)
    }

    fn resolve<S: LedgerStore>(
        &mut self,
        ledger: &Ledger<S>,
        multiplier: f64,
    ) -> Result<(), ValidationError> {
        let request = self.request.ok_or(ValidationError::NoActiveGame(KIND))?;
        self.phase = Phase::Resolved(settle(ledger, &request, multiplier));
        Ok(())
    }
}
