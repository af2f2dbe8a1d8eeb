use super::{BetSize, Phase};
use crate::{
    casino::{sports, sports::Selection, ValidationError},
    ledger::Ledger,
    sync::LedgerStore,
};
use houseedge_types::casino::{
    default_fixtures, BetRequest, Fixture, GameKind, GameOutcome, Side, MIN_BET,
    SPORTS_LOSS_MESSAGE,
};
use tracing::info;

const KIND: GameKind = GameKind::SportsWager;

/// A sports board with a running parlay selection.
pub struct SportsSession {
    fixtures: Vec<Fixture>,
    selection: Selection,
    min_bet: u64,
    bet: BetSize,
    phase: Phase,
    request: Option<BetRequest>,
}

impl Default for SportsSession {
    fn default() -> Self {
        Self::new(default_fixtures(), BetSize::default(), MIN_BET)
    }
}

impl SportsSession {
    pub fn new(fixtures: Vec<Fixture>, bet: BetSize, min_bet: u64) -> Self {
        Self {
            fixtures,
            selection: Selection::new(),
            min_bet,
            bet,
            phase: Phase::Idle,
            request: None,
        }
    }

    pub fn fixtures(&self) -> &[Fixture] {
        &self.fixtures
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
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

    /// Toggle a pick. Picks are frozen while a wager is open.
    pub fn toggle(&mut self, fixture_id: &str, side: Side) -> Result<(), ValidationError> {
        self.phase.ensure_idle(KIND)?;
        if !self.fixtures.iter().any(|f| f.id == fixture_id) {
            return Err(ValidationError::UnknownFixture(fixture_id.to_string()));
        }
        self.selection.toggle(fixture_id, side);
        Ok(())
    }

    pub fn total_odds(&self) -> Result<f64, ValidationError> {
        self.selection.total_odds(&self.fixtures)
    }

    pub fn potential_win(&self) -> Result<f64, ValidationError> {
        self.selection.potential_win(&self.fixtures, self.bet.amount())
    }

    /// Take the stake for the current selection.
    pub fn place_bet<S: LedgerStore>(
        &mut self,
        ledger: &Ledger<S>,
    ) -> Result<BetRequest, ValidationError> {
        self.phase.ensure_idle(KIND)?;
        let odds = self.total_odds()?;
        let request = BetRequest::new(KIND, self.bet.amount());
        ledger.stake(&request, self.min_bet)?;

        info!(amount = request.amount, picks = self.selection.len(), odds, "sports wager placed");
        self.request = Some(request);
        self.phase = Phase::Active;
        Ok(request)
    }

    /// Settle the open wager and clear the selection.
    pub fn settle<S: LedgerStore>(
        &mut self,
        ledger: &Ledger<S>,
    ) -> Result<GameOutcome, ValidationError> {
        self.phase.ensure_active(KIND)?;
        let request = self.request.ok_or(ValidationError::NoActiveGame(KIND))?;
        let outcome = sports::settle(request.amount);
        if outcome.payout > 0 {
            ledger.credit(outcome.payout);
        }
        info!(amount = request.amount, balance = ledger.balance(), "{SPORTS_LOSS_MESSAGE}");
        self.selection.clear();
        self.phase = Phase::Resolved(outcome);
        Ok(outcome)
    }

    /// Return to idle after a settled wager.
    pub fn finish(&mut self) -> Option<GameOutcome> {
        let outcome = self.phase.outcome()?;
        self.phase = Phase::Idle;
        self.request = None;
        Some(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::MemoryStore;
    use houseedge_types::casino::LedgerSnapshot;

    #[test]
    fn test_parlay_odds() {
        let mut session = SportsSession::default();
        session.toggle("1", Side::Home).unwrap();
        session.toggle("2", Side::Home).unwrap();
        let odds = session.total_odds().unwrap();
        assert!((odds - 1.95 * 2.10).abs() < 1e-9);
        assert!((session.potential_win().unwrap() - 100.0 * odds).abs() < 1e-9);

        session.toggle("2", Side::Home).unwrap();
        assert!((session.total_odds().unwrap() - 1.95).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_fixture_rejected() {
        let mut session = SportsSession::default();
        assert_eq!(
            session.toggle("9", Side::Away),
            Err(ValidationError::UnknownFixture("9".to_string()))
        );
        assert!(session.selection().is_empty());
    }

    #[test]
    fn test_wager_always_loses() {
        let ledger = Ledger::new(MemoryStore::new());
        let mut session = SportsSession::default();
        session.toggle("1", Side::Away).unwrap();
        session.toggle("3", Side::Home).unwrap();

        session.place_bet(&ledger).unwrap();
        assert_eq!(ledger.snapshot(), LedgerSnapshot::new(9_900, 100));
        assert_eq!(
            session.toggle("2", Side::Home),
            Err(ValidationError::GameInProgress(KIND))
        );
        assert!(session.place_bet(&ledger).is_err());

        let outcome = session.settle(&ledger).unwrap();
        assert_eq!(outcome.payout, 0);
        assert_eq!(ledger.snapshot(), LedgerSnapshot::new(9_900, 100));
        assert!(session.selection().is_empty());

        assert_eq!(session.finish(), Some(outcome));
        assert!(session.phase().is_idle());
    }

    #[test]
    fn test_empty_selection_can_bet() {
        let ledger = Ledger::new(MemoryStore::new());
        let mut session = SportsSession::default();
        assert_eq!(session.total_odds(), Ok(1.0));
        assert!(session.place_bet(&ledger).is_ok());
    }

    #[test]
    fn test_settle_without_wager() {
        let ledger = Ledger::new(MemoryStore::new());
        let mut session = SportsSession::default();
        assert_eq!(
            session.settle(&ledger),
            Err(ValidationError::NoActiveGame(KIND))
        );
    }

    #[test]
    fn test_overdraw_rejected() {
        let ledger = Ledger::with_snapshot(MemoryStore::new(), LedgerSnapshot::new(99, 0));
        let mut session = SportsSession::default();
        assert!(session.place_bet(&ledger).is_err());
        assert_eq!(ledger.snapshot(), LedgerSnapshot::new(99, 0));
        assert!(session.phase().is_idle());
    }
}
