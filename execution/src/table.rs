use crate::{
    casino::{mines::Reveal, GameRng, ValidationError},
    config::{Timing, ValidatedConfig},
    ledger::Ledger,
    session::{BetSize, MinesSession, PlinkoSession, SportsSession},
    sync::LedgerStore,
};
use houseedge_types::casino::{GameKind, GameOutcome, Side};
use tokio::time::sleep;
use tracing::info;

/// All three games sharing one ledger.
///
/// This is the surface a front end drives: it turns player intents into
/// session transitions and paces timed rounds.
pub struct Table<S: LedgerStore> {
    ledger: Ledger<S>,
    plinko: PlinkoSession,
    mines: MinesSession,
    sports: SportsSession,
    timing: Timing,
    seed: u64,
    round: u64,
}

impl<S: LedgerStore> Table<S> {
    pub fn new(config: ValidatedConfig, ledger: Ledger<S>) -> Self {
        let seed = config.seed.unwrap_or_else(rand::random);
        info!(seed, "table opened");

        let bet = BetSize::new(config.default_bet, config.bet_step);
        Self {
            ledger,
            plinko: PlinkoSession::new(config.plinko, bet, config.min_bet),
            mines: MinesSession::new(config.mines, bet, config.min_bet),
            sports: SportsSession::new(config.fixtures, bet, config.min_bet),
            timing: config.timing,
            seed,
            round: 0,
        }
    }

    pub fn ledger(&self) -> &Ledger<S> {
        &self.ledger
    }

    pub fn plinko(&self) -> &PlinkoSession {
        &self.plinko
    }

    pub fn mines(&self) -> &MinesSession {
        &self.mines
    }

    pub fn sports(&self) -> &SportsSession {
        &self.sports
    }

    pub fn timing(&self) -> Timing {
        self.timing
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// RNG for the next round; every round gets its own stream.
    fn next_rng(&mut self) -> GameRng {
        self.round += 1;
        GameRng::new(self.seed, self.round)
    }

    /// Start a round of `kind` at its current bet amount.
    pub fn place_bet(&mut self, kind: GameKind) -> Result<(), ValidationError> {
        let mut rng = self.next_rng();
        match kind {
            GameKind::PlinkoDrop => self.plinko.drop_ball(&self.ledger, &mut rng).map(|_| ()),
            GameKind::MinesReveal => self.mines.start(&self.ledger, &mut rng),
            GameKind::SportsWager => self.sports.place_bet(&self.ledger).map(|_| ()),
        }
    }

    pub fn reveal(&mut self, cell: usize) -> Result<Reveal, ValidationError> {
        self.mines.reveal(&self.ledger, cell)
    }

    pub fn cash_out(&mut self) -> Result<GameOutcome, ValidationError> {
        self.mines.cash_out(&self.ledger)
    }

    pub fn toggle_pick(&mut self, fixture_id: &str, side: Side) -> Result<(), ValidationError> {
        self.sports.toggle(fixture_id, side)
    }

    /// Move the bet amount of `kind` by `delta`, bounded by the balance.
    pub fn adjust_bet_amount(&mut self, kind: GameKind, delta: i64) -> u64 {
        let balance = self.ledger.balance();
        match kind {
            GameKind::PlinkoDrop => self.plinko.adjust_bet_amount(delta, balance),
            GameKind::MinesReveal => self.mines.adjust_bet_amount(delta, balance),
            GameKind::SportsWager => self.sports.adjust_bet_amount(delta, balance),
        }
    }

    /// Return a resolved game to idle.
    pub fn finish(&mut self, kind: GameKind) -> Option<GameOutcome> {
        match kind {
            GameKind::PlinkoDrop => self.plinko.finish(),
            GameKind::MinesReveal => self.mines.finish(),
            GameKind::SportsWager => self.sports.finish(),
        }
    }

    /// Hold a resolved game for the settle delay, then return it to idle.
    pub async fn finish_after_delay(&mut self, kind: GameKind) -> Option<GameOutcome> {
        sleep(self.timing.settle).await;
        self.finish(kind)
    }

    /// Drop a ball and walk it down the board row by row.
    pub async fn play_plinko(&mut self) -> Result<GameOutcome, ValidationError> {
        self.place_bet(GameKind::PlinkoDrop)?;
        while self.plinko.advance().is_some() {
            sleep(self.timing.step).await;
        }
        let outcome = self.plinko.land(&self.ledger)?;
        self.finish_after_delay(GameKind::PlinkoDrop).await;
        Ok(outcome)
    }

    /// Place the sports wager and wait for it to settle.
    pub async fn play_sports(&mut self) -> Result<GameOutcome, ValidationError> {
        self.place_bet(GameKind::SportsWager)?;
        sleep(self.timing.sports).await;
        let outcome = self.sports.settle(&self.ledger)?;
        self.finish_after_delay(GameKind::SportsWager).await;
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::Config,
        mocks::{create_table, wait_for_sync},
        sync::MemoryStore,
    };
    use houseedge_types::casino::LedgerSnapshot;
    use std::time::Duration;

    #[tokio::test]
    async fn test_play_plinko() {
        let mut table = create_table(MemoryStore::new(), 7);
        let outcome = table.play_plinko().await.unwrap();

        assert_eq!(outcome.amount, 100);
        assert_eq!(table.ledger().balance(), 9_900 + outcome.payout);
        assert_eq!(table.ledger().total_lost(), 100);
        assert!(table.plinko().phase().is_idle());
    }

    #[tokio::test]
    async fn test_play_sports() {
        let mut table = create_table(MemoryStore::new(), 7);
        table.toggle_pick("2", Side::Home).unwrap();
        let outcome = table.play_sports().await.unwrap();

        assert_eq!(outcome.payout, 0);
        assert_eq!(table.ledger().snapshot(), LedgerSnapshot::new(9_900, 100));
        assert!(table.sports().selection().is_empty());
        assert!(table.sports().phase().is_idle());
    }

    #[tokio::test]
    async fn test_mines_intents() {
        let mut table = create_table(MemoryStore::new(), 7);
        table.place_bet(GameKind::MinesReveal).unwrap();
        assert_eq!(
            table.place_bet(GameKind::MinesReveal),
            Err(ValidationError::GameInProgress(GameKind::MinesReveal))
        );

        let mines = table.mines().board().unwrap().mines().clone();
        let safe: Vec<usize> = (0..25).filter(|c| !mines.contains(c)).take(2).collect();
        for cell in safe {
            table.reveal(cell).unwrap();
        }
        let outcome = table.cash_out().unwrap();
        assert_eq!(outcome.payout, 144);
        assert_eq!(table.ledger().balance(), 10_044);

        assert_eq!(
            table.finish_after_delay(GameKind::MinesReveal).await,
            Some(outcome)
        );
        assert!(table.mines().phase().is_idle());
    }

    #[test]
    fn test_games_are_independent() {
        let mut table = create_table(MemoryStore::new(), 7);
        table.place_bet(GameKind::MinesReveal).unwrap();
        table.place_bet(GameKind::PlinkoDrop).unwrap();
        table.place_bet(GameKind::SportsWager).unwrap();
        assert_eq!(table.ledger().snapshot(), LedgerSnapshot::new(9_700, 300));
    }

    #[test]
    fn test_adjust_bet_amount() {
        let mut table = create_table(MemoryStore::new(), 7);
        assert_eq!(table.adjust_bet_amount(GameKind::PlinkoDrop, 100), 200);
        assert_eq!(table.adjust_bet_amount(GameKind::PlinkoDrop, 1_000_000), 10_000);
        assert_eq!(table.adjust_bet_amount(GameKind::MinesReveal, -100), 100);
        assert_eq!(table.plinko().bet_amount(), 10_000);
        assert_eq!(table.mines().bet_amount(), 100);
        assert_eq!(table.sports().bet_amount(), 100);
    }

    #[test]
    fn test_rejected_bet_leaves_ledger() {
        let mut table = create_table(MemoryStore::new(), 7);
        table.ledger().restore(LedgerSnapshot::new(60, 9_940));
        for kind in GameKind::ALL {
            assert!(matches!(
                table.place_bet(kind),
                Err(ValidationError::InsufficientBalance { balance: 60, amount: 100 })
            ));
        }
        assert_eq!(table.ledger().snapshot(), LedgerSnapshot::new(60, 9_940));
    }

    #[test]
    fn test_seeded_tables_replay() {
        let mut a = create_table(MemoryStore::new(), 99);
        let mut b = create_table(MemoryStore::new(), 99);
        for _ in 0..5 {
            a.place_bet(GameKind::PlinkoDrop).unwrap();
            b.place_bet(GameKind::PlinkoDrop).unwrap();
            assert_eq!(a.plinko().current_drop(), b.plinko().current_drop());
            while a.plinko.advance().is_some() {}
            while b.plinko.advance().is_some() {}
            a.plinko.land(&a.ledger).unwrap();
            b.plinko.land(&b.ledger).unwrap();
            a.finish(GameKind::PlinkoDrop);
            b.finish(GameKind::PlinkoDrop);
        }
        assert_eq!(a.ledger().snapshot(), b.ledger().snapshot());
    }

    #[tokio::test]
    async fn test_rounds_reach_the_store() {
        let store = MemoryStore::new();
        let mut table = create_table(store.clone(), 3);
        table.ledger().bind("alice");

        table.play_sports().await.unwrap();
        table.play_sports().await.unwrap();
        let expected = LedgerSnapshot::new(9_800, 200);
        assert!(wait_for_sync(&store, "alice", expected).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_play_plinko_is_paced() {
        let mut config = Config::default();
        config.seed = Some(1);
        let config = config.validate().unwrap();
        let mut table = Table::new(config, Ledger::new(MemoryStore::new()));

        let start = tokio::time::Instant::now();
        table.play_plinko().await.unwrap();
        // Eight rows at 200ms, then the settle delay
        assert!(start.elapsed() >= Duration::from_millis(8 * 200 + 1_500));

        let start = tokio::time::Instant::now();
        table.play_sports().await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(1_000 + 1_500));
        assert!(table.sports().phase().is_idle());
    }
}
