//! Casino game outcome engine.
//!
//! This module contains the payout logic for all table games:
//! - Plinko
//! - Mines
//! - Sports

pub mod mines;
pub mod plinko;
pub mod sports;


use houseedge_types::casino::{BetRequest, GameKind};
use rand::{seq::index, Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use thiserror::Error;

/// Seedable random number generator shared by every game.
///
/// Each round draws from its own ChaCha stream so a replay with the same
/// seed and round number reproduces the exact same board or path.
#[derive(Clone, Debug)]
pub struct GameRng {
    inner: ChaCha20Rng,
}

impl GameRng {
    /// Create a new RNG from a seed and round number.
    pub fn new(seed: u64, round: u64) -> Self {
        let mut inner = ChaCha20Rng::seed_from_u64(seed);
        inner.set_stream(round);
        Self { inner }
    }

    /// Create an RNG seeded from operating system entropy.
    pub fn from_entropy() -> Self {
        Self {
            inner: ChaCha20Rng::from_entropy(),
        }
    }

    /// Flip a fair coin.
    pub fn coin(&mut self) -> bool {
        self.inner.gen_bool(0.5)
    }

    /// Get a random value in range [0.0, max).
    pub fn jitter(&mut self, max: f64) -> f64 {
        if !(max > 0.0) {
            return 0.0;
        }
        self.inner.gen_range(0.0..max)
    }

    /// Get a random value in range [0, max).
    pub fn next_bounded(&mut self, max: usize) -> usize {
        if max == 0 {
            return 0;
        }
        self.inner.gen_range(0..max)
    }

    /// Draw `count` distinct indices uniformly from [0, domain).
    pub fn sample_distinct(&mut self, domain: usize, count: usize) -> Vec<usize> {
        index::sample(&mut self.inner, domain, count.min(domain)).into_vec()
    }
}

impl RngCore for GameRng {
    fn next_u32(&mut self) -> u32 {
        self.inner.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.inner.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.inner.try_fill_bytes(dest)
    }
}

/// A rejected player action. Nothing is mutated when one is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("bet must be at least {min} (got {amount})")]
    BelowMinimum { min: u64, amount: u64 },
    #[error("insufficient balance: have {balance}, need {amount}")]
    InsufficientBalance { balance: u64, amount: u64 },
    #[error("a {0} round is already in progress")]
    GameInProgress(GameKind),
    #[error("no active {0} round")]
    NoActiveGame(GameKind),
    #[error("the {0} round is still playing out")]
    StillPlaying(GameKind),
    #[error("cell {cell} is outside the board ({cells} cells)")]
    InvalidCell { cell: usize, cells: usize },
    #[error("cell {0} is already revealed")]
    CellAlreadyRevealed(usize),
    #[error("unknown fixture: {0}")]
    UnknownFixture(String),
}

/// Check a wager against the table minimum and the current balance.
pub fn validate_bet(
    request: &BetRequest,
    balance: u64,
    min_bet: u64,
) -> Result<(), ValidationError> {
    let min = min_bet.max(1);
    if request.amount < min {
        return Err(ValidationError::BelowMinimum {
            min,
            amount: request.amount,
        });
    }
    if request.amount > balance {
        return Err(ValidationError::InsufficientBalance {
            balance,
            amount: request.amount,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_rng_deterministic() {
        let mut rng1 = GameRng::new(7, 1);
        let mut rng2 = GameRng::new(7, 1);

        // Same seed should produce same sequence
        for _ in 0..100 {
            assert_eq!(rng1.next_u64(), rng2.next_u64());
        }
    }

    #[test]
    fn test_game_rng_different_rounds() {
        let mut rng1 = GameRng::new(7, 1);
        let mut rng2 = GameRng::new(7, 2);

        // Different rounds should produce different sequences
        let seq1: Vec<u64> = (0..10).map(|_| rng1.next_u64()).collect();
        let seq2: Vec<u64> = (0..10).map(|_| rng2.next_u64()).collect();
        assert_ne!(seq1, seq2);
    }

    #[test]
    fn test_game_rng_bounded() {
        let mut rng = GameRng::new(7, 1);

        for _ in 0..1000 {
            assert!(rng.next_bounded(25) < 25);
            let jitter = rng.jitter(5.0);
            assert!((0.0..5.0).contains(&jitter));
        }
        assert_eq!(rng.next_bounded(0), 0);
        assert_eq!(rng.jitter(0.0), 0.0);
    }

    #[test]
    fn test_game_rng_sample_distinct() {
        let mut rng = GameRng::new(7, 1);

        for _ in 0..200 {
            let mut picks = rng.sample_distinct(25, 3);
            assert_eq!(picks.len(), 3);
            assert!(picks.iter().all(|&i| i < 25));
            picks.sort_unstable();
            picks.dedup();
            assert_eq!(picks.len(), 3);
        }

        // Never draws more than the domain holds
        assert_eq!(rng.sample_distinct(4, 10).len(), 4);
    }

    #[test]
    fn test_coin_is_roughly_fair() {
        let mut rng = GameRng::new(42, 0);
        let heads = (0..10_000).filter(|_| rng.coin()).count();
        assert!((4_500..5_500).contains(&heads), "heads = {heads}");
    }

    #[test]
    fn test_validate_bet() {
        let request = BetRequest::new(GameKind::PlinkoDrop, 100);
        assert_eq!(validate_bet(&request, 100, 1), Ok(()));
        assert_eq!(
            validate_bet(&request, 99, 1),
            Err(ValidationError::InsufficientBalance {
                balance: 99,
                amount: 100
            })
        );

        let zero = BetRequest::new(GameKind::MinesReveal, 0);
        assert_eq!(
            validate_bet(&zero, 10_000, 0),
            Err(ValidationError::BelowMinimum { min: 1, amount: 0 })
        );
    }
}
