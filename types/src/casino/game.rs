use serde::{Deserialize, Serialize};
use std::fmt;

/// Games offered at the table
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameKind {
    PlinkoDrop,
    MinesReveal,
    SportsWager,
}

impl GameKind {
    pub const ALL: [GameKind; 3] = [
        GameKind::PlinkoDrop,
        GameKind::MinesReveal,
        GameKind::SportsWager,
    ];
}

impl fmt::Display for GameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GameKind::PlinkoDrop => "plinko",
            GameKind::MinesReveal => "mines",
            GameKind::SportsWager => "sports",
        };
        f.write_str(name)
    }
}

/// A wager submitted to one of the games.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BetRequest {
    pub amount: u64,
    pub kind: GameKind,
}

impl BetRequest {
    pub fn new(kind: GameKind, amount: u64) -> Self {
        Self { amount, kind }
    }
}

/// Final result of a resolved wager.
///
/// `payout` is the total credited back (stake included), so a loss has
/// `payout == 0` and `delta == -amount`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameOutcome {
    pub kind: GameKind,
    pub amount: u64,
    pub multiplier: f64,
    pub payout: u64,
    pub delta: i64,
}

impl GameOutcome {
    pub fn new(kind: GameKind, amount: u64, multiplier: f64) -> Self {
        let multiplier = if multiplier.is_finite() && multiplier > 0.0 {
            multiplier
        } else {
            0.0
        };
        let payout = payout(amount, multiplier);
        let delta = to_signed(payout).saturating_sub(to_signed(amount));
        Self {
            kind,
            amount,
            multiplier,
            payout,
            delta,
        }
    }

    /// A resolved wager that returns nothing.
    pub fn loss(kind: GameKind, amount: u64) -> Self {
        Self::new(kind, amount, 0.0)
    }

    pub fn is_win(&self) -> bool {
        self.delta > 0
    }
}

/// Credits returned for `amount` at `multiplier`, rounded to the nearest credit.
pub fn payout(amount: u64, multiplier: f64) -> u64 {
    if !(multiplier > 0.0) {
        return 0;
    }
    // Float-to-int casts saturate, so oversized products clamp to u64::MAX
    (amount as f64 * multiplier).round() as u64
}

fn to_signed(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Visible state of a single Mines cell
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellState {
    #[default]
    Hidden,
    RevealedSafe,
    RevealedMine,
}

impl CellState {
    pub fn is_revealed(&self) -> bool {
        !matches!(self, CellState::Hidden)
    }
}
