/// Virtual credits granted to a fresh ledger
pub const INITIAL_BALANCE: u64 = 10_000;

/// Smallest accepted wager
pub const MIN_BET: u64 = 1;

/// Bet size every game starts with
pub const DEFAULT_BET: u64 = 100;

/// Increment used by the bet +/- controls (also the lowest adjustable bet)
pub const BET_STEP: u64 = 100;

/// Number of pin rows a Plinko ball falls through
pub const PLINKO_ROWS: usize = 8;

/// Width of the Plinko board in layout units
pub const PLINKO_BOARD_WIDTH: f64 = 400.0;

/// Upper bound (exclusive) of the cosmetic horizontal jitter added per row
pub const PLINKO_MAX_JITTER: f64 = 5.0;

/// Landing multipliers, indexed by bucket (edges low, center high)
pub const PLINKO_MULTIPLIERS: [f64; 9] = [0.2, 0.3, 0.5, 1.5, 2.0, 1.5, 0.5, 0.3, 0.2];

/// Side length of the square Mines grid
pub const MINES_GRID_SIZE: usize = 5;

/// Number of cells on the Mines grid
pub const MINES_TOTAL_CELLS: usize = MINES_GRID_SIZE * MINES_GRID_SIZE;

/// Mines hidden on every board
pub const DEFAULT_MINES: usize = 3;

/// Multiplier growth per safe reveal
pub const MINES_SAFE_FACTOR: f64 = 1.2;

/// Delay between Plinko rows (milliseconds)
pub const STEP_DELAY_MS: u64 = 200;

/// Delay before a resolved game returns to idle (milliseconds)
pub const SETTLE_DELAY_MS: u64 = 1_500;

/// Visible delay before a sports wager settles (milliseconds)
pub const SPORTS_SETTLE_DELAY_MS: u64 = 1_000;

/// Message shown when a sports wager settles
pub const SPORTS_LOSS_MESSAGE: &str = "Unfortunately, your bet did not win. This is a common outcome in real gambling, which is why we recommend not gambling with real money.";
