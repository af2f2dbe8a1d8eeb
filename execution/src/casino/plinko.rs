//! Plinko outcome calculation.
//!
//! A ball starts at the horizontal center of the board and takes one
//! left/right step per row. Pins are staggered, so each step moves half a
//! bucket width; on the default board (8 rows, 9 buckets) the ball rests
//! above the bucket numbered by its count of right steps. The bucket is
//! `floor(position / board_width * bucket_count)`, clamped to the table.
//!
//! The drawn path also carries a small random jitter per row so the ball
//! does not fall on a perfect lattice. Jitter only shapes the presentation
//! path and never feeds the bucket calculation.

use super::GameRng;
use houseedge_types::casino::{
    PLINKO_BOARD_WIDTH, PLINKO_MAX_JITTER, PLINKO_MULTIPLIERS, PLINKO_ROWS,
};

/// Board geometry and payout table.
#[derive(Clone, Debug, PartialEq)]
pub struct Board {
    pub rows: usize,
    pub width: f64,
    pub max_jitter: f64,
    pub multipliers: Vec<f64>,
}

impl Default for Board {
    fn default() -> Self {
        Self {
            rows: PLINKO_ROWS,
            width: PLINKO_BOARD_WIDTH,
            max_jitter: PLINKO_MAX_JITTER,
            multipliers: PLINKO_MULTIPLIERS.to_vec(),
        }
    }
}

impl Board {
    pub fn bucket_count(&self) -> usize {
        self.multipliers.len()
    }

    /// Width of one bucket.
    pub fn column_width(&self) -> f64 {
        self.width / self.bucket_count().max(1) as f64
    }

    /// Horizontal distance covered by one step.
    pub fn step_width(&self) -> f64 {
        self.column_width() / 2.0
    }

    /// Vertical distance covered by one step.
    pub fn row_height(&self) -> f64 {
        self.width / self.rows.max(1) as f64
    }

    /// Multiplier paid for landing in `bucket` (clamped into the table).
    pub fn multiplier(&self, bucket: usize) -> f64 {
        let last = self.bucket_count().saturating_sub(1);
        self.multipliers.get(bucket.min(last)).copied().unwrap_or(0.0)
    }
}

/// A point on the presentation path.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PathPoint {
    pub x: f64,
    pub y: f64,
}

/// A fully simulated ball drop.
#[derive(Clone, Debug, PartialEq)]
pub struct BallDrop {
    /// One entry per row, `true` for a step to the right.
    pub steps: Vec<bool>,
    /// Jittered positions to animate through, one per row.
    pub path: Vec<PathPoint>,
    /// Resting position derived from `steps` alone.
    pub position: f64,
    pub bucket: usize,
    pub multiplier: f64,
}

/// Simulate a drop on `board`.
pub fn simulate(board: &Board, rng: &mut GameRng) -> BallDrop {
    let step = board.step_width();
    let row = board.row_height();

    let mut steps = Vec::with_capacity(board.rows);
    let mut path = Vec::with_capacity(board.rows);
    let mut x = board.width / 2.0;
    let mut y = 0.0;
    for _ in 0..board.rows {
        let right = rng.coin();
        let direction = if right { 1.0 } else { -1.0 };
        x += direction * (step + rng.jitter(board.max_jitter));
        y += row;
        steps.push(right);
        path.push(PathPoint { x, y });
    }

    let position = resting_position(board, &steps);
    let bucket = bucket_for(position, board.width, board.bucket_count());
    BallDrop {
        steps,
        path,
        position,
        bucket,
        multiplier: board.multiplier(bucket),
    }
}

/// Position reached by following `steps` from the center without jitter.
pub fn resting_position(board: &Board, steps: &[bool]) -> f64 {
    let step = board.step_width();
    steps.iter().fold(board.width / 2.0, |x, &right| {
        if right {
            x + step
        } else {
            x - step
        }
    })
}

/// Bucket under `position`, clamped into `[0, buckets - 1]`.
pub fn bucket_for(position: f64, width: f64, buckets: usize) -> usize {
    let last = buckets.saturating_sub(1);
    let raw = (position / width * buckets as f64).floor();
    if !raw.is_finite() || raw <= 0.0 {
        return 0;
    }
    (raw as usize).min(last)
}
