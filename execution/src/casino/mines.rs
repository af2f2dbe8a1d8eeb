//! Mines board logic.
//!
//! A square grid hides a fixed number of mines placed before the first
//! reveal. Every safe reveal multiplies the running multiplier by a fixed
//! factor. Hitting a mine busts the round; revealing every safe cell clears
//! it and pays the running multiplier, as does cashing out early.

use super::{GameRng, ValidationError};
use houseedge_types::casino::{
    CellState, GameKind, DEFAULT_MINES, MINES_SAFE_FACTOR, MINES_TOTAL_CELLS,
};
use std::collections::BTreeSet;

/// Board dimensions and payout growth.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rules {
    pub cells: usize,
    pub mines: usize,
    pub factor: f64,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            cells: MINES_TOTAL_CELLS,
            mines: DEFAULT_MINES,
            factor: MINES_SAFE_FACTOR,
        }
    }
}

impl Rules {
    /// Number of cells that can be revealed without busting.
    pub fn safe_cells(&self) -> usize {
        self.cells.saturating_sub(self.mines)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    Active,
    Busted,
    Cleared,
    CashedOut,
}

/// Result of revealing one cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Reveal {
    Safe { multiplier: f64 },
    Cleared { multiplier: f64 },
    Mine,
}

#[derive(Clone, Debug)]
pub struct Board {
    cells: Vec<CellState>,
    mines: BTreeSet<usize>,
    factor: f64,
    multiplier: f64,
    safe_revealed: usize,
    status: Status,
}

impl Board {
    /// Lay out a fresh board, drawing mine positions from `rng`.
    pub fn new(rules: Rules, rng: &mut GameRng) -> Self {
        let mines = rng.sample_distinct(rules.cells, rules.mines);
        Self::with_mines(rules, mines)
    }

    /// Lay out a board with known mine positions.
    ///
    /// Positions outside the board are ignored.
    pub fn with_mines(rules: Rules, mines: impl IntoIterator<Item = usize>) -> Self {
        let mines = mines.into_iter().filter(|&m| m < rules.cells).collect();
        Self {
            cells: vec![CellState::Hidden; rules.cells],
            mines,
            factor: rules.factor,
            multiplier: 1.0,
            safe_revealed: 0,
            status: Status::Active,
        }
    }

    pub fn cells(&self) -> &[CellState] {
        &self.cells
    }

    pub fn mines(&self) -> &BTreeSet<usize> {
        &self.mines
    }

    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    pub fn safe_revealed(&self) -> usize {
        self.safe_revealed
    }

    pub fn safe_cells(&self) -> usize {
        self.cells.len().saturating_sub(self.mines.len())
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_active(&self) -> bool {
        self.status == Status::Active
    }

    /// Multiplier the round settles at (zero once busted).
    pub fn final_multiplier(&self) -> f64 {
        match self.status {
            Status::Busted => 0.0,
            _ => self.multiplier,
        }
    }

    /// Reveal `cell`.
    ///
    /// The board is left untouched when an error is returned.
    pub fn reveal(&mut self, cell: usize) -> Result<Reveal, ValidationError> {
        if !self.is_active() {
            return Err(ValidationError::NoActiveGame(GameKind::MinesReveal));
        }
        let state = self
            .cells
            .get(cell)
            .copied()
            .ok_or(ValidationError::InvalidCell {
                cell,
                cells: self.cells.len(),
            })?;
        if state.is_revealed() {
            return Err(ValidationError::CellAlreadyRevealed(cell));
        }

        if self.mines.contains(&cell) {
            self.cells[cell] = CellState::RevealedMine;
            self.end(Status::Busted);
            return Ok(Reveal::Mine);
        }

        self.cells[cell] = CellState::RevealedSafe;
        self.safe_revealed += 1;
        self.multiplier *= self.factor;
        if self.safe_revealed >= self.safe_cells() {
            self.end(Status::Cleared);
            return Ok(Reveal::Cleared {
                multiplier: self.multiplier,
            });
        }
        Ok(Reveal::Safe {
            multiplier: self.multiplier,
        })
    }

    /// Stop revealing and lock in the running multiplier.
    pub fn cash_out(&mut self) -> Result<f64, ValidationError> {
        if !self.is_active() {
            return Err(ValidationError::NoActiveGame(GameKind::MinesReveal));
        }
        self.end(Status::CashedOut);
        Ok(self.multiplier)
    }

    fn end(&mut self, status: Status) {
        self.status = status;
        for (i, cell) in self.cells.iter_mut().enumerate() {
            *cell = if self.mines.contains(&i) {
                CellState::RevealedMine
            } else {
                CellState::RevealedSafe
            };
        }
    }
}
