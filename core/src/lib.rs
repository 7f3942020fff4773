#![no_std]

extern crate alloc;

use serde::{Deserialize, Serialize};

pub use cell::*;
pub use cheat::*;
pub use error::*;
pub use game::*;
pub use grid::*;
pub use mines::*;
pub use types::*;
pub use view::*;

mod cell;
mod cheat;
mod error;
mod game;
mod grid;
mod mines;
mod types;
mod view;

/// Board size and mine count of every round a [`Game`] plays.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    size: Coord2,
    mines: CellCount,
}

impl GameConfig {
    /// Shortest allowed board side.
    pub const MIN_SIDE: Coord = 3;

    /// Percentage of cells that are mined when no count is given.
    pub const DEFAULT_DENSITY_PERCENT: u32 = 15;

    pub const fn new_unchecked(size: Coord2, mines: CellCount) -> Self {
        Self { size, mines }
    }

    /// Validates the board size and settles the mine count.
    ///
    /// Without an explicit count the default density applies. The count is clamped to
    /// `1..=width * height`; an explicit zero is rejected.
    pub fn new((width, height): Coord2, mines: Option<CellCount>) -> Result<Self> {
        if width < Self::MIN_SIDE || height < Self::MIN_SIDE {
            return Err(GameError::InvalidSize {
                min: Self::MIN_SIDE,
            });
        }
        if mines == Some(0) {
            return Err(GameError::NoMines);
        }

        let total_cells = mult(width, height);
        let mines = mines
            .unwrap_or_else(|| Self::default_mine_count(total_cells))
            .clamp(1, total_cells);
        Ok(Self::new_unchecked((width, height), mines))
    }

    pub fn default_mine_count(total_cells: CellCount) -> CellCount {
        let mines = u32::from(total_cells) * Self::DEFAULT_DENSITY_PERCENT / 100;
        CellCount::try_from(mines).unwrap_or(CellCount::MAX).max(1)
    }

    pub const fn size(&self) -> Coord2 {
        self.size
    }

    pub const fn width(&self) -> Coord {
        self.size.0
    }

    pub const fn height(&self) -> Coord {
        self.size.1
    }

    pub const fn mines(&self) -> CellCount {
        self.mines
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.size.0, self.size.1)
    }
}
