use serde::{Deserialize, Serialize};

/// What a cell currently shows. Derived from the round state after every update.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisplayState {
    Covered,
    Uncovered,
    Flagged,
    Mine,
}

impl Default for DisplayState {
    fn default() -> Self {
        Self::Covered
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub display: DisplayState,
    /// Mined neighbors, `None` only on cells holding a mine.
    pub adjacent_mines: Option<u8>,
}

impl Cell {
    pub const fn is_zero(self) -> bool {
        matches!(self.adjacent_mines, Some(0))
    }
}
