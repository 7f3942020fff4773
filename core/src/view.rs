use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Effective look of a cell for the renderer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellView {
    Covered,
    Uncovered(u8),
    Flagged,
    Mine,
}

impl Default for CellView {
    fn default() -> Self {
        Self::Covered
    }
}

impl From<Cell> for CellView {
    fn from(cell: Cell) -> Self {
        match cell.display {
            DisplayState::Covered => Self::Covered,
            DisplayState::Uncovered => Self::Uncovered(cell.adjacent_mines.unwrap_or_default()),
            DisplayState::Flagged => Self::Flagged,
            DisplayState::Mine => Self::Mine,
        }
    }
}

/// Read-only copy of everything the renderer draws, taken between two inputs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub size: Coord2,
    pub cells: Array2<CellView>,
    pub cursor: Option<Coord2>,
    pub ended: bool,
    pub cheat_reveal: bool,
    pub total_mines: CellCount,
}

impl Snapshot {
    pub fn from_game(game: &Game) -> Self {
        let size = game.size();
        let mut cells = Array2::default(size.to_nd_index());
        for coords in iter_coords(size) {
            cells[coords.to_nd_index()] = CellView::from(game.grid().at(coords));
        }

        Self {
            size,
            cells,
            cursor: game.cursor(),
            ended: game.is_finished(),
            cheat_reveal: game.cheat_reveal(),
            total_mines: game.total_mines(),
        }
    }

    pub fn cell_at(&self, coords: Coord2) -> CellView {
        self.cells[coords.to_nd_index()]
    }
}

/// End-of-round numbers for the summary screen.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundSummary {
    pub won: bool,
    pub manually_uncovered: CellCount,
    pub flags_placed: CellCount,
    pub flagged_mines: CellCount,
    pub total_mines: CellCount,
    pub cheated: bool,
}

impl RoundSummary {
    /// `None` while the round is still being played.
    pub fn from_game(game: &Game) -> Option<Self> {
        let won = match game.state() {
            RoundState::Won => true,
            RoundState::Lost => false,
            RoundState::Ready | RoundState::Active => return None,
        };

        Some(Self {
            won,
            manually_uncovered: game.manually_uncovered(),
            flags_placed: saturate(game.flagged_count()),
            flagged_mines: saturate(game.flagged_mine_count()),
            total_mines: game.total_mines(),
            cheated: game.cheated(),
        })
    }
}

fn saturate(count: usize) -> CellCount {
    CellCount::try_from(count).unwrap_or(CellCount::MAX)
}

impl Game {
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::from_game(self)
    }

    pub fn summary(&self) -> Option<RoundSummary> {
        RoundSummary::from_game(self)
    }
}
