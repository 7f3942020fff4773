use core::ops::{Index, IndexMut};
use hashbrown::HashSet;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Fixed-size board of cells, indexed by `(x, y)`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    size: Coord2,
    cells: Array2<Cell>,
}

impl Grid {
    pub fn new(size: Coord2) -> Self {
        Self {
            size,
            cells: Array2::default(size.to_nd_index()),
        }
    }

    /// Drops every cell and allocates a fresh covered board of `size`.
    pub fn reset(&mut self, size: Coord2) {
        *self = Self::new(size);
    }

    pub fn size(&self) -> Coord2 {
        self.size
    }

    pub fn total_cells(&self) -> CellCount {
        mult(self.size.0, self.size.1)
    }

    pub fn at(&self, coords: Coord2) -> Cell {
        self[coords]
    }

    pub fn contains(&self, (x, y): Coord2) -> bool {
        x < self.size.0 && y < self.size.1
    }

    pub fn iter_neighbors(&self, coords: Coord2) -> NeighborIter {
        self.cells.iter_neighbors(coords)
    }

    /// Stores the mined-neighbor count of every cell, clearing it on mined cells.
    pub fn recompute_numbers(&mut self, mines: &MineSet) {
        for coords in iter_coords(self.size) {
            self[coords].adjacent_mines = if mines.contains(coords) {
                None
            } else {
                Some(mines.adjacent_count(coords))
            };
        }
    }

    /// Rebuilds display states from the flagged and uncovered sets. Uncovered wins over flagged.
    pub fn refresh_display(&mut self, flagged: &HashSet<Coord2>, uncovered: &HashSet<Coord2>) {
        for cell in self.cells.iter_mut() {
            cell.display = DisplayState::Covered;
        }
        for &coords in flagged {
            self[coords].display = DisplayState::Flagged;
        }
        for &coords in uncovered {
            self[coords].display = DisplayState::Uncovered;
        }
    }
}

impl Index<Coord2> for Grid {
    type Output = Cell;

    fn index(&self, coords: Coord2) -> &Self::Output {
        &self.cells[coords.to_nd_index()]
    }
}

impl IndexMut<Coord2> for Grid {
    fn index_mut(&mut self, coords: Coord2) -> &mut Self::Output {
        &mut self.cells[coords.to_nd_index()]
    }
}
