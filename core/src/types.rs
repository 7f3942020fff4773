use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Single coordinate axis used for board width, height, and positions.
pub type Coord = u8;

/// Count type used for mine counts and total-cell counts.
pub type CellCount = u16;

/// Two-dimensional coordinates `(x, y)`.
pub type Coord2 = (Coord, Coord);

pub trait ToNdIndex {
    type Output;
    fn to_nd_index(self) -> Self::Output;
}

impl ToNdIndex for Coord2 {
    type Output = [usize; 2];

    fn to_nd_index(self) -> Self::Output {
        [self.0.into(), self.1.into()]
    }
}

pub const fn mult(a: Coord, b: Coord) -> CellCount {
    let a = a as CellCount;
    let b = b as CellCount;
    a.saturating_mul(b)
}

/// Row-major iterator over every coordinate of a board of `size`.
pub fn iter_coords((width, height): Coord2) -> impl Iterator<Item = Coord2> {
    (0..height).flat_map(move |y| (0..width).map(move |x| (x, y)))
}

/// Cursor movement direction.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    const fn delta(self) -> (i16, i16) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }

    /// Steps one cell from `coords`, wrapping each axis independently inside `bounds`.
    pub fn wrapping_step(self, (x, y): Coord2, (width, height): Coord2) -> Coord2 {
        let (dx, dy) = self.delta();
        (wrap_axis(x, dx, width), wrap_axis(y, dy, height))
    }
}

fn wrap_axis(value: Coord, delta: i16, len: Coord) -> Coord {
    let wrapped = (i16::from(value) + delta).rem_euclid(i16::from(len.max(1)));
    // rem_euclid keeps the result inside 0..len
    wrapped as Coord
}

pub trait NeighborIterExt {
    fn iter_neighbors(&self, index: Coord2) -> NeighborIter;
}

impl<T> NeighborIterExt for Array2<T> {
    fn iter_neighbors(&self, index: Coord2) -> NeighborIter {
        let (width, height) = self.dim();
        let bounds = (
            Coord::try_from(width).unwrap_or(Coord::MAX),
            Coord::try_from(height).unwrap_or(Coord::MAX),
        );
        NeighborIter::new(index, bounds)
    }
}

/// Offsets a coordinate, returning a value only when it stays inside `bounds`.
fn offset((x, y): Coord2, (dx, dy): (i16, i16), (width, height): Coord2) -> Option<Coord2> {
    let next_x = Coord::try_from(i16::from(x) + dx).ok().filter(|&nx| nx < width)?;
    let next_y = Coord::try_from(i16::from(y) + dy).ok().filter(|&ny| ny < height)?;
    Some((next_x, next_y))
}

/// Walks the up to eight Chebyshev-adjacent cells of `center`, clipped to the board.
#[derive(Clone, Debug)]
pub struct NeighborIter {
    center: Coord2,
    bounds: Coord2,
    step: u8,
}

impl NeighborIter {
    pub fn new(center: Coord2, bounds: Coord2) -> Self {
        Self {
            center,
            bounds,
            step: 0,
        }
    }
}

impl Iterator for NeighborIter {
    type Item = Coord2;

    fn next(&mut self) -> Option<Self::Item> {
        // steps 0..9 cover the 3x3 square, step 4 is the center itself
        while self.step < 9 {
            let step = self.step;
            self.step += 1;
            if step == 4 {
                continue;
            }

            let delta = (i16::from(step % 3) - 1, i16::from(step / 3) - 1);
            if let Some(next) = offset(self.center, delta, self.bounds) {
                return Some(next);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    #[test]
    fn neighbors_are_clipped_at_corners_and_edges() {
        let corner: Vec<_> = NeighborIter::new((0, 0), (10, 10)).collect();
        assert_eq!(corner, [(1, 0), (0, 1), (1, 1)]);

        assert_eq!(NeighborIter::new((5, 0), (10, 10)).count(), 5);
        assert_eq!(NeighborIter::new((5, 5), (10, 10)).count(), 8);
        assert!(NeighborIter::new((5, 5), (10, 10)).all(|pos| pos != (5, 5)));
    }

    #[test]
    fn cursor_steps_wrap_on_both_axes() {
        let bounds = (10, 10);

        assert_eq!(Direction::Left.wrapping_step((0, 4), bounds), (9, 4));
        assert_eq!(Direction::Up.wrapping_step((4, 0), bounds), (4, 9));
        assert_eq!(Direction::Right.wrapping_step((9, 4), bounds), (0, 4));
        assert_eq!(Direction::Down.wrapping_step((4, 9), bounds), (4, 0));
        assert_eq!(Direction::Down.wrapping_step((4, 3), bounds), (4, 4));
    }

    #[test]
    fn iter_coords_is_row_major() {
        let coords: Vec<_> = iter_coords((3, 2)).collect();
        assert_eq!(coords, [(0, 0), (1, 0), (2, 0), (0, 1), (1, 1), (2, 1)]);
    }
}
