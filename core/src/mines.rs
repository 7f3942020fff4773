use hashbrown::HashMap;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mine {
    coords: Coord2,
}

impl Mine {
    pub const fn new(coords: Coord2) -> Self {
        Self { coords }
    }

    pub const fn coords(self) -> Coord2 {
        self.coords
    }
}

/// Authoritative mine layout of a round: a coordinate is mined iff it is a key here.
#[derive(Clone, Debug, PartialEq)]
pub struct MineSet {
    size: Coord2,
    mines: HashMap<Coord2, Mine>,
}

impl MineSet {
    pub fn empty(size: Coord2) -> Self {
        Self {
            size,
            mines: HashMap::new(),
        }
    }

    /// Randomly places up to `config.mines()` mines.
    ///
    /// Each mine gets [`MineSet::sample_tries`] attempts at finding a free cell and is skipped when
    /// they run out, so crowded boards may end up with fewer mines than requested. A layout with no
    /// mines at all is thrown away and placed again.
    pub fn place<R: Rng>(config: &GameConfig, rng: &mut R) -> Self {
        let requested = config.mines();
        loop {
            let mut layout = Self::empty(config.size());
            for _ in 0..requested {
                match layout.sample_free(rng) {
                    Some(coords) => layout.insert(coords),
                    None => log::warn!(
                        "Gave up placing a mine after {} tries",
                        layout.sample_tries()
                    ),
                }
            }

            if layout.is_empty() {
                log::warn!("Mine placement produced an empty layout, placing again");
                continue;
            }
            if layout.len() < usize::from(requested) {
                log::debug!(
                    "Placed {} mines, requested {}",
                    layout.len(),
                    requested
                );
            }
            return layout;
        }
    }

    pub fn from_mine_coords(size: Coord2, mine_coords: &[Coord2]) -> Result<Self> {
        let mut layout = Self::empty(size);
        for &coords in mine_coords {
            if coords.0 >= size.0 || coords.1 >= size.1 {
                return Err(GameError::InvalidCoords);
            }
            layout.insert(coords);
        }
        Ok(layout)
    }

    pub fn size(&self) -> Coord2 {
        self.size
    }

    pub fn len(&self) -> usize {
        self.mines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mines.is_empty()
    }

    pub fn mine_count(&self) -> CellCount {
        CellCount::try_from(self.mines.len()).unwrap_or(CellCount::MAX)
    }

    pub fn contains(&self, coords: Coord2) -> bool {
        self.mines.contains_key(&coords)
    }

    pub fn coords(&self) -> impl Iterator<Item = Coord2> + '_ {
        self.mines.values().map(|mine| mine.coords())
    }

    pub fn remove(&mut self, coords: Coord2) -> Option<Mine> {
        self.mines.remove(&coords)
    }

    /// Moves the mine at `from` to a random free cell, returning where it went.
    ///
    /// The mine stays put when sampling runs out of tries or there is no mine at `from`.
    pub fn relocate<R: Rng>(&mut self, from: Coord2, rng: &mut R) -> Option<Coord2> {
        if !self.contains(from) {
            return None;
        }
        let to = self.sample_free(rng)?;
        self.mines.remove(&from);
        self.insert(to);
        Some(to)
    }

    pub fn adjacent_count(&self, coords: Coord2) -> u8 {
        let count = NeighborIter::new(coords, self.size)
            .filter(|&pos| self.contains(pos))
            .count();
        // at most eight neighbors
        count as u8
    }

    /// Attempts a single free-cell sample gets before giving up.
    pub fn sample_tries(&self) -> u32 {
        (u32::from(self.size.0) + u32::from(self.size.1)) * 3
    }

    fn insert(&mut self, coords: Coord2) {
        self.mines.insert(coords, Mine::new(coords));
    }

    fn sample_free<R: Rng>(&self, rng: &mut R) -> Option<Coord2> {
        let (width, height) = self.size;
        (0..self.sample_tries())
            .map(|_| (rng.random_range(0..width), rng.random_range(0..height)))
            .find(|&coords| !self.contains(coords))
    }
}
