use alloc::collections::VecDeque;
use core::num::Saturating;
use hashbrown::HashSet;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};

use crate::*;

/// Cells a single flood-fill processes before it stops expanding.
pub const MAX_REVEAL_CELLS: usize = 5000;

/// Valid transitions:
/// - Ready -> Active
/// - Ready -> Won
/// - Ready -> Lost
/// - Active -> Won
/// - Active -> Lost
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundState {
    /// Mines are placed, nothing has been revealed yet
    Ready,
    /// At least one reveal happened
    Active,
    Won,
    Lost,
}

impl RoundState {
    pub const fn is_ready(self) -> bool {
        matches!(self, Self::Ready)
    }

    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

impl Default for RoundState {
    fn default() -> Self {
        Self::Ready
    }
}

/// Discrete event delivered by the input source.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Input {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    Reveal,
    ToggleFlag,
    /// Typed character, only seen by the cheat-code detector.
    Character(char),
}

/// One physical key: the character it typed, if any, and the input it is bound to, if any.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct KeyPress {
    pub ch: Option<char>,
    pub input: Option<Input>,
}

impl KeyPress {
    pub const fn new(ch: Option<char>, input: Option<Input>) -> Self {
        Self { ch, input }
    }
}

impl From<Input> for KeyPress {
    fn from(input: Input) -> Self {
        match input {
            Input::Character(ch) => Self::new(Some(ch), None),
            input => Self::new(None, Some(input)),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MarkOutcome {
    NoChange,
    Changed,
}

impl MarkOutcome {
    pub const fn has_update(self) -> bool {
        matches!(self, Self::Changed)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RevealOutcome {
    NoChange,
    Revealed,
    HitMine,
    Won,
}

impl RevealOutcome {
    pub const fn has_update(self) -> bool {
        !matches!(self, Self::NoChange)
    }
}

/// What a [`KeyPress`] ended up doing.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum KeyOutcome {
    Ignored,
    CheatPending,
    CheatActivated,
    Moved(Coord2),
    Marked(MarkOutcome),
    Revealed(RevealOutcome),
}

impl KeyOutcome {
    /// Whether the board looks different after the key press.
    pub const fn has_update(self) -> bool {
        match self {
            Self::Ignored | Self::CheatPending => false,
            Self::CheatActivated | Self::Moved(_) => true,
            Self::Marked(outcome) => outcome.has_update(),
            Self::Revealed(outcome) => outcome.has_update(),
        }
    }
}

/// One Minesweeper round after another on a fixed configuration.
#[derive(Clone, Debug)]
pub struct Game {
    config: GameConfig,
    rng: SmallRng,
    grid: Grid,
    mines: MineSet,
    cursor: Option<Coord2>,
    flagged: HashSet<Coord2>,
    uncovered: HashSet<Coord2>,
    manually_uncovered: Saturating<CellCount>,
    state: RoundState,
    cheat: CheatDetector,
    cheat_reveal: bool,
    cheated: bool,
}

impl Game {
    /// Sets up the first round with randomly placed mines.
    pub fn new(config: GameConfig, seed: u64) -> Self {
        let mut game = Self::idle(config, seed);
        game.reset();
        game
    }

    /// Sets up the first round on a fixed layout. Later rounds are random again.
    pub fn with_layout(mines: MineSet, seed: u64) -> Self {
        let config = GameConfig::new_unchecked(mines.size(), mines.mine_count().max(1));
        let mut game = Self::idle(config, seed);
        game.start_round(mines);
        game
    }

    fn idle(config: GameConfig, seed: u64) -> Self {
        Self {
            config,
            rng: SmallRng::seed_from_u64(seed),
            grid: Grid::new(config.size()),
            mines: MineSet::empty(config.size()),
            cursor: None,
            flagged: HashSet::new(),
            uncovered: HashSet::new(),
            manually_uncovered: Saturating(0),
            state: Default::default(),
            cheat: Default::default(),
            cheat_reveal: false,
            cheated: false,
        }
    }

    /// Throws the current round away and starts a new one with fresh mines.
    pub fn reset(&mut self) {
        let mines = MineSet::place(&self.config, &mut self.rng);
        self.start_round(mines);
    }

    fn start_round(&mut self, mines: MineSet) {
        self.grid.reset(self.config.size());
        self.mines = mines;
        self.cursor = Some((0, 0));
        self.flagged.clear();
        self.uncovered.clear();
        self.manually_uncovered = Saturating(0);
        self.state = RoundState::Ready;
        self.cheat.reset();
        self.cheat_reveal = false;
        self.cheated = false;

        self.grid.recompute_numbers(&self.mines);
        self.refresh_display();
        log::debug!(
            "Round started on {:?} board with {} mines",
            self.config.size(),
            self.mines.len()
        );
    }

    pub fn config(&self) -> GameConfig {
        self.config
    }

    pub fn state(&self) -> RoundState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    pub fn size(&self) -> Coord2 {
        self.grid.size()
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn mines(&self) -> &MineSet {
        &self.mines
    }

    pub fn total_mines(&self) -> CellCount {
        self.mines.mine_count()
    }

    /// Cursor position, `None` once the round has ended.
    pub fn cursor(&self) -> Option<Coord2> {
        self.cursor
    }

    pub fn is_uncovered(&self, coords: Coord2) -> bool {
        self.uncovered.contains(&coords)
    }

    pub fn is_flagged(&self, coords: Coord2) -> bool {
        self.flagged.contains(&coords) && !self.uncovered.contains(&coords)
    }

    pub fn uncovered_count(&self) -> usize {
        self.uncovered.len()
    }

    pub fn flagged_count(&self) -> usize {
        self.flagged.len()
    }

    pub fn flagged_mine_count(&self) -> usize {
        self.mines
            .coords()
            .filter(|coords| self.flagged.contains(coords))
            .count()
    }

    pub fn manually_uncovered(&self) -> CellCount {
        self.manually_uncovered.0
    }

    /// Whether mines are shown for the current frame because the cheat code was just typed.
    pub fn cheat_reveal(&self) -> bool {
        self.cheat_reveal
    }

    pub fn cheated(&self) -> bool {
        self.cheated
    }

    /// Handles one key press, letting the cheat-code detector take it first.
    pub fn press(&mut self, key: KeyPress) -> Result<KeyOutcome> {
        self.check_not_finished()?;
        self.cheat_reveal = false;

        let progress = match key.ch {
            Some(ch) => self.cheat.feed(ch),
            None => {
                self.cheat.reset();
                CheatProgress::Rejected
            }
        };

        let outcome = if progress == CheatProgress::Matched {
            self.cheat_reveal = true;
            self.cheated = true;
            log::debug!("Cheat code entered");
            KeyOutcome::CheatActivated
        } else if progress.consumed() {
            KeyOutcome::CheatPending
        } else {
            match key.input {
                Some(input) => self.perform(input)?,
                None => KeyOutcome::Ignored,
            }
        };

        self.refresh_display();
        Ok(outcome)
    }

    /// Handles a bare input event, see [`Game::press`].
    pub fn apply(&mut self, input: Input) -> Result<KeyOutcome> {
        self.press(input.into())
    }

    fn perform(&mut self, input: Input) -> Result<KeyOutcome> {
        use Input::*;
        Ok(match input {
            MoveUp => KeyOutcome::Moved(self.move_cursor(Direction::Up)?),
            MoveDown => KeyOutcome::Moved(self.move_cursor(Direction::Down)?),
            MoveLeft => KeyOutcome::Moved(self.move_cursor(Direction::Left)?),
            MoveRight => KeyOutcome::Moved(self.move_cursor(Direction::Right)?),
            Reveal => KeyOutcome::Revealed(self.reveal()?),
            ToggleFlag => KeyOutcome::Marked(self.toggle_flag()?),
            Character(_) => KeyOutcome::Ignored,
        })
    }

    /// Moves the cursor one cell, wrapping around the board edges.
    pub fn move_cursor(&mut self, direction: Direction) -> Result<Coord2> {
        self.check_not_finished()?;
        let cursor = direction.wrapping_step(self.cursor.unwrap_or_default(), self.size());
        self.cursor = Some(cursor);
        Ok(cursor)
    }

    pub fn set_cursor(&mut self, coords: Coord2) -> Result<()> {
        self.check_not_finished()?;
        if !self.grid.contains(coords) {
            return Err(GameError::InvalidCoords);
        }
        self.cursor = Some(coords);
        Ok(())
    }

    /// Flags or unflags the cell under the cursor. Uncovered cells are left alone.
    pub fn toggle_flag(&mut self) -> Result<MarkOutcome> {
        self.check_not_finished()?;
        let coords = self.cursor.unwrap_or_default();

        if self.uncovered.contains(&coords) {
            return Ok(MarkOutcome::NoChange);
        }
        if !self.flagged.insert(coords) {
            self.flagged.remove(&coords);
        }

        self.refresh_display();
        Ok(MarkOutcome::Changed)
    }

    /// Reveals the cell under the cursor and checks whether the round is over.
    pub fn reveal(&mut self) -> Result<RevealOutcome> {
        self.check_not_finished()?;
        let coords = self.cursor.unwrap_or_default();

        if self.flagged.contains(&coords) || self.uncovered.contains(&coords) {
            return Ok(RevealOutcome::NoChange);
        }

        if self.state.is_ready() && self.mines.contains(coords) {
            self.clear_first_reveal(coords);
        }

        self.flood_reveal(coords);
        self.manually_uncovered += Saturating(1);
        self.uncover(coords);

        let outcome = self.evaluate(coords);
        self.refresh_display();
        Ok(outcome)
    }

    /// Takes the mine away from under the first reveal.
    ///
    /// The mine is removed when others remain and moved to a free cell otherwise.
    fn clear_first_reveal(&mut self, coords: Coord2) {
        if self.mines.len() > 1 {
            self.mines.remove(coords);
            log::debug!("First reveal at {:?} hit a mine, removed it", coords);
        } else {
            match self.mines.relocate(coords, &mut self.rng) {
                Some(to) => log::debug!(
                    "First reveal at {:?} hit a mine, moved it to {:?}",
                    coords,
                    to
                ),
                None => log::warn!("Could not find a free cell for the mine at {:?}", coords),
            }
        }
        self.grid.recompute_numbers(&self.mines);
    }

    fn flood_reveal(&mut self, start: Coord2) {
        let mut visited = HashSet::new();
        let mut to_visit = VecDeque::from([start]);

        while let Some(coords) = to_visit.pop_front() {
            if visited.contains(&coords) {
                continue;
            }
            if visited.len() >= MAX_REVEAL_CELLS {
                log::warn!(
                    "Flood-fill from {:?} stopped after {} cells",
                    start,
                    MAX_REVEAL_CELLS
                );
                break;
            }
            visited.insert(coords);
            self.uncover(coords);

            // numbered cells and mines stop the cascade
            if !self.grid[coords].is_zero() {
                continue;
            }
            to_visit.extend(
                self.grid
                    .iter_neighbors(coords)
                    .filter(|pos| !visited.contains(pos)),
            );
        }
        log::trace!("Flood-fill from {:?} uncovered {} cells", start, visited.len());
    }

    fn uncover(&mut self, coords: Coord2) {
        self.flagged.remove(&coords);
        self.uncovered.insert(coords);
    }

    fn evaluate(&mut self, revealed: Coord2) -> RevealOutcome {
        if self.mines.contains(revealed) {
            self.end_round(false);
            RevealOutcome::HitMine
        } else if self.is_cleared() {
            self.end_round(true);
            RevealOutcome::Won
        } else {
            self.state = RoundState::Active;
            RevealOutcome::Revealed
        }
    }

    /// Every safe cell uncovered and no mine among them.
    fn is_cleared(&self) -> bool {
        // an uncovered mine makes the counts add up too, it must not count as cleared
        self.uncovered.len() + self.mines.len() == usize::from(self.grid.total_cells())
            && !self.uncovered.iter().any(|&coords| self.mines.contains(coords))
    }

    fn end_round(&mut self, won: bool) {
        self.state = if won { RoundState::Won } else { RoundState::Lost };
        self.cursor = None;
        log::debug!(
            "Round {} after {} reveals",
            if won { "won" } else { "lost" },
            self.manually_uncovered
        );
    }

    fn refresh_display(&mut self) {
        self.grid.refresh_display(&self.flagged, &self.uncovered);

        let show_all = self.state.is_finished() || self.cheat_reveal;
        for coords in self.mines.coords() {
            if show_all || self.uncovered.contains(&coords) {
                self.grid[coords].display = DisplayState::Mine;
            }
        }
    }

    fn check_not_finished(&self) -> Result<()> {
        if self.state.is_finished() {
            Err(GameError::AlreadyEnded)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game(size: Coord2, mines: &[Coord2]) -> Game {
        Game::with_layout(MineSet::from_mine_coords(size, mines).unwrap(), 0)
    }

    fn reveal_at(game: &mut Game, coords: Coord2) -> RevealOutcome {
        game.set_cursor(coords).unwrap();
        game.reveal().unwrap()
    }

    /// Mines in the 3x3 square around `(x, y)`, counted without the neighbor helpers.
    fn mines_around(game: &Game, (x, y): Coord2) -> u8 {
        let (width, height) = game.size();
        let mut count = 0;
        for ny in y.saturating_sub(1)..=(y + 1).min(height - 1) {
            for nx in x.saturating_sub(1)..=(x + 1).min(width - 1) {
                if (nx, ny) != (x, y) && game.mines().contains((nx, ny)) {
                    count += 1;
                }
            }
        }
        count
    }

    fn assert_numbers_consistent(game: &Game) {
        for coords in iter_coords(game.size()) {
            let expected = if game.mines().contains(coords) {
                None
            } else {
                Some(mines_around(game, coords))
            };
            assert_eq!(game.grid().at(coords).adjacent_mines, expected, "at {coords:?}");
        }
    }

    #[test]
    fn setup_places_mines_and_numbers() {
        let config = GameConfig::new((12, 9), Some(20)).unwrap();

        for seed in 0..16 {
            let game = Game::new(config, seed);

            assert!(game.total_mines() > 0);
            assert!(game.total_mines() <= config.total_cells());
            assert_eq!(game.state(), RoundState::Ready);
            assert_eq!(game.cursor(), Some((0, 0)));
            assert_numbers_consistent(&game);
        }
    }

    #[test]
    fn first_reveal_never_hits_a_mine() {
        let config = GameConfig::new((5, 5), Some(20)).unwrap();

        for seed in 0..64 {
            let mut game = Game::new(config, seed);
            let target = game.mines().coords().next().unwrap();

            let outcome = reveal_at(&mut game, target);

            assert_ne!(outcome, RevealOutcome::HitMine);
            assert!(!game.mines().contains(target));
            assert_numbers_consistent(&game);
        }
    }

    #[test]
    fn single_mine_is_moved_on_first_reveal() {
        let mut game = game((5, 5), &[(4, 4)]);

        let outcome = reveal_at(&mut game, (4, 4));

        assert_ne!(outcome, RevealOutcome::HitMine);
        assert_eq!(game.total_mines(), 1);
        assert!(!game.mines().contains((4, 4)));
        assert!(game.is_uncovered((4, 4)));
        assert_numbers_consistent(&game);
    }

    #[test]
    fn extra_mine_is_removed_on_first_reveal() {
        let mut game = game((4, 4), &[(0, 0), (1, 1)]);

        assert_eq!(reveal_at(&mut game, (0, 0)), RevealOutcome::Revealed);
        assert_eq!(game.total_mines(), 1);
        assert_eq!(game.uncovered_count(), 1);
        assert_eq!(game.grid().at((0, 0)).adjacent_mines, Some(1));
        assert_eq!(game.state(), RoundState::Active);
    }

    #[test]
    fn later_reveal_on_mine_loses() {
        let mut game = game((4, 4), &[(0, 0), (3, 3)]);

        assert_eq!(reveal_at(&mut game, (1, 0)), RevealOutcome::Revealed);
        assert_eq!(reveal_at(&mut game, (3, 3)), RevealOutcome::HitMine);
        assert_eq!(game.state(), RoundState::Lost);
        assert_eq!(game.cursor(), None);
        assert_eq!(game.grid().at((0, 0)).display, DisplayState::Mine);
        assert_eq!(game.reveal(), Err(GameError::AlreadyEnded));
        assert_eq!(game.move_cursor(Direction::Up), Err(GameError::AlreadyEnded));
    }

    #[test]
    fn zero_cell_cascades_to_numbered_border() {
        let mut game = game((5, 5), &[(4, 4)]);

        let outcome = reveal_at(&mut game, (0, 0));

        assert_eq!(outcome, RevealOutcome::Won);
        assert_eq!(game.uncovered_count(), 24);
        assert!(!game.is_uncovered((4, 4)));
        assert_eq!(game.manually_uncovered(), 1);
    }

    #[test]
    fn numbered_cell_does_not_cascade() {
        let mut game = game((5, 5), &[(2, 2)]);

        assert_eq!(reveal_at(&mut game, (1, 1)), RevealOutcome::Revealed);
        assert_eq!(game.uncovered_count(), 1);
    }

    #[test]
    fn cascade_clears_flags_it_passes() {
        let mut game = game((5, 5), &[(4, 4)]);
        game.set_cursor((2, 0)).unwrap();
        assert_eq!(game.toggle_flag().unwrap(), MarkOutcome::Changed);

        reveal_at(&mut game, (0, 0));

        assert!(game.is_uncovered((2, 0)));
        assert!(!game.is_flagged((2, 0)));
        assert_eq!(game.flagged_count(), 0);
    }

    #[test]
    fn revealing_twice_changes_nothing() {
        let wall: alloc::vec::Vec<_> = (0..6).map(|y| (3, y)).collect();
        let mut game = game((6, 6), &wall);
        assert_eq!(reveal_at(&mut game, (0, 0)), RevealOutcome::Revealed);
        let uncovered = game.uncovered_count();
        let manual = game.manually_uncovered();
        assert_eq!(uncovered, 18);

        assert_eq!(reveal_at(&mut game, (0, 0)), RevealOutcome::NoChange);
        assert_eq!(game.uncovered_count(), uncovered);
        assert_eq!(game.manually_uncovered(), manual);
    }

    #[test]
    fn flagged_cell_cannot_be_revealed() {
        let mut game = game((4, 4), &[(3, 3)]);
        game.set_cursor((1, 1)).unwrap();
        game.toggle_flag().unwrap();

        assert_eq!(game.reveal().unwrap(), RevealOutcome::NoChange);
        assert!(!game.is_uncovered((1, 1)));
        assert_eq!(game.grid().at((1, 1)).display, DisplayState::Flagged);
    }

    #[test]
    fn toggling_flag_twice_restores_state() {
        let mut game = game((4, 4), &[(3, 3)]);
        game.set_cursor((2, 1)).unwrap();

        game.toggle_flag().unwrap();
        assert!(game.is_flagged((2, 1)));
        game.toggle_flag().unwrap();
        assert!(!game.is_flagged((2, 1)));
        assert_eq!(game.flagged_count(), 0);
    }

    #[test]
    fn flagging_uncovered_cell_is_noop() {
        let mut game = game((4, 4), &[(1, 1)]);
        assert_eq!(reveal_at(&mut game, (0, 0)), RevealOutcome::Revealed);

        assert_eq!(game.toggle_flag().unwrap(), MarkOutcome::NoChange);
        assert_eq!(game.flagged_count(), 0);
    }

    #[test]
    fn flood_fill_cap_bounds_cascade() {
        let mut game = game((100, 100), &[(99, 99)]);

        assert_eq!(reveal_at(&mut game, (0, 0)), RevealOutcome::Revealed);
        assert_eq!(game.uncovered_count(), MAX_REVEAL_CELLS);
        assert_eq!(game.state(), RoundState::Active);
    }

    #[test]
    fn flood_fill_terminates_without_mines() {
        let mut game = game((20, 20), &[]);

        reveal_at(&mut game, (10, 10));

        assert_eq!(game.uncovered_count(), 400);
    }

    #[test]
    fn crowded_board_wins_on_the_only_safe_cell() {
        let mines: alloc::vec::Vec<_> = iter_coords((3, 3)).filter(|&c| c != (1, 1)).collect();
        let mut game = game((3, 3), &mines);

        assert_eq!(reveal_at(&mut game, (1, 1)), RevealOutcome::Won);
        assert_eq!(game.state(), RoundState::Won);
    }

    #[test]
    fn crowded_board_first_reveal_on_mine_removes_it() {
        let mines: alloc::vec::Vec<_> = iter_coords((3, 3)).filter(|&c| c != (1, 1)).collect();
        let mut game = game((3, 3), &mines);

        assert_eq!(reveal_at(&mut game, (0, 0)), RevealOutcome::Revealed);
        assert_eq!(game.total_mines(), 7);
        assert_eq!(game.grid().at((0, 0)).adjacent_mines, Some(2));
        assert_eq!(reveal_at(&mut game, (1, 1)), RevealOutcome::Won);
    }

    #[test]
    fn uncovered_mine_never_counts_as_cleared() {
        let mut game = game((3, 3), &[(0, 0)]);
        for coords in iter_coords((3, 3)).filter(|&c| c != (2, 2)) {
            game.uncover(coords);
        }

        assert_eq!(game.uncovered_count() + game.mines().len(), 9);
        assert!(!game.is_cleared());
    }

    #[test]
    fn key_outcomes_report_board_updates() {
        let mut game = game((4, 4), &[(3, 3)]);

        let moved = game.apply(Input::MoveRight).unwrap();
        let pending = game.apply(Input::Character('c')).unwrap();
        let ignored = game.apply(Input::Character('x')).unwrap();
        let flagged = game.apply(Input::ToggleFlag).unwrap();
        let blocked = game.apply(Input::Reveal).unwrap();

        assert_eq!(moved, KeyOutcome::Moved((1, 0)));
        assert!(moved.has_update());
        assert_eq!(pending, KeyOutcome::CheatPending);
        assert!(!pending.has_update());
        assert_eq!(ignored, KeyOutcome::Ignored);
        assert!(!ignored.has_update());
        assert!(flagged.has_update());
        assert_eq!(blocked, KeyOutcome::Revealed(RevealOutcome::NoChange));
        assert!(!blocked.has_update());
    }

    #[test]
    fn reset_starts_a_clean_round() {
        let config = GameConfig::new((8, 8), Some(10)).unwrap();
        let mut game = Game::new(config, 42);
        game.set_cursor((3, 3)).unwrap();
        game.toggle_flag().unwrap();
        game.apply(Input::Character('c')).unwrap();

        game.reset();

        assert_eq!(game.state(), RoundState::Ready);
        assert_eq!(game.cursor(), Some((0, 0)));
        assert_eq!(game.flagged_count(), 0);
        assert_eq!(game.uncovered_count(), 0);
        assert_eq!(game.manually_uncovered(), 0);
        assert!(!game.cheated());
        assert_eq!(game.config(), config);
        assert_numbers_consistent(&game);
    }
}
