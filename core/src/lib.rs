#![no_std]

extern crate alloc;

use core::time::Duration;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

pub use cell::*;
pub use engine::*;
pub use error::*;
pub use generator::*;
pub use level::*;
pub use milestone::*;
pub use mirror::*;
pub use progress::*;
pub use session::*;
pub use timer::*;
pub use types::*;

mod cell;
mod engine;
mod error;
mod generator;
mod level;
mod milestone;
mod mirror;
mod progress;
mod session;
mod timer;
mod types;

/// A generated level: its configuration, the mirror placement and the lit pattern the player has to reproduce.
///
/// Every lit pattern cell has a mirror target, constructors reject anything else.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Puzzle {
    level: Level,
    config: LevelConfig,
    mirror: MirrorMap,
    pattern: Array2<Cell>,
}

impl Puzzle {
    pub(crate) fn new_unchecked(
        level: Level,
        config: LevelConfig,
        mirror: MirrorMap,
        pattern: Array2<Cell>,
    ) -> Self {
        Self {
            level,
            config,
            mirror,
            pattern,
        }
    }

    /// Builds a puzzle from a full pattern grid of `(pattern_rows, pattern_cols)` cells.
    pub fn from_pattern(
        level: Level,
        config: LevelConfig,
        mirror_start: Coord,
        pattern: Array2<Cell>,
    ) -> Result<Self> {
        let expected = (
            usize::from(config.pattern_rows()),
            usize::from(config.pattern_cols()),
        );
        if pattern.dim() != expected {
            return Err(GameError::InvalidBoardShape);
        }

        let mirror = MirrorMap::new(&config, mirror_start);
        if let Some(length) = config.effective_mirror_length() {
            if mirror_start > config.mirror_extent() - length {
                return Err(GameError::InvalidBoardShape);
            }
        }

        let puzzle = Self::new_unchecked(level, config, mirror, pattern);
        puzzle.validate()?;
        Ok(puzzle)
    }

    /// Builds a puzzle whose pattern is off except for the given cells, which are forced on.
    pub fn from_lit_cells(
        level: Level,
        config: LevelConfig,
        mirror_start: Coord,
        lit: &[(CellIndex, Selection)],
    ) -> Result<Self> {
        let cols = config.pattern_cols();
        let mut pattern = Array2::from_elem(
            (
                usize::from(config.pattern_rows()),
                usize::from(cols),
            ),
            Cell::OFF,
        );
        for &(index, selection) in lit {
            if index >= config.pattern_size() {
                return Err(GameError::InvalidIndex);
            }
            pattern[split_index(index, cols)] = Cell::lit(selection);
        }
        Self::from_pattern(level, config, mirror_start, pattern)
    }

    /// Checks that every lit pattern cell has a mirror target.
    pub fn validate(&self) -> Result<()> {
        match self
            .lit_indices()
            .find(|&index| self.mirror.mirror_index(index).is_none())
        {
            Some(index) => Err(GameError::UnmirrorableLitCell(index)),
            None => Ok(()),
        }
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn config(&self) -> &LevelConfig {
        &self.config
    }

    pub fn mirror(&self) -> &MirrorMap {
        &self.mirror
    }

    pub fn unlocks(&self) -> Unlocks {
        Unlocks::for_level(self.level)
    }

    pub fn pattern(&self) -> &Array2<Cell> {
        &self.pattern
    }

    pub fn pattern_cell(&self, index: CellIndex) -> Option<Cell> {
        if index >= self.config.pattern_size() {
            return None;
        }
        Some(self.pattern[split_index(index, self.config.pattern_cols())])
    }

    pub fn lit_indices(&self) -> impl Iterator<Item = CellIndex> + use<'_> {
        self.pattern
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.on)
            .map(|(index, _)| index)
    }

    pub fn lit_count(&self) -> CellCount {
        self.pattern
            .iter()
            .filter(|cell| cell.on)
            .count()
            .try_into()
            .unwrap_or(CellCount::MAX)
    }

    /// Whether some lit pattern cell mirrors onto `player_index`.
    pub fn is_target(&self, player_index: CellIndex) -> bool {
        self.lit_indices()
            .any(|index| self.mirror.mirror_index(index) == Some(player_index))
    }

    /// What the player cell at `player_index` has to show for the level to be solved.
    pub fn expected_player_cell(&self, player_index: CellIndex) -> Cell {
        self.mirror
            .source_of(player_index)
            .and_then(|index| self.pattern_cell(index))
            .unwrap_or(Cell::OFF)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CellChange {
    /// An off cell was turned on.
    TurnedOn,
    /// An on cell was painted with a different shape or color.
    Repainted,
    TurnedOff,
}

/// Everything a single tap caused.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TapOutcome {
    pub change: CellChange,
    pub correct_target: bool,
    /// Points deducted for lighting a cell that mirrors nothing.
    pub penalty: Option<Score>,
    /// Points awarded when the tap solved the level.
    pub points: Option<Score>,
}

impl TapOutcome {
    pub const fn is_win(&self) -> bool {
        self.points.is_some()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// No timer is running.
    Idle,
    Running { remaining: Duration },
    TimedOut,
}
