use core::time::Duration;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::*;
use crate::Axis::{Horizontal as H, Vertical as V};
use self::Phase::{HeatingUp, Learning, Partial, WarmingUp};

/// Cosmetic difficulty tier shown next to the level number.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    Learning,
    WarmingUp,
    HeatingUp,
    Partial,
    Expert,
    Master,
    Legend,
}

impl Phase {
    pub const fn label(self) -> &'static str {
        use Phase::*;
        match self {
            Learning => "🌱 Learning",
            WarmingUp => "📚 Warming Up",
            HeatingUp => "🔥 Heating Up",
            Partial => "⚡ Partial!",
            Expert => "🎯 Expert",
            Master => "👑 Master",
            Legend => "⭐ Legend",
        }
    }

    /// Tier for levels past the curated table.
    pub const fn for_scaled_level(level: Level) -> Self {
        match level {
            300.. => Self::Legend,
            200.. => Self::Master,
            _ => Self::Expert,
        }
    }
}

/// Geometry and difficulty of a single level.
///
/// `pattern_span` counts pattern columns for a vertical mirror and pattern rows for a horizontal one, the rest of
/// the grid belongs to the player. `mirror_length` restricts the mirror to that many rows (vertical) or columns
/// (horizontal), `None` mirrors the full extent.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelConfig {
    pub rows: Coord,
    pub cols: Coord,
    pub pattern_span: Coord,
    pub lit_count: CellCount,
    pub axis: Axis,
    pub mirror_length: Option<Coord>,
    pub phase: Phase,
}

const fn full(
    rows: Coord,
    cols: Coord,
    pattern_span: Coord,
    lit_count: CellCount,
    axis: Axis,
    phase: Phase,
) -> LevelConfig {
    LevelConfig {
        rows,
        cols,
        pattern_span,
        lit_count,
        axis,
        mirror_length: None,
        phase,
    }
}

const fn partial(
    rows: Coord,
    cols: Coord,
    pattern_span: Coord,
    lit_count: CellCount,
    axis: Axis,
    phase: Phase,
    mirror_length: Coord,
) -> LevelConfig {
    LevelConfig {
        mirror_length: Some(mirror_length),
        ..full(rows, cols, pattern_span, lit_count, axis, phase)
    }
}

/// Curated levels, `LEVEL_TABLE[0]` is level 1.
pub const LEVEL_TABLE: [LevelConfig; 70] = [
    // 1-10: single small mirrors
    full(2, 4, 2, 1, V, Learning),
    full(2, 4, 2, 2, V, Learning),
    full(4, 2, 2, 2, H, Learning),
    full(2, 4, 3, 2, V, Learning),
    full(4, 2, 3, 2, H, Learning),
    full(2, 6, 3, 2, V, Learning),
    full(2, 6, 4, 3, V, Learning),
    full(6, 2, 4, 3, H, Learning),
    full(3, 4, 2, 3, V, Learning),
    full(3, 4, 3, 3, V, Learning),
    // 11-25
    full(4, 4, 2, 3, V, WarmingUp),
    full(4, 4, 2, 3, H, WarmingUp),
    full(3, 6, 3, 4, V, WarmingUp),
    full(3, 6, 4, 4, V, WarmingUp),
    full(6, 3, 4, 4, H, WarmingUp),
    full(4, 6, 3, 4, V, WarmingUp),
    full(4, 6, 4, 5, V, WarmingUp),
    full(6, 4, 4, 5, H, WarmingUp),
    full(4, 6, 5, 4, V, WarmingUp),
    full(6, 4, 5, 4, H, WarmingUp),
    full(3, 8, 4, 4, V, WarmingUp),
    full(3, 8, 5, 5, V, WarmingUp),
    full(8, 3, 5, 5, H, WarmingUp),
    full(4, 8, 4, 5, V, WarmingUp),
    full(4, 8, 6, 5, V, WarmingUp),
    // 26-49: bigger boards, still full mirrors
    full(5, 6, 3, 5, V, HeatingUp),
    full(5, 6, 4, 5, V, HeatingUp),
    full(6, 5, 4, 5, H, HeatingUp),
    full(5, 8, 4, 6, V, HeatingUp),
    full(5, 8, 5, 6, V, HeatingUp),
    full(8, 5, 5, 6, H, HeatingUp),
    full(5, 8, 6, 6, V, HeatingUp),
    full(6, 6, 3, 6, V, HeatingUp),
    full(6, 6, 4, 6, V, HeatingUp),
    full(6, 6, 4, 6, H, HeatingUp),
    full(6, 8, 4, 7, V, HeatingUp),
    full(6, 8, 5, 7, V, HeatingUp),
    full(6, 8, 6, 7, V, HeatingUp),
    full(8, 6, 5, 7, H, HeatingUp),
    full(8, 6, 6, 7, H, HeatingUp),
    full(5, 8, 4, 7, V, HeatingUp),
    full(5, 8, 5, 7, V, HeatingUp),
    full(5, 8, 6, 8, V, HeatingUp),
    full(6, 8, 5, 8, V, HeatingUp),
    full(6, 8, 6, 8, V, HeatingUp),
    full(6, 8, 4, 8, V, HeatingUp),
    full(6, 8, 5, 8, V, HeatingUp),
    full(7, 8, 5, 8, V, HeatingUp),
    full(7, 8, 6, 8, V, HeatingUp),
    // 50-70: partial mirrors
    partial(4, 6, 3, 4, V, Partial, 2),
    partial(4, 6, 4, 4, V, Partial, 2),
    partial(6, 4, 3, 4, H, Partial, 2),
    partial(4, 8, 4, 5, V, Partial, 2),
    partial(4, 8, 5, 5, V, Partial, 3),
    partial(5, 6, 3, 5, V, Partial, 3),
    partial(5, 6, 4, 5, V, Partial, 2),
    partial(6, 5, 3, 5, H, Partial, 3),
    partial(5, 8, 4, 6, V, Partial, 3),
    partial(5, 8, 5, 6, V, Partial, 2),
    partial(6, 6, 3, 5, V, Partial, 3),
    partial(6, 6, 4, 5, V, Partial, 2),
    partial(6, 8, 4, 6, V, Partial, 3),
    partial(6, 8, 5, 6, V, Partial, 4),
    partial(8, 6, 4, 6, H, Partial, 3),
    partial(6, 8, 4, 6, V, Partial, 3),
    partial(6, 8, 5, 6, V, Partial, 4),
    partial(7, 8, 4, 7, V, Partial, 4),
    partial(7, 8, 5, 7, V, Partial, 3),
    partial(8, 8, 4, 7, V, Partial, 4),
    partial(8, 8, 5, 7, V, Partial, 5),
];

/// Levels past the table cycle through this many trailing entries.
const SCALING_CYCLE: usize = 20;

impl LevelConfig {
    pub const fn pattern_rows(&self) -> Coord {
        match self.axis {
            V => self.rows,
            H => self.pattern_span,
        }
    }

    pub const fn pattern_cols(&self) -> Coord {
        match self.axis {
            V => self.pattern_span,
            H => self.cols,
        }
    }

    pub const fn player_rows(&self) -> Coord {
        match self.axis {
            V => self.rows,
            H => self.rows.saturating_sub(self.pattern_span),
        }
    }

    pub const fn player_cols(&self) -> Coord {
        match self.axis {
            V => self.cols.saturating_sub(self.pattern_span),
            H => self.cols,
        }
    }

    pub const fn pattern_size(&self) -> usize {
        mult(self.pattern_rows(), self.pattern_cols()) as usize
    }

    pub const fn player_size(&self) -> usize {
        mult(self.player_rows(), self.player_cols()) as usize
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.rows, self.cols)
    }

    /// Number of rows (vertical) or columns (horizontal) a partial mirror can slide along.
    pub const fn mirror_extent(&self) -> Coord {
        match self.axis {
            V => self.rows,
            H => self.cols,
        }
    }

    /// Mirror length clamped to the extent of the grid.
    pub fn effective_mirror_length(&self) -> Option<Coord> {
        self.mirror_length
            .map(|length| length.min(self.mirror_extent()))
    }
}

/// Curated configuration of `level`, if it has one.
pub fn tabulated_level(level: Level) -> Option<LevelConfig> {
    let index = usize::try_from(level.max(1) - 1).ok()?;
    LEVEL_TABLE.get(index).copied()
}

/// Derives the configuration of `level`.
///
/// Curated levels come straight from [`LEVEL_TABLE`]. Later levels cycle through the last entries of the table with
/// more lit cells, and get a random partial mirror when the base entry has none.
pub fn generate_level<R: Rng + ?Sized>(level: Level, rng: &mut R) -> LevelConfig {
    let level = level.max(1);
    if let Some(config) = tabulated_level(level) {
        return config;
    }

    let table_len = LEVEL_TABLE.len();
    let past_table = (level as usize) - table_len - 1;
    let base = LEVEL_TABLE[table_len - SCALING_CYCLE + past_table % SCALING_CYCLE];
    scale_config(base, level, rng)
}

/// Turns the table entry `base` into the configuration of the scaled `level`.
///
/// Adds two lit cells capped at 35% of the grid. From level 50 on a base without a partial mirror gets one of
/// random length 2 to 4.
pub fn scale_config<R: Rng + ?Sized>(base: LevelConfig, level: Level, rng: &mut R) -> LevelConfig {
    let lit_cap = u32::from(base.total_cells()) * 35 / 100;
    let lit_count = (u32::from(base.lit_count) + 2).min(lit_cap);
    let mirror_length = match base.mirror_length {
        Some(length) => Some(length),
        None if level >= 50 => Some(rng.random_range(2..=4)),
        None => None,
    };

    LevelConfig {
        lit_count: lit_count.try_into().unwrap_or(CellCount::MAX),
        mirror_length,
        phase: Phase::for_scaled_level(level),
        ..base
    }
}

/// Time limit of `level`, levels below 100 are untimed.
pub fn timer_duration(level: Level) -> Option<Duration> {
    let secs = match level {
        ..100 => return None,
        100..=130 => 45,
        131..=160 => 40,
        161..=200 => 35,
        201..=250 => 30,
        251..=300 => 25,
        _ => 25u32.saturating_sub((level - 300) / 20).max(15),
    };
    Some(Duration::from_secs(secs.into()))
}
