use serde::{Deserialize, Serialize};

/// Single coordinate axis used for grid width, height, and positions.
pub type Coord = u8;

/// Count type used for lit-cell counts and total-cell counts.
pub type CellCount = u16;

/// Flat row-major index into the pattern or player grid.
pub type CellIndex = usize;

/// Two-dimensional coordinates `(row, col)`.
pub type Coord2 = (Coord, Coord);

/// 1-based level number.
pub type Level = u32;

/// Session score, negative values are allowed.
pub type Score = i64;

pub const fn mult(a: Coord, b: Coord) -> CellCount {
    let a = a as CellCount;
    let b = b as CellCount;
    a.saturating_mul(b)
}

/// Splits a flat index into `(row, col)` for a grid `cols` wide.
pub const fn split_index(index: CellIndex, cols: Coord) -> (usize, usize) {
    let cols = cols as usize;
    (index / cols, index % cols)
}

/// Direction of the mirror line.
///
/// A vertical mirror puts the pattern on the left and the player grid on the right, a horizontal one puts the
/// pattern on top.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    Vertical,
    Horizontal,
}

impl Axis {
    pub const fn is_vertical(self) -> bool {
        matches!(self, Self::Vertical)
    }
}
