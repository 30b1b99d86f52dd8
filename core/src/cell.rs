use serde::{Deserialize, Serialize};

use crate::Level;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeKind {
    Square,
    Circle,
    Triangle,
    Star,
}

impl ShapeKind {
    /// All shapes in unlock order.
    pub const ALL: [Self; 4] = [Self::Square, Self::Circle, Self::Triangle, Self::Star];

    /// First level on which the shape can be placed.
    pub const fn unlock_level(self) -> Level {
        use ShapeKind::*;
        match self {
            Square => 1,
            Circle => 150,
            Triangle => 200,
            Star => 300,
        }
    }

    pub const fn name(self) -> &'static str {
        use ShapeKind::*;
        match self {
            Square => "square",
            Circle => "circle",
            Triangle => "triangle",
            Star => "star",
        }
    }
}

impl Default for ShapeKind {
    fn default() -> Self {
        Self::Square
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColorKind {
    Green,
    Purple,
    Orange,
}

impl ColorKind {
    /// All colors in unlock order.
    pub const ALL: [Self; 3] = [Self::Green, Self::Purple, Self::Orange];

    /// First level on which the color can be placed.
    pub const fn unlock_level(self) -> Level {
        use ColorKind::*;
        match self {
            Green => 1,
            Purple => 250,
            Orange => 300,
        }
    }

    pub const fn name(self) -> &'static str {
        use ColorKind::*;
        match self {
            Green => "green",
            Purple => "purple",
            Orange => "orange",
        }
    }
}

impl Default for ColorKind {
    fn default() -> Self {
        Self::Green
    }
}

/// Shape and color the player paints with.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selection {
    pub shape: ShapeKind,
    pub color: ColorKind,
}

impl Selection {
    pub const fn new(shape: ShapeKind, color: ColorKind) -> Self {
        Self { shape, color }
    }
}

/// A single grid cell, shared by the pattern and the player grid.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub on: bool,
    pub shape: ShapeKind,
    pub color: ColorKind,
}

impl Cell {
    pub const OFF: Self = Self {
        on: false,
        shape: ShapeKind::Square,
        color: ColorKind::Green,
    };

    pub const fn lit(selection: Selection) -> Self {
        Self {
            on: true,
            shape: selection.shape,
            color: selection.color,
        }
    }

    pub const fn selection(self) -> Selection {
        Selection::new(self.shape, self.color)
    }

    /// Whether the cell is on and painted exactly with `selection`.
    pub fn is_lit_with(self, selection: Selection) -> bool {
        self.on && self.selection() == selection
    }

    /// Whether the cell shows the same thing as `other`; shape and color only count while on.
    pub fn mirrors(self, other: Self) -> bool {
        if self.on != other.on {
            return false;
        }
        !self.on || self.selection() == other.selection()
    }
}

static SHAPE_ORDER: [ShapeKind; 4] = ShapeKind::ALL;
static COLOR_ORDER: [ColorKind; 3] = ColorKind::ALL;

/// Shapes and colors available on a level. Both lists are prefixes of the unlock order.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Unlocks {
    pub shapes: &'static [ShapeKind],
    pub colors: &'static [ColorKind],
}

impl Unlocks {
    pub fn for_level(level: Level) -> Self {
        let shape_count = SHAPE_ORDER
            .iter()
            .take_while(|shape| shape.unlock_level() <= level)
            .count();
        let color_count = COLOR_ORDER
            .iter()
            .take_while(|color| color.unlock_level() <= level)
            .count();
        Self {
            shapes: &SHAPE_ORDER[..shape_count.max(1)],
            colors: &COLOR_ORDER[..color_count.max(1)],
        }
    }

    pub fn allows(&self, selection: Selection) -> bool {
        self.shapes.contains(&selection.shape) && self.colors.contains(&selection.color)
    }

    /// Palettes are only shown once there is something to choose from.
    pub fn has_shape_palette(&self) -> bool {
        self.shapes.len() > 1
    }

    pub fn has_color_palette(&self) -> bool {
        self.colors.len() > 1
    }
}
