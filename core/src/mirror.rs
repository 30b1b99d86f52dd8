use serde::{Deserialize, Serialize};

use crate::*;

/// Rows (vertical axis) or columns (horizontal axis) covered by a partial mirror.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirrorSpan {
    pub start: Coord,
    pub length: Coord,
}

impl MirrorSpan {
    pub const fn contains(&self, line: usize) -> bool {
        let start = self.start as usize;
        line >= start && line < start + self.length as usize
    }
}

/// Maps pattern cells to the player cells that must mirror them.
///
/// This is the single source of truth for both lighting pattern cells at level start and for checking the win
/// condition.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirrorMap {
    axis: Axis,
    pattern_size: Coord2,
    player_size: Coord2,
    span: Option<MirrorSpan>,
}

impl MirrorMap {
    /// Builds the mapping for `config` with a partial mirror starting at `mirror_start`.
    ///
    /// `mirror_start` is ignored for full mirrors.
    pub fn new(config: &LevelConfig, mirror_start: Coord) -> Self {
        let span = config
            .effective_mirror_length()
            .map(|length| MirrorSpan {
                start: mirror_start,
                length,
            });
        Self {
            axis: config.axis,
            pattern_size: (config.pattern_rows(), config.pattern_cols()),
            player_size: (config.player_rows(), config.player_cols()),
            span,
        }
    }

    pub fn span(&self) -> Option<MirrorSpan> {
        self.span
    }

    pub fn pattern_len(&self) -> usize {
        mult(self.pattern_size.0, self.pattern_size.1).into()
    }

    /// Player index that must mirror the pattern cell at `pattern_index`.
    ///
    /// Returns `None` for cells outside a partial mirror's span, cells whose reflection falls outside the player grid
    /// and indices outside the pattern grid.
    pub fn mirror_index(&self, pattern_index: CellIndex) -> Option<CellIndex> {
        if pattern_index >= self.pattern_len() {
            return None;
        }

        let (pattern_rows, pattern_cols) = self.pattern_size;
        let (player_rows, player_cols) = (
            usize::from(self.player_size.0),
            usize::from(self.player_size.1),
        );
        let (row, col) = split_index(pattern_index, pattern_cols);

        let (target_row, target_col) = match self.axis {
            Axis::Vertical => {
                if self.span.is_some_and(|span| !span.contains(row)) {
                    return None;
                }
                (row, usize::from(pattern_cols) - 1 - col)
            }
            Axis::Horizontal => {
                if self.span.is_some_and(|span| !span.contains(col)) {
                    return None;
                }
                (usize::from(pattern_rows) - 1 - row, col)
            }
        };

        if target_row >= player_rows || target_col >= player_cols {
            return None;
        }
        Some(target_row * player_cols + target_col)
    }

    /// Pattern indices that have a mirror target, in ascending order.
    pub fn mirrorable(&self) -> impl Iterator<Item = CellIndex> + use<'_> {
        (0..self.pattern_len()).filter(|&index| self.mirror_index(index).is_some())
    }

    /// Pattern index mirrored by the player cell at `player_index`, if any.
    pub fn source_of(&self, player_index: CellIndex) -> Option<CellIndex> {
        (0..self.pattern_len()).find(|&index| self.mirror_index(index) == Some(player_index))
    }
}

/// Free-standing form of [`MirrorMap::mirror_index`].
///
/// The player dimensions are passed explicitly, everything else comes from `config` and `mirror_start`.
pub fn mirror_index(
    pattern_index: CellIndex,
    player_rows: Coord,
    player_cols: Coord,
    config: &LevelConfig,
    mirror_start: Coord,
) -> Option<CellIndex> {
    let mut map = MirrorMap::new(config, mirror_start);
    map.player_size = (player_rows, player_cols);
    map.mirror_index(pattern_index)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vertical(rows: Coord, cols: Coord, span: Coord, mirror_length: Option<Coord>) -> LevelConfig {
        LevelConfig {
            rows,
            cols,
            pattern_span: span,
            lit_count: 1,
            axis: Axis::Vertical,
            mirror_length,
            phase: Phase::Learning,
        }
    }

    fn horizontal(rows: Coord, cols: Coord, span: Coord, mirror_length: Option<Coord>) -> LevelConfig {
        LevelConfig {
            axis: Axis::Horizontal,
            ..vertical(rows, cols, span, mirror_length)
        }
    }

    #[test]
    fn first_level_reflects_across_the_middle() {
        let map = MirrorMap::new(&LEVEL_TABLE[0], 0);

        assert_eq!(map.mirror_index(0), Some(1));
        assert_eq!(map.mirror_index(1), Some(0));
        assert_eq!(map.mirror_index(2), Some(3));
        assert_eq!(map.mirror_index(3), Some(2));
        assert_eq!(map.mirror_index(4), None);
    }

    #[test]
    fn wide_pattern_loses_cells_past_the_player_grid() {
        // 3 pattern columns, 1 player column: only the rightmost pattern column reflects
        let map = MirrorMap::new(&vertical(2, 4, 3, None), 0);

        assert_eq!(map.mirror_index(0), None);
        assert_eq!(map.mirror_index(1), None);
        assert_eq!(map.mirror_index(2), Some(0));
        assert_eq!(map.mirror_index(5), Some(1));
        assert_eq!(map.mirrorable().collect::<alloc::vec::Vec<_>>(), [2, 5]);
    }

    #[test]
    fn horizontal_mirror_flips_rows() {
        // 2 pattern rows on top of 2 player rows, 3 columns
        let map = MirrorMap::new(&horizontal(4, 3, 2, None), 0);

        assert_eq!(map.mirror_index(0), Some(3));
        assert_eq!(map.mirror_index(2), Some(5));
        assert_eq!(map.mirror_index(3), Some(0));
        assert_eq!(map.mirror_index(5), Some(2));
    }

    #[test]
    fn partial_vertical_mirror_only_covers_its_rows() {
        let config = vertical(4, 6, 3, Some(2));
        let map = MirrorMap::new(&config, 1);

        for index in 0..config.pattern_size() {
            let (row, _) = split_index(index, config.pattern_cols());
            assert_eq!(
                map.mirror_index(index).is_some(),
                (1..3).contains(&row),
                "index {index}"
            );
        }
    }

    #[test]
    fn partial_horizontal_mirror_only_covers_its_columns() {
        let config = horizontal(6, 4, 3, Some(2));
        let map = MirrorMap::new(&config, 2);

        for index in 0..config.pattern_size() {
            let (_, col) = split_index(index, config.pattern_cols());
            assert_eq!(
                map.mirror_index(index).is_some(),
                (2..4).contains(&col),
                "index {index}"
            );
        }
    }

    #[test]
    fn targets_always_land_inside_the_player_grid() {
        for config in LEVEL_TABLE {
            let extent = config.mirror_extent();
            let starts = match config.effective_mirror_length() {
                Some(length) => 0..=(extent - length),
                None => 0..=0,
            };
            for start in starts {
                let map = MirrorMap::new(&config, start);
                for index in 0..config.pattern_size() {
                    if let Some(target) = map.mirror_index(index) {
                        assert!(target < config.player_size());
                    }
                }
            }
        }
    }

    #[test]
    fn source_of_inverts_mirror_index() {
        let map = MirrorMap::new(&LEVEL_TABLE[10], 0);
        for index in map.mirrorable() {
            let target = map.mirror_index(index).unwrap();
            assert_eq!(map.source_of(target), Some(index));
        }
    }

    #[test]
    fn free_function_agrees_with_the_map() {
        let config = LEVEL_TABLE[50];
        let map = MirrorMap::new(&config, 1);
        for index in 0..config.pattern_size() {
            assert_eq!(
                mirror_index(index, config.player_rows(), config.player_cols(), &config, 1),
                map.mirror_index(index)
            );
        }
    }

    #[test]
    fn mirror_length_is_clamped_to_the_extent() {
        let map = MirrorMap::new(&vertical(2, 4, 2, Some(4)), 0);
        assert_eq!(
            map.span(),
            Some(MirrorSpan {
                start: 0,
                length: 2
            })
        );
    }
}
