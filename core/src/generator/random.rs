use alloc::vec::Vec;
use ndarray::Array2;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use super::*;

/// Generation strategy that lights a random subset of the mirrorable pattern cells, each with a random unlocked
/// shape and color. Everything random, including the partial mirror placement, derives from `seed`.
#[derive(Clone, Debug, PartialEq)]
pub struct RandomPuzzleGenerator {
    seed: u64,
}

impl RandomPuzzleGenerator {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl PuzzleGenerator for RandomPuzzleGenerator {
    fn generate(self, level: Level) -> Puzzle {
        let level = level.max(1);
        let mut rng = SmallRng::seed_from_u64(self.seed);

        let config = generate_level(level, &mut rng);
        let mirror_start = match config.effective_mirror_length() {
            Some(length) => rng.random_range(0..=config.mirror_extent() - length),
            None => 0,
        };
        let mirror = MirrorMap::new(&config, mirror_start);

        let mut mirrorable: Vec<CellIndex> = mirror.mirrorable().collect();
        if mirrorable.is_empty() {
            log::warn!("Level {} has no mirrorable pattern cell, nothing to light", level);
        }
        mirrorable.shuffle(&mut rng);

        let lit_count = usize::from(config.lit_count).clamp(1, mirrorable.len().max(1));
        if lit_count != usize::from(config.lit_count) {
            log::debug!(
                "Level {} asks for {} lit cells, only {} are mirrorable",
                level,
                config.lit_count,
                mirrorable.len()
            );
        }

        let unlocks = Unlocks::for_level(level);
        let pattern_cols = config.pattern_cols();
        let mut pattern = Array2::from_elem(
            (
                usize::from(config.pattern_rows()),
                usize::from(pattern_cols),
            ),
            Cell::OFF,
        );
        for &index in mirrorable.iter().take(lit_count) {
            let shape = unlocks.shapes[rng.random_range(0..unlocks.shapes.len())];
            let color = unlocks.colors[rng.random_range(0..unlocks.colors.len())];
            pattern[split_index(index, pattern_cols)] = Cell::lit(Selection::new(shape, color));
        }

        let puzzle = Puzzle::new_unchecked(level, config, mirror, pattern);
        debug_assert_eq!(puzzle.validate(), Ok(()));
        puzzle
    }
}
