use crate::*;
pub use random::*;

mod random;

pub trait PuzzleGenerator {
    fn generate(self, level: Level) -> Puzzle;
}
