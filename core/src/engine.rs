use core::time::Duration;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineState {
    Playing,
    Won,
    Failed,
}

impl EngineState {
    pub const fn is_playing(self) -> bool {
        matches!(self, Self::Playing)
    }

    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Failed)
    }
}

impl Default for EngineState {
    fn default() -> Self {
        Self::Playing
    }
}

/// Points deducted when a tap lights a player cell that mirrors no lit pattern cell.
pub const fn penalty_for(level: Level) -> Score {
    5 + (level as Score) * 55 / 100
}

/// Points awarded for solving `level`.
pub const fn points_for(level: Level) -> Score {
    10 + (level as Score) / 2
}

/// Gameplay state of a single level: the puzzle, the player's grid, the running score and the optional countdown.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayEngine {
    puzzle: Puzzle,
    player: Array2<Cell>,
    score: Score,
    state: EngineState,
    timer: Option<LevelTimer>,
}

impl PlayEngine {
    /// Starts `puzzle` carrying over `score` from previous levels.
    pub fn new(puzzle: Puzzle, score: Score) -> Self {
        let config = puzzle.config();
        let player = Array2::from_elem(
            (
                usize::from(config.player_rows()),
                usize::from(config.player_cols()),
            ),
            Cell::OFF,
        );
        let timer = LevelTimer::for_level(puzzle.level());
        Self {
            puzzle,
            player,
            score,
            state: Default::default(),
            timer,
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    pub fn level(&self) -> Level {
        self.puzzle.level()
    }

    pub fn score(&self) -> Score {
        self.score
    }

    pub fn progress(&self) -> Progress {
        Progress::new(self.level(), self.score)
    }

    pub fn puzzle(&self) -> &Puzzle {
        &self.puzzle
    }

    pub fn config(&self) -> &LevelConfig {
        self.puzzle.config()
    }

    pub fn unlocks(&self) -> Unlocks {
        self.puzzle.unlocks()
    }

    pub fn timer(&self) -> Option<&LevelTimer> {
        self.timer.as_ref()
    }

    pub fn player(&self) -> &Array2<Cell> {
        &self.player
    }

    pub fn player_cell(&self, index: CellIndex) -> Option<Cell> {
        self.player_coords(index).map(|coords| self.player[coords])
    }

    pub fn pattern_cell(&self, index: CellIndex) -> Option<Cell> {
        self.puzzle.pattern_cell(index)
    }

    /// Paints or clears the player cell at `index` with `selection`.
    ///
    /// A cell already lit with exactly `selection` is cleared, anything else is lit with it. Lighting a cell that no
    /// lit pattern cell mirrors onto costs [`penalty_for`] points. The win condition is checked after every tap.
    pub fn tap(&mut self, index: CellIndex, selection: Selection) -> Result<TapOutcome> {
        let coords = self.player_coords(index).ok_or(GameError::InvalidIndex)?;
        if !self.unlocks().allows(selection) {
            return Err(GameError::LockedSelection);
        }
        self.check_playing()?;

        let correct_target = self.puzzle.is_target(index);
        let current = self.player[coords];
        let (next, change) = if current.is_lit_with(selection) {
            (Cell::OFF, CellChange::TurnedOff)
        } else if current.on {
            (Cell::lit(selection), CellChange::Repainted)
        } else {
            (Cell::lit(selection), CellChange::TurnedOn)
        };
        self.player[coords] = next;

        let penalty = if next.on && !correct_target {
            let penalty = penalty_for(self.level());
            self.score -= penalty;
            log::debug!("Wrong cell {} on level {}, -{}", index, self.level(), penalty);
            Some(penalty)
        } else {
            None
        };

        let points = self.is_solved().then(|| self.win());

        Ok(TapOutcome {
            change,
            correct_target,
            penalty,
            points,
        })
    }

    /// Advances the level timer by `delta`, failing the level when it runs out.
    pub fn tick(&mut self, delta: Duration) -> TickOutcome {
        if !self.state.is_playing() {
            return TickOutcome::Idle;
        }
        let Some(timer) = self.timer.as_mut() else {
            return TickOutcome::Idle;
        };

        if timer.tick(delta) {
            self.fail();
            TickOutcome::TimedOut
        } else {
            TickOutcome::Running {
                remaining: timer.remaining(),
            }
        }
    }

    /// Whether every mirrored player cell matches its pattern cell.
    pub fn is_solved(&self) -> bool {
        let mirror = self.puzzle.mirror();
        self.puzzle
            .pattern()
            .iter()
            .enumerate()
            .all(|(index, &pattern_cell)| match mirror.mirror_index(index) {
                Some(target) => self
                    .player_cell(target)
                    .is_some_and(|player_cell| pattern_cell.mirrors(player_cell)),
                // puzzles never light a cell without a target
                None => !pattern_cell.on,
            })
    }

    fn win(&mut self) -> Score {
        let points = points_for(self.level());
        self.score += points;
        self.state = EngineState::Won;
        self.timer = None;
        log::info!("Level {} solved, +{} (score {})", self.level(), points, self.score);
        points
    }

    fn fail(&mut self) {
        self.state = EngineState::Failed;
        self.timer = None;
        log::info!("Level {} timed out", self.level());
    }

    fn player_coords(&self, index: CellIndex) -> Option<(usize, usize)> {
        let (rows, cols) = self.player.dim();
        (index < rows * cols).then(|| (index / cols, index % cols))
    }

    fn check_playing(&self) -> Result<()> {
        if self.state.is_playing() {
            Ok(())
        } else {
            Err(GameError::AlreadyEnded)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GREEN_SQUARE: Selection = Selection::new(ShapeKind::Square, ColorKind::Green);

    fn first_level() -> PlayEngine {
        let puzzle = Puzzle::from_lit_cells(1, LEVEL_TABLE[0], 0, &[(0, GREEN_SQUARE)]).unwrap();
        PlayEngine::new(puzzle, 0)
    }

    #[test]
    fn tapping_the_mirror_target_wins() {
        let mut engine = first_level();

        let outcome = engine.tap(1, GREEN_SQUARE).unwrap();

        assert_eq!(outcome.change, CellChange::TurnedOn);
        assert!(outcome.correct_target);
        assert_eq!(outcome.penalty, None);
        assert_eq!(outcome.points, Some(10));
        assert_eq!(engine.state(), EngineState::Won);
        assert_eq!(engine.score(), 10);
    }

    #[test]
    fn tapping_a_wrong_cell_costs_points() {
        let mut engine = first_level();

        let outcome = engine.tap(0, GREEN_SQUARE).unwrap();

        assert!(!outcome.correct_target);
        assert_eq!(outcome.penalty, Some(5));
        assert_eq!(outcome.points, None);
        assert_eq!(engine.score(), -5);
        assert_eq!(engine.state(), EngineState::Playing);
    }

    #[test]
    fn turning_a_wrong_cell_off_is_free() {
        let mut engine = first_level();

        engine.tap(0, GREEN_SQUARE).unwrap();
        let outcome = engine.tap(0, GREEN_SQUARE).unwrap();

        assert_eq!(outcome.change, CellChange::TurnedOff);
        assert_eq!(outcome.penalty, None);
        assert_eq!(engine.score(), -5);
        assert_eq!(engine.player_cell(0), Some(Cell::OFF));
    }

    #[test]
    fn double_tap_restores_the_cell_and_classification() {
        let puzzle = Puzzle::from_lit_cells(2, LEVEL_TABLE[1], 0, &[(0, GREEN_SQUARE), (2, GREEN_SQUARE)])
            .unwrap();
        let mut engine = PlayEngine::new(puzzle, 0);

        let first = engine.tap(1, GREEN_SQUARE).unwrap();
        let second = engine.tap(1, GREEN_SQUARE).unwrap();
        let third = engine.tap(1, GREEN_SQUARE).unwrap();

        assert_eq!(first.change, CellChange::TurnedOn);
        assert_eq!(second.change, CellChange::TurnedOff);
        assert_eq!(engine.player_cell(1), Some(Cell::lit(GREEN_SQUARE)));
        assert_eq!(third.change, CellChange::TurnedOn);
        assert_eq!(first.correct_target, third.correct_target);
        assert_eq!(engine.score(), 0);
    }

    #[test]
    fn repainting_keeps_the_cell_on() {
        let circle = Selection::new(ShapeKind::Circle, ColorKind::Green);
        let puzzle = Puzzle::from_lit_cells(150, LEVEL_TABLE[10], 0, &[(0, circle)]).unwrap();
        let mut engine = PlayEngine::new(puzzle, 0);

        // (0, 0) mirrors to (0, 1) in a 2 column player grid
        assert_eq!(engine.tap(1, GREEN_SQUARE).unwrap().change, CellChange::TurnedOn);
        assert_eq!(engine.state(), EngineState::Playing);

        let outcome = engine.tap(1, circle).unwrap();
        assert_eq!(outcome.change, CellChange::Repainted);
        assert!(outcome.is_win());
    }

    #[test]
    fn locked_selection_is_rejected_without_changes() {
        let mut engine = first_level();
        let star = Selection::new(ShapeKind::Star, ColorKind::Green);

        assert_eq!(engine.tap(1, star), Err(GameError::LockedSelection));
        assert_eq!(engine.player_cell(1), Some(Cell::OFF));
    }

    #[test]
    fn out_of_bounds_tap_is_rejected_without_changes() {
        let mut engine = first_level();

        assert_eq!(engine.tap(4, GREEN_SQUARE), Err(GameError::InvalidIndex));
        assert_eq!(engine.score(), 0);
        assert!(engine.player().iter().all(|cell| !cell.on));
    }

    #[test]
    fn no_moves_after_the_level_ended() {
        let mut engine = first_level();
        engine.tap(1, GREEN_SQUARE).unwrap();

        assert_eq!(engine.tap(0, GREEN_SQUARE), Err(GameError::AlreadyEnded));
    }

    #[test]
    fn penalty_grows_with_level() {
        assert_eq!(penalty_for(1), 5);
        assert_eq!(penalty_for(50), 32);
        assert_eq!(penalty_for(100), 60);
        for level in 1..1000 {
            assert!(penalty_for(level) <= penalty_for(level + 1));
        }
    }

    #[test]
    fn points_grow_with_level() {
        assert_eq!(points_for(1), 10);
        assert_eq!(points_for(2), 11);
        assert_eq!(points_for(101), 60);
    }

    #[test]
    fn timed_levels_fail_when_the_clock_runs_out() {
        let puzzle = Puzzle::from_lit_cells(100, LEVEL_TABLE[0], 0, &[(0, GREEN_SQUARE)]).unwrap();
        let mut engine = PlayEngine::new(puzzle, 40);

        assert_eq!(
            engine.tick(Duration::from_secs(44)),
            TickOutcome::Running {
                remaining: Duration::from_secs(1)
            }
        );
        assert_eq!(engine.tick(Duration::from_secs(1)), TickOutcome::TimedOut);
        assert_eq!(engine.state(), EngineState::Failed);
        assert_eq!(engine.timer(), None);
        assert_eq!(engine.tick(TICK_INTERVAL), TickOutcome::Idle);
        assert_eq!(engine.score(), 40);
    }

    #[test]
    fn winning_stops_the_clock() {
        let puzzle = Puzzle::from_lit_cells(100, LEVEL_TABLE[0], 0, &[(0, GREEN_SQUARE)]).unwrap();
        let mut engine = PlayEngine::new(puzzle, 0);
        assert!(engine.timer().is_some());

        engine.tap(1, GREEN_SQUARE).unwrap();

        assert_eq!(engine.timer(), None);
        assert_eq!(engine.tick(Duration::from_secs(60)), TickOutcome::Idle);
        assert_eq!(engine.state(), EngineState::Won);
    }

    #[test]
    fn untimed_levels_never_tick() {
        let mut engine = first_level();
        assert_eq!(engine.tick(Duration::from_secs(3600)), TickOutcome::Idle);
        assert_eq!(engine.state(), EngineState::Playing);
    }
}
