use alloc::vec::Vec;
use core::time::Duration;
use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::*;

/// Counts generated puzzles; ticks from a timer started for an older puzzle carry an older epoch.
pub type Epoch = u64;

/// Identifies the board a UI event was produced against.
///
/// The epoch changes with every new puzzle and the revision with every applied tap, so a repeated delivery of the
/// same UI event no longer matches and is dropped.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoardVersion {
    pub epoch: Epoch,
    pub revision: u32,
}

/// Side effects the UI shell has to carry out, in queue order.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    /// Start ticking every [`TICK_INTERVAL`], stamping ticks with `epoch`.
    StartTimer { epoch: Epoch, total: Duration },
    /// Cancel the running timer, no further ticks may be delivered.
    StopTimer,
    SaveProgress(Progress),
    ResetProgress,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    Playing,
    /// The level was solved, waiting for [`Session::advance`].
    Celebrating { points: Score },
    /// Interstitial before the milestone level, waiting for [`Session::dismiss_milestone`].
    Milestone(&'static Milestone),
    /// The timer ran out, waiting for [`Session::advance`] to retry the level.
    TimedOut,
}

impl SessionPhase {
    pub const fn is_playing(self) -> bool {
        matches!(self, Self::Playing)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Dispatch<T> {
    Applied(T),
    /// The event was produced for a board that no longer exists and was ignored.
    Stale,
}

impl<T> Dispatch<T> {
    pub fn applied(self) -> Option<T> {
        match self {
            Self::Applied(value) => Some(value),
            Self::Stale => None,
        }
    }
}

/// Owns the game across levels: the current engine, the random source, the palette selection and the queue of
/// effects for the UI shell.
#[derive(Clone, Debug)]
pub struct Session {
    engine: PlayEngine,
    rng: SmallRng,
    selection: Selection,
    version: BoardVersion,
    phase: SessionPhase,
    timer_running: bool,
    effects: Vec<Effect>,
}

impl Session {
    /// Starts playing `progress.level` with `progress.score`.
    pub fn new(progress: Progress, seed: u64) -> Self {
        let progress = progress.sanitized();
        let mut rng = SmallRng::seed_from_u64(seed);
        let engine = Self::generate(&mut rng, progress);
        let mut session = Self {
            engine,
            rng,
            selection: Selection::default(),
            version: BoardVersion::default(),
            phase: SessionPhase::Playing,
            timer_running: false,
            effects: Vec::new(),
        };
        session.on_level_start();
        session
    }

    pub fn engine(&self) -> &PlayEngine {
        &self.engine
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn version(&self) -> BoardVersion {
        self.version
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn progress(&self) -> Progress {
        self.engine.progress()
    }

    pub fn is_timer_running(&self) -> bool {
        self.timer_running
    }

    /// Takes all queued effects.
    pub fn drain_effects(&mut self) -> Vec<Effect> {
        core::mem::take(&mut self.effects)
    }

    pub fn select_shape(&mut self, shape: ShapeKind) -> Result<()> {
        self.select(Selection {
            shape,
            ..self.selection
        })
    }

    pub fn select_color(&mut self, color: ColorKind) -> Result<()> {
        self.select(Selection {
            color,
            ..self.selection
        })
    }

    fn select(&mut self, selection: Selection) -> Result<()> {
        if !self.engine.unlocks().allows(selection) {
            return Err(GameError::LockedSelection);
        }
        self.selection = selection;
        Ok(())
    }

    /// Taps the player cell at `index` with the current selection.
    ///
    /// Taps stamped with an outdated `version` are ignored, which makes duplicate deliveries of one UI event
    /// harmless.
    pub fn tap(&mut self, version: BoardVersion, index: CellIndex) -> Result<Dispatch<TapOutcome>> {
        if version != self.version {
            log::debug!("Dropping stale tap on {} ({:?})", index, version);
            return Ok(Dispatch::Stale);
        }

        let outcome = self.engine.tap(index, self.selection)?;
        self.version.revision = self.version.revision.wrapping_add(1);

        if let Some(points) = outcome.points {
            self.stop_timer();
            self.phase = SessionPhase::Celebrating { points };
            self.effects.push(Effect::SaveProgress(self.engine.progress()));
        }
        Ok(Dispatch::Applied(outcome))
    }

    /// Advances the level timer; ticks from a timer of an earlier puzzle are ignored.
    pub fn tick(&mut self, epoch: Epoch, delta: Duration) -> Dispatch<TickOutcome> {
        if epoch != self.version.epoch || !self.timer_running {
            return Dispatch::Stale;
        }

        let outcome = self.engine.tick(delta);
        if outcome == TickOutcome::TimedOut {
            self.stop_timer();
            self.phase = SessionPhase::TimedOut;
        }
        Dispatch::Applied(outcome)
    }

    /// Moves on once the UI finished showing a win or a timeout.
    ///
    /// A win continues with the milestone interstitial when the next level is a milestone, or with the next level.
    /// A timeout regenerates the same level.
    pub fn advance(&mut self) -> SessionPhase {
        match self.phase {
            SessionPhase::Celebrating { .. } => {
                let next = self.engine.level().saturating_add(1);
                match milestone_for(next) {
                    Some(milestone) => self.phase = SessionPhase::Milestone(milestone),
                    None => self.start_level(Progress::new(next, self.engine.score())),
                }
            }
            SessionPhase::TimedOut => self.start_level(self.engine.progress()),
            SessionPhase::Playing | SessionPhase::Milestone(_) => {}
        }
        self.phase
    }

    /// Closes the milestone interstitial and starts the milestone level.
    pub fn dismiss_milestone(&mut self) -> SessionPhase {
        if let SessionPhase::Milestone(milestone) = self.phase {
            self.start_level(Progress::new(milestone.level, self.engine.score()));
        }
        self.phase
    }

    /// Drops all progress and starts over from level 1.
    pub fn reset(&mut self) {
        self.effects.push(Effect::ResetProgress);
        self.start_level(Progress::INITIAL);
    }

    fn start_level(&mut self, progress: Progress) {
        self.stop_timer();
        self.engine = Self::generate(&mut self.rng, progress);
        self.version = BoardVersion {
            epoch: self.version.epoch.wrapping_add(1),
            revision: 0,
        };
        self.selection = Selection::default();
        self.phase = SessionPhase::Playing;
        self.on_level_start();
    }

    fn on_level_start(&mut self) {
        let config = self.engine.config();
        log::debug!(
            "Level {} ({}): {}x{} {:?}, {} lit",
            self.engine.level(),
            config.phase.label(),
            config.rows,
            config.cols,
            config.axis,
            self.engine.puzzle().lit_count()
        );

        if let Some(timer) = self.engine.timer() {
            self.effects.push(Effect::StartTimer {
                epoch: self.version.epoch,
                total: timer.total(),
            });
            self.timer_running = true;
        }
    }

    fn stop_timer(&mut self) {
        if self.timer_running {
            self.effects.push(Effect::StopTimer);
            self.timer_running = false;
        }
    }

    fn generate(rng: &mut SmallRng, progress: Progress) -> PlayEngine {
        let puzzle = RandomPuzzleGenerator::new(rng.next_u64()).generate(progress.level);
        PlayEngine::new(puzzle, progress.score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Taps every mirror target of the current puzzle with the pattern's shape and color.
    fn solve(session: &mut Session) -> Option<TapOutcome> {
        let puzzle = session.engine().puzzle().clone();
        let mut last = None;
        for index in puzzle.lit_indices() {
            let cell = puzzle.pattern_cell(index).unwrap();
            let target = puzzle.mirror().mirror_index(index).unwrap();
            session.select_shape(cell.shape).unwrap();
            session.select_color(cell.color).unwrap();
            last = session.tap(session.version(), target).unwrap().applied();
        }
        last
    }

    #[test]
    fn new_session_starts_at_the_saved_level() {
        let session = Session::new(Progress::new(12, 99), 1);
        assert_eq!(session.engine().level(), 12);
        assert_eq!(session.engine().score(), 99);
        assert_eq!(session.phase(), SessionPhase::Playing);
    }

    #[test]
    fn solving_saves_the_won_level_and_advances() {
        let mut session = Session::new(Progress::new(3, 0), 5);
        session.drain_effects();

        let outcome = solve(&mut session).unwrap();
        assert_eq!(outcome.points, Some(points_for(3)));
        assert_eq!(
            session.phase(),
            SessionPhase::Celebrating {
                points: points_for(3)
            }
        );
        assert_eq!(
            session.drain_effects(),
            [Effect::SaveProgress(Progress::new(3, points_for(3)))]
        );

        assert_eq!(session.advance(), SessionPhase::Playing);
        assert_eq!(session.engine().level(), 4);
        assert_eq!(session.engine().score(), points_for(3));
    }

    #[test]
    fn winning_the_last_level_does_not_overflow() {
        let mut session = Session::new(Progress::new(Level::MAX, 0), 5);
        session.drain_effects();

        solve(&mut session).unwrap();
        assert!(matches!(
            session.drain_effects().as_slice(),
            [Effect::StopTimer, Effect::SaveProgress(Progress { level: Level::MAX, .. })]
        ));

        assert_eq!(session.advance(), SessionPhase::Playing);
        assert_eq!(session.engine().level(), Level::MAX);
    }

    #[test]
    fn milestones_pause_before_the_next_level() {
        let mut session = Session::new(Progress::new(9, 0), 5);
        solve(&mut session).unwrap();

        let phase = session.advance();
        assert_eq!(phase, SessionPhase::Milestone(milestone_for(10).unwrap()));
        assert_eq!(session.engine().level(), 9);

        // advancing again does not skip the interstitial
        assert_eq!(session.advance(), phase);

        assert_eq!(session.dismiss_milestone(), SessionPhase::Playing);
        assert_eq!(session.engine().level(), 10);
    }

    #[test]
    fn duplicate_taps_are_stale() {
        let mut session = Session::new(Progress::INITIAL, 9);
        let version = session.version();

        let first = session.tap(version, 0).unwrap();
        let second = session.tap(version, 0).unwrap();

        assert!(matches!(first, Dispatch::Applied(_)));
        assert_eq!(second, Dispatch::Stale);
        assert_eq!(session.engine().player_cell(0).map(|cell| cell.on), Some(true));
    }

    #[test]
    fn invalid_taps_do_not_bump_the_version() {
        let mut session = Session::new(Progress::INITIAL, 9);
        let version = session.version();

        assert_eq!(session.tap(version, 100), Err(GameError::InvalidIndex));
        assert_eq!(session.version(), version);
    }

    #[test]
    fn locked_kinds_cannot_be_selected() {
        let mut session = Session::new(Progress::INITIAL, 9);
        assert_eq!(session.select_shape(ShapeKind::Circle), Err(GameError::LockedSelection));
        assert_eq!(session.select_color(ColorKind::Purple), Err(GameError::LockedSelection));
        assert_eq!(session.selection(), Selection::default());

        let mut session = Session::new(Progress::new(300, 0), 9);
        session.select_shape(ShapeKind::Star).unwrap();
        session.select_color(ColorKind::Orange).unwrap();
        assert_eq!(
            session.selection(),
            Selection::new(ShapeKind::Star, ColorKind::Orange)
        );
    }

    #[test]
    fn timed_levels_start_and_stop_the_timer() {
        let mut session = Session::new(Progress::new(120, 0), 3);
        let epoch = session.version().epoch;
        assert_eq!(
            session.drain_effects(),
            [Effect::StartTimer {
                epoch,
                total: Duration::from_secs(45)
            }]
        );

        solve(&mut session).unwrap();
        let effects = session.drain_effects();
        assert_eq!(effects[0], Effect::StopTimer);
        assert!(matches!(effects[1], Effect::SaveProgress(_)));
        assert!(!session.is_timer_running());
    }

    #[test]
    fn timeout_retries_the_same_level() {
        let mut session = Session::new(Progress::new(140, 77), 3);
        let epoch = session.version().epoch;
        session.drain_effects();

        assert_eq!(
            session.tick(epoch, Duration::from_secs(40)),
            Dispatch::Applied(TickOutcome::TimedOut)
        );
        assert_eq!(session.phase(), SessionPhase::TimedOut);
        assert_eq!(session.drain_effects(), [Effect::StopTimer]);

        // a tick that was already queued when the timer stopped
        assert_eq!(session.tick(epoch, TICK_INTERVAL), Dispatch::Stale);

        assert_eq!(session.advance(), SessionPhase::Playing);
        assert_eq!(session.engine().level(), 140);
        assert_eq!(session.engine().score(), 77);
        assert_ne!(session.version().epoch, epoch);
        assert!(matches!(
            session.drain_effects().as_slice(),
            [Effect::StartTimer { .. }]
        ));
    }

    #[test]
    fn ticks_from_an_old_puzzle_are_stale() {
        let mut session = Session::new(Progress::new(140, 0), 3);
        let old_epoch = session.version().epoch;
        session.reset();

        assert_eq!(session.tick(old_epoch, TICK_INTERVAL), Dispatch::Stale);
    }

    #[test]
    fn reset_starts_over_and_stops_the_timer_first() {
        let mut session = Session::new(Progress::new(140, 500), 3);
        session.drain_effects();

        session.reset();

        assert_eq!(
            session.drain_effects(),
            [Effect::ResetProgress, Effect::StopTimer]
        );
        assert_eq!(session.progress(), Progress::INITIAL);
        assert_eq!(session.phase(), SessionPhase::Playing);
    }

    #[test]
    fn selection_resets_on_a_new_level() {
        let mut session = Session::new(Progress::new(150, 0), 11);
        session.select_shape(ShapeKind::Circle).unwrap();
        session.reset();
        assert_eq!(session.selection(), Selection::default());
    }
}
