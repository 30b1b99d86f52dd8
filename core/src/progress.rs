use serde::{Deserialize, Serialize};

use crate::*;

/// The part of a session that survives level transitions and gets synced to the backend.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Progress {
    pub level: Level,
    pub score: Score,
}

impl Progress {
    pub const INITIAL: Self = Self { level: 1, score: 0 };

    pub const fn new(level: Level, score: Score) -> Self {
        Self { level, score }
    }

    /// Levels are 1-based, anything lower is treated as a fresh start on level 1.
    pub fn sanitized(self) -> Self {
        Self {
            level: self.level.max(1),
            ..self
        }
    }

    /// Startup progress: the backend copy wins, then the local snapshot, then a fresh start.
    pub fn resolve(remote: Option<Progress>, local: Option<Progress>) -> Self {
        remote
            .or(local)
            .map(Self::sanitized)
            .unwrap_or(Self::INITIAL)
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::INITIAL
    }
}

/// Progress backup kept in local storage for when the backend is unreachable.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalSnapshot {
    #[serde(default = "first_level")]
    pub level: Level,
    #[serde(default)]
    pub score: Score,
    /// Milliseconds since the unix epoch.
    #[serde(rename = "savedAt", default)]
    pub saved_at: u64,
}

const fn first_level() -> Level {
    1
}

impl LocalSnapshot {
    pub fn new(progress: Progress, saved_at: u64) -> Self {
        Self {
            level: progress.level,
            score: progress.score,
            saved_at,
        }
    }

    pub fn progress(&self) -> Progress {
        Progress::new(self.level, self.score).sanitized()
    }
}
