use core::time::Duration;
use serde::{Deserialize, Serialize};

use crate::*;

/// How often the UI is expected to tick a running level timer.
pub const TICK_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerUrgency {
    Calm,
    Warning,
    Danger,
}

/// Countdown of a timed level.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelTimer {
    total: Duration,
    remaining: Duration,
}

impl LevelTimer {
    pub fn new(total: Duration) -> Self {
        Self {
            total,
            remaining: total,
        }
    }

    pub fn for_level(level: Level) -> Option<Self> {
        timer_duration(level).map(Self::new)
    }

    pub fn total(&self) -> Duration {
        self.total
    }

    pub fn remaining(&self) -> Duration {
        self.remaining
    }

    pub fn is_expired(&self) -> bool {
        self.remaining.is_zero()
    }

    /// Advances the countdown, returns `true` once it ran out.
    pub fn tick(&mut self, delta: Duration) -> bool {
        self.remaining = self.remaining.saturating_sub(delta);
        self.is_expired()
    }

    /// Remaining share of the total time in `0.0..=1.0`.
    pub fn fraction_remaining(&self) -> f32 {
        if self.total.is_zero() {
            return 0.0;
        }
        self.remaining.as_secs_f32() / self.total.as_secs_f32()
    }

    pub fn urgency(&self) -> TimerUrgency {
        if self.total.is_zero() {
            return TimerUrgency::Danger;
        }
        let percent = self.remaining.as_millis() * 100 / self.total.as_millis().max(1);
        match percent {
            ..30 => TimerUrgency::Danger,
            30..50 => TimerUrgency::Warning,
            _ => TimerUrgency::Calm,
        }
    }
}
