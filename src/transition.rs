//! A single linear ramp of one channel.

use crate::time::{TimeDuration, TimeInstant};
use crate::types::TransitionKey;

/// One slot's worth of scheduled work.
///
/// A transition ramps the channel named by its [`TransitionKey`] from
/// `start_value` to `target_value` over `duration`, starting at
/// `start_time`.
#[derive(Debug, Clone, Copy)]
pub struct Transition<I: TimeInstant> {
    pub key: TransitionKey,
    pub start_value: u8,
    pub target_value: u8,
    pub start_time: I,
    pub duration: I::Duration,
}

impl<I: TimeInstant> Transition<I> {
    /// Creates a transition starting at `start_time`.
    pub fn new(
        key: TransitionKey,
        start_value: u8,
        target_value: u8,
        start_time: I,
        duration: I::Duration,
    ) -> Self {
        Self {
            key,
            start_value,
            target_value,
            start_time,
            duration,
        }
    }

    /// Fraction of the ramp covered at `now`, clamped to `0.0..=1.0`.
    ///
    /// Zero-length transitions are always complete.
    pub fn progress(&self, now: I) -> f32 {
        let duration_millis = self.duration.as_millis();
        if duration_millis == 0 {
            return 1.0;
        }

        let elapsed_millis = now.duration_since(self.start_time).as_millis();
        let progress = (elapsed_millis as f32) / (duration_millis as f32);
        progress.clamp(0.0, 1.0)
    }

    /// Channel value at `now`, truncated toward zero.
    pub fn value_at(&self, now: I) -> u8 {
        self.value_for_progress(self.progress(now))
    }

    /// Channel value for a given progress.
    pub fn value_for_progress(&self, progress: f32) -> u8 {
        if progress >= 1.0 {
            return self.target_value;
        }

        let start = f32::from(self.start_value);
        let delta = f32::from(self.target_value) - start;
        // `as` truncates and saturates, which is the intended rounding
        (start + delta * progress) as u8
    }

    /// Returns true once the ramp has reached its target.
    pub fn is_complete(&self, now: I) -> bool {
        self.progress(now) >= 1.0
    }

    /// Time since the transition (re)started.
    pub fn age(&self, now: I) -> I::Duration {
        now.duration_since(self.start_time)
    }
}
