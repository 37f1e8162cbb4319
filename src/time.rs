//! Time abstraction traits for platform-agnostic timing.
//!
//! The wire protocol speaks milliseconds, so durations only need to round
//! trip through `u64` milliseconds. Enable the `embassy-time` feature to use
//! `embassy_time::Instant` directly.

/// Trait for abstracting time sources.
pub trait TimeSource<I: TimeInstant> {
    /// Returns the current monotonic time instant.
    fn now(&self) -> I;
}

/// Trait abstraction for duration types.
pub trait TimeDuration: Copy + PartialEq {
    /// Zero duration constant.
    const ZERO: Self;

    /// Converts duration to milliseconds.
    fn as_millis(&self) -> u64;

    /// Creates duration from milliseconds.
    fn from_millis(millis: u64) -> Self;

    /// Saturating subtraction (returns ZERO on underflow).
    fn saturating_sub(self, other: Self) -> Self;
}

/// Trait abstraction for instant types.
pub trait TimeInstant: Copy {
    /// Duration type for this instant.
    type Duration: TimeDuration;

    /// Calculates duration since an earlier instant.
    ///
    /// Implementations should saturate to zero when `earlier` is later than
    /// `self`.
    fn duration_since(&self, earlier: Self) -> Self::Duration;
}

#[cfg(feature = "embassy-time")]
mod embassy {
    use super::{TimeDuration, TimeInstant};
    use embassy_time::{Duration, Instant};

    impl TimeDuration for Duration {
        const ZERO: Self = Duration::from_ticks(0);

        fn as_millis(&self) -> u64 {
            Duration::as_millis(self)
        }

        fn from_millis(millis: u64) -> Self {
            Duration::from_millis(millis)
        }

        fn saturating_sub(self, other: Self) -> Self {
            self.checked_sub(other).unwrap_or(Self::ZERO)
        }
    }

    impl TimeInstant for Instant {
        type Duration = Duration;

        fn duration_since(&self, earlier: Self) -> Self::Duration {
            self.checked_duration_since(earlier)
                .unwrap_or(Duration::from_ticks(0))
        }
    }
}
