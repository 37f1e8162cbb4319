//! Multi-strip transition scheduler and frame loop.
//!
//! Provides [`Scheduler`], which owns the strips and the transition pool.
//! Requests schedule per-channel ramps; [`Scheduler::update`] advances them
//! at a bounded frame rate and flushes each changed strip once per frame.

use crate::DEFAULT_FRAME_INTERVAL_MS;
use crate::pool::{Allocation, TransitionPool};
use crate::strip::LedStrip;
use crate::time::{TimeDuration, TimeInstant};
use crate::transition::Transition;
use crate::types::{ChannelTargets, CommandError, TransitionKey};

/// Runtime settings for a [`Scheduler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig<D: TimeDuration> {
    /// Minimum time between two frames.
    pub frame_interval: D,
}

impl<D: TimeDuration> Default for SchedulerConfig<D> {
    fn default() -> Self {
        Self {
            frame_interval: D::from_millis(DEFAULT_FRAME_INTERVAL_MS),
        }
    }
}

/// What one frame did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameStats {
    /// Active transitions evaluated this frame.
    pub advanced: usize,
    /// Transitions that reached their target this frame.
    pub completed: usize,
    /// Strips flushed to hardware this frame.
    pub flushed: usize,
}

/// Result of [`Scheduler::update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameOutcome {
    /// Less than one frame interval since the previous frame; nothing ran.
    Throttled,
    /// A frame ran.
    Rendered(FrameStats),
}

/// Schedules linear channel transitions across a set of strips.
///
/// The scheduler is the single owner of both the strips and the transition
/// pool, so it is driven from one loop and needs no locking.
///
/// # Type Parameters
/// * `I` - Time instant type
/// * `S` - Strip implementation type (same for all strips)
/// * `STRIPS` - Number of strips
/// * `SLOTS` - Number of transition slots
pub struct Scheduler<I: TimeInstant, S: LedStrip, const STRIPS: usize, const SLOTS: usize> {
    strips: [S; STRIPS],
    pool: TransitionPool<I, SLOTS>,
    config: SchedulerConfig<I::Duration>,
    last_frame: Option<I>,
}

impl<I, S, const STRIPS: usize, const SLOTS: usize> Scheduler<I, S, STRIPS, SLOTS>
where
    I: TimeInstant,
    S: LedStrip,
{
    /// Creates a scheduler with the default frame interval.
    pub fn new(strips: [S; STRIPS]) -> Self {
        Self::with_config(strips, SchedulerConfig::default())
    }

    /// Creates a scheduler with custom settings.
    pub fn with_config(strips: [S; STRIPS], config: SchedulerConfig<I::Duration>) -> Self {
        Self {
            strips,
            pool: TransitionPool::new(),
            config,
            last_frame: None,
        }
    }

    /// Schedules ramps for the channels of one pixel.
    ///
    /// Each targeted channel starts from its current buffered value and
    /// reaches its target after `duration`. Skipped channels keep their
    /// state, including any transition already running on them.
    ///
    /// # Returns
    /// The number of channels scheduled.
    ///
    /// # Errors
    /// * `StripOutOfRange` / `PixelOutOfRange` - nothing is scheduled
    /// * `NoTransitionSlots` - the pool has zero capacity
    pub fn lerp_led(
        &mut self,
        now: I,
        strip: usize,
        pixel: usize,
        targets: ChannelTargets,
        duration: I::Duration,
    ) -> Result<usize, CommandError> {
        self.check_pixel(strip, pixel)?;

        let mut scheduled = 0;
        for (channel, target) in targets.iter() {
            self.lerp_channel(now, TransitionKey::new(strip, pixel, channel), target, duration)?;
            scheduled += 1;
        }
        Ok(scheduled)
    }

    /// Schedules a ramp for a single channel.
    ///
    /// # Errors
    /// Same as [`lerp_led`](Self::lerp_led).
    pub fn lerp_channel(
        &mut self,
        now: I,
        key: TransitionKey,
        target: u8,
        duration: I::Duration,
    ) -> Result<Allocation, CommandError> {
        let current = self.check_pixel(key.strip, key.pixel)?.channel_value(key.pixel, key.channel);

        let allocation = self
            .pool
            .allocate(key, current, target, duration, now)
            .ok_or(CommandError::NoTransitionSlots)?;

        trace!(
            "lerp strip {=usize} pixel {=usize} channel {} {=u8} -> {=u8} in {=u64}ms",
            key.strip,
            key.pixel,
            key.channel,
            current,
            target,
            duration.as_millis()
        );
        Ok(allocation)
    }

    /// Sets a strip's global brightness and flushes it immediately.
    ///
    /// # Errors
    /// `StripOutOfRange` if the strip does not exist.
    pub fn set_brightness(&mut self, strip: usize, brightness: u8) -> Result<(), CommandError> {
        let target = self.strip_checked(strip)?;
        target.set_brightness(brightness);
        target.show();
        Ok(())
    }

    /// Runs a frame if at least one frame interval has passed since the
    /// previous one.
    pub fn update(&mut self, now: I) -> FrameOutcome {
        if let Some(last) = self.last_frame {
            let since_last = now.duration_since(last).as_millis();
            if since_last < self.config.frame_interval.as_millis() {
                return FrameOutcome::Throttled;
            }
        }

        self.last_frame = Some(now);
        FrameOutcome::Rendered(self.render_frame(now))
    }

    /// Runs a frame unconditionally.
    ///
    /// Every active transition writes its interpolated value into its
    /// strip's buffer. Each strip with at least one changed pixel is then
    /// flushed exactly once, however many channels changed on it.
    pub fn render_frame(&mut self, now: I) -> FrameStats {
        let mut dirty = [false; STRIPS];
        let strips = &mut self.strips;

        let advance = self.pool.advance(now, |transition, value| {
            let key = transition.key;
            let Some(strip) = strips.get_mut(key.strip) else {
                return;
            };

            let current = strip.pixel(key.pixel);
            let next = current.with_channel(key.channel, value);
            if next != current {
                strip.set_pixel(key.pixel, next);
                if let Some(flag) = dirty.get_mut(key.strip) {
                    *flag = true;
                }
            }
        });

        let mut flushed = 0;
        for (strip, dirty) in self.strips.iter_mut().zip(dirty) {
            if dirty {
                strip.show();
                flushed += 1;
            }
        }

        let stats = FrameStats {
            advanced: advance.advanced,
            completed: advance.completed,
            flushed,
        };
        if stats.advanced > 0 {
            trace!(
                "frame: {=usize} advanced, {=usize} completed, {=usize} flushed",
                stats.advanced,
                stats.completed,
                stats.flushed
            );
        }
        stats
    }

    /// Time until the next frame is due.
    ///
    /// # Returns
    /// * `Some(Duration::ZERO)` - a frame is due now
    /// * `Some(duration)` - sleep at most this long before calling
    ///   [`update`](Self::update) again
    /// * `None` - no transition is active; nothing to do until a new request
    pub fn next_frame_in(&self, now: I) -> Option<I::Duration> {
        if self.pool.is_idle() {
            return None;
        }

        match self.last_frame {
            None => Some(I::Duration::ZERO),
            Some(last) => Some(
                self.config
                    .frame_interval
                    .saturating_sub(now.duration_since(last)),
            ),
        }
    }

    /// Returns the active transition for `key`, if any.
    pub fn transition_for(&self, key: TransitionKey) -> Option<&Transition<I>> {
        self.pool.get(key)
    }

    /// Number of active transitions.
    pub fn active_count(&self) -> usize {
        self.pool.active_count()
    }

    /// Returns the transition pool.
    pub fn pool(&self) -> &TransitionPool<I, SLOTS> {
        &self.pool
    }

    /// Returns the scheduler settings.
    pub fn config(&self) -> &SchedulerConfig<I::Duration> {
        &self.config
    }

    /// Returns a strip by id.
    pub fn strip(&self, id: usize) -> Option<&S> {
        self.strips.get(id)
    }

    /// Returns a strip by id for direct manipulation.
    ///
    /// Writes made here are picked up as the start value of the next
    /// request for the affected channels.
    pub fn strip_mut(&mut self, id: usize) -> Option<&mut S> {
        self.strips.get_mut(id)
    }

    /// Drops every transition. Strips keep their current buffers.
    pub fn cancel_all(&mut self) {
        self.pool.clear();
    }

    fn strip_checked(&mut self, strip: usize) -> Result<&mut S, CommandError> {
        self.strips
            .get_mut(strip)
            .ok_or(CommandError::StripOutOfRange {
                strip,
                count: STRIPS,
            })
    }

    fn check_pixel(&mut self, strip: usize, pixel: usize) -> Result<&mut S, CommandError> {
        let target = self.strip_checked(strip)?;
        let count = target.pixel_count();
        if pixel >= count {
            return Err(CommandError::PixelOutOfRange { pixel, count });
        }
        Ok(target)
    }
}
