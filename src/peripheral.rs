//! Peripherals polled from the main loop alongside the scheduler.

use embedded_hal::digital::InputPin;

use crate::time::{TimeDuration, TimeInstant};

/// Default debounce time for [`Button`].
pub const DEFAULT_DEBOUNCE_MS: u64 = 50;

/// Something the main loop polls once per iteration.
///
/// Implementations must return quickly: the loop is cooperative and any
/// time spent here delays serial input and frames.
pub trait Peripheral<I: TimeInstant> {
    /// Samples the peripheral.
    fn poll(&mut self, now: I);
}

impl<I: TimeInstant> Peripheral<I> for () {
    fn poll(&mut self, _now: I) {}
}

impl<I: TimeInstant, P: Peripheral<I> + ?Sized> Peripheral<I> for &mut P {
    fn poll(&mut self, now: I) {
        (**self).poll(now);
    }
}

impl<I: TimeInstant, A: Peripheral<I>, B: Peripheral<I>> Peripheral<I> for (A, B) {
    fn poll(&mut self, now: I) {
        self.0.poll(now);
        self.1.poll(now);
    }
}

/// Settings for a [`Button`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonConfig<D: TimeDuration> {
    /// How long the input must hold a new level before it is accepted.
    pub debounce: D,
    /// The button pulls the pin low when pressed.
    pub active_low: bool,
}

impl<D: TimeDuration> Default for ButtonConfig<D> {
    fn default() -> Self {
        Self {
            debounce: D::from_millis(DEFAULT_DEBOUNCE_MS),
            active_low: true,
        }
    }
}

/// A debounced push button.
///
/// Counts confirmed presses so the application can consume them with
/// [`take_press`](Button::take_press) at its own pace. Pin read errors are
/// treated as "no sample".
pub struct Button<P: InputPin, I: TimeInstant> {
    pin: P,
    config: ButtonConfig<I::Duration>,
    pressed: bool,
    candidate: bool,
    candidate_since: Option<I>,
    presses: u32,
}

impl<P: InputPin, I: TimeInstant> Button<P, I> {
    /// Creates a button with the default debounce time.
    pub fn new(pin: P) -> Self {
        Self::with_config(pin, ButtonConfig::default())
    }

    /// Creates a button with custom settings.
    pub fn with_config(pin: P, config: ButtonConfig<I::Duration>) -> Self {
        Self {
            pin,
            config,
            pressed: false,
            candidate: false,
            candidate_since: None,
            presses: 0,
        }
    }

    /// Returns the debounced state.
    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    /// Number of presses not yet consumed.
    pub fn pending_presses(&self) -> u32 {
        self.presses
    }

    /// Consumes one press, if any.
    pub fn take_press(&mut self) -> bool {
        if self.presses == 0 {
            return false;
        }
        self.presses -= 1;
        true
    }

    /// Releases the pin.
    pub fn release(self) -> P {
        self.pin
    }

    fn sample(&mut self) -> Option<bool> {
        let level = if self.config.active_low {
            self.pin.is_low()
        } else {
            self.pin.is_high()
        };
        level.ok()
    }
}

impl<P: InputPin, I: TimeInstant> Peripheral<I> for Button<P, I> {
    fn poll(&mut self, now: I) {
        let Some(level) = self.sample() else {
            return;
        };

        if level != self.candidate {
            self.candidate = level;
            self.candidate_since = Some(now);
            return;
        }

        if self.candidate == self.pressed {
            return;
        }

        let settled = self.candidate_since.is_none_or(|since| {
            now.duration_since(since).as_millis() >= self.config.debounce.as_millis()
        });
        if settled {
            self.pressed = self.candidate;
            if self.pressed {
                self.presses = self.presses.saturating_add(1);
                debug!("button pressed");
            }
        }
    }
}
