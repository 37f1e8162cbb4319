//! Shared test infrastructure for lerp-led integration tests

#![allow(dead_code)] // Items used across multiple test files; Rust analyzes per-file

use std::collections::VecDeque;
use std::convert::Infallible;

use lerp_led::{LedStrip, PixelColor, TimeDuration, TimeInstant, TimeSource};

// ============================================================================
// Mock Time Types
// ============================================================================

/// Mock duration type for testing (wraps milliseconds)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TestDuration(pub u64);

impl TimeDuration for TestDuration {
    const ZERO: Self = TestDuration(0);

    fn as_millis(&self) -> u64 {
        self.0
    }

    fn from_millis(millis: u64) -> Self {
        TestDuration(millis)
    }

    fn saturating_sub(self, other: Self) -> Self {
        TestDuration(self.0.saturating_sub(other.0))
    }
}

/// Mock instant type for testing
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TestInstant(pub u64);

impl TimeInstant for TestInstant {
    type Duration = TestDuration;

    fn duration_since(&self, earlier: Self) -> Self::Duration {
        TestDuration(self.0.saturating_sub(earlier.0))
    }
}

// ============================================================================
// Mock Time Source
// ============================================================================

/// Mock time source with controllable time advancement
pub struct MockTimeSource {
    current_time: core::cell::Cell<TestInstant>,
}

impl MockTimeSource {
    pub fn new() -> Self {
        Self {
            current_time: core::cell::Cell::new(TestInstant(0)),
        }
    }

    /// Advance time by the given number of milliseconds
    pub fn advance(&self, millis: u64) {
        let current = self.current_time.get();
        self.current_time.set(TestInstant(current.0 + millis));
    }

    pub fn set_time(&self, time: TestInstant) {
        self.current_time.set(time);
    }
}

impl TimeSource<TestInstant> for MockTimeSource {
    fn now(&self) -> TestInstant {
        self.current_time.get()
    }
}

// ============================================================================
// Mock Strip
// ============================================================================

/// Strip that records every flush
pub struct MockStrip {
    pixels: Vec<PixelColor>,
    brightness: u8,
    shows: usize,
    flushed_frames: Vec<Vec<PixelColor>>,
}

impl MockStrip {
    pub fn new(pixel_count: usize) -> Self {
        Self {
            pixels: vec![PixelColor::OFF; pixel_count],
            brightness: 255,
            shows: 0,
            flushed_frames: Vec::new(),
        }
    }

    pub fn show_count(&self) -> usize {
        self.shows
    }

    pub fn brightness(&self) -> u8 {
        self.brightness
    }

    pub fn last_flushed(&self) -> Option<&[PixelColor]> {
        self.flushed_frames.last().map(Vec::as_slice)
    }
}

impl LedStrip for MockStrip {
    fn pixel_count(&self) -> usize {
        self.pixels.len()
    }

    fn pixel(&self, index: usize) -> PixelColor {
        self.pixels.get(index).copied().unwrap_or(PixelColor::OFF)
    }

    fn set_pixel(&mut self, index: usize, color: PixelColor) {
        if let Some(pixel) = self.pixels.get_mut(index) {
            *pixel = color;
        }
    }

    fn set_brightness(&mut self, brightness: u8) {
        self.brightness = brightness;
    }

    fn show(&mut self) {
        self.shows += 1;
        self.flushed_frames.push(self.pixels.clone());
    }
}

// ============================================================================
// Mock Serial Link
// ============================================================================

/// Serial link fed from a byte queue, capturing everything written
pub struct MockSerial {
    input: VecDeque<u8>,
    output: Vec<u8>,
}

impl MockSerial {
    pub fn new() -> Self {
        Self {
            input: VecDeque::new(),
            output: Vec::new(),
        }
    }

    pub fn send(&mut self, bytes: &[u8]) {
        self.input.extend(bytes.iter().copied());
    }

    pub fn pending_input(&self) -> usize {
        self.input.len()
    }

    pub fn output_bytes(&self) -> &[u8] {
        &self.output
    }

    pub fn output(&self) -> &str {
        std::str::from_utf8(&self.output).expect("firmware wrote non-UTF-8")
    }

    pub fn output_lines(&self) -> Vec<&str> {
        self.output().lines().collect()
    }
}

impl embedded_io::ErrorType for MockSerial {
    type Error = Infallible;
}

impl embedded_io::Read for MockSerial {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let mut count = 0;
        for slot in buf.iter_mut() {
            let Some(byte) = self.input.pop_front() else {
                break;
            };
            *slot = byte;
            count += 1;
        }
        Ok(count)
    }
}

impl embedded_io::ReadReady for MockSerial {
    fn read_ready(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.input.is_empty())
    }
}

impl embedded_io::Write for MockSerial {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.output.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

// ============================================================================
// Mock Diagnostic Pin
// ============================================================================

/// Output pin that remembers its level and counts toggles
#[derive(Debug, Default)]
pub struct MockPin {
    high: bool,
    writes: usize,
}

impl MockPin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_high(&self) -> bool {
        self.high
    }

    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl embedded_hal::digital::ErrorType for MockPin {
    type Error = Infallible;
}

impl embedded_hal::digital::OutputPin for MockPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.high = false;
        self.writes += 1;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.high = true;
        self.writes += 1;
        Ok(())
    }
}

impl embedded_hal::digital::StatefulOutputPin for MockPin {
    fn is_set_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.high)
    }

    fn is_set_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.high)
    }
}

// ============================================================================
// Test Helper Functions
// ============================================================================

/// Milliseconds as a test duration
pub fn ms(millis: u64) -> TestDuration {
    TestDuration(millis)
}

/// Milliseconds as a test instant
pub fn at(millis: u64) -> TestInstant {
    TestInstant(millis)
}
