#![cfg_attr(not(feature = "std"), no_std)]
#![doc = include_str!("../README.md")]

//! # Core Concepts
//!
//! - **`LedStrip`**: Trait to implement for your strip driver (pixel buffer + flush)
//! - **`TimeSource`**: Trait to implement for your timing system
//! - **`Transition`**: A linear ramp of one channel of one pixel
//! - **`TransitionPool`**: Fixed set of slots, at most one transition per (strip, pixel, channel)
//! - **`Scheduler`**: Owns strips and pool; schedules ramps and runs throttled frames
//! - **`LineBuffer`** / **`Command`**: Newline framing and tokenizing of the text protocol
//! - **`Firmware`**: One cooperative loop iteration: serial byte, peripherals, frame
//!
//! Channel values are 8-bit. Interpolation is linear in time and truncated
//! on write.

#[macro_use]
mod fmt;

pub mod command;
pub mod firmware;
pub mod line;
pub mod peripheral;
pub mod pool;
pub mod scheduler;
pub mod strip;
pub mod time;
pub mod transition;
pub mod types;

pub use command::{Command, LerpRequest, Request, lenient_int};
pub use firmware::{Firmware, FirmwareError, TickOutcome};
pub use line::{Line, LineBuffer};
pub use peripheral::{Button, ButtonConfig, Peripheral};
pub use pool::{AdvanceStats, Allocation, TransitionPool};
pub use scheduler::{FrameOutcome, FrameStats, Scheduler, SchedulerConfig};
pub use strip::LedStrip;
pub use time::{TimeDuration, TimeInstant, TimeSource};
pub use transition::Transition;
pub use types::{Channel, ChannelTargets, CommandError, PixelColor, SKIP_CHANNEL, TransitionKey};

/// Default minimum time between two frames (about 60 FPS).
pub const DEFAULT_FRAME_INTERVAL_MS: u64 = 16;

/// Default serial line buffer capacity.
pub const DEFAULT_LINE_CAPACITY: usize = 64;

/// Maximum number of parameter tokens kept per command.
pub const MAX_PARAMS: usize = 8;
