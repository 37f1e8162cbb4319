//! The cooperative main loop.
//!
//! [`Firmware`] ties the serial link, the command parser, the peripherals
//! and the [`Scheduler`] together. Each [`tick`](Firmware::tick) does a
//! bounded amount of work and never waits on input:
//!
//! 1. read at most one byte from the serial link, if one is ready
//! 2. on a completed line: parse, dispatch, then echo `ACK <line>` with
//!    the bytes exactly as received
//! 3. poll the peripherals
//! 4. run a frame if the frame interval has elapsed

use embedded_hal::digital::StatefulOutputPin;
use embedded_io::{Read, ReadReady, Write};

use crate::DEFAULT_LINE_CAPACITY;
use crate::command::{Command, Request};
use crate::line::LineBuffer;
use crate::peripheral::Peripheral;
use crate::scheduler::{FrameOutcome, Scheduler};
use crate::strip::LedStrip;
use crate::time::{TimeDuration, TimeInstant, TimeSource};
use crate::types::CommandError;

/// Prefix of every acknowledgment line.
pub const ACK_PREFIX: &[u8] = b"ACK ";

/// Errors that stop a loop iteration.
///
/// Only the serial link can fail a tick; command problems are reported in
/// [`TickOutcome::line`] and never on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FirmwareError<E> {
    /// Reading from or writing to the serial link failed.
    Serial(E),
}

impl<E: core::fmt::Debug> core::fmt::Display for FirmwareError<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            FirmwareError::Serial(err) => write!(f, "serial link error: {:?}", err),
        }
    }
}

#[cfg(feature = "std")]
impl<E: core::fmt::Debug> std::error::Error for FirmwareError<E> {}

/// What one loop iteration did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickOutcome {
    /// Set when a line was completed and acknowledged this tick, with the
    /// request it carried or why it had no effect.
    pub line: Option<Result<Request, CommandError>>,
    /// Whether a frame ran.
    pub frame: FrameOutcome,
}

/// Serial command endpoint driving a [`Scheduler`].
///
/// # Type Parameters
/// * `'t` - Lifetime of the time source reference
/// * `I` - Time instant type
/// * `T` - Time source implementation type
/// * `S` - Strip implementation type
/// * `U` - Serial link (`embedded_io` reader/writer)
/// * `D` - Diagnostic output pin toggled by `TEST`
/// * `STRIPS` - Number of strips
/// * `SLOTS` - Number of transition slots
/// * `LINE` - Serial line buffer capacity
pub struct Firmware<
    't,
    I,
    T,
    S,
    U,
    D,
    const STRIPS: usize,
    const SLOTS: usize,
    const LINE: usize = { DEFAULT_LINE_CAPACITY },
> where
    I: TimeInstant,
    T: TimeSource<I>,
    S: LedStrip,
{
    time_source: &'t T,
    scheduler: Scheduler<I, S, STRIPS, SLOTS>,
    serial: U,
    diagnostic: D,
    lines: LineBuffer<LINE>,
}

impl<'t, I, T, S, U, D, const STRIPS: usize, const SLOTS: usize, const LINE: usize>
    Firmware<'t, I, T, S, U, D, STRIPS, SLOTS, LINE>
where
    I: TimeInstant,
    T: TimeSource<I>,
    S: LedStrip,
    U: Read + ReadReady + Write,
    D: StatefulOutputPin,
{
    /// Creates the endpoint.
    pub fn new(
        time_source: &'t T,
        scheduler: Scheduler<I, S, STRIPS, SLOTS>,
        serial: U,
        diagnostic: D,
    ) -> Self {
        Self {
            time_source,
            scheduler,
            serial,
            diagnostic,
            lines: LineBuffer::new(),
        }
    }

    /// Runs one loop iteration with no extra peripherals.
    ///
    /// # Errors
    /// `Serial` if the serial link fails.
    pub fn tick(&mut self) -> Result<TickOutcome, FirmwareError<U::Error>> {
        self.tick_with(&mut ())
    }

    /// Runs one loop iteration, polling `peripherals` between serial input
    /// and the frame update.
    ///
    /// # Errors
    /// `Serial` if the serial link fails. The line in progress is kept, so
    /// the next tick resumes where this one stopped.
    pub fn tick_with<P: Peripheral<I>>(
        &mut self,
        peripherals: &mut P,
    ) -> Result<TickOutcome, FirmwareError<U::Error>> {
        let now = self.time_source.now();

        let line = self.poll_serial(now)?;
        peripherals.poll(now);
        let frame = self.scheduler.update(now);

        Ok(TickOutcome { line, frame })
    }

    /// Parses and executes one line.
    ///
    /// Does not acknowledge; the caller decides what goes on the wire.
    ///
    /// # Errors
    /// Why the line had no effect (unknown opcode, missing parameters,
    /// out-of-range indices, ...).
    pub fn handle_line(&mut self, now: I, line: &str) -> Result<Request, CommandError> {
        let request = Command::<LINE>::parse(line).request()?;
        self.dispatch(now, request)?;
        Ok(request)
    }

    /// Executes a decoded request.
    ///
    /// # Errors
    /// Same as [`handle_line`](Self::handle_line).
    pub fn dispatch(&mut self, now: I, request: Request) -> Result<(), CommandError> {
        match request {
            Request::LerpLed(lerp) => {
                self.scheduler.lerp_led(
                    now,
                    lerp.strip,
                    lerp.pixel,
                    lerp.targets,
                    I::Duration::from_millis(lerp.duration_ms),
                )?;
            }
            Request::SetBrightness { strip, brightness } => {
                self.scheduler.set_brightness(strip, brightness)?;
            }
            Request::Test => {
                self.diagnostic
                    .toggle()
                    .map_err(|_| CommandError::DiagnosticPin)?;
            }
        }
        Ok(())
    }

    /// Returns the scheduler.
    pub fn scheduler(&self) -> &Scheduler<I, S, STRIPS, SLOTS> {
        &self.scheduler
    }

    /// Returns the scheduler for direct control.
    pub fn scheduler_mut(&mut self) -> &mut Scheduler<I, S, STRIPS, SLOTS> {
        &mut self.scheduler
    }

    /// Returns the serial link.
    pub fn serial(&self) -> &U {
        &self.serial
    }

    /// Returns the serial link for direct access.
    pub fn serial_mut(&mut self) -> &mut U {
        &mut self.serial
    }

    /// Returns the diagnostic pin.
    pub fn diagnostic(&self) -> &D {
        &self.diagnostic
    }

    /// Takes the endpoint apart.
    pub fn release(self) -> (Scheduler<I, S, STRIPS, SLOTS>, U, D) {
        (self.scheduler, self.serial, self.diagnostic)
    }

    fn poll_serial(
        &mut self,
        now: I,
    ) -> Result<Option<Result<Request, CommandError>>, FirmwareError<U::Error>> {
        if !self.serial.read_ready().map_err(FirmwareError::Serial)? {
            return Ok(None);
        }

        let mut byte = [0u8; 1];
        if self.serial.read(&mut byte).map_err(FirmwareError::Serial)? == 0 {
            return Ok(None);
        }

        let Some(line) = self.lines.push(byte[0]) else {
            return Ok(None);
        };

        // undecodable bytes read as an unknown opcode, the line is still acked
        let text = core::str::from_utf8(&line).unwrap_or("");
        let result = self.handle_line(now, text);
        if let Err(err) = result {
            debug!("line had no effect: {}", err);
        }

        self.acknowledge(&line)?;
        Ok(Some(result))
    }

    fn acknowledge(&mut self, line: &[u8]) -> Result<(), FirmwareError<U::Error>> {
        self.serial
            .write_all(ACK_PREFIX)
            .and_then(|()| self.serial.write_all(line))
            .and_then(|()| self.serial.write_all(b"\n"))
            .map_err(FirmwareError::Serial)
    }
}
