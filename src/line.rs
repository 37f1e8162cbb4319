//! Newline framing for the serial link.

use heapless::Vec;

/// One complete line as received, copied out of the receive buffer.
///
/// Lines are kept as raw bytes: a cut at the capacity boundary can split a
/// multi-byte character, and the line still has to be echoed back.
pub type Line<const CAP: usize> = Vec<u8, CAP>;

/// Assembles newline-terminated lines one byte at a time.
///
/// * `\n` ends a line; `\r` is discarded.
/// * When `CAP` bytes accumulate without a newline, the line is cut at that
///   boundary and emitted as-is; the next byte starts a new line.
/// * Empty lines are not emitted.
/// * Bytes are passed through unchecked; decoding is up to the caller.
#[derive(Debug, Default)]
pub struct LineBuffer<const CAP: usize> {
    buffer: Vec<u8, CAP>,
}

impl<const CAP: usize> LineBuffer<CAP> {
    /// Creates an empty buffer.
    pub const fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    /// Feeds one byte.
    ///
    /// Returns the completed line, if this byte finished one. The buffer is
    /// ready for the next line as soon as this returns.
    pub fn push(&mut self, byte: u8) -> Option<Line<CAP>> {
        match byte {
            b'\n' => self.take(),
            b'\r' => None,
            _ => {
                if self.buffer.push(byte).is_err() {
                    // only reachable with CAP == 0
                    return None;
                }
                if self.buffer.is_full() {
                    warn!("line exceeded {=usize} bytes, cutting it short", CAP);
                    return self.take();
                }
                None
            }
        }
    }

    /// Bytes buffered for the line in progress.
    pub fn pending(&self) -> &[u8] {
        &self.buffer
    }

    fn take(&mut self) -> Option<Line<CAP>> {
        if self.buffer.is_empty() {
            return None;
        }

        Some(core::mem::take(&mut self.buffer))
    }
}
