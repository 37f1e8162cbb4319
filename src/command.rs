//! Text command parsing.
//!
//! A line such as `LERP_LED 0 3 255 -1 0 40 1500` is split on single spaces
//! into an opcode and owned parameter tokens, then decoded into a typed
//! [`Request`]. Numeric parameters are parsed leniently: a token that is not
//! a number reads as 0 instead of rejecting the command.

use heapless::{String, Vec};

use crate::{DEFAULT_LINE_CAPACITY, MAX_PARAMS};
use crate::types::{ChannelTargets, CommandError};

/// Opcode that schedules per-channel transitions for one pixel.
pub const OPCODE_LERP_LED: &str = "LERP_LED";
/// Opcode that sets a strip's brightness.
pub const OPCODE_SET_BRIGHTNESS: &str = "SET_BRIGHTNESS";
/// Opcode that toggles the diagnostic pin.
pub const OPCODE_TEST: &str = "TEST";

/// Parameters taken by `LERP_LED`.
const LERP_LED_PARAMS: usize = 7;
/// Parameters taken by `SET_BRIGHTNESS`.
const SET_BRIGHTNESS_PARAMS: usize = 2;

/// One owned token of at most `LEN` bytes.
pub type Token<const LEN: usize> = String<LEN>;

/// A tokenized command line.
///
/// Tokens are copied out of the input line, so a `Command` stays valid after
/// the line buffer is reused.
///
/// # Type Parameters
/// * `LEN` - Longest token kept. Set it to the line capacity so no token
///   can be cut short.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command<const LEN: usize = { DEFAULT_LINE_CAPACITY }> {
    opcode: Token<LEN>,
    params: Vec<Token<LEN>, MAX_PARAMS>,
}

impl<const LEN: usize> Command<LEN> {
    /// Tokenizes a line.
    ///
    /// The first token is the opcode. At most [`MAX_PARAMS`] parameters are
    /// kept; extra tokens are dropped. Consecutive spaces produce empty
    /// tokens, which read as 0. Tokens longer than `LEN` bytes are
    /// truncated at a character boundary.
    pub fn parse(line: &str) -> Self {
        let mut tokens = line.split(' ');
        let opcode = tokens.next().map(owned_token).unwrap_or_default();

        let mut params = Vec::new();
        for token in tokens {
            if params.push(owned_token(token)).is_err() {
                break;
            }
        }

        Self { opcode, params }
    }

    /// Returns the opcode.
    pub fn opcode(&self) -> &str {
        &self.opcode
    }

    /// Returns the parameter tokens.
    pub fn params(&self) -> &[Token<LEN>] {
        &self.params
    }

    /// Returns a parameter parsed with [`lenient_int`], or 0 if missing.
    pub fn int_param(&self, index: usize) -> i32 {
        self.params.get(index).map_or(0, |token| lenient_int(token))
    }

    /// Decodes the command into a typed request.
    ///
    /// # Errors
    /// * `UnknownOpcode` - the opcode is not recognized
    /// * `MissingParameters` - too few parameters for the opcode
    pub fn request(&self) -> Result<Request, CommandError> {
        match self.opcode() {
            OPCODE_LERP_LED => {
                self.require(LERP_LED_PARAMS)?;
                Ok(Request::LerpLed(LerpRequest {
                    strip: wire_index(self.int_param(0)),
                    pixel: wire_index(self.int_param(1)),
                    targets: ChannelTargets::from_wire(
                        self.int_param(2),
                        self.int_param(3),
                        self.int_param(4),
                        self.int_param(5),
                    ),
                    duration_ms: u64::try_from(self.int_param(6)).unwrap_or(0),
                }))
            }
            OPCODE_SET_BRIGHTNESS => {
                self.require(SET_BRIGHTNESS_PARAMS)?;
                Ok(Request::SetBrightness {
                    strip: wire_index(self.int_param(0)),
                    brightness: wire_byte(self.int_param(1)),
                })
            }
            OPCODE_TEST => Ok(Request::Test),
            _ => Err(CommandError::UnknownOpcode),
        }
    }

    fn require(&self, expected: usize) -> Result<(), CommandError> {
        let found = self.params.len();
        if found < expected {
            return Err(CommandError::MissingParameters { expected, found });
        }
        Ok(())
    }
}

/// A decoded command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Request {
    /// `LERP_LED stripId pixel r g b w durationMs`
    LerpLed(LerpRequest),
    /// `SET_BRIGHTNESS stripId brightness`
    SetBrightness { strip: usize, brightness: u8 },
    /// `TEST`
    Test,
}

/// Parameters of a `LERP_LED` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LerpRequest {
    pub strip: usize,
    pub pixel: usize,
    pub targets: ChannelTargets,
    pub duration_ms: u64,
}

/// Parses a decimal integer the way C's `atol` does.
///
/// Leading spaces and one sign are accepted, then as many digits as follow.
/// Parsing stops at the first non-digit; no digits at all gives 0. Values
/// beyond `i32` saturate.
pub fn lenient_int(token: &str) -> i32 {
    let bytes = token.trim_start_matches(' ').as_bytes();
    let (negative, digits) = match bytes.split_first() {
        Some((b'-', rest)) => (true, rest),
        Some((b'+', rest)) => (false, rest),
        _ => (false, bytes),
    };

    let mut value: i64 = 0;
    for &byte in digits.iter().take_while(|byte| byte.is_ascii_digit()) {
        value = value
            .saturating_mul(10)
            .saturating_add(i64::from(byte - b'0'));
    }
    if negative {
        value = -value;
    }

    i32::try_from(value).unwrap_or(if negative { i32::MIN } else { i32::MAX })
}

fn owned_token<const LEN: usize>(token: &str) -> Token<LEN> {
    let mut owned = Token::<LEN>::new();
    for ch in token.chars() {
        if owned.push(ch).is_err() {
            break;
        }
    }
    owned
}

/// Negative indices can never address anything.
fn wire_index(value: i32) -> usize {
    usize::try_from(value).unwrap_or(usize::MAX)
}

fn wire_byte(value: i32) -> u8 {
    u8::try_from(value.clamp(0, i32::from(u8::MAX))).unwrap_or(u8::MAX)
}
