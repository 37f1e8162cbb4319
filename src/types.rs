//! Core value types shared by the parser and the scheduler.

use palette::Srgba;
use palette::rgb::channels::Argb;

/// Wire value that leaves a channel untouched.
///
/// Any negative value is treated the same way.
pub const SKIP_CHANNEL: i32 = -1;

/// One color component of an RGBW pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Channel {
    Red = 0,
    Green = 1,
    Blue = 2,
    White = 3,
}

impl Channel {
    /// All channels in index order.
    pub const ALL: [Channel; 4] = [Channel::Red, Channel::Green, Channel::Blue, Channel::White];

    /// Returns the channel index (0-3).
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Returns the channel for an index, if in range.
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Channel::Red),
            1 => Some(Channel::Green),
            2 => Some(Channel::Blue),
            3 => Some(Channel::White),
            _ => None,
        }
    }
}

/// Color of a single RGBW pixel, one byte per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PixelColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub w: u8,
}

impl PixelColor {
    /// All channels off.
    pub const OFF: PixelColor = PixelColor::new(0, 0, 0, 0);

    /// Creates a color from its four channel values.
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8, w: u8) -> Self {
        Self { r, g, b, w }
    }

    /// Returns the value of one channel.
    #[inline]
    pub const fn channel(&self, channel: Channel) -> u8 {
        match channel {
            Channel::Red => self.r,
            Channel::Green => self.g,
            Channel::Blue => self.b,
            Channel::White => self.w,
        }
    }

    /// Returns a copy with one channel replaced.
    #[inline]
    pub const fn with_channel(mut self, channel: Channel, value: u8) -> Self {
        match channel {
            Channel::Red => self.r = value,
            Channel::Green => self.g = value,
            Channel::Blue => self.b = value,
            Channel::White => self.w = value,
        }
        self
    }

    /// Packs the color as `0xWWRRGGBB`, the layout NeoPixel-style drivers use.
    pub fn to_packed(self) -> u32 {
        Srgba::<u8>::new(self.r, self.g, self.b, self.w).into_u32::<Argb>()
    }

    /// Unpacks a `0xWWRRGGBB` color.
    pub fn from_packed(packed: u32) -> Self {
        let color = Srgba::<u8>::from_u32::<Argb>(packed);
        Self::new(color.red, color.green, color.blue, color.alpha)
    }
}

impl From<u32> for PixelColor {
    fn from(packed: u32) -> Self {
        PixelColor::from_packed(packed)
    }
}

impl From<PixelColor> for u32 {
    fn from(color: PixelColor) -> Self {
        color.to_packed()
    }
}

/// Identity of a transition: the exact strip, pixel and channel it animates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TransitionKey {
    pub strip: usize,
    pub pixel: usize,
    pub channel: Channel,
}

impl TransitionKey {
    /// Creates a key.
    #[inline]
    pub const fn new(strip: usize, pixel: usize, channel: Channel) -> Self {
        Self {
            strip,
            pixel,
            channel,
        }
    }
}

/// Per-channel targets of a multi-channel request.
///
/// `None` leaves the channel alone, including any transition already
/// running on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelTargets {
    pub r: Option<u8>,
    pub g: Option<u8>,
    pub b: Option<u8>,
    pub w: Option<u8>,
}

impl ChannelTargets {
    /// Targets all four channels.
    pub const fn all(color: PixelColor) -> Self {
        Self {
            r: Some(color.r),
            g: Some(color.g),
            b: Some(color.b),
            w: Some(color.w),
        }
    }

    /// Builds targets from raw wire values.
    ///
    /// Negative values skip the channel, values above 255 saturate.
    pub fn from_wire(r: i32, g: i32, b: i32, w: i32) -> Self {
        Self {
            r: wire_channel(r),
            g: wire_channel(g),
            b: wire_channel(b),
            w: wire_channel(w),
        }
    }

    /// Returns the target for one channel.
    #[inline]
    pub const fn get(&self, channel: Channel) -> Option<u8> {
        match channel {
            Channel::Red => self.r,
            Channel::Green => self.g,
            Channel::Blue => self.b,
            Channel::White => self.w,
        }
    }

    /// Iterates over the channels that are not skipped.
    pub fn iter(&self) -> impl Iterator<Item = (Channel, u8)> + '_ {
        Channel::ALL
            .into_iter()
            .filter_map(|channel| self.get(channel).map(|value| (channel, value)))
    }
}

/// Why a command line did not take effect.
///
/// These never reach the wire: the firmware still acknowledges the line and
/// only logs the error. They exist so callers and tests can tell what
/// happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandError {
    /// The opcode is not one the firmware understands.
    UnknownOpcode,

    /// Fewer parameters than the opcode requires.
    MissingParameters { expected: usize, found: usize },

    /// The strip id does not name a strip.
    StripOutOfRange { strip: usize, count: usize },

    /// The pixel index is past the end of the strip.
    PixelOutOfRange { pixel: usize, count: usize },

    /// The transition pool has no slots at all.
    NoTransitionSlots,

    /// The diagnostic pin could not be toggled.
    DiagnosticPin,
}

impl core::fmt::Display for CommandError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            CommandError::UnknownOpcode => write!(f, "unknown opcode"),
            CommandError::MissingParameters { expected, found } => {
                write!(f, "expected {} parameters, got {}", expected, found)
            }
            CommandError::StripOutOfRange { strip, count } => {
                write!(f, "strip {} out of range (have {})", strip, count)
            }
            CommandError::PixelOutOfRange { pixel, count } => {
                write!(f, "pixel {} out of range (strip has {})", pixel, count)
            }
            CommandError::NoTransitionSlots => write!(f, "transition pool has no slots"),
            CommandError::DiagnosticPin => write!(f, "diagnostic pin toggle failed"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for CommandError {}

fn wire_channel(value: i32) -> Option<u8> {
    if value < 0 {
        None
    } else {
        Some(u8::try_from(value).unwrap_or(u8::MAX))
    }
}
