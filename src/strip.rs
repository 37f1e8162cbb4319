//! Hardware abstraction for addressable RGBW strips.

use crate::types::{Channel, PixelColor};

/// Trait for abstracting one physical LED strip.
///
/// Implement this for your driver (PIO, RMT, SPI, bit-banged, ...). The
/// scheduler only ever touches the driver's pixel buffer through
/// [`pixel`](LedStrip::pixel) and [`set_pixel`](LedStrip::set_pixel), and
/// pushes the buffer to the LEDs with a single [`show`](LedStrip::show) per
/// strip per frame. Handle hardware errors internally; none of these methods
/// can fail.
pub trait LedStrip {
    /// Number of addressable pixels.
    fn pixel_count(&self) -> usize;

    /// Returns the buffered color of a pixel.
    ///
    /// Out-of-range indices return [`PixelColor::OFF`].
    fn pixel(&self, index: usize) -> PixelColor;

    /// Writes a pixel into the buffer without flushing it.
    ///
    /// Out-of-range indices are ignored.
    fn set_pixel(&mut self, index: usize, color: PixelColor);

    /// Sets the global brightness multiplier applied on output.
    fn set_brightness(&mut self, brightness: u8);

    /// Flushes the buffer to the hardware.
    fn show(&mut self);

    /// Returns one channel of a buffered pixel.
    fn channel_value(&self, index: usize, channel: Channel) -> u8 {
        self.pixel(index).channel(channel)
    }
}

impl<S: LedStrip + ?Sized> LedStrip for &mut S {
    fn pixel_count(&self) -> usize {
        (**self).pixel_count()
    }

    fn pixel(&self, index: usize) -> PixelColor {
        (**self).pixel(index)
    }

    fn set_pixel(&mut self, index: usize, color: PixelColor) {
        (**self).set_pixel(index, color);
    }

    fn set_brightness(&mut self, brightness: u8) {
        (**self).set_brightness(brightness);
    }

    fn show(&mut self) {
        (**self).show();
    }
}
