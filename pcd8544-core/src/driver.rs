//! Driver front end: init/flush sequencing and the drawing API.

use crate::command::{
    Config, DisplayMode, FUNCTION_SET, FUNCTION_SET_EXTENDED, SET_VOP, SET_X_ADDR, SET_Y_ADDR,
};
use crate::font;
use crate::font::CELL_WIDTH;
use crate::framebuffer::{Framebuffer, OutOfRange, BUF_LEN};
use crate::interface::{DisplayInterface, Transfer};
use crate::raster::Line;

/// Driver errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// A text cell, pixel coordinate or glyph code is outside the
    /// addressable range; the call was a no-op.
    OutOfRange,
    /// The bus transfer failed.
    Interface(E),
}

impl<E> From<OutOfRange> for Error<E> {
    fn from(_: OutOfRange) -> Self {
        Error::OutOfRange
    }
}

/// PCD8544 display driver.
///
/// Generic over the [`DisplayInterface`] transport. Drawing operations
/// mutate the local [`Framebuffer`] mirror; position setters additionally
/// move the controller's own write pointer, and [`flush`](Self::flush)
/// streams the whole mirror out as data bytes. Out-of-range requests are
/// rejected before any mutation or bus traffic.
pub struct Pcd8544<DI> {
    interface: DI,
    config: Config,
    fb: Framebuffer,
}

impl<DI: DisplayInterface> Pcd8544<DI> {
    /// Driver with the default configuration.
    pub fn new(interface: DI) -> Self {
        Self::with_config(interface, Config::default())
    }

    /// Driver with an explicit controller configuration.
    pub fn with_config(interface: DI, config: Config) -> Self {
        Self {
            interface,
            config,
            fb: Framebuffer::new(),
        }
    }

    fn command(&mut self, byte: u8) -> Result<(), Error<DI::Error>> {
        self.interface
            .send(Transfer::Command, byte)
            .map_err(Error::Interface)
    }

    fn data(&mut self, byte: u8) -> Result<(), Error<DI::Error>> {
        self.interface
            .send(Transfer::Data, byte)
            .map_err(Error::Interface)
    }

    /// Reset the controller and apply the configuration sequence.
    ///
    /// Runs once per session, before any other operation. The serial bus
    /// itself must already be configured by the platform.
    pub fn init(&mut self) -> Result<(), Error<DI::Error>> {
        self.interface.reset().map_err(Error::Interface)?;
        for byte in self.config.init_sequence() {
            self.command(byte)?;
        }
        Ok(())
    }

    /// Zero the framebuffer mirror. No bus traffic; the cursor stays put.
    pub fn clear(&mut self) {
        self.fb.clear();
    }

    /// Stream the whole framebuffer to the controller.
    ///
    /// Positions the controller at text cell `(0, 0)` and pushes all
    /// `BUF_LEN` bytes in index order. Unconditional: no dirty tracking,
    /// no partial updates.
    pub fn flush(&mut self) -> Result<(), Error<DI::Error>> {
        self.set_text_position(0, 0)?;
        for i in 0..BUF_LEN {
            let byte = self.fb.data()[i];
            self.data(byte)?;
        }
        Ok(())
    }

    /// Move the write position to text cell `(row, col)`.
    ///
    /// Valid for `row < 6`, `col < 14`. Mirrors the position to the
    /// controller with the two addressing commands.
    pub fn set_text_position(&mut self, row: u8, col: u8) -> Result<(), Error<DI::Error>> {
        self.fb.seek_text(row, col)?;
        self.command(SET_Y_ADDR | row)?;
        self.command(SET_X_ADDR | col * CELL_WIDTH as u8)?;
        Ok(())
    }

    /// Move the write position to the byte holding pixel `(x, y)`.
    ///
    /// Valid for `x < 48`, `y < 84`.
    pub fn set_pixel_position(&mut self, x: u8, y: u8) -> Result<(), Error<DI::Error>> {
        self.fb.seek_pixel(x, y)?;
        self.command(SET_Y_ADDR | (x / 8))?;
        self.command(SET_X_ADDR | y)?;
        Ok(())
    }

    /// Turn on the pixel at `(x, y)`.
    ///
    /// Pixels are only ever set by this primitive, never cleared.
    pub fn draw_pixel(&mut self, x: u8, y: u8) -> Result<(), Error<DI::Error>> {
        self.set_pixel_position(x, y)?;
        self.fb.or_under_cursor(1 << (x % 8));
        Ok(())
    }

    /// Draw one printable ASCII character at the cursor and advance it.
    ///
    /// Codes outside `[0x20, 0x7F]` are rejected. A glyph that would
    /// straddle a row boundary wraps to the next row first; when no row is
    /// left the call fails and writes nothing.
    pub fn draw_char(&mut self, c: char) -> Result<(), Error<DI::Error>> {
        let glyph = font::glyph(c).ok_or(Error::OutOfRange)?;
        self.fb.write_glyph(glyph)?;
        Ok(())
    }

    /// Draw a string, one independent [`draw_char`](Self::draw_char) per
    /// character.
    ///
    /// Characters that fail to draw are skipped; once the buffer is full
    /// the remainder of the string is effectively truncated.
    pub fn draw_str(&mut self, s: &str) {
        for c in s.chars() {
            let _ = self.draw_char(c);
        }
    }

    /// Draw a line segment between two pixels.
    ///
    /// Integer Bresenham; both endpoints are included and a zero-length
    /// segment plots exactly one pixel. Points outside the display are
    /// dropped by the pixel bounds check without aborting the rest of the
    /// line.
    pub fn draw_line(&mut self, x0: u8, y0: u8, x1: u8, y1: u8) -> Result<(), Error<DI::Error>> {
        for (x, y) in Line::new(x0, y0, x1, y1) {
            match self.draw_pixel(x, y) {
                Ok(()) | Err(Error::OutOfRange) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    /// Set the operating voltage (contrast) level, 0-0x7F.
    pub fn set_contrast(&mut self, contrast: u8) -> Result<(), Error<DI::Error>> {
        self.config.contrast = contrast & 0x7F;
        self.command(FUNCTION_SET_EXTENDED)?;
        self.command(SET_VOP | self.config.contrast)?;
        self.command(FUNCTION_SET)?;
        Ok(())
    }

    /// Switch the display control mode (normal, inverse, blank, all-on).
    pub fn set_display_mode(&mut self, mode: DisplayMode) -> Result<(), Error<DI::Error>> {
        self.command(mode as u8)
    }

    /// The active controller configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Read access to the framebuffer mirror.
    pub fn framebuffer(&self) -> &Framebuffer {
        &self.fb
    }

    /// Tear down the driver and hand the transport back.
    pub fn release(self) -> DI {
        self.interface
    }
}
