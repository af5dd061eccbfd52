//! Command/data transport capability.
//!
//! The controller is written one byte at a time. Every byte travels inside
//! a chip-enable envelope, with a mode line selecting whether the
//! controller interprets it as an instruction or as display RAM data.

/// Interpretation of a transferred byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Transfer {
    /// Instruction byte (mode line low)
    Command,
    /// Display RAM byte (mode line high)
    Data,
}

/// Byte transport to the display controller.
///
/// Implementations own the framing envelope around each byte: assert chip
/// enable (active low), drive the mode line for `kind`, shift the byte
/// out, block until the hardware reports the transfer complete, deassert
/// chip enable. One byte per call, no queuing; no partial-byte state
/// escapes the call.
pub trait DisplayInterface {
    /// Error type for bus operations
    type Error;

    /// Transmit one byte, tagged as command or data.
    ///
    /// Blocks until the transfer has completed. The bus lines must already
    /// be configured by the platform before the first call.
    fn send(&mut self, kind: Transfer, byte: u8) -> Result<(), Self::Error>;

    /// Pulse the reset line: assert low, wait, deassert, wait.
    ///
    /// Must run once, before the init command sequence.
    fn reset(&mut self) -> Result<(), Self::Error>;
}
