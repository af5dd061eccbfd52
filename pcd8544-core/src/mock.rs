//! Recording transport double for host-side tests.

use heapless::Vec;

use crate::interface::{DisplayInterface, Transfer};

/// Capture capacity: two full framebuffer flushes plus headroom for init
/// and positioning traffic.
pub const CAPTURE_CAPACITY: usize = 2048;

/// Transport double that records every transfer instead of driving
/// hardware. Transfers beyond the capture capacity are dropped.
#[derive(Debug, Default)]
pub struct RecordingInterface {
    sent: Vec<(Transfer, u8), CAPTURE_CAPACITY>,
    resets: u32,
}

impl RecordingInterface {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self {
            sent: Vec::new(),
            resets: 0,
        }
    }

    /// Every transfer seen so far, in transmission order.
    pub fn sent(&self) -> &[(Transfer, u8)] {
        &self.sent
    }

    /// The command bytes seen so far, in transmission order.
    pub fn commands(&self) -> impl Iterator<Item = u8> + '_ {
        self.sent
            .iter()
            .filter(|(kind, _)| *kind == Transfer::Command)
            .map(|(_, byte)| *byte)
    }

    /// The data bytes seen so far, in transmission order.
    pub fn data(&self) -> impl Iterator<Item = u8> + '_ {
        self.sent
            .iter()
            .filter(|(kind, _)| *kind == Transfer::Data)
            .map(|(_, byte)| *byte)
    }

    /// Number of reset pulses seen.
    pub fn resets(&self) -> u32 {
        self.resets
    }

    /// Forget everything recorded so far.
    pub fn reset_capture(&mut self) {
        self.sent.clear();
        self.resets = 0;
    }
}

impl DisplayInterface for RecordingInterface {
    type Error = core::convert::Infallible;

    fn send(&mut self, kind: Transfer, byte: u8) -> Result<(), Self::Error> {
        let _ = self.sent.push((kind, byte));
        Ok(())
    }

    fn reset(&mut self) -> Result<(), Self::Error> {
        self.resets += 1;
        Ok(())
    }
}
