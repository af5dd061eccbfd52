//! `embedded-hal` transport for the PCD8544 driver core.
//!
//! Maps the command/data capability onto an [`SpiBus`] plus three GPIO
//! lines: D/C mode select, chip enable and reset. Chip enable frames every
//! byte, active low; [`SpiBus::flush`] provides the blocking wait for the
//! shift register to drain before the frame closes.
//!
//! The SPI bus and pins must be configured by the platform before the
//! first transfer (mode 0, MSB first, up to 4 MHz for this controller).

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiBus;
use pcd8544_core::{DisplayInterface, Transfer};

/// Duration of each phase of the reset pulse, in microseconds.
const RESET_PULSE_US: u32 = 1_000;

/// Transport-level errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InterfaceError<S, P> {
    /// SPI transfer failed
    Spi(S),
    /// A control line could not be driven
    Pin(P),
}

/// SPI transport with explicit per-byte chip-enable framing.
pub struct SpiInterface<SPI, DC, CE, RST, D> {
    spi: SPI,
    dc: DC,
    ce: CE,
    rst: RST,
    delay: D,
}

impl<SPI, DC, CE, RST, D> SpiInterface<SPI, DC, CE, RST, D>
where
    SPI: SpiBus,
    DC: OutputPin,
    CE: OutputPin<Error = DC::Error>,
    RST: OutputPin<Error = DC::Error>,
    D: DelayNs,
{
    /// Build the transport. Chip enable is parked at its idle (high)
    /// level.
    pub fn new(
        spi: SPI,
        dc: DC,
        mut ce: CE,
        rst: RST,
        delay: D,
    ) -> Result<Self, InterfaceError<SPI::Error, DC::Error>> {
        ce.set_high().map_err(InterfaceError::Pin)?;
        Ok(Self {
            spi,
            dc,
            ce,
            rst,
            delay,
        })
    }

    /// Tear down the transport and return the bus and pins.
    pub fn release(self) -> (SPI, DC, CE, RST, D) {
        (self.spi, self.dc, self.ce, self.rst, self.delay)
    }
}

impl<SPI, DC, CE, RST, D> DisplayInterface for SpiInterface<SPI, DC, CE, RST, D>
where
    SPI: SpiBus,
    DC: OutputPin,
    CE: OutputPin<Error = DC::Error>,
    RST: OutputPin<Error = DC::Error>,
    D: DelayNs,
{
    type Error = InterfaceError<SPI::Error, DC::Error>;

    fn send(&mut self, kind: Transfer, byte: u8) -> Result<(), Self::Error> {
        self.ce.set_low().map_err(InterfaceError::Pin)?;
        match kind {
            Transfer::Command => self.dc.set_low(),
            Transfer::Data => self.dc.set_high(),
        }
        .map_err(InterfaceError::Pin)?;
        self.spi.write(&[byte]).map_err(InterfaceError::Spi)?;
        // Wait for the shift register to drain before closing the frame
        self.spi.flush().map_err(InterfaceError::Spi)?;
        self.ce.set_high().map_err(InterfaceError::Pin)?;
        Ok(())
    }

    fn reset(&mut self) -> Result<(), Self::Error> {
        self.rst.set_low().map_err(InterfaceError::Pin)?;
        self.delay.delay_us(RESET_PULSE_US);
        self.rst.set_high().map_err(InterfaceError::Pin)?;
        self.delay.delay_us(RESET_PULSE_US);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use pcd8544_core::Pcd8544;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Event {
        CeLow,
        CeHigh,
        DcLow,
        DcHigh,
        RstLow,
        RstHigh,
        Byte(u8),
        Flush,
        DelayUs(u32),
    }

    type Log = Rc<RefCell<Vec<Event>>>;

    struct FakePin {
        log: Log,
        low: Event,
        high: Event,
    }

    impl FakePin {
        fn new(log: &Log, low: Event, high: Event) -> Self {
            Self {
                log: Rc::clone(log),
                low,
                high,
            }
        }
    }

    impl embedded_hal::digital::ErrorType for FakePin {
        type Error = Infallible;
    }

    impl OutputPin for FakePin {
        fn set_low(&mut self) -> Result<(), Infallible> {
            self.log.borrow_mut().push(self.low);
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            self.log.borrow_mut().push(self.high);
            Ok(())
        }
    }

    struct FakeSpi {
        log: Log,
    }

    impl embedded_hal::spi::ErrorType for FakeSpi {
        type Error = Infallible;
    }

    impl SpiBus for FakeSpi {
        fn read(&mut self, _words: &mut [u8]) -> Result<(), Infallible> {
            Ok(())
        }

        fn write(&mut self, words: &[u8]) -> Result<(), Infallible> {
            for &word in words {
                self.log.borrow_mut().push(Event::Byte(word));
            }
            Ok(())
        }

        fn transfer(&mut self, _read: &mut [u8], write: &[u8]) -> Result<(), Infallible> {
            self.write(write)
        }

        fn transfer_in_place(&mut self, _words: &mut [u8]) -> Result<(), Infallible> {
            Ok(())
        }

        fn flush(&mut self) -> Result<(), Infallible> {
            self.log.borrow_mut().push(Event::Flush);
            Ok(())
        }
    }

    struct FakeDelay {
        log: Log,
    }

    impl DelayNs for FakeDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.log.borrow_mut().push(Event::DelayUs(ns / 1_000));
        }
    }

    fn interface(
        log: &Log,
    ) -> SpiInterface<FakeSpi, FakePin, FakePin, FakePin, FakeDelay> {
        SpiInterface::new(
            FakeSpi {
                log: Rc::clone(log),
            },
            FakePin::new(log, Event::DcLow, Event::DcHigh),
            FakePin::new(log, Event::CeLow, Event::CeHigh),
            FakePin::new(log, Event::RstLow, Event::RstHigh),
            FakeDelay {
                log: Rc::clone(log),
            },
        )
        .unwrap()
    }

    #[test]
    fn test_chip_enable_idles_high_after_construction() {
        let log: Log = Log::default();
        let _iface = interface(&log);
        assert_eq!(*log.borrow(), vec![Event::CeHigh]);
    }

    #[test]
    fn test_command_envelope() {
        let log: Log = Log::default();
        let mut iface = interface(&log);
        log.borrow_mut().clear();
        iface.send(Transfer::Command, 0x21).unwrap();
        assert_eq!(
            *log.borrow(),
            vec![
                Event::CeLow,
                Event::DcLow,
                Event::Byte(0x21),
                Event::Flush,
                Event::CeHigh,
            ]
        );
    }

    #[test]
    fn test_data_envelope() {
        let log: Log = Log::default();
        let mut iface = interface(&log);
        log.borrow_mut().clear();
        iface.send(Transfer::Data, 0xA5).unwrap();
        assert_eq!(
            *log.borrow(),
            vec![
                Event::CeLow,
                Event::DcHigh,
                Event::Byte(0xA5),
                Event::Flush,
                Event::CeHigh,
            ]
        );
    }

    #[test]
    fn test_reset_pulse_order_and_timing() {
        let log: Log = Log::default();
        let mut iface = interface(&log);
        log.borrow_mut().clear();
        iface.reset().unwrap();
        assert_eq!(
            *log.borrow(),
            vec![
                Event::RstLow,
                Event::DelayUs(1_000),
                Event::RstHigh,
                Event::DelayUs(1_000),
            ]
        );
    }

    #[test]
    fn test_driver_init_through_spi_transport() {
        let log: Log = Log::default();
        let mut display = Pcd8544::new(interface(&log));
        display.init().unwrap();
        let bytes: Vec<u8> = log
            .borrow()
            .iter()
            .filter_map(|event| match event {
                Event::Byte(byte) => Some(*byte),
                _ => None,
            })
            .collect();
        assert_eq!(bytes, vec![0x21, 0x06, 0x13, 0xC2, 0x20, 0x0C]);
        // Reset pulse completes before the first command byte goes out
        let rst_high = log
            .borrow()
            .iter()
            .position(|event| *event == Event::RstHigh)
            .unwrap();
        let first_byte = log
            .borrow()
            .iter()
            .position(|event| matches!(event, Event::Byte(_)))
            .unwrap();
        assert!(rst_high < first_byte);
    }
}
