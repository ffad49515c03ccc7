//! The motor interface board: an SPI-to-serial bridge between the Pi and the
//! Arduino's UART.

use embedded_hal::spi::{Operation, SpiDevice};
use log::{debug, trace};
use rppal::spi::{Bus, Mode, SimpleHalSpiDevice, SlaveSelect, Spi};

use crate::{Error, Link};

/// Bridge opcodes, always the first byte of an SPI transaction.
const SET_BAUD: u8 = 0x01;
const WRITE: u8 = 0x02;
const AVAILABLE: u8 = 0x03;
const READ: u8 = 0x04;

/// Largest serial chunk the bridge accepts or returns in one transaction.
pub const MAX_CHUNK: usize = 32;

#[derive(Debug, Clone, Copy, bon::Builder)]
pub struct SpiConfig {
    #[builder(default = Bus::Spi0)]
    pub bus: Bus,
    #[builder(default = SlaveSelect::Ss0)]
    pub slave_select: SlaveSelect,
    #[builder(default = 500_000)]
    pub clock_speed: u32,
    #[builder(default = Mode::Mode0)]
    pub mode: Mode,
}

impl Default for SpiConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Open the Pi's SPI bus for the bridge.
pub fn open_spi(config: &SpiConfig) -> Result<SimpleHalSpiDevice, Error> {
    debug!(
        "Opening SPI {:?} {:?} at {} Hz",
        config.bus, config.slave_select, config.clock_speed
    );
    let spi = Spi::new(
        config.bus,
        config.slave_select,
        config.clock_speed,
        config.mode,
    )?;
    Ok(SimpleHalSpiDevice::new(spi))
}

fn spi_error<E: embedded_hal::spi::Error>(error: E) -> Error {
    Error::Spi(error.kind())
}

/// Serial-over-SPI [`Link`] through the motor interface board.
pub struct SpiBridge<S> {
    spi: S,
}

impl<S: SpiDevice> SpiBridge<S> {
    pub fn new(spi: S) -> Self {
        Self { spi }
    }

    pub fn release(self) -> S {
        self.spi
    }

    fn available(&mut self) -> Result<usize, Error> {
        let mut count = [0u8];
        self.spi
            .transaction(&mut [Operation::Write(&[AVAILABLE]), Operation::Read(&mut count)])
            .map_err(spi_error)?;
        Ok(count[0] as usize)
    }
}

impl<S: SpiDevice> Link for SpiBridge<S> {
    fn set_baud_rate(&mut self, baud: u32) -> Result<(), Error> {
        debug!("Bridge baud rate {baud}");
        let [b0, b1, b2, b3] = baud.to_le_bytes();
        self.spi
            .write(&[SET_BAUD, b0, b1, b2, b3])
            .map_err(spi_error)
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<(), Error> {
        let mut buf = Vec::with_capacity(MAX_CHUNK + 2);
        for chunk in bytes.chunks(MAX_CHUNK) {
            trace!("Bridge write w:{}", chunk.len());
            buf.clear();
            buf.push(WRITE);
            buf.push(chunk.len() as u8);
            buf.extend_from_slice(chunk);
            self.spi.write(&buf).map_err(spi_error)?;
        }
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Error> {
        let n = self.available()?.min(buf.len()).min(MAX_CHUNK);
        if n == 0 {
            return Ok(0);
        }
        trace!("Bridge read r:{n}");
        self.spi
            .transaction(&mut [
                Operation::Write(&[READ, n as u8]),
                Operation::Read(&mut buf[..n]),
            ])
            .map_err(spi_error)?;
        Ok(n)
    }
}
