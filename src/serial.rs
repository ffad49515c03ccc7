use std::io::{ErrorKind, Read, Write};
use std::time::Duration;

use log::debug;
use serialport::SerialPort;

use crate::{Error, Link};

/// How long a single read waits before reporting that nothing is pending.
const READ_TIMEOUT: Duration = Duration::from_millis(1);

/// [`Link`] to an Arduino plugged in directly over USB serial.
pub struct SerialLink {
    serial_port: Box<dyn SerialPort>,
}

impl SerialLink {
    pub fn open(path: &str, baud: u32) -> Result<Self, Error> {
        debug!("Opening serial port {path} at {baud} baud");
        let serial_port = serialport::new(path, baud).timeout(READ_TIMEOUT).open()?;
        Ok(Self { serial_port })
    }
}

impl Link for SerialLink {
    fn set_baud_rate(&mut self, baud: u32) -> Result<(), Error> {
        Ok(SerialPort::set_baud_rate(self.serial_port.as_mut(), baud)?)
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<(), Error> {
        Write::write_all(&mut self.serial_port, bytes)?;
        Ok(Write::flush(&mut self.serial_port)?)
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Error> {
        match Read::read(&mut self.serial_port, buf) {
            Ok(n) => Ok(n),
            Err(e) if e.kind() == ErrorKind::TimedOut => Ok(0),
            Err(e) => Err(e.into()),
        }
    }
}
