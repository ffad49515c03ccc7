use std::time::Duration;

#[derive(Debug)]
pub enum Error {
    /// An SPI transaction with the bridge failed.
    Spi(embedded_hal::spi::ErrorKind),
    Rppal(rppal::spi::Error),
    SerialPort(serialport::Error),
    Io(std::io::Error),
    Cobs(cobs::DecodeError),
    /// Request payloads carry a one-byte length.
    PayloadTooLong(usize),
    /// No complete reply arrived within the response timeout.
    Timeout(Duration),
    /// The reply did not fit in the decode buffer.
    FrameTooLong,
    MalformedResponse(&'static str),
    Checksum {
        expected: u8,
        actual: u8,
    },
    AddressMismatch {
        expected: u8,
        actual: u8,
    },
    /// The device answered with a non-zero status code.
    DeviceStatus(u8),
    /// A single byte was requested but the reply carried no data.
    EmptyResponse,
    Utf8(std::string::FromUtf8Error),
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serialport::Error> for Error {
    fn from(value: serialport::Error) -> Self {
        Self::SerialPort(value)
    }
}

impl From<rppal::spi::Error> for Error {
    fn from(value: rppal::spi::Error) -> Self {
        Self::Rppal(value)
    }
}

impl From<cobs::DecodeError> for Error {
    fn from(value: cobs::DecodeError) -> Self {
        Self::Cobs(value)
    }
}

impl From<std::string::FromUtf8Error> for Error {
    fn from(value: std::string::FromUtf8Error) -> Self {
        Self::Utf8(value)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Spi(kind) => write!(f, "SPI bridge error: {kind}"),
            Error::Rppal(e) => write!(f, "failed to open SPI bus: {e}"),
            Error::SerialPort(e) => write!(f, "serial port error: {e}"),
            Error::Io(e) => write!(f, "I/O error: {e}"),
            Error::Cobs(e) => write!(f, "COBS decode error: {e:?}"),
            Error::PayloadTooLong(len) => {
                write!(f, "payload of {len} bytes exceeds the 255 byte limit")
            }
            Error::Timeout(after) => write!(f, "no reply after {after:?}"),
            Error::FrameTooLong => write!(f, "reply frame overflowed the decode buffer"),
            Error::MalformedResponse(reason) => write!(f, "malformed reply: {reason}"),
            Error::Checksum { expected, actual } => write!(
                f,
                "reply checksum mismatch: expected {expected:#04x}, got {actual:#04x}"
            ),
            Error::AddressMismatch { expected, actual } => {
                write!(f, "reply from address {actual}, expected {expected}")
            }
            Error::DeviceStatus(code) => write!(f, "device reported status {code}"),
            Error::EmptyResponse => write!(f, "reply carried no data"),
            Error::Utf8(e) => write!(f, "reply is not valid UTF-8: {e}"),
        }
    }
}

impl std::error::Error for Error {}
