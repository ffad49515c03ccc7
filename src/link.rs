use crate::Error;

/// A raw byte pipe to the serial side of the bus.
pub trait Link {
    fn set_baud_rate(&mut self, baud: u32) -> Result<(), Error>;

    fn write_all(&mut self, bytes: &[u8]) -> Result<(), Error>;

    /// Read whatever is pending without blocking for more.
    ///
    /// Returns the number of bytes placed in `buf`, which is 0 when nothing
    /// has arrived yet.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Error>;
}
