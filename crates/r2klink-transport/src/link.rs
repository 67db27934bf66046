use crate::error::Result;

/// A duplex byte link to a reader module.
///
/// This is the seam between the protocol engine and the physical transport.
/// Implementations wrap whatever carries the bytes — a UART, a USB-CDC
/// device, a serial-over-TCP gateway. The engine's poll loop relies on
/// [`bytes_available`](RfidLink::bytes_available) being cheap and
/// non-blocking so it can back off when the line is idle.
pub trait RfidLink: Send {
    /// Number of bytes waiting to be read, without blocking.
    fn bytes_available(&self) -> Result<usize>;

    /// Read up to `buf.len()` bytes, returning how many were read.
    ///
    /// May block briefly when called with bytes available; the poll loop
    /// only calls it after a positive `bytes_available`.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// Write the entire buffer to the device.
    fn write_all(&mut self, buf: &[u8]) -> Result<()>;
}

impl<L: RfidLink + ?Sized> RfidLink for Box<L> {
    fn bytes_available(&self) -> Result<usize> {
        (**self).bytes_available()
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        (**self).read(buf)
    }

    fn write_all(&mut self, buf: &[u8]) -> Result<()> {
        (**self).write_all(buf)
    }
}
