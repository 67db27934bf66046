use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::error::{Result, TransportError};

/// One direction of an in-memory pipe.
#[derive(Debug, Default)]
struct Pipe {
    buf: VecDeque<u8>,
    closed: bool,
}

type Shared = Arc<Mutex<Pipe>>;

/// An in-memory duplex link for tests and higher-layer development.
///
/// [`LoopbackLink::pair`] returns two connected ends; bytes written to one
/// end become readable on the other. Dropping an end marks both directions
/// closed so the peer observes link death instead of hanging.
#[derive(Debug)]
pub struct LoopbackLink {
    rx: Shared,
    tx: Shared,
}

impl LoopbackLink {
    /// Create a connected pair of loopback ends.
    pub fn pair() -> (LoopbackLink, LoopbackLink) {
        let a = Shared::default();
        let b = Shared::default();
        (
            LoopbackLink {
                rx: Arc::clone(&a),
                tx: Arc::clone(&b),
            },
            LoopbackLink { rx: b, tx: a },
        )
    }

    fn lock(shared: &Shared) -> std::sync::MutexGuard<'_, Pipe> {
        // A poisoned pipe mutex only means a peer thread panicked mid-write;
        // the byte queue itself is still coherent.
        shared.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl super::link::RfidLink for LoopbackLink {
    fn bytes_available(&self) -> Result<usize> {
        let pipe = Self::lock(&self.rx);
        if pipe.buf.is_empty() && pipe.closed {
            return Err(TransportError::Closed);
        }
        Ok(pipe.buf.len())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let mut pipe = Self::lock(&self.rx);
        if pipe.buf.is_empty() && pipe.closed {
            return Err(TransportError::Closed);
        }
        let n = buf.len().min(pipe.buf.len());
        for slot in buf.iter_mut().take(n) {
            *slot = pipe.buf.pop_front().unwrap_or_default();
        }
        Ok(n)
    }

    fn write_all(&mut self, buf: &[u8]) -> Result<()> {
        let mut pipe = Self::lock(&self.tx);
        if pipe.closed {
            return Err(TransportError::Closed);
        }
        pipe.buf.extend(buf.iter().copied());
        Ok(())
    }
}

impl Drop for LoopbackLink {
    fn drop(&mut self) {
        Self::lock(&self.rx).closed = true;
        Self::lock(&self.tx).closed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::RfidLink;

    #[test]
    fn roundtrip_between_ends() {
        let (mut host, mut device) = LoopbackLink::pair();

        host.write_all(&[0xA0, 0x03, 0x01]).unwrap();
        assert_eq!(device.bytes_available().unwrap(), 3);

        let mut buf = [0u8; 8];
        let n = device.read(&mut buf).unwrap();
        assert_eq!(&buf[..n], &[0xA0, 0x03, 0x01]);
        assert_eq!(device.bytes_available().unwrap(), 0);

        device.write_all(&[0x10]).unwrap();
        let n = host.read(&mut buf).unwrap();
        assert_eq!(&buf[..n], &[0x10]);
    }

    #[test]
    fn short_read_leaves_remainder() {
        let (mut host, mut device) = LoopbackLink::pair();
        host.write_all(&[1, 2, 3, 4, 5]).unwrap();

        let mut buf = [0u8; 2];
        assert_eq!(device.read(&mut buf).unwrap(), 2);
        assert_eq!(buf, [1, 2]);
        assert_eq!(device.bytes_available().unwrap(), 3);
    }

    #[test]
    fn dropped_peer_closes_link() {
        let (mut host, device) = LoopbackLink::pair();
        drop(device);

        assert!(matches!(
            host.write_all(&[0x00]),
            Err(TransportError::Closed)
        ));
        assert!(matches!(
            host.bytes_available(),
            Err(TransportError::Closed)
        ));
    }

    #[test]
    fn buffered_bytes_readable_after_peer_drop() {
        let (mut host, mut device) = LoopbackLink::pair();
        host.write_all(&[7, 8]).unwrap();
        drop(host);

        let mut buf = [0u8; 4];
        assert_eq!(device.read(&mut buf).unwrap(), 2);
        assert!(matches!(
            device.read(&mut buf),
            Err(TransportError::Closed)
        ));
    }
}
