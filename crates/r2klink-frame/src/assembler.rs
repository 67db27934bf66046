use bytes::{BufMut, BytesMut};
use tracing::debug;

use crate::codec::{validate_frame, Frame, HEAD};

const INITIAL_BUFFER_CAPACITY: usize = 256;

/// Streaming frame reassembly.
///
/// Consumes arbitrary-sized byte chunks and emits validated frames.
/// Two states: scanning for the `0xA0` start marker, and accumulating a
/// frame whose end is governed solely by the declared length field —
/// an embedded `0xA0` inside payload or checksum never restarts framing,
/// so the emitted frame sequence is independent of chunk boundaries.
///
/// Frames that fail validation (wrong address, bad checksum) are dropped
/// silently; the machine returns to scanning either way. A corrupted
/// length byte can garble at most the one frame it belongs to.
#[derive(Debug)]
pub struct FrameAssembler {
    buf: BytesMut,
    in_frame: bool,
    address: u8,
}

impl FrameAssembler {
    /// Create an assembler that accepts frames addressed to `address`.
    pub fn new(address: u8) -> Self {
        Self {
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            in_frame: false,
            address,
        }
    }

    /// The address inbound frames must carry.
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Track a session address change. Takes effect for the next frame;
    /// a frame mid-accumulation still completes first.
    pub fn set_address(&mut self, address: u8) {
        self.address = address;
    }

    /// Feed one byte; returns a frame if this byte completed one.
    pub fn feed_byte(&mut self, byte: u8) -> Option<Frame> {
        if !self.in_frame {
            if byte == HEAD {
                self.in_frame = true;
                self.buf.put_u8(byte);
            }
            return None;
        }

        self.buf.put_u8(byte);
        if self.buf.len() < 2 || self.buf.len() != self.buf[1] as usize + 2 {
            return None;
        }

        // Structurally complete: validate, then reset to scanning whether
        // or not the frame passes.
        let result = validate_frame(&self.buf, self.address);
        self.buf.clear();
        self.in_frame = false;

        match result {
            Ok(frame) => Some(frame),
            Err(err) => {
                debug!(%err, "dropping invalid frame");
                None
            }
        }
    }

    /// Feed a chunk of bytes, collecting every frame completed by it.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<Frame> {
        chunk.iter().filter_map(|&b| self.feed_byte(b)).collect()
    }
}
