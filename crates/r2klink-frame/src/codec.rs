use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};

/// Frame start marker.
pub const HEAD: u8 = 0xA0;

/// Maximum payload size: the length byte covers address + command +
/// checksum (3 bytes) plus the payload, so the payload caps at 252.
pub const MAX_PAYLOAD: usize = u8::MAX as usize - 3;

/// Bytes of fixed framing around the payload: head, length, address,
/// command, checksum.
pub const OVERHEAD: usize = 5;

/// A validated inbound frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// The declared length field (`3 + payload.len()`).
    pub length: u8,
    /// The reader address the frame was sent from.
    pub address: u8,
    /// The command code this frame responds to.
    pub command: u8,
    /// The response payload.
    pub payload: Bytes,
}

/// Longitudinal redundancy check: the additive checksum used by the R2000
/// protocol. Returns the byte that makes `data` plus the result sum to
/// zero mod 256 — so a received frame that includes its checksum byte
/// yields an LRC of zero.
pub fn lrc(data: &[u8]) -> u8 {
    let sum = data.iter().fold(0u8, |acc, &b| acc.wrapping_add(b));
    (!sum).wrapping_add(1)
}

/// Encode a command frame for the wire.
///
/// Wire format:
/// ```text
/// ┌──────────┬─────────┬─────────┬─────────┬───────────────┬──────────┐
/// │ Head     │ Length  │ Address │ Command │ Payload        │ Checksum │
/// │ 0xA0     │ 3+N     │ 0-254   │ 1B      │ N bytes        │ LRC      │
/// └──────────┴─────────┴─────────┴─────────┴───────────────┴──────────┘
/// ```
///
/// Field ranges are the caller's contract; this function only frames.
pub fn encode_frame(address: u8, command: u8, payload: &[u8]) -> BytesMut {
    debug_assert!(payload.len() <= MAX_PAYLOAD);

    let mut buf = BytesMut::with_capacity(OVERHEAD + payload.len());
    buf.put_u8(HEAD);
    buf.put_u8(3 + payload.len() as u8);
    buf.put_u8(address);
    buf.put_u8(command);
    buf.put_slice(payload);
    let ck = lrc(&buf);
    buf.put_u8(ck);
    buf
}

/// Validate a structurally complete frame buffer.
///
/// The assembler guarantees `buf` is exactly one declared-length frame;
/// this checks the addressing and the checksum. A frame passes when its
/// address equals `address` and the LRC over the entire buffer (checksum
/// byte included) is zero.
pub fn validate_frame(buf: &[u8], address: u8) -> Result<Frame> {
    if buf.len() < OVERHEAD {
        return Err(FrameError::Truncated { len: buf.len() });
    }
    if buf[2] != address {
        return Err(FrameError::AddressMismatch {
            expected: address,
            actual: buf[2],
        });
    }
    let residue = lrc(buf);
    if residue != 0 {
        return Err(FrameError::ChecksumMismatch { residue });
    }
    Ok(Frame {
        length: buf[1],
        address: buf[2],
        command: buf[3],
        payload: Bytes::copy_from_slice(&buf[4..buf.len() - 1]),
    })
}
