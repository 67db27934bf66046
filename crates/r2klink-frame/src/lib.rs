//! Framing layer for the Impinj R2000 serial protocol.
//!
//! Every message on the wire is framed as:
//! - A 1-byte start marker (`0xA0`)
//! - A 1-byte length field covering address, command, payload and checksum
//! - A 1-byte reader address
//! - A 1-byte command code
//! - The payload
//! - A 1-byte LRC checksum (the whole frame sums to zero mod 256)
//!
//! [`codec`] holds the pure encode/validate functions; [`assembler`] turns
//! an unbounded byte stream into validated frames.

pub mod assembler;
pub mod codec;
pub mod error;

pub use assembler::FrameAssembler;
pub use codec::{encode_frame, lrc, validate_frame, Frame, HEAD, MAX_PAYLOAD};
pub use error::{FrameError, Result};
