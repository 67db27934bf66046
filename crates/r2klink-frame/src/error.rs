/// Errors that can occur while validating an inbound frame.
///
/// The assembler drops rejected frames silently; these variants exist so
/// the drop reason can be logged and so [`validate_frame`] stays usable on
/// its own.
///
/// [`validate_frame`]: crate::codec::validate_frame
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The frame is addressed to a different reader.
    #[error("address mismatch (expected 0x{expected:02X}, got 0x{actual:02X})")]
    AddressMismatch { expected: u8, actual: u8 },

    /// The whole-frame LRC did not sum to zero.
    #[error("checksum mismatch (residue 0x{residue:02X})")]
    ChecksumMismatch { residue: u8 },

    /// The buffer is too short to hold a complete frame.
    #[error("truncated frame ({len} bytes)")]
    Truncated { len: usize },
}

pub type Result<T> = std::result::Result<T, FrameError>;
