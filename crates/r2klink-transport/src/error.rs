/// Errors that can occur on a reader byte link.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// An I/O error occurred on the underlying device.
    #[error("link I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The link has been closed and can no longer move bytes.
    #[error("link closed")]
    Closed,
}

pub type Result<T> = std::result::Result<T, TransportError>;
