use std::time::Duration;

/// Errors surfaced by the reader session.
#[derive(Debug, thiserror::Error)]
pub enum ReaderError {
    /// The byte link failed.
    #[error("transport error: {0}")]
    Transport(#[from] r2klink_transport::TransportError),

    /// No reply arrived on the command channel in time.
    #[error("reply timed out after {0:?}")]
    ReplyTimeout(Duration),

    /// The session's poll task has stopped; no more replies can arrive.
    #[error("session closed")]
    Closed,

    /// A method argument violates the protocol's field ranges.
    #[error("invalid parameter: {0}")]
    InvalidParameter(&'static str),

    /// A reply arrived but its payload doesn't have the expected shape.
    #[error("unexpected reply shape for {0}")]
    UnexpectedReply(&'static str),
}

pub type Result<T> = std::result::Result<T, ReaderError>;
