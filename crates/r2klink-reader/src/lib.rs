//! High-level session layer for the Impinj R2000 reader.
//!
//! This is the "just works" layer. Open a [`ReaderSession`] over any
//! [`RfidLink`](r2klink_transport::RfidLink); a background poll task
//! reassembles the inbound byte stream and fans frames out to two bounded
//! queues — synchronous command replies and the asynchronous tag-event
//! stream. Session methods block on the reply queue with a timeout;
//! inventory starts are fire-and-forget with results arriving on
//! [`ReaderSession::events`].

pub mod dispatch;
pub mod error;
pub mod poll;
pub mod session;

pub use dispatch::{dispatch, CommandReply};
pub use error::{ReaderError, Result};
pub use poll::PollTask;
pub use session::{Ack, ReaderSession, SessionConfig, DEFAULT_ADDRESS};
