//! Byte-link abstraction for UHF RFID reader transports.
//!
//! The protocol engine talks to the reader module through the [`RfidLink`]
//! trait: a duplex byte stream with a non-blocking "bytes waiting" query.
//! Serial ports, USB-CDC bridges, and TCP-serial gateways all fit behind it;
//! this crate deliberately does not open any of them. [`LoopbackLink`]
//! provides an in-memory pair for tests and higher-layer development.

pub mod error;
pub mod link;
pub mod loopback;

pub use error::{Result, TransportError};
pub use link::RfidLink;
pub use loopback::LoopbackLink;
