//! Protocol semantics for the Impinj R2000 UHF RFID reader.
//!
//! Sits between the framing layer and the session API: the command-code
//! table, the status-byte taxonomy, settable-parameter types, and the
//! bit-field decoding of inventory tag events.

pub mod command;
pub mod params;
pub mod status;
pub mod tag;

pub use command::Command;
pub use params::{
    Baudrate, FastSwitchAntenna, FastSwitchPlan, InventorySession, LockAction, LockBank,
    MemoryBank, Region, RfLinkProfile, SessionTarget,
};
pub use status::{status_category, status_message, StatusCategory};
pub use tag::{
    decode_tag_event, DecodeError, TagEvent, TagRead, FREQUENCY_TABLE_MHZ, RSSI_BASELINE,
};
