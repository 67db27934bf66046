use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use bytes::Bytes;
use crossbeam::channel::{SendTimeoutError, Sender};
use r2klink_frame::Frame;
use r2klink_proto::command::is_inventory_stream_code;
use r2klink_proto::{decode_tag_event, TagEvent};
use tracing::warn;

/// A non-inventory reply, as delivered on the command channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandReply {
    /// The echoed command code.
    pub command: u8,
    /// The raw reply payload.
    pub payload: Bytes,
}

/// Frame delivery ended: a consumer went away, or a stop was requested
/// while a send was pending.
#[derive(Debug, thiserror::Error)]
#[error("dispatch channel disconnected")]
pub struct Disconnected;

/// How often a stalled send re-checks the stop flag.
const STOP_RECHECK_INTERVAL: Duration = Duration::from_millis(10);

fn send_or_stop<T>(tx: &Sender<T>, mut value: T, stop: &AtomicBool) -> Result<(), Disconnected> {
    loop {
        if stop.load(Ordering::Relaxed) {
            return Err(Disconnected);
        }
        match tx.send_timeout(value, STOP_RECHECK_INTERVAL) {
            Ok(()) => return Ok(()),
            Err(SendTimeoutError::Timeout(v)) => value = v,
            Err(SendTimeoutError::Disconnected(_)) => return Err(Disconnected),
        }
    }
}

/// Route a validated frame to the command-reply or tag-event channel.
///
/// Inventory-stream responses decode to a [`TagEvent`]; everything else
/// is delivered raw as a [`CommandReply`]. Both sends block while the
/// channel is full — backpressure from a slow tag consumer stalls frame
/// processing rather than dropping events — but re-check `stop` as they
/// wait, so teardown is never held up behind a saturated channel. An
/// undecodable inventory payload is logged and dropped; its effect on a
/// waiting caller is a missing event, never a crash.
pub fn dispatch(
    frame: &Frame,
    replies: &Sender<CommandReply>,
    events: &Sender<TagEvent>,
    stop: &AtomicBool,
) -> Result<(), Disconnected> {
    if is_inventory_stream_code(frame.command) {
        match decode_tag_event(frame) {
            Ok(event) => send_or_stop(events, event, stop),
            Err(err) => {
                warn!(command = frame.command, %err, "dropping undecodable inventory payload");
                Ok(())
            }
        }
    } else {
        send_or_stop(
            replies,
            CommandReply {
                command: frame.command,
                payload: frame.payload.clone(),
            },
            stop,
        )
    }
}
