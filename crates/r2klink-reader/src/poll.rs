use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::Sender;
use r2klink_frame::FrameAssembler;
use r2klink_proto::TagEvent;
use r2klink_transport::RfidLink;
use tracing::{debug, warn};

use crate::dispatch::{dispatch, CommandReply};

const READ_CHUNK_SIZE: usize = 256;

pub(crate) fn lock_link<L>(link: &Mutex<L>) -> MutexGuard<'_, L> {
    // A poisoned lock means a session thread panicked mid-write; the link
    // state is still usable for reads.
    link.lock().unwrap_or_else(|e| e.into_inner())
}

/// The background task driving reassembly and dispatch.
///
/// Polls the link for available bytes, feeds them through a
/// [`FrameAssembler`], and routes each validated frame to the reply or
/// tag-event channel. Idles with a short sleep when the line is quiet so
/// shutdown requests are observed promptly. The task stops on its own
/// when the link dies or every consumer is gone; either way it drops its
/// channel senders, which unblocks any caller waiting on a reply.
pub struct PollTask {
    handle: Option<JoinHandle<()>>,
    shutdown: Arc<AtomicBool>,
}

impl PollTask {
    /// Spawn the poll thread.
    ///
    /// `address` is the shared session address; the assembler re-reads it
    /// every chunk so an optimistic address change takes effect without
    /// restarting the task.
    pub fn spawn<L: RfidLink + 'static>(
        link: Arc<Mutex<L>>,
        address: Arc<AtomicU8>,
        replies: Sender<CommandReply>,
        events: Sender<TagEvent>,
        idle_interval: Duration,
    ) -> Self {
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_flag = Arc::clone(&shutdown);

        let handle = thread::Builder::new()
            .name("r2klink-poll".to_string())
            .spawn(move || {
                run(link, address, replies, events, idle_interval, shutdown_flag);
            })
            .expect("failed to spawn poll thread");

        Self {
            handle: Some(handle),
            shutdown,
        }
    }

    /// True while the poll thread is alive.
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Signal the poll thread to stop and wait for it.
    pub fn stop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("poll thread panicked during shutdown");
            }
        }
    }
}

impl Drop for PollTask {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run<L: RfidLink>(
    link: Arc<Mutex<L>>,
    address: Arc<AtomicU8>,
    replies: Sender<CommandReply>,
    events: Sender<TagEvent>,
    idle_interval: Duration,
    shutdown: Arc<AtomicBool>,
) {
    let mut assembler = FrameAssembler::new(address.load(Ordering::Relaxed));
    let mut chunk = [0u8; READ_CHUNK_SIZE];

    while !shutdown.load(Ordering::Relaxed) {
        // Hold the link lock only for the poll and read, never across a
        // blocking channel send.
        let read = {
            let mut link = lock_link(&link);
            match link.bytes_available() {
                Ok(0) => Ok(0),
                Ok(_) => link.read(&mut chunk),
                Err(err) => Err(err),
            }
        };

        let n = match read {
            Ok(0) => {
                thread::sleep(idle_interval);
                continue;
            }
            Ok(n) => n,
            Err(err) => {
                warn!(%err, "link failed, stopping poll task");
                break;
            }
        };

        assembler.set_address(address.load(Ordering::Relaxed));
        let frames = assembler.feed(&chunk[..n]);
        for frame in &frames {
            debug!(command = frame.command, len = frame.length, "frame received");
        }
        // dispatch re-checks the shutdown flag while a send is blocked on
        // a full channel, so stop() never waits behind a stalled consumer.
        if frames
            .into_iter()
            .any(|frame| dispatch(&frame, &replies, &events, &shutdown).is_err())
        {
            debug!("consumers gone or stop requested, ending poll task");
            break;
        }
    }
}
