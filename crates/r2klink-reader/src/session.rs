use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use crossbeam::channel::{bounded, Receiver, RecvTimeoutError};
use r2klink_frame::{encode_frame, MAX_PAYLOAD};
use r2klink_proto::{
    status, Baudrate, Command, FastSwitchPlan, InventorySession, LockAction, LockBank, MemoryBank,
    Region, RfLinkProfile, SessionTarget, TagEvent,
};
use r2klink_transport::RfidLink;
use tracing::{debug, warn};

use crate::dispatch::CommandReply;
use crate::error::{ReaderError, Result};
use crate::poll::{lock_link, PollTask};

/// Factory-default reader address, also the broadcast address.
pub const DEFAULT_ADDRESS: u8 = 0xFF;

/// Highest assignable reader address.
const MAX_ADDRESS: u8 = 0xFE;

/// Reader-identifier field width on the wire.
const IDENTIFIER_LEN: usize = 12;

/// Largest write payload that still fits one frame alongside the
/// password, bank, start-address and word-count fields, rounded down to
/// a whole word.
const MAX_WRITE_DATA_LEN: usize = (MAX_PAYLOAD - 7) & !1;

/// Session tuning knobs.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// How long a request waits for its reply before the synthetic FAIL.
    pub reply_timeout: Duration,
    /// Poll backoff while the line is idle.
    pub idle_poll_interval: Duration,
    /// Command reply channel capacity.
    pub reply_capacity: usize,
    /// Tag event channel capacity. When full, frame processing stalls
    /// rather than dropping events; size for the expected read rate.
    pub event_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            reply_timeout: Duration::from_secs(2),
            idle_poll_interval: Duration::from_millis(10),
            reply_capacity: 1024,
            event_capacity: 1024,
        }
    }
}

/// Decoded acknowledgement of a command.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ack {
    /// True only when the reader reported the explicit SUCCESS code.
    pub success: bool,
    /// The status message. Beware the taxonomy's `"SUCCESS"` fallback for
    /// unknown codes; trust `success`, not this string.
    pub message: String,
}

impl Ack {
    fn from_status(code: u8) -> Self {
        Self {
            success: status::is_success(code),
            message: status::status_message(code).to_string(),
        }
    }

    /// The synthetic failure produced on reply timeout or link failure.
    fn fail() -> Self {
        Self {
            success: false,
            message: status::status_message(status::FAIL).to_string(),
        }
    }
}

/// A live session with one reader over one byte link.
///
/// Owns the session address and the background poll task. Request methods
/// follow a single-outstanding-request discipline — the shared reply
/// channel cannot correlate concurrent requests of different types, which
/// is why they take `&mut self`. Inventory starts are fire-and-forget;
/// subscribe to [`events`](Self::events) before starting one.
pub struct ReaderSession<L: RfidLink> {
    link: Arc<Mutex<L>>,
    address: Arc<AtomicU8>,
    replies: Receiver<CommandReply>,
    events: Receiver<TagEvent>,
    poll: PollTask,
    reply_timeout: Duration,
}

impl<L: RfidLink + 'static> ReaderSession<L> {
    /// Open a session at the factory-default address.
    pub fn open(link: L) -> Self {
        Self::open_with(link, DEFAULT_ADDRESS, SessionConfig::default())
    }

    /// Open a session with an explicit address and configuration.
    pub fn open_with(link: L, address: u8, config: SessionConfig) -> Self {
        let link = Arc::new(Mutex::new(link));
        let address = Arc::new(AtomicU8::new(address));
        let (reply_tx, reply_rx) = bounded(config.reply_capacity);
        let (event_tx, event_rx) = bounded(config.event_capacity);

        let poll = PollTask::spawn(
            Arc::clone(&link),
            Arc::clone(&address),
            reply_tx,
            event_tx,
            config.idle_poll_interval,
        );

        Self {
            link,
            address,
            replies: reply_rx,
            events: event_rx,
            poll,
            reply_timeout: config.reply_timeout,
        }
    }

    /// A handle to the asynchronous tag-event stream.
    pub fn events(&self) -> Receiver<TagEvent> {
        self.events.clone()
    }

    /// The address this session currently believes the reader has.
    pub fn session_address(&self) -> u8 {
        self.address.load(Ordering::Relaxed)
    }

    /// Override the session address without touching the device, e.g. to
    /// roll back a rejected [`set_reader_address`](Self::set_reader_address).
    pub fn set_session_address(&mut self, address: u8) {
        self.address.store(address, Ordering::Relaxed);
    }

    /// Stop the poll task and release the link. Also happens on drop;
    /// any caller still waiting on a reply is unblocked with a failure.
    pub fn shutdown(&mut self) {
        self.poll.stop();
    }

    /// True while the background poll task is alive.
    pub fn is_connected(&self) -> bool {
        self.poll.is_running()
    }

    // ---- core request plumbing ------------------------------------------

    fn send_command(&self, command: Command, payload: &[u8]) -> Result<()> {
        let address = self.address.load(Ordering::Relaxed);
        let wire = encode_frame(address, command.code(), payload);

        // Optimistic update: the session adopts a new reader address the
        // moment the set-address frame is built, before any transmission
        // or ack. If the device rejects the change the two now disagree;
        // see `set_reader_address`.
        if command == Command::SetReaderAddress {
            self.address.store(payload[0], Ordering::Relaxed);
        }

        debug!(command = command.code(), len = wire.len(), "sending frame");
        lock_link(&self.link).write_all(&wire)?;
        Ok(())
    }

    /// Send and interpret the reply's first payload byte as a status code.
    /// Timeout, disconnect and link failure all collapse to the synthetic
    /// FAIL ack.
    fn ack_request(&mut self, command: Command, payload: &[u8]) -> Result<Ack> {
        if let Err(err) = self.send_command(command, payload) {
            warn!(%err, command = command.code(), "send failed");
            return Ok(Ack::fail());
        }
        match self.replies.recv_timeout(self.reply_timeout) {
            Ok(reply) => Ok(reply
                .payload
                .first()
                .map_or_else(Ack::fail, |&code| Ack::from_status(code))),
            Err(_) => Ok(Ack::fail()),
        }
    }

    /// Send and return the raw reply payload.
    fn data_request(&mut self, command: Command, payload: &[u8]) -> Result<Bytes> {
        self.send_command(command, payload)?;
        match self.replies.recv_timeout(self.reply_timeout) {
            Ok(reply) => Ok(reply.payload),
            Err(RecvTimeoutError::Timeout) => Err(ReaderError::ReplyTimeout(self.reply_timeout)),
            Err(RecvTimeoutError::Disconnected) => Err(ReaderError::Closed),
        }
    }

    // ---- reader management ----------------------------------------------

    pub fn reset(&mut self) -> Result<Ack> {
        self.ack_request(Command::Reset, &[])
    }

    pub fn set_baudrate(&mut self, baudrate: Baudrate) -> Result<Ack> {
        self.ack_request(Command::SetUartBaudrate, &[baudrate.code()])
    }

    /// Assign a new reader address.
    ///
    /// The session address updates optimistically on send. When the
    /// returned ack is a failure, call
    /// [`set_session_address`](Self::set_session_address) with the old
    /// address to resynchronize.
    pub fn set_reader_address(&mut self, address: u8) -> Result<Ack> {
        if address > MAX_ADDRESS {
            return Err(ReaderError::InvalidParameter("reader address must be 0-254"));
        }
        self.ack_request(Command::SetReaderAddress, &[address])
    }

    /// Firmware version as (major, minor).
    pub fn firmware_version(&mut self) -> Result<(u8, u8)> {
        let payload = self.data_request(Command::GetFirmwareVersion, &[])?;
        match payload.as_ref() {
            [major, minor, ..] => Ok((*major, *minor)),
            _ => Err(ReaderError::UnexpectedReply("firmware version")),
        }
    }

    pub fn set_reader_identifier(&mut self, identifier: &str) -> Result<Ack> {
        let mut body = [0xFFu8; IDENTIFIER_LEN];
        for (slot, byte) in body.iter_mut().zip(identifier.bytes()) {
            *slot = byte;
        }
        self.ack_request(Command::SetReaderIdentifier, &body)
    }

    pub fn reader_identifier(&mut self) -> Result<Bytes> {
        self.data_request(Command::GetReaderIdentifier, &[])
    }

    /// Reader temperature in °C.
    pub fn temperature(&mut self) -> Result<i32> {
        let payload = self.data_request(Command::GetReaderTemperature, &[])?;
        match payload.as_ref() {
            // First byte is the sign flag: zero means below zero.
            [sign, value, ..] => Ok(if *sign == 0 {
                -(*value as i32)
            } else {
                *value as i32
            }),
            _ => Err(ReaderError::UnexpectedReply("temperature")),
        }
    }

    pub fn set_beeper_mode(&mut self, mode: u8) -> Result<Ack> {
        if mode > 2 {
            return Err(ReaderError::InvalidParameter("beeper mode must be 0-2"));
        }
        self.ack_request(Command::SetBeeperMode, &[mode])
    }

    // ---- antenna and RF -------------------------------------------------

    pub fn set_work_antenna(&mut self, antenna: u8) -> Result<Ack> {
        if antenna > 3 {
            return Err(ReaderError::InvalidParameter("antenna index must be 0-3"));
        }
        self.ack_request(Command::SetWorkAntenna, &[antenna])
    }

    pub fn work_antenna(&mut self) -> Result<u8> {
        let payload = self.data_request(Command::GetWorkAntenna, &[])?;
        payload
            .first()
            .copied()
            .ok_or(ReaderError::UnexpectedReply("work antenna"))
    }

    /// Output power per antenna, 0-33 dBm each.
    pub fn set_rf_power(&mut self, power_dbm: [u8; 4]) -> Result<Ack> {
        if power_dbm.iter().any(|&p| p > 33) {
            return Err(ReaderError::InvalidParameter("output power must be 0-33 dBm"));
        }
        self.ack_request(Command::SetRfPower, &power_dbm)
    }

    pub fn rf_power(&mut self) -> Result<[u8; 4]> {
        let payload = self.data_request(Command::GetRfPower, &[])?;
        match payload.as_ref() {
            [a1, a2, a3, a4, ..] => Ok([*a1, *a2, *a3, *a4]),
            _ => Err(ReaderError::UnexpectedReply("rf power")),
        }
    }

    /// Fast power set without a flash write; 22-33 dBm only.
    pub fn set_temporary_power(&mut self, power_dbm: u8) -> Result<Ack> {
        if !(22..=33).contains(&power_dbm) {
            return Err(ReaderError::InvalidParameter(
                "temporary power must be 22-33 dBm",
            ));
        }
        self.ack_request(Command::SetTemporaryOutputPower, &[power_dbm])
    }

    /// Enable the antenna connection detector at the given return-loss
    /// threshold in dB; zero disables it.
    pub fn set_ant_connection_detector(&mut self, loss_db: u8) -> Result<Ack> {
        self.ack_request(Command::SetAntConnectionDetector, &[loss_db])
    }

    pub fn ant_connection_detector(&mut self) -> Result<u8> {
        let payload = self.data_request(Command::GetAntConnectionDetector, &[])?;
        payload
            .first()
            .copied()
            .ok_or(ReaderError::UnexpectedReply("ant connection detector"))
    }

    pub fn set_rf_link_profile(&mut self, profile: RfLinkProfile) -> Result<Ack> {
        self.ack_request(Command::SetRfLinkProfile, &[profile as u8])
    }

    pub fn rf_link_profile(&mut self) -> Result<u8> {
        let payload = self.data_request(Command::GetRfLinkProfile, &[])?;
        payload
            .first()
            .copied()
            .ok_or(ReaderError::UnexpectedReply("rf link profile"))
    }

    /// Return loss at the working antenna port for a frequency-table slot.
    pub fn rf_port_return_loss(&mut self, frequency_index: u8) -> Result<u8> {
        let payload = self.data_request(Command::GetRfPortReturnLoss, &[frequency_index])?;
        payload
            .first()
            .copied()
            .ok_or(ReaderError::UnexpectedReply("rf port return loss"))
    }

    pub fn set_frequency_region(&mut self, region: Region, start: u8, stop: u8) -> Result<Ack> {
        self.ack_request(Command::SetFrequencyRegion, &[region as u8, start, stop])
    }

    /// User-defined frequency plan: `start_khz` in kHz (24-bit),
    /// `space` in 10-kHz steps, `quantity` channels.
    pub fn set_user_frequency_region(
        &mut self,
        start_khz: u32,
        space: u8,
        quantity: u8,
    ) -> Result<Ack> {
        if quantity == 0 {
            return Err(ReaderError::InvalidParameter("channel quantity must be above 0"));
        }
        if space > 25 {
            return Err(ReaderError::InvalidParameter("channel space must be 0-25"));
        }
        let body = [
            Region::User as u8,
            space * 10,
            quantity,
            ((start_khz >> 16) & 0xFF) as u8,
            ((start_khz >> 8) & 0xFF) as u8,
            (start_khz & 0xFF) as u8,
        ];
        self.ack_request(Command::SetFrequencyRegion, &body)
    }

    pub fn frequency_region(&mut self) -> Result<Bytes> {
        self.data_request(Command::GetFrequencyRegion, &[])
    }

    // ---- GPIO -----------------------------------------------------------

    /// Drive an output pin. Only GPIO3 and GPIO4 are writable.
    pub fn set_gpio(&mut self, port: u8, level: bool) -> Result<Ack> {
        if !(3..=4).contains(&port) {
            return Err(ReaderError::InvalidParameter("writable GPIO ports are 3-4"));
        }
        self.ack_request(Command::SetGpioValue, &[port, level as u8])
    }

    /// Read the input pins GPIO1 and GPIO2.
    pub fn gpio_values(&mut self) -> Result<(bool, bool)> {
        let payload = self.data_request(Command::GetGpioValue, &[])?;
        match payload.as_ref() {
            [gpio1, gpio2, ..] => Ok((*gpio1 != 0, *gpio2 != 0)),
            _ => Err(ReaderError::UnexpectedReply("gpio values")),
        }
    }

    // ---- tag access -----------------------------------------------------

    /// Read `word_count` 16-bit words from a tag memory bank.
    pub fn read_tag(
        &mut self,
        bank: MemoryBank,
        word_address: u8,
        word_count: u8,
        password: [u8; 4],
    ) -> Result<Bytes> {
        let mut body = vec![bank as u8, word_address, word_count];
        body.extend_from_slice(&password);
        self.data_request(Command::Read, &body)
    }

    pub fn write_tag(
        &mut self,
        bank: MemoryBank,
        word_address: u8,
        data: &[u8],
        password: [u8; 4],
    ) -> Result<Ack> {
        self.write_words(Command::Write, bank, word_address, data, password)
    }

    /// BlockWrite variant of [`write_tag`](Self::write_tag) for tags that
    /// support it.
    pub fn write_tag_block(
        &mut self,
        bank: MemoryBank,
        word_address: u8,
        data: &[u8],
        password: [u8; 4],
    ) -> Result<Ack> {
        self.write_words(Command::WriteBlock, bank, word_address, data, password)
    }

    fn write_words(
        &mut self,
        command: Command,
        bank: MemoryBank,
        word_address: u8,
        data: &[u8],
        password: [u8; 4],
    ) -> Result<Ack> {
        if data.is_empty() || data.len() % 2 != 0 {
            return Err(ReaderError::InvalidParameter(
                "write data must be a non-empty whole number of 16-bit words",
            ));
        }
        if data.len() > MAX_WRITE_DATA_LEN {
            return Err(ReaderError::InvalidParameter(
                "write data is at most 244 bytes (122 words)",
            ));
        }
        // Writing EPC from word 0 actually starts at word 2, past the
        // CRC and PC words.
        let address = if bank == MemoryBank::Epc && word_address == 0 {
            2
        } else {
            word_address
        };
        let mut body = Vec::with_capacity(password.len() + 3 + data.len());
        body.extend_from_slice(&password);
        body.push(bank as u8);
        body.push(address);
        body.push((data.len() / 2) as u8);
        body.extend_from_slice(data);
        self.ack_request(command, &body)
    }

    pub fn lock_tag(
        &mut self,
        bank: LockBank,
        action: LockAction,
        password: [u8; 4],
    ) -> Result<Ack> {
        let mut body = Vec::with_capacity(6);
        body.extend_from_slice(&password);
        body.push(bank as u8);
        body.push(action as u8);
        self.ack_request(Command::Lock, &body)
    }

    pub fn kill_tag(&mut self, password: [u8; 4]) -> Result<Ack> {
        self.ack_request(Command::Kill, &password)
    }

    /// Restrict subsequent access commands to one EPC (`mode` 0) or clear
    /// the restriction (`mode` 1).
    pub fn set_access_epc_match(&mut self, mode: u8, epc: &[u8]) -> Result<Ack> {
        if mode > 1 {
            return Err(ReaderError::InvalidParameter("EPC match mode must be 0 or 1"));
        }
        if epc.len() > 62 {
            return Err(ReaderError::InvalidParameter("EPC match is at most 62 bytes"));
        }
        let mut body = Vec::with_capacity(2 + epc.len());
        body.push(mode);
        body.push(epc.len() as u8);
        body.extend_from_slice(epc);
        self.ack_request(Command::SetAccessEpcMatch, &body)
    }

    pub fn access_epc_match(&mut self) -> Result<Bytes> {
        self.data_request(Command::GetAccessEpcMatch, &[])
    }

    // ---- inventory ------------------------------------------------------

    /// Buffered inventory: tags accumulate in the reader's buffer and the
    /// round summary comes back as a command reply, not on the tag stream.
    pub fn inventory(&mut self, repeat: u8) -> Result<Bytes> {
        self.data_request(Command::Inventory, &[repeat])
    }

    pub fn inventory_buffer(&mut self) -> Result<Bytes> {
        self.data_request(Command::GetInventoryBuffer, &[])
    }

    pub fn inventory_buffer_and_reset(&mut self) -> Result<Bytes> {
        self.data_request(Command::GetAndResetInventoryBuffer, &[])
    }

    pub fn inventory_buffer_tag_count(&mut self) -> Result<u16> {
        let payload = self.data_request(Command::GetInventoryBufferTagCount, &[])?;
        match payload.as_ref() {
            [hi, lo, ..] => Ok(u16::from_be_bytes([*hi, *lo])),
            _ => Err(ReaderError::UnexpectedReply("inventory buffer tag count")),
        }
    }

    pub fn reset_inventory_buffer(&mut self) -> Result<Ack> {
        self.ack_request(Command::ResetInventoryBuffer, &[])
    }

    /// Start a real-time inventory round. Fire-and-forget: tag reads and
    /// the round summary arrive on [`events`](Self::events) only.
    pub fn start_realtime_inventory(&mut self, repeat: u8) -> Result<()> {
        self.send_command(Command::RealTimeInventory, &[repeat])
    }

    /// Start a session-target inventory round (fire-and-forget).
    pub fn start_session_inventory(
        &mut self,
        session: InventorySession,
        target: SessionTarget,
        repeat: u8,
    ) -> Result<()> {
        self.send_command(
            Command::CustomizedSessionTargetInventory,
            &[session as u8, target as u8, repeat],
        )
    }

    /// Start a fast-switch-antenna inventory round (fire-and-forget).
    pub fn start_fast_switch_inventory(&mut self, plan: FastSwitchPlan) -> Result<()> {
        self.send_command(Command::FastSwitchAntInventory, &plan.to_payload())
    }

    /// Start an ISO18000-6B inventory round (fire-and-forget).
    pub fn start_iso18000_6b_inventory(&mut self) -> Result<()> {
        self.send_command(Command::Iso18000_6bInventory, &[])
    }
}

#[cfg(test)]
mod tests {
    use r2klink_transport::LoopbackLink;

    use super::*;

    fn quick_config() -> SessionConfig {
        SessionConfig {
            reply_timeout: Duration::from_millis(100),
            idle_poll_interval: Duration::from_millis(1),
            ..SessionConfig::default()
        }
    }

    #[test]
    fn parameter_validation_rejects_before_sending() {
        let (host, _device) = LoopbackLink::pair();
        let mut session = ReaderSession::open_with(host, 0x01, quick_config());

        assert!(matches!(
            session.set_reader_address(0xFF),
            Err(ReaderError::InvalidParameter(_))
        ));
        assert!(matches!(
            session.set_work_antenna(4),
            Err(ReaderError::InvalidParameter(_))
        ));
        assert!(matches!(
            session.set_rf_power([33, 34, 0, 0]),
            Err(ReaderError::InvalidParameter(_))
        ));
        assert!(matches!(
            session.set_temporary_power(21),
            Err(ReaderError::InvalidParameter(_))
        ));
        assert!(matches!(
            session.set_beeper_mode(3),
            Err(ReaderError::InvalidParameter(_))
        ));
        assert!(matches!(
            session.set_gpio(1, true),
            Err(ReaderError::InvalidParameter(_))
        ));
        assert!(matches!(
            session.write_tag(MemoryBank::Epc, 0, &[0x01], [0; 4]),
            Err(ReaderError::InvalidParameter(_))
        ));
        // One word past the largest write that fits a single frame.
        assert!(matches!(
            session.write_tag(MemoryBank::User, 0, &[0u8; MAX_WRITE_DATA_LEN + 2], [0; 4]),
            Err(ReaderError::InvalidParameter(_))
        ));
        assert!(matches!(
            session.write_tag_block(MemoryBank::User, 0, &[0u8; 246], [0; 4]),
            Err(ReaderError::InvalidParameter(_))
        ));
        assert!(matches!(
            session.set_user_frequency_region(915_000, 5, 0),
            Err(ReaderError::InvalidParameter(_))
        ));
    }

    #[test]
    fn set_address_updates_session_before_any_reply() {
        let (host, _device) = LoopbackLink::pair();
        let mut session = ReaderSession::open_with(host, 0x01, quick_config());

        // No device ever replies, yet the session address changes the
        // moment the frame is sent.
        let ack = session.set_reader_address(0x09).unwrap();
        assert!(!ack.success);
        assert_eq!(session.session_address(), 0x09);

        session.set_session_address(0x01);
        assert_eq!(session.session_address(), 0x01);
    }

    #[test]
    fn reply_timeout_yields_synthetic_fail_ack() {
        let (host, _device) = LoopbackLink::pair();
        let mut session = ReaderSession::open_with(host, 0x01, quick_config());

        let ack = session.reset().unwrap();
        assert!(!ack.success);
        assert_eq!(ack.message, "FAIL");
    }

    #[test]
    fn data_mode_timeout_is_an_error() {
        let (host, _device) = LoopbackLink::pair();
        let mut session = ReaderSession::open_with(host, 0x01, quick_config());

        assert!(matches!(
            session.firmware_version(),
            Err(ReaderError::ReplyTimeout(_))
        ));
    }

    #[test]
    fn dead_link_yields_synthetic_fail_ack() {
        let (host, device) = LoopbackLink::pair();
        let mut session = ReaderSession::open_with(host, 0x01, quick_config());
        drop(device);

        let ack = session.set_work_antenna(0).unwrap();
        assert!(!ack.success);
        assert_eq!(ack.message, "FAIL");
    }

    #[test]
    fn shutdown_stops_the_poll_task() {
        let (host, _device) = LoopbackLink::pair();
        let mut session = ReaderSession::open_with(host, 0x01, quick_config());

        assert!(session.is_connected());
        session.shutdown();
        assert!(!session.is_connected());
    }

    #[test]
    fn identifier_padded_to_twelve_bytes() {
        // Indirectly checks the padding by encoding what would go on the
        // wire; the frame itself is covered by the loopback tests.
        let mut body = [0xFFu8; IDENTIFIER_LEN];
        for (slot, byte) in body.iter_mut().zip("R2K".bytes()) {
            *slot = byte;
        }
        assert_eq!(&body[..3], b"R2K");
        assert!(body[3..].iter().all(|&b| b == 0xFF));
    }
}
