use bytes::Bytes;
use r2klink_frame::Frame;

use crate::command::Command;
use crate::status;

/// Carrier frequency table, indexed by the 6-bit frequency field of a tag
/// record: the seven ETSI channels 865.0–868.0 MHz, then the 53 FCC
/// channels 902.0–928.0 MHz, all in 500 kHz steps.
pub const FREQUENCY_TABLE_MHZ: [f64; 60] = [
    865.0, 865.5, 866.0, 866.5, 867.0, 867.5, 868.0, // ETSI
    902.0, 902.5, 903.0, 903.5, 904.0, 904.5, 905.0, 905.5, // FCC
    906.0, 906.5, 907.0, 907.5, 908.0, 908.5, 909.0, 909.5,
    910.0, 910.5, 911.0, 911.5, 912.0, 912.5, 913.0, 913.5,
    914.0, 914.5, 915.0, 915.5, 916.0, 916.5, 917.0, 917.5,
    918.0, 918.5, 919.0, 919.5, 920.0, 920.5, 921.0, 921.5,
    922.0, 922.5, 923.0, 923.5, 924.0, 924.5, 925.0, 925.5,
    926.0, 926.5, 927.0, 927.5, 928.0,
];

/// Fixed baseline subtracted from the raw RSSI byte to get dBm.
pub const RSSI_BASELINE: i32 = 129;

/// Frame length field marking an inventory "operation completed" summary.
const DONE_FRAME_LENGTH: u8 = 0x0A;

/// Frame length field marking an inventory error report.
const ERROR_FRAME_LENGTH: u8 = 0x04;

/// One decoded tag read.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TagRead {
    /// Antenna the tag was seen on, 1-4.
    pub antenna: u8,
    /// Carrier frequency of the read, from [`FREQUENCY_TABLE_MHZ`].
    pub frequency_mhz: f64,
    /// Received signal strength in dBm.
    pub rssi_dbm: i32,
    /// The tag's EPC.
    pub epc: Bytes,
}

impl TagRead {
    /// The EPC as uppercase hex digit pairs, the conventional rendering.
    pub fn epc_hex(&self) -> String {
        self.epc.iter().map(|b| format!("{b:02X}")).collect()
    }
}

/// One event on the asynchronous tag stream.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TagEvent {
    /// A single tag read.
    Tag(TagRead),
    /// An inventory round finished.
    InventoryDone { total_read: u32, duration_ms: u32 },
    /// The reader reported an inventory fault.
    InventoryError { message: String },
}

/// Errors for payloads the bit-field decoder cannot make sense of.
///
/// These indicate a malformed or misclassified frame, not a device fault —
/// device faults decode to [`TagEvent::InventoryError`].
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The payload is empty where at least a status byte was expected.
    #[error("empty inventory payload")]
    EmptyPayload,

    /// The payload ends before a declared field.
    #[error("payload too short for {field} ({len} bytes)")]
    Truncated { field: &'static str, len: usize },

    /// The 6-bit frequency field indexes past the frequency table.
    #[error("frequency index {index} out of table range")]
    FrequencyIndex { index: usize },
}

/// Decode the payload of an inventory-class response frame into a tag
/// event.
///
/// Layout varies with the frame's declared length field and command:
/// summary frames (`length == 0x0A`) and error frames (`length == 0x04`)
/// carry counters or a status byte; everything else is a single tag
/// record of antenna/frequency bits, PC word, EPC and trailing RSSI.
pub fn decode_tag_event(frame: &Frame) -> Result<TagEvent, DecodeError> {
    let payload = frame.payload.as_ref();

    if payload.is_empty() {
        return Err(DecodeError::EmptyPayload);
    }
    if payload.len() <= 1 {
        return Ok(TagEvent::InventoryError {
            message: status::status_message(payload[0]).to_string(),
        });
    }

    if frame.length == DONE_FRAME_LENGTH {
        return decode_inventory_done(frame.command, payload);
    }
    if frame.length == ERROR_FRAME_LENGTH {
        return Ok(TagEvent::InventoryError {
            message: status::status_message(payload[0]).to_string(),
        });
    }

    decode_tag_record(payload)
}

fn decode_inventory_done(command: u8, payload: &[u8]) -> Result<TagEvent, DecodeError> {
    if payload.len() < 7 {
        return Err(DecodeError::Truncated {
            field: "inventory summary",
            len: payload.len(),
        });
    }

    let realtime = command == Command::RealTimeInventory.code()
        || command == Command::CustomizedSessionTargetInventory.code();

    let (total_read, duration_ms) = if realtime {
        // AntID(1) -- ReadRate(2, BE) -- TotalRead(4, BE)
        let duration = u16::from_be_bytes([payload[1], payload[2]]) as u32;
        let total = u32::from_be_bytes([payload[3], payload[4], payload[5], payload[6]]);
        (total, duration)
    } else {
        // TotalRead(3, BE) -- CommandDuration(4, BE)
        let total = u32::from_be_bytes([0, payload[0], payload[1], payload[2]]);
        let duration = u32::from_be_bytes([payload[3], payload[4], payload[5], payload[6]]);
        (total, duration)
    };

    Ok(TagEvent::InventoryDone {
        total_read,
        duration_ms,
    })
}

fn decode_tag_record(payload: &[u8]) -> Result<TagEvent, DecodeError> {
    let antenna = (payload[0] & 0x03) + 1;
    let freq_index = ((payload[0] >> 2) & 0x3F) as usize;
    let frequency_mhz = *FREQUENCY_TABLE_MHZ
        .get(freq_index)
        .ok_or(DecodeError::FrequencyIndex { index: freq_index })?;

    if payload.len() < 3 {
        // A two-byte record is how the reader reports a disconnected
        // antenna mid-inventory.
        if payload[1] == status::ANTENNA_MISSING_ERROR {
            return Ok(TagEvent::InventoryError {
                message: format!("Antenna-{antenna} disconnect."),
            });
        }
        return Err(DecodeError::Truncated {
            field: "PC word",
            len: payload.len(),
        });
    }

    let pc = u16::from_be_bytes([payload[1], payload[2]]);
    // PC bits 15-11 give the EPC length in 16-bit words; shifting by 10
    // doubles it into bytes, masked even.
    let epc_len = (((pc & 0xF800) >> 10) & 0x3E) as usize;
    if epc_len == 0 {
        return Ok(TagEvent::InventoryError {
            message: "Nothing!".to_string(),
        });
    }
    if payload.len() < 3 + epc_len {
        return Err(DecodeError::Truncated {
            field: "EPC",
            len: payload.len(),
        });
    }

    let epc = Bytes::copy_from_slice(&payload[3..3 + epc_len]);
    let rssi_dbm = payload[payload.len() - 1] as i32 - RSSI_BASELINE;

    Ok(TagEvent::Tag(TagRead {
        antenna,
        frequency_mhz,
        rssi_dbm,
        epc,
    }))
}

#[cfg(test)]
mod tests {
    use r2klink_frame::{encode_frame, validate_frame};

    use super::*;

    const ADDR: u8 = 0x01;

    fn frame(command: Command, payload: &[u8]) -> Frame {
        let wire = encode_frame(ADDR, command.code(), payload);
        validate_frame(&wire, ADDR).unwrap()
    }

    #[test]
    fn decodes_single_tag_record() {
        // Antenna field 0x04: antenna 1, frequency index 1 (865.5 MHz).
        // PC 0x3000: EPC length 6 words = 12 bytes. Trailing 0x94: RSSI
        // 148 - 129 = 19 dBm.
        let mut payload = vec![0x04, 0x30, 0x00];
        payload.extend_from_slice(&[
            0xE2, 0x00, 0x18, 0x29, 0x94, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07,
        ]);
        payload.push(0x94);

        let event = decode_tag_event(&frame(Command::RealTimeInventory, &payload)).unwrap();
        let TagEvent::Tag(tag) = event else {
            panic!("expected tag read, got {event:?}");
        };
        assert_eq!(tag.antenna, 1);
        assert_eq!(tag.frequency_mhz, 865.5);
        assert_eq!(tag.rssi_dbm, 19);
        assert_eq!(tag.epc.len(), 12);
        assert_eq!(tag.epc_hex(), "E20018299401020304050607");
    }

    #[test]
    fn antenna_and_frequency_bit_fields() {
        // Low two bits select the antenna, upper six the frequency slot.
        // PC 0x0800: one EPC word.
        let mut payload = vec![(7 << 2) | 0x02, 0x08, 0x00];
        payload.extend_from_slice(&[0xAA, 0xBB]);
        payload.push(129);

        let event = decode_tag_event(&frame(Command::FastSwitchAntInventory, &payload)).unwrap();
        let TagEvent::Tag(tag) = event else {
            panic!("expected tag read, got {event:?}");
        };
        assert_eq!(tag.antenna, 3);
        assert_eq!(tag.frequency_mhz, 902.0);
        assert_eq!(tag.rssi_dbm, 0);
        assert_eq!(tag.epc_hex(), "AABB");
    }

    #[test]
    fn realtime_done_layout() {
        // AntID 0x01, read rate 0x0123, total 0x00000456; length field is
        // fixed 0x0A for summary frames.
        let payload = [0x01, 0x01, 0x23, 0x00, 0x00, 0x04, 0x56];
        let event = decode_tag_event(&frame(Command::RealTimeInventory, &payload)).unwrap();
        assert_eq!(
            event,
            TagEvent::InventoryDone {
                total_read: 0x456,
                duration_ms: 0x0123,
            }
        );
    }

    #[test]
    fn session_target_done_uses_realtime_layout() {
        let payload = [0x02, 0x00, 0x64, 0x00, 0x00, 0x00, 0x0A];
        let event = decode_tag_event(&frame(
            Command::CustomizedSessionTargetInventory,
            &payload,
        ))
        .unwrap();
        assert_eq!(
            event,
            TagEvent::InventoryDone {
                total_read: 10,
                duration_ms: 100,
            }
        );
    }

    #[test]
    fn non_realtime_done_layout() {
        // TotalRead as 24-bit BE at offset 0, duration 32-bit BE at 3.
        let payload = [0x00, 0x02, 0x2B, 0x00, 0x00, 0x03, 0xE8];
        let event = decode_tag_event(&frame(Command::Iso18000_6bInventory, &payload)).unwrap();
        assert_eq!(
            event,
            TagEvent::InventoryDone {
                total_read: 555,
                duration_ms: 1000,
            }
        );
    }

    #[test]
    fn single_status_byte_becomes_inventory_error() {
        let event =
            decode_tag_event(&frame(Command::RealTimeInventory, &[status::TAG_INVENTORY_ERROR]))
                .unwrap();
        assert_eq!(
            event,
            TagEvent::InventoryError {
                message: "Tag inventory error".to_string(),
            }
        );
    }

    #[test]
    fn antenna_disconnect_record() {
        let event = decode_tag_event(&frame(
            Command::RealTimeInventory,
            &[0x01, status::ANTENNA_MISSING_ERROR],
        ))
        .unwrap();
        assert_eq!(
            event,
            TagEvent::InventoryError {
                message: "Antenna-2 disconnect.".to_string(),
            }
        );
    }

    #[test]
    fn zero_epc_length_reports_nothing() {
        let payload = [0x00, 0x00, 0x00, 0x81];
        let event = decode_tag_event(&frame(Command::RealTimeInventory, &payload)).unwrap();
        assert_eq!(
            event,
            TagEvent::InventoryError {
                message: "Nothing!".to_string(),
            }
        );
    }

    #[test]
    fn truncated_epc_is_a_decode_error() {
        // PC claims 12 EPC bytes, payload carries 5.
        let payload = [0x00, 0x30, 0x00, 0x01, 0x02, 0x03, 0x04, 0x05];
        let err = decode_tag_event(&frame(Command::RealTimeInventory, &payload)).unwrap_err();
        assert!(matches!(err, DecodeError::Truncated { field: "EPC", .. }));
    }

    #[test]
    fn frequency_index_out_of_range_is_a_decode_error() {
        // Index 63 is past the 60-entry table.
        let payload = [0xFC, 0x10, 0x00, 0xAA, 0xBB, 0x81];
        let err = decode_tag_event(&frame(Command::RealTimeInventory, &payload)).unwrap_err();
        assert!(matches!(err, DecodeError::FrequencyIndex { index: 63 }));
    }

    #[test]
    fn empty_payload_is_a_decode_error() {
        let f = Frame {
            length: 3,
            address: ADDR,
            command: Command::RealTimeInventory.code(),
            payload: Bytes::new(),
        };
        assert!(matches!(
            decode_tag_event(&f),
            Err(DecodeError::EmptyPayload)
        ));
    }

    #[test]
    fn frequency_table_shape() {
        assert_eq!(FREQUENCY_TABLE_MHZ.len(), 60);
        assert_eq!(FREQUENCY_TABLE_MHZ[0], 865.0);
        assert_eq!(FREQUENCY_TABLE_MHZ[6], 868.0);
        assert_eq!(FREQUENCY_TABLE_MHZ[7], 902.0);
        assert_eq!(FREQUENCY_TABLE_MHZ[59], 928.0);
        for window in FREQUENCY_TABLE_MHZ.windows(2) {
            let step = window[1] - window[0];
            assert!(step == 0.5 || (window[0] == 868.0 && window[1] == 902.0));
        }
    }
}
