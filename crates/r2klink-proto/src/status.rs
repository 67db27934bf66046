//! Status-byte taxonomy.
//!
//! Every acknowledgement and tag-stream error carries one of these codes.
//! Code ranges group by fault class: 0x1x general result, 0x2x
//! device/hardware, 0x3x tag operations, 0x4x parameter validation,
//! 0x5x RF/calibration, plus 0xEE for return-loss measurement.

pub const SUCCESS: u8 = 0x10;
pub const FAIL: u8 = 0x11;

pub const MCU_RESET_ERROR: u8 = 0x20;
pub const CW_ON_ERROR: u8 = 0x21;
pub const ANTENNA_MISSING_ERROR: u8 = 0x22;
pub const WRITE_FLASH_ERROR: u8 = 0x23;
pub const READ_FLASH_ERROR: u8 = 0x24;
pub const SET_OUTPUT_POWER_ERROR: u8 = 0x25;

pub const TAG_INVENTORY_ERROR: u8 = 0x31;
pub const TAG_READ_ERROR: u8 = 0x32;
pub const TAG_WRITE_ERROR: u8 = 0x33;
pub const TAG_LOCK_ERROR: u8 = 0x34;
pub const TAG_KILL_ERROR: u8 = 0x35;
pub const NO_TAG_ERROR: u8 = 0x36;
pub const INVENTORY_OK_BUT_ACCESS_FAIL: u8 = 0x37;
pub const BUFFER_IS_EMPTY_ERROR: u8 = 0x38;
pub const NXP_CUSTOM_COMMAND_FAIL: u8 = 0x3C;

pub const ACCESS_OR_PASSWORD_ERROR: u8 = 0x40;
pub const PARAMETER_INVALID: u8 = 0x41;
pub const PARAMETER_INVALID_WORDCNT_TOO_LONG: u8 = 0x42;
pub const PARAMETER_INVALID_MEMBANK_OUT_OF_RANGE: u8 = 0x43;
pub const PARAMETER_INVALID_LOCK_REGION_OUT_OF_RANGE: u8 = 0x44;
pub const PARAMETER_INVALID_LOCK_ACTION_OUT_OF_RANGE: u8 = 0x45;
pub const PARAMETER_READER_ADDRESS_INVALID: u8 = 0x46;
pub const PARAMETER_INVALID_ANTENNA_ID_OUT_OF_RANGE: u8 = 0x47;
pub const PARAMETER_INVALID_OUTPUT_POWER_OUT_OF_RANGE: u8 = 0x48;
pub const PARAMETER_INVALID_FREQUENCY_REGION_OUT_OF_RANGE: u8 = 0x49;
pub const PARAMETER_INVALID_BAUDRATE_OUT_OF_RANGE: u8 = 0x4A;
pub const PARAMETER_BEEPER_MODE_OUT_OF_RANGE: u8 = 0x4B;
pub const PARAMETER_EPC_MATCH_LEN_TOO_LONG: u8 = 0x4C;
pub const PARAMETER_EPC_MATCH_LEN_ERROR: u8 = 0x4D;
pub const PARAMETER_INVALID_EPC_MATCH_MODE: u8 = 0x4E;
pub const PARAMETER_INVALID_FREQUENCY_RANGE: u8 = 0x4F;

pub const FAIL_TO_GET_RN16_FROM_TAG: u8 = 0x50;
pub const PARAMETER_INVALID_DRM_MODE: u8 = 0x51;
pub const PLL_LOCK_FAIL: u8 = 0x52;
pub const RF_CHIP_FAIL_TO_RESPONSE: u8 = 0x53;
pub const FAIL_TO_ACHIEVE_DESIRED_OUTPUT_POWER: u8 = 0x54;
pub const COPYRIGHT_AUTHENTICATION_FAIL: u8 = 0x55;
pub const SPECTRUM_REGULATION_ERROR: u8 = 0x56;
pub const OUTPUT_POWER_TOO_LOW: u8 = 0x57;

pub const FAIL_TO_GET_RF_PORT_RETURN_LOSS: u8 = 0xEE;

/// True only for the explicit SUCCESS code.
///
/// Deliberately strict: [`status_message`] falls back to `"SUCCESS"` for
/// unmapped codes, so the message string must never be used as a success
/// test.
pub fn is_success(code: u8) -> bool {
    code == SUCCESS
}

/// Fault class of a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCategory {
    /// 0x10/0x11: plain success or failure.
    General,
    /// 0x2x: MCU, flash, antenna and power hardware faults.
    Device,
    /// 0x3x: inventory/read/write/lock/kill tag-operation faults.
    TagOperation,
    /// 0x4x: range/format errors for settable parameters.
    Parameter,
    /// 0x5x: PLL, RF chip and spectrum-regulation faults.
    RfCalibration,
    /// 0xEE: return-loss measurement failure.
    ReturnLoss,
    /// Anything the taxonomy does not name.
    Unknown,
}

/// Classify a status byte by code range.
pub fn status_category(code: u8) -> StatusCategory {
    match code {
        0x10 | 0x11 => StatusCategory::General,
        0x20..=0x25 => StatusCategory::Device,
        0x31..=0x38 | 0x3C => StatusCategory::TagOperation,
        0x40..=0x4F => StatusCategory::Parameter,
        0x50..=0x57 => StatusCategory::RfCalibration,
        0xEE => StatusCategory::ReturnLoss,
        _ => StatusCategory::Unknown,
    }
}

/// Human-readable message for a status byte.
///
/// Unrecognized codes fall back to `"SUCCESS"` — this mirrors the reader
/// vendor's reference driver and is part of the observable contract.
/// Use [`is_success`] to test for success, never this string.
pub fn status_message(code: u8) -> &'static str {
    match code {
        FAIL => "FAIL",

        MCU_RESET_ERROR => "MCU reset error.",
        CW_ON_ERROR => "CW on error.",
        ANTENNA_MISSING_ERROR => "Antenna miss error.",
        WRITE_FLASH_ERROR => "Write flash error.",
        READ_FLASH_ERROR => "Read flash error.",
        SET_OUTPUT_POWER_ERROR => "Set output power error.",

        TAG_INVENTORY_ERROR => "Tag inventory error",
        TAG_READ_ERROR => "Tag read error",
        TAG_WRITE_ERROR => "Tag write error",
        TAG_LOCK_ERROR => "Tag lock error",
        TAG_KILL_ERROR => "Tag kill error",
        NO_TAG_ERROR => "No tag error",
        INVENTORY_OK_BUT_ACCESS_FAIL => "Inventory is ok, but access failed.",
        BUFFER_IS_EMPTY_ERROR => "Buffer is empty.",
        NXP_CUSTOM_COMMAND_FAIL => "NXP command failed.",

        ACCESS_OR_PASSWORD_ERROR => "Access or password error.",
        PARAMETER_INVALID => "Invalid parameter.",
        PARAMETER_INVALID_WORDCNT_TOO_LONG => "Word count too long.",
        PARAMETER_INVALID_MEMBANK_OUT_OF_RANGE => "Memory bank out of range.",
        PARAMETER_INVALID_LOCK_REGION_OUT_OF_RANGE => "Lock region out of range.",
        PARAMETER_INVALID_LOCK_ACTION_OUT_OF_RANGE => "Lock action out of range.",
        PARAMETER_READER_ADDRESS_INVALID => "Reader address invalid.",
        PARAMETER_INVALID_ANTENNA_ID_OUT_OF_RANGE => "Antenna id out of range.",
        PARAMETER_INVALID_OUTPUT_POWER_OUT_OF_RANGE => "Output power out of range.",
        PARAMETER_INVALID_FREQUENCY_REGION_OUT_OF_RANGE => "Frequency region out of range.",
        PARAMETER_INVALID_BAUDRATE_OUT_OF_RANGE => "Baudrate out of range.",
        PARAMETER_BEEPER_MODE_OUT_OF_RANGE => "Beeper mode out of range.",
        PARAMETER_EPC_MATCH_LEN_TOO_LONG => "EPC match length too long.",
        PARAMETER_EPC_MATCH_LEN_ERROR => "EPC match length error.",
        PARAMETER_INVALID_EPC_MATCH_MODE => "Invalid EPC match mode.",
        PARAMETER_INVALID_FREQUENCY_RANGE => "Invalid frequency range.",

        FAIL_TO_GET_RN16_FROM_TAG => "Failed to get RN16 from tag.",
        PARAMETER_INVALID_DRM_MODE => "Invalid DRM mode.",
        PLL_LOCK_FAIL => "PLL lock failed.",
        RF_CHIP_FAIL_TO_RESPONSE => "RF chip failed to respond.",
        FAIL_TO_ACHIEVE_DESIRED_OUTPUT_POWER => "Failed to achieve desired output power.",
        COPYRIGHT_AUTHENTICATION_FAIL => "Copyright authentication failed.",
        SPECTRUM_REGULATION_ERROR => "Spectrum regulation error.",
        OUTPUT_POWER_TOO_LOW => "Output power too low.",

        FAIL_TO_GET_RF_PORT_RETURN_LOSS => "Failed to get RF port return loss.",

        _ => "SUCCESS",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_map_to_fixed_strings() {
        assert_eq!(status_message(FAIL), "FAIL");
        assert_eq!(status_message(MCU_RESET_ERROR), "MCU reset error.");
        assert_eq!(status_message(ANTENNA_MISSING_ERROR), "Antenna miss error.");
        assert_eq!(status_message(BUFFER_IS_EMPTY_ERROR), "Buffer is empty.");
        assert_eq!(status_message(PLL_LOCK_FAIL), "PLL lock failed.");
    }

    #[test]
    fn unknown_code_falls_back_to_success_string() {
        // Specified fallback behavior, inherited from the vendor driver:
        // an unmapped code renders the same string as explicit SUCCESS.
        assert_eq!(status_message(0x99), status_message(SUCCESS));
        assert_eq!(status_message(0x99), "SUCCESS");
        // The strict predicate does not share the fallback.
        assert!(!is_success(0x99));
        assert!(is_success(SUCCESS));
        assert!(!is_success(FAIL));
    }

    #[test]
    fn categories_follow_code_ranges() {
        assert_eq!(status_category(SUCCESS), StatusCategory::General);
        assert_eq!(status_category(ANTENNA_MISSING_ERROR), StatusCategory::Device);
        assert_eq!(status_category(TAG_KILL_ERROR), StatusCategory::TagOperation);
        assert_eq!(
            status_category(PARAMETER_INVALID_BAUDRATE_OUT_OF_RANGE),
            StatusCategory::Parameter
        );
        assert_eq!(
            status_category(SPECTRUM_REGULATION_ERROR),
            StatusCategory::RfCalibration
        );
        assert_eq!(
            status_category(FAIL_TO_GET_RF_PORT_RETURN_LOSS),
            StatusCategory::ReturnLoss
        );
        assert_eq!(status_category(0x99), StatusCategory::Unknown);
    }
}
