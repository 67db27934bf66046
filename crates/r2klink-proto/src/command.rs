//! R2000 command codes.
//!
//! One byte of code space; the reader echoes the command code in every
//! response frame, which is what the dispatcher classifies on.

/// A command code understood by the R2000 reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Command {
    GetGpioValue = 0x60,
    SetGpioValue = 0x61,
    SetAntConnectionDetector = 0x62,
    GetAntConnectionDetector = 0x63,
    SetTemporaryOutputPower = 0x66,
    SetReaderIdentifier = 0x67,
    GetReaderIdentifier = 0x68,
    SetRfLinkProfile = 0x69,
    GetRfLinkProfile = 0x6A,

    Reset = 0x70,
    SetUartBaudrate = 0x71,
    GetFirmwareVersion = 0x72,
    SetReaderAddress = 0x73,
    SetWorkAntenna = 0x74,
    GetWorkAntenna = 0x75,
    SetRfPower = 0x76,
    GetRfPower = 0x77,
    SetFrequencyRegion = 0x78,
    GetFrequencyRegion = 0x79,
    SetBeeperMode = 0x7A,
    GetReaderTemperature = 0x7B,
    GetRfPortReturnLoss = 0x7E,

    // ISO18000-6C
    Inventory = 0x80,
    Read = 0x81,
    Write = 0x82,
    Lock = 0x83,
    Kill = 0x84,
    SetAccessEpcMatch = 0x85,
    GetAccessEpcMatch = 0x86,

    RealTimeInventory = 0x89,
    FastSwitchAntInventory = 0x8A,
    CustomizedSessionTargetInventory = 0x8B,
    SetImpinjFastTid = 0x8C,
    SetAndSaveImpinjFastTid = 0x8D,
    GetImpinjFastTid = 0x8E,

    GetInventoryBuffer = 0x90,
    GetAndResetInventoryBuffer = 0x91,
    GetInventoryBufferTagCount = 0x92,
    ResetInventoryBuffer = 0x93,

    WriteBlock = 0x94,

    // ISO18000-6B
    Iso18000_6bInventory = 0xB0,
    Iso18000_6bRead = 0xB1,
    Iso18000_6bWrite = 0xB2,
    Iso18000_6bLock = 0xB3,
    Iso18000_6bQueryLock = 0xB4,
}

impl Command {
    /// The wire byte for this command.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// True for the commands whose responses are an asynchronous tag
    /// stream (tag reads, inventory summaries, inventory errors) rather
    /// than a single acknowledgement. Buffered `Inventory` (0x80) is
    /// deliberately not one of them: its reply arrives on the command
    /// channel like any other request.
    pub fn is_inventory_stream(self) -> bool {
        is_inventory_stream_code(self.code())
    }
}

impl From<Command> for u8 {
    fn from(command: Command) -> u8 {
        command.code()
    }
}

/// Classify a raw response command code as tag-stream traffic.
pub fn is_inventory_stream_code(code: u8) -> bool {
    matches!(
        code,
        c if c == Command::RealTimeInventory.code()
            || c == Command::FastSwitchAntInventory.code()
            || c == Command::CustomizedSessionTargetInventory.code()
            || c == Command::Iso18000_6bInventory.code()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inventory_stream_classification() {
        assert!(Command::RealTimeInventory.is_inventory_stream());
        assert!(Command::FastSwitchAntInventory.is_inventory_stream());
        assert!(Command::CustomizedSessionTargetInventory.is_inventory_stream());
        assert!(Command::Iso18000_6bInventory.is_inventory_stream());

        assert!(!Command::Inventory.is_inventory_stream());
        assert!(!Command::GetInventoryBuffer.is_inventory_stream());
        assert!(!Command::SetRfPower.is_inventory_stream());
        assert!(!Command::Reset.is_inventory_stream());
    }

    #[test]
    fn wire_codes_match_protocol_table() {
        assert_eq!(Command::Reset.code(), 0x70);
        assert_eq!(Command::SetReaderAddress.code(), 0x73);
        assert_eq!(Command::SetRfPower.code(), 0x76);
        assert_eq!(Command::RealTimeInventory.code(), 0x89);
        assert_eq!(Command::WriteBlock.code(), 0x94);
        assert_eq!(Command::Iso18000_6bQueryLock.code(), 0xB4);
    }
}
