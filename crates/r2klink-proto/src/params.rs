//! Settable-parameter types for reader commands.
//!
//! Wire encodings follow the R2000 serial protocol; each type carries its
//! one-byte code, and [`FastSwitchPlan`] packs the ten-byte fast-switch
//! inventory schedule.

/// Gen2 tag memory bank selector for read/write operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum MemoryBank {
    Reserved = 0,
    #[default]
    Epc = 1,
    Tid = 2,
    User = 3,
}

/// Regulatory frequency region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Region {
    Fcc = 1,
    Etsi = 2,
    Chn = 3,
    User = 4,
}

/// RF link profile (Tari / modulation / backscatter rate presets).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum RfLinkProfile {
    /// Tari 25 us, FM0 40 KHz.
    Profile0 = 0xD0,
    /// Tari 25 us, Miller 4 250 KHz (reader default).
    Profile1 = 0xD1,
    /// Tari 25 us, Miller 4 300 KHz.
    Profile2 = 0xD2,
    /// Tari 6.25 us, FM0 400 KHz.
    Profile3 = 0xD3,
}

/// Lockable memory region for the LOCK command.
///
/// Distinct from [`MemoryBank`]: the lock command uses its own bank codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum LockBank {
    User = 1,
    Tid = 2,
    Epc = 3,
    AccessPassword = 4,
    KillPassword = 5,
}

/// Lock state transition for the LOCK command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum LockAction {
    Open = 0,
    Lock = 1,
    OpenForever = 2,
    LockForever = 3,
}

/// Gen2 inventory session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum InventorySession {
    S0 = 0,
    #[default]
    S1 = 1,
    S2 = 2,
    S3 = 3,
}

/// Gen2 inventoried-flag target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum SessionTarget {
    #[default]
    A = 0,
    B = 1,
}

/// UART baudrate supported by the reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Baudrate {
    B38400,
    #[default]
    B115200,
}

impl Baudrate {
    /// The selector byte the SET_UART_BAUDRATE command expects.
    pub fn code(self) -> u8 {
        match self {
            Baudrate::B38400 => 3,
            Baudrate::B115200 => 4,
        }
    }
}

/// Antenna slot in a fast-switch inventory schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum FastSwitchAntenna {
    #[default]
    Ant1 = 0x00,
    Ant2 = 0x01,
    Ant3 = 0x02,
    Ant4 = 0x03,
    Disabled = 0xFF,
}

/// Schedule for fast-switch-antenna inventory: four antenna slots with
/// per-slot dwell loops, an inter-slot rest interval (ms), and an overall
/// repeat count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FastSwitchPlan {
    pub a: FastSwitchAntenna,
    pub a_loop: u8,
    pub b: FastSwitchAntenna,
    pub b_loop: u8,
    pub c: FastSwitchAntenna,
    pub c_loop: u8,
    pub d: FastSwitchAntenna,
    pub d_loop: u8,
    pub interval_ms: u8,
    pub repeat: u8,
}

impl Default for FastSwitchPlan {
    fn default() -> Self {
        Self {
            a: FastSwitchAntenna::Ant1,
            a_loop: 1,
            b: FastSwitchAntenna::Disabled,
            b_loop: 1,
            c: FastSwitchAntenna::Disabled,
            c_loop: 1,
            d: FastSwitchAntenna::Disabled,
            d_loop: 1,
            interval_ms: 0,
            repeat: 1,
        }
    }
}

impl FastSwitchPlan {
    /// Pack the schedule into the command payload layout.
    pub fn to_payload(self) -> [u8; 10] {
        [
            self.a as u8,
            self.a_loop,
            self.b as u8,
            self.b_loop,
            self.c as u8,
            self.c_loop,
            self.d as u8,
            self.d_loop,
            self.interval_ms,
            self.repeat,
        ]
    }
}
