// src/common/radio.rs

use super::timing::{DEFAULT_RETRANSMIT, MAX_CHANNEL};
use arrayvec::ArrayVec;

/// Radio address, 2 to 5 bytes, MSB first as written in the configuration.
pub type Address = ArrayVec<u8, 5>;

/// Air data rate, selected by the `Rate:` setting (0, 1 or 2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataRate {
    #[default]
    Kbps250,
    Mbps1,
    Mbps2,
}

impl DataRate {
    pub fn from_setting(value: i32) -> Self {
        match value {
            0 => DataRate::Kbps250,
            1 => DataRate::Mbps1,
            _ => DataRate::Mbps2,
        }
    }
}

/// Hardware CRC length, selected by the `CRC:` setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CrcMode {
    #[default]
    Off,
    OneByte,
    TwoBytes,
}

impl CrcMode {
    pub fn from_setting(value: i32) -> Self {
        match value {
            1 => CrcMode::OneByte,
            2 => CrcMode::TwoBytes,
            _ => CrcMode::Off,
        }
    }
}

/// Which address the link was last configured for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkRole {
    /// Peer address, used by reads and writes.
    Command,
    /// Passive listen address.
    Listen,
}

/// Everything a transceiver needs to set up the link before a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkConfig {
    pub address: Address,
    pub channel: u8,
    pub data_rate: DataRate,
    pub crc: CrcMode,
    /// Auto-retransmit register value, delay in the high nibble, count in the low one.
    pub retransmit: u8,
    pub dynamic_payload: bool,
    /// Static payload width used when `dynamic_payload` is off.
    pub payload_width: u8,
}

impl Default for LinkConfig {
    fn default() -> Self {
        LinkConfig {
            address: Address::new(),
            channel: 0,
            data_rate: DataRate::default(),
            crc: CrcMode::default(),
            retransmit: DEFAULT_RETRANSMIT,
            dynamic_payload: false,
            payload_width: 0,
        }
    }
}

/// Clamps a requested channel to the range the radio accepts.
pub fn clamp_channel(channel: i32) -> u8 {
    channel.clamp(0, i32::from(MAX_CHANNEL)) as u8
}
