// src/catalog/settings.rs

use super::batch::ListenSpec;
use crate::common::radio::{clamp_channel, Address, CrcMode, DataRate, LinkConfig};
use crate::common::schema::FieldSchema;
use crate::common::timing::{
    DEFAULT_PACKET_DELAY, DEFAULT_READ_REPEAT_PERIOD, DEFAULT_RESEND, DEFAULT_RETRANSMIT,
};
use alloc::string::String;
use core::time::Duration;

/// Link and timing settings from the configuration header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Free text from `Info:`.
    pub info: String,
    pub channel: u8,
    pub data_rate: DataRate,
    pub dynamic_payload: bool,
    pub crc: CrcMode,
    pub retransmit: u8,
    pub address: Address,
    /// Application-level resends after the first attempt.
    pub resend: u8,
    /// Pause between packets and between retries.
    pub packet_delay: Duration,
    pub read_repeat_period: Duration,
    pub schema: FieldSchema,
    pub listen: Option<ListenSpec>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            info: String::new(),
            channel: 0,
            data_rate: DataRate::default(),
            dynamic_payload: false,
            crc: CrcMode::default(),
            retransmit: DEFAULT_RETRANSMIT,
            address: Address::new(),
            resend: DEFAULT_RESEND,
            packet_delay: DEFAULT_PACKET_DELAY,
            read_repeat_period: DEFAULT_READ_REPEAT_PERIOD,
            schema: FieldSchema::default(),
            listen: None,
        }
    }
}

impl Settings {
    /// Link setup for the given address with the current radio settings.
    pub fn link_config(&self, address: &Address) -> LinkConfig {
        LinkConfig {
            address: address.clone(),
            channel: self.channel,
            data_rate: self.data_rate,
            crc: self.crc,
            retransmit: self.retransmit,
            dynamic_payload: self.dynamic_payload,
            payload_width: self.schema.payload_size() as u8,
        }
    }

    pub fn set_channel(&mut self, channel: i32) {
        self.channel = clamp_channel(channel);
    }

    pub(crate) fn packet_delay_ms(&self) -> u32 {
        u32::try_from(self.packet_delay.as_millis()).unwrap_or(u32::MAX)
    }
}
