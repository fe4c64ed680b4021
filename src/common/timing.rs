// src/common/timing.rs

use core::time::Duration;

// === Read Transactions ===

/// How long a read waits for the peer's answer after an acknowledged request
/// before it resends (or gives up with a timeout).
pub const READ_TIMEOUT: Duration = Duration::from_millis(300);

/// Nominal period at which the host is expected to call `tick()`.
pub const TICK_PERIOD: Duration = Duration::from_millis(2);

/// Receive polls attempted per tick while waiting for a response.
pub const RECEIVE_POLLS_PER_TICK: usize = 3;

// === Configuration Defaults ===

/// Pause between consecutive packets (and between retries) unless `Delay_ms:` overrides it.
pub const DEFAULT_PACKET_DELAY: Duration = Duration::from_millis(10);

/// Application-level resends after the first attempt unless `Resend:` overrides it.
pub const DEFAULT_RESEND: u8 = 1;

/// Period of the repeating read command unless `ReadCmd repeat:` overrides it.
pub const DEFAULT_READ_REPEAT_PERIOD: Duration = Duration::from_secs(10);

/// Hardware auto-retransmit setting (delay/count nibbles) unless `RETR:` overrides it.
pub const DEFAULT_RETRANSMIT: u8 = 0x3F;

// === Radio Limits ===

/// Highest RF channel accepted; larger values are clamped.
pub const MAX_CHANNEL: u8 = 125;
