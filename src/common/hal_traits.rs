// src/common/hal_traits.rs

use super::radio::LinkConfig;
use super::schema::MAX_PAYLOAD;
use arrayvec::ArrayVec;
use core::fmt::Debug;
use core::ops::Sub;
use core::time::Duration;

/// A received packet, at most one full payload long.
pub type Frame = ArrayVec<u8, MAX_PAYLOAD>;

/// Monotonic timestamp type produced by a [`RadioClock`].
///
/// Subtracting an earlier instant from a later one must give the elapsed time.
pub trait RadioInstant: Copy + Ord + Debug + Sub<Self, Output = Duration> {}

impl<T> RadioInstant for T where T: Copy + Ord + Debug + Sub<T, Output = Duration> {}

/// Abstraction for the time source and blocking delays the engine needs.
pub trait RadioClock {
    type Instant: RadioInstant;

    /// Current monotonic time.
    fn now(&self) -> Self::Instant;

    /// Block for at least the given number of milliseconds.
    fn delay_ms(&mut self, ms: u32);
}

/// Abstraction for an ACK-capable packet transceiver (nRF24L01+ style).
pub trait Transceiver {
    /// Associated error type for hardware faults.
    type Error: Debug;

    /// Applies address, channel, rate, CRC, retransmit and payload-width settings.
    fn configure(&mut self, config: &LinkConfig) -> Result<(), Self::Error>;

    /// Sends one packet and waits for the hardware acknowledgement.
    ///
    /// Returns `true` if the peer acknowledged, `false` once the hardware
    /// auto-retransmit gave up.
    fn transmit(&mut self, payload: &[u8]) -> bool;

    /// Switches the radio to receive on the configured address.
    fn enter_receive_mode(&mut self);

    /// Attempts to fetch one received packet.
    ///
    /// `max_width` is the static payload width, or 0 when dynamic payloads are on.
    /// Returns `Err(nb::Error::WouldBlock)` if nothing has arrived yet.
    /// Hardware faults are returned as `Err(nb::Error::Other(Self::Error))`.
    fn poll_receive(&mut self, max_width: u8) -> nb::Result<Frame, Self::Error>;

    /// Drops anything pending in the transmit and receive FIFOs.
    fn flush(&mut self);
}
