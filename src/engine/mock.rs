// src/engine/mock.rs

use super::EngineContext;
use crate::catalog::Catalog;
use crate::common::hal_traits::{Frame, RadioClock, Transceiver};
use crate::common::radio::LinkConfig;
use alloc::collections::VecDeque;
use alloc::vec::Vec;
use core::time::Duration;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct MockInstant(pub u64);

impl core::ops::Add<Duration> for MockInstant {
    type Output = Self;
    fn add(self, rhs: Duration) -> Self {
        MockInstant(self.0.saturating_add(rhs.as_micros() as u64))
    }
}

impl core::ops::Sub<MockInstant> for MockInstant {
    type Output = Duration;
    fn sub(self, rhs: MockInstant) -> Duration {
        Duration::from_micros(self.0.saturating_sub(rhs.0))
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) struct MockRadioError;

pub(crate) struct MockRadio {
    pub current_time_us: u64,
    /// Per-transmit ACK results; `default_ack` once exhausted.
    pub acks: VecDeque<bool>,
    pub default_ack: bool,
    pub responses: VecDeque<Result<Vec<u8>, MockRadioError>>,
    pub sent: Vec<Vec<u8>>,
    pub configs: Vec<LinkConfig>,
    pub fail_configure: bool,
    pub rx_mode_calls: usize,
    pub flushes: usize,
    pub delays_ms: Vec<u32>,
}

impl MockRadio {
    pub fn new() -> Self {
        MockRadio {
            current_time_us: 0,
            acks: VecDeque::new(),
            default_ack: true,
            responses: VecDeque::new(),
            sent: Vec::new(),
            configs: Vec::new(),
            fail_configure: false,
            rx_mode_calls: 0,
            flushes: 0,
            delays_ms: Vec::new(),
        }
    }

    pub fn advance_ms(&mut self, ms: u64) {
        self.current_time_us = self.current_time_us.saturating_add(ms * 1000);
    }

    pub fn queue_response(&mut self, bytes: &[u8]) {
        self.responses.push_back(Ok(bytes.to_vec()));
    }

    pub fn queue_fault(&mut self) {
        self.responses.push_back(Err(MockRadioError));
    }
}

impl RadioClock for MockRadio {
    type Instant = MockInstant;

    fn now(&self) -> MockInstant {
        MockInstant(self.current_time_us)
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delays_ms.push(ms);
        self.advance_ms(u64::from(ms));
    }
}

impl Transceiver for MockRadio {
    type Error = MockRadioError;

    fn configure(&mut self, config: &LinkConfig) -> Result<(), MockRadioError> {
        if self.fail_configure {
            return Err(MockRadioError);
        }
        self.configs.push(config.clone());
        Ok(())
    }

    fn transmit(&mut self, payload: &[u8]) -> bool {
        self.sent.push(payload.to_vec());
        self.acks.pop_front().unwrap_or(self.default_ack)
    }

    fn enter_receive_mode(&mut self) {
        self.rx_mode_calls += 1;
    }

    fn poll_receive(&mut self, _max_width: u8) -> nb::Result<Frame, MockRadioError> {
        match self.responses.pop_front() {
            Some(Ok(bytes)) => Ok(bytes.into_iter().collect()),
            Some(Err(e)) => Err(nb::Error::Other(e)),
            None => Err(nb::Error::WouldBlock),
        }
    }

    fn flush(&mut self) {
        self.flushes += 1;
    }
}

pub(crate) fn engine_with(config: &str) -> EngineContext<MockRadio> {
    let catalog = Catalog::parse(config).unwrap();
    EngineContext::new(MockRadio::new(), catalog)
}

/// Advances the mock clock by `step_ms` before each of `ticks` ticks.
pub(crate) fn tick_for(engine: &mut EngineContext<MockRadio>, ticks: usize, step_ms: u64) {
    for _ in 0..ticks {
        engine.interface_mut().advance_ms(step_ms);
        engine.tick();
    }
}
