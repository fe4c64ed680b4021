// tests/common/mod.rs

#![allow(dead_code)]

use nrf24_batch::common::{Frame, LinkConfig, RadioClock, Transceiver};
use nrf24_batch::{Catalog, EngineContext};
use std::collections::VecDeque;
use std::time::Duration;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SimInstant(pub u64);

impl std::ops::Sub for SimInstant {
    type Output = Duration;
    fn sub(self, rhs: SimInstant) -> Duration {
        Duration::from_micros(self.0.saturating_sub(rhs.0))
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SimFault;

/// Scripted peer: ACKs every packet unless told otherwise and answers from a queue.
pub struct SimRadio {
    pub now_us: u64,
    pub ack: bool,
    pub responses: VecDeque<Vec<u8>>,
    pub sent: Vec<Vec<u8>>,
    pub configs: Vec<LinkConfig>,
}

impl SimRadio {
    pub fn new() -> Self {
        SimRadio {
            now_us: 0,
            ack: true,
            responses: VecDeque::new(),
            sent: Vec::new(),
            configs: Vec::new(),
        }
    }

    pub fn respond(&mut self, bytes: &[u8]) {
        self.responses.push_back(bytes.to_vec());
    }
}

impl RadioClock for SimRadio {
    type Instant = SimInstant;

    fn now(&self) -> SimInstant {
        SimInstant(self.now_us)
    }

    fn delay_ms(&mut self, ms: u32) {
        self.now_us += u64::from(ms) * 1000;
    }
}

impl Transceiver for SimRadio {
    type Error = SimFault;

    fn configure(&mut self, config: &LinkConfig) -> Result<(), SimFault> {
        self.configs.push(config.clone());
        Ok(())
    }

    fn transmit(&mut self, payload: &[u8]) -> bool {
        self.sent.push(payload.to_vec());
        self.ack
    }

    fn enter_receive_mode(&mut self) {}

    fn poll_receive(&mut self, _max_width: u8) -> nb::Result<Frame, SimFault> {
        match self.responses.pop_front() {
            Some(bytes) => Ok(bytes.into_iter().collect()),
            None => Err(nb::Error::WouldBlock),
        }
    }

    fn flush(&mut self) {}
}

pub fn engine(config: &str) -> EngineContext<SimRadio> {
    let catalog = Catalog::parse(config).expect("valid configuration");
    EngineContext::new(SimRadio::new(), catalog)
}

/// Advances the simulated clock by `step_ms` before every tick.
pub fn run_ticks(engine: &mut EngineContext<SimRadio>, ticks: usize, step_ms: u64) {
    for _ in 0..ticks {
        engine.interface_mut().now_us += step_ms * 1000;
        engine.tick();
    }
}
