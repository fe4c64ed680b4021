// src/engine/mod.rs

pub mod batch_log;
pub mod state;

mod listen;
mod read;
mod save;
mod write;

#[cfg(test)]
pub(crate) mod mock;

pub use batch_log::BatchLog;
pub use listen::ListenStats;
pub use state::{ActiveBatch, BatchCursor, Mode, Status, TxState};

use crate::catalog::Catalog;
use crate::common::{
    error::{ConfigError, EngineError, Failure, TransportError},
    hal_traits::{RadioClock, Transceiver},
    number::HexBytes,
    radio::{clamp_channel, Address, LinkRole},
    schema::{PayloadBuf, MAX_PAYLOAD},
};
use alloc::string::String;
use alloc::vec::Vec;
use core::time::Duration;
use read::ReadProgress;
use write::WriteRun;

/// Drives reads, batches and listening over one exclusively owned transceiver.
///
/// The host calls [`tick`](Self::tick) every couple of milliseconds
/// (see [`TICK_PERIOD`](crate::common::timing::TICK_PERIOD)). Reads progress
/// across ticks; write steps block inside the call that runs them.
pub struct EngineContext<IF>
where
    IF: Transceiver + RadioClock,
{
    interface: IF,
    catalog: Catalog,
    log: BatchLog,
    state: TxState,
    mode: Option<Mode>,
    failure: Option<Failure>,
    /// Log line of the write step that failed.
    error_line: Option<usize>,
    retries: u8,
    /// Next array element is due; sending it does not count as a retry.
    continuation: bool,
    last_activity: Option<<IF as RadioClock>::Instant>,
    /// Address the radio was last configured for, `None` when it must be reconfigured.
    link: Option<LinkRole>,
    payload: PayloadBuf,
    read: Option<ReadProgress>,
    current_read: Option<usize>,
    read_repeat: bool,
    read_batch: Option<ActiveBatch>,
    read_refs: Vec<String>,
    write_batch: Option<WriteRun>,
    listen: ListenStats<<IF as RadioClock>::Instant>,
}

impl<IF> EngineContext<IF>
where
    IF: Transceiver + RadioClock,
{
    pub fn new(interface: IF, catalog: Catalog) -> Self {
        EngineContext {
            interface,
            catalog,
            log: BatchLog::new(),
            state: TxState::Idle,
            mode: None,
            failure: None,
            error_line: None,
            retries: 0,
            continuation: false,
            last_activity: None,
            link: None,
            payload: [0; MAX_PAYLOAD],
            read: None,
            current_read: None,
            read_repeat: false,
            read_batch: None,
            read_refs: Vec::new(),
            write_batch: None,
            listen: ListenStats::default(),
        }
    }

    // --- Accessors ---

    pub fn interface(&self) -> &IF {
        &self.interface
    }

    pub fn interface_mut(&mut self) -> &mut IF {
        &mut self.interface
    }

    /// Gives back the transceiver and catalog.
    pub fn release(self) -> (IF, Catalog) {
        (self.interface, self.catalog)
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn log(&self) -> &BatchLog {
        &self.log
    }

    /// Mutable log, for editing a prepared write batch before running it.
    pub fn log_mut(&mut self) -> &mut BatchLog {
        &mut self.log
    }

    pub fn state(&self) -> TxState {
        self.state
    }

    pub fn mode(&self) -> Option<Mode> {
        self.mode
    }

    pub fn failure(&self) -> Option<&Failure> {
        self.failure.as_ref()
    }

    pub fn error_line(&self) -> Option<usize> {
        self.error_line
    }

    /// Resends used so far by the current packet.
    pub fn retries(&self) -> u8 {
        self.retries
    }

    pub fn read_batch(&self) -> Option<&ActiveBatch> {
        self.read_batch.as_ref()
    }

    pub fn write_batch(&self) -> Option<&ActiveBatch> {
        self.write_batch.as_ref().map(|run| &run.batch)
    }

    pub fn status(&self) -> Status {
        match self.state {
            TxState::Idle => Status::Idle,
            TxState::Sending => Status::Sending,
            TxState::Receiving if self.mode == Some(Mode::Listen) => Status::Listening,
            TxState::Receiving => Status::Receiving,
            TxState::Ok if self.batch_finished() => Status::Ok,
            TxState::Ok => Status::Working,
            TxState::Error => Status::Failed,
            TxState::Timeout => Status::Timeout,
        }
    }

    fn batch_finished(&self) -> bool {
        match self.mode {
            Some(Mode::ReadBatch) => self.read_batch.map_or(true, |b| b.cursor.is_finished()),
            Some(mode) if mode.is_write() => self
                .write_batch
                .as_ref()
                .map_or(true, |run| run.batch.cursor.is_finished()),
            _ => true,
        }
    }

    // --- Overrides ---

    /// Replaces the peer address. The radio is reconfigured before the next transaction.
    pub fn set_address(&mut self, address: &[u8]) -> Result<(), ConfigError> {
        let address = parse_address(address)?;
        self.catalog.settings_mut().address = address;
        self.link = None;
        Ok(())
    }

    /// Replaces the channel, clamped to the radio's range.
    pub fn set_channel(&mut self, channel: u8) {
        self.catalog.settings_mut().channel = clamp_channel(i32::from(channel));
        self.link = None;
    }

    /// Replaces the listen address, if a listen line was configured.
    pub fn set_listen_address(&mut self, address: &[u8]) -> Result<(), ConfigError> {
        let address = parse_address(address)?;
        if let Some(listen) = self.catalog.settings_mut().listen.as_mut() {
            listen.address = address;
        }
        self.link = None;
        Ok(())
    }

    // --- Scheduling ---

    /// Advances the running operation. Call periodically.
    pub fn tick(&mut self) {
        let Some(mode) = self.mode else {
            return;
        };

        if mode == Mode::ReadCommand
            && self.read_repeat
            && self.elapsed() > self.catalog.settings().read_repeat_period
        {
            if let Some(index) = self.current_read {
                self.log.clear();
                if let Err(e) = self.start_read(index) {
                    log::debug!("Repeated read failed: {}", e);
                }
            }
            return;
        }

        match self.state {
            TxState::Sending if mode.expects_response() => self.tick_sending(),
            TxState::Receiving => self.poll_receive(mode),
            TxState::Ok => self.tick_advance(mode),
            _ => {}
        }
    }

    fn tick_advance(&mut self, mode: Mode) {
        if self.elapsed() < self.catalog.settings().packet_delay {
            return;
        }
        let result = match mode {
            Mode::ReadBatch => match self.read_batch.as_mut().and_then(ActiveBatch::advance) {
                Some(step) => self.run_read_batch_step(step),
                None => Ok(()),
            },
            Mode::WriteBatch | Mode::SetBatch => {
                match self.write_batch.as_mut().and_then(|run| run.batch.advance()) {
                    Some(step) => self.run_write_step(step),
                    None => Ok(()),
                }
            }
            _ => Ok(()),
        };
        if let Err(e) = result {
            log::debug!("Batch step failed: {}", e);
        }
    }

    /// Stops whatever is running. Logs and batch cursors are kept.
    pub fn cancel(&mut self) {
        self.state = TxState::Idle;
        self.mode = None;
        self.failure = None;
        self.error_line = None;
        self.retries = 0;
        self.continuation = false;
        self.read = None;
    }

    // --- Shared helpers ---

    /// Resets per-run state before starting `mode`.
    fn begin(&mut self, mode: Mode) {
        self.cancel();
        self.mode = Some(mode);
    }

    fn elapsed(&self) -> Duration {
        match self.last_activity {
            Some(last) => self.interface.now() - last,
            None => Duration::MAX,
        }
    }

    fn fail(&mut self, reason: impl Into<EngineError>) -> EngineError {
        self.fail_with(TxState::Error, reason.into())
    }

    fn fail_with(&mut self, state: TxState, reason: EngineError) -> EngineError {
        log::debug!("{:?} failed: {}", self.mode, reason);
        self.state = state;
        self.failure = Some(Failure::new(reason.clone()));
        reason
    }

    /// Configures the radio if needed, then clears its FIFOs.
    ///
    /// Listen mode always reconfigures, as does the first command after listening.
    fn prepare_link(&mut self, role: LinkRole) -> Result<(), EngineError> {
        if self.link.is_none() || role == LinkRole::Listen || self.link == Some(LinkRole::Listen) {
            let settings = self.catalog.settings();
            let address = match (role, settings.listen.as_ref()) {
                (LinkRole::Listen, Some(listen)) => &listen.address,
                _ => &settings.address,
            };
            let config = settings.link_config(address);
            log::debug!("Prepare link {:?}: {}", role, HexBytes(&config.address));
            if let Err(e) = self.interface.configure(&config) {
                log::warn!("Transceiver configuration failed: {:?}", e);
                self.link = None;
                return Err(self.fail(TransportError::HardwareFault));
            }
            self.link = Some(role);
        }
        self.interface.flush();
        Ok(())
    }

    /// Sends the current payload once. Reads switch to receiving when acknowledged.
    fn send_packet(&mut self) -> bool {
        let size = self.catalog.schema().payload_size();
        log::debug!("SEND: {}", HexBytes(&self.payload[..size]));
        let acked = self.interface.transmit(&self.payload[..size]);
        let awaits_response = self.mode.is_some_and(Mode::expects_response);
        if acked && awaits_response && self.state == TxState::Sending {
            self.interface.enter_receive_mode();
            self.state = TxState::Receiving;
        }
        self.last_activity = Some(self.interface.now());
        log::debug!("Send packet: {}", if acked { "ACK" } else { "no ACK" });
        acked
    }

    /// Marks the current step done. A batch moves on at the next tick.
    fn step_succeeded(&mut self) {
        self.state = TxState::Ok;
    }
}

fn parse_address(bytes: &[u8]) -> Result<Address, ConfigError> {
    if bytes.is_empty() {
        return Err(ConfigError::InvalidAddress);
    }
    Address::try_from(bytes).map_err(|_| ConfigError::InvalidAddress)
}
