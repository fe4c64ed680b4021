// src/engine/listen.rs

use super::{EngineContext, Mode, TxState};
use crate::common::{
    decoder::{decode, FieldWidth},
    error::{CatalogError, EngineError},
    hal_traits::{RadioClock, RadioInstant, Transceiver},
    radio::LinkRole,
};
use alloc::string::String;
use alloc::vec::Vec;
use core::time::Duration;

/// Counters for passively received packets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenStats<I> {
    pub frames: u32,
    pub last: Option<I>,
    previous: Option<I>,
}

impl<I> Default for ListenStats<I> {
    fn default() -> Self {
        ListenStats { frames: 0, last: None, previous: None }
    }
}

impl<I: RadioInstant> ListenStats<I> {
    fn record(&mut self, now: I) {
        self.previous = self.last.replace(now);
        self.frames = self.frames.saturating_add(1);
    }

    /// Time between the last two packets.
    pub fn interval(&self) -> Option<Duration> {
        Some(self.last? - self.previous?)
    }
}

impl<IF> EngineContext<IF>
where
    IF: Transceiver + RadioClock,
{
    /// Starts listening on the `Listen:` address. Runs until cancelled; there is no timeout.
    pub fn start_listen(&mut self) -> Result<(), EngineError> {
        self.begin(Mode::Listen);
        self.log.clear();
        self.listen = ListenStats::default();
        if self.catalog.settings().listen.is_none() {
            return Err(self.fail(CatalogError::EntryNotFound(String::from("Listen"))));
        }
        self.prepare_link(LinkRole::Listen)?;
        self.interface.enter_receive_mode();
        self.state = TxState::Receiving;
        self.last_activity = Some(self.interface.now());
        Ok(())
    }

    pub fn listen_stats(&self) -> &ListenStats<<IF as RadioClock>::Instant> {
        &self.listen
    }

    /// Replaces the log with one `field: value` line per configured field.
    pub(super) fn accept_listen_frame(&mut self, frame: &[u8]) {
        self.listen.record(self.interface.now());
        let Some(spec) = self.catalog.settings().listen.as_ref() else {
            return;
        };
        let lines: Vec<String> = spec
            .fields
            .iter()
            .zip(self.catalog.schema().layout())
            .map(|(field, (offset, width))| {
                let raw = frame.get(offset..).unwrap_or(&[]);
                let decoded = decode(raw, FieldWidth::Bytes(width), field.hex);
                let mut line = String::with_capacity(field.name.len() + 2 + decoded.text.len());
                line.push_str(&field.name);
                line.push_str(": ");
                line.push_str(&decoded.text);
                line
            })
            .collect();

        self.log.clear();
        for line in lines {
            if let Err(e) = self.log.push(line) {
                self.fail(e);
                return;
            }
        }
    }
}
