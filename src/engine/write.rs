// src/engine/write.rs

use super::{state::ActiveBatch, EngineContext, Mode, TxState};
use crate::catalog::{Assignment, Catalog};
use crate::common::{
    compiler::PayloadCompiler,
    error::{CatalogError, CompileError, EngineError, TransportError},
    hal_traits::{RadioClock, Transceiver},
    radio::LinkRole,
    schema::{PayloadBuf, MAX_PAYLOAD},
};
use alloc::format;
use alloc::string::{String, ToString};

/// A prepared or running write/set batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct WriteRun {
    pub(crate) kind: Mode,
    pub(crate) batch: ActiveBatch,
}

/// Layers `W default:` and a definition into a zeroed buffer, both seeing `value` as `n`.
fn compile_write(
    catalog: &Catalog,
    expression: &str,
    value: i32,
    payload: &mut PayloadBuf,
) -> Result<Option<usize>, CompileError> {
    *payload = [0; MAX_PAYLOAD];
    let compiler = PayloadCompiler::new(catalog.schema(), catalog.constants());
    if let Some(default) = catalog.write_default() {
        compiler.compile_into(default, Some(value), payload)?;
    }
    compiler.compile_into(expression, Some(value), payload)
}

impl<IF> EngineContext<IF>
where
    IF: Transceiver + RadioClock,
{
    /// Loads the assignments of a `WBatch:` line into the log for review and
    /// editing. Nothing is sent until [`run_write_batch`](Self::run_write_batch).
    pub fn prepare_write_batch(&mut self, index: usize) -> Result<(), EngineError> {
        self.prepare_batch(Mode::WriteBatch, index)
    }

    /// Executes the prepared write batch from the (possibly edited) log.
    pub fn run_write_batch(&mut self) -> Result<(), EngineError> {
        let prepared = match self.write_batch {
            Some(run) if !self.log.is_empty() => run,
            _ => return Err(self.fail(CatalogError::NoActiveBatch)),
        };
        self.begin(prepared.kind);
        self.write_batch = Some(WriteRun {
            kind: prepared.kind,
            batch: ActiveBatch::new(prepared.batch.script, self.log.len()),
        });
        self.run_write_step(0)
    }

    /// Prepares and immediately executes an `SBatch:` line. No `Write start:` packet is sent.
    pub fn run_set_batch(&mut self, index: usize) -> Result<(), EngineError> {
        self.prepare_batch(Mode::SetBatch, index)?;
        self.run_write_batch()
    }

    fn prepare_batch(&mut self, kind: Mode, index: usize) -> Result<(), EngineError> {
        self.cancel();
        self.log.clear();
        self.write_batch = None;
        let scripts = match kind {
            Mode::SetBatch => self.catalog.set_batches(),
            _ => self.catalog.write_batches(),
        };
        let entries = match scripts.get(index) {
            Some(script) => script
                .entries()
                .map(|entries| entries.into_iter().map(String::from).collect::<alloc::vec::Vec<_>>()),
            None => Err(CatalogError::EntryNotFound(format!("batch #{}", index))),
        };
        let entries = match entries {
            Ok(entries) => entries,
            Err(e) => return Err(self.fail(e)),
        };
        for entry in entries {
            if let Err(e) = self.log.push(entry) {
                return Err(self.fail(e));
            }
        }
        self.write_batch = Some(WriteRun { kind, batch: ActiveBatch::new(index, self.log.len()) });
        Ok(())
    }

    /// Sends every packet of one assignment, blocking through the retries.
    pub(super) fn run_write_step(&mut self, step: usize) -> Result<(), EngineError> {
        let kind = self.mode.unwrap_or(Mode::WriteBatch);
        if step == 0 {
            self.prepare_link(LinkRole::Command)?;
            if kind == Mode::WriteBatch {
                self.send_write_start(step)?;
            }
        }

        let Some(entry) = self.log.get(step).map(String::from) else {
            return Err(self.fail_step(step, CatalogError::NoActiveBatch.into()));
        };
        let assignment = Assignment::parse(&entry);
        let Some(definition) = self.catalog.find_write_definition(assignment.name) else {
            let missing = CatalogError::EntryNotFound(assignment.name.to_string());
            return Err(self.fail_step(step, missing.into()));
        };
        let expression = String::from(definition.expression);
        let step_width = definition.step();
        let values: alloc::vec::Vec<i32> =
            assignment.values.iter().map(|&v| definition.mask(v)).collect();

        log::debug!("Write {}: {:?}", assignment.name, values);
        let mut next_index: Option<u8> = None;
        for value in values {
            let array_index = match compile_write(&self.catalog, &expression, value, &mut self.payload) {
                Ok(index) => index.filter(|_| assignment.is_array),
                Err(e) => return Err(self.fail_step(step, e.into())),
            };
            if let (Some(offset), Some(index)) = (array_index, next_index) {
                self.payload[offset] = index;
            }
            if !self.send_with_retries() {
                return Err(self.fail_step(step, TransportError::NoAck.into()));
            }
            match array_index {
                Some(offset) => next_index = Some(self.payload[offset].wrapping_add(step_width)),
                None => break,
            }
        }

        self.step_succeeded();
        Ok(())
    }

    fn send_write_start(&mut self, step: usize) -> Result<(), EngineError> {
        let Some(start) = self.catalog.write_start().map(String::from) else {
            return Ok(());
        };
        let compiled = PayloadCompiler::new(self.catalog.schema(), self.catalog.constants())
            .compile(&start, None);
        match compiled {
            Ok(compiled) => self.payload = compiled.payload,
            Err(e) => return Err(self.fail_step(step, e.into())),
        }
        if !self.send_with_retries() {
            return Err(self.fail_step(step, TransportError::NoAck.into()));
        }
        Ok(())
    }

    /// Up to `resend + 1` attempts, pausing `Delay_ms` between them.
    fn send_with_retries(&mut self) -> bool {
        let resend = self.catalog.settings().resend;
        let delay = self.catalog.settings().packet_delay_ms();
        self.state = TxState::Sending;
        for attempt in 0..=resend {
            self.retries = attempt;
            if self.send_packet() {
                return true;
            }
            if attempt < resend {
                self.interface.delay_ms(delay);
            }
        }
        false
    }

    fn fail_step(&mut self, step: usize, reason: EngineError) -> EngineError {
        self.error_line = Some(step);
        self.fail(reason)
    }
}
