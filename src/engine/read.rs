// src/engine/read.rs

use super::{state::ActiveBatch, EngineContext, Mode, TxState};
use crate::catalog::{Catalog, ReadCommand};
use crate::common::{
    compiler::PayloadCompiler,
    decoder::{decode, FieldWidth},
    error::{CatalogError, CompileError, EngineError, TransportError},
    hal_traits::{RadioClock, Transceiver},
    number::HexBytes,
    radio::LinkRole,
    schema::{PayloadBuf, MAX_PAYLOAD},
    timing::{READ_TIMEOUT, RECEIVE_POLLS_PER_TICK},
};
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

/// Bookkeeping for the read in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ReadProgress {
    /// Log line receiving the decoded values.
    line: usize,
    /// Length of the `head: ` prefix; a resend truncates back to it.
    prefix_len: usize,
    width: FieldWidth,
    hex: bool,
    array: Option<ArrayProgress>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ArrayProgress {
    /// Byte offset of the `i:` field in the payload.
    offset: usize,
    /// Elements still expected, the current one included.
    remaining: u32,
}

/// Layers `R default:` and the command expression into a zeroed buffer.
fn compile_read(
    catalog: &Catalog,
    command: &ReadCommand,
    payload: &mut PayloadBuf,
) -> Result<Option<usize>, CompileError> {
    *payload = [0; MAX_PAYLOAD];
    let compiler = PayloadCompiler::new(catalog.schema(), catalog.constants());
    if let Some(default) = catalog.read_default() {
        compiler.compile_into(default, None, payload)?;
    }
    compiler.compile_into(command.expression(), None, payload)
}

impl<IF> EngineContext<IF>
where
    IF: Transceiver + RadioClock,
{
    /// Runs one read command by its index in the catalog.
    ///
    /// The log is cleared and gets one `head: value` line. Progress continues in
    /// [`tick`](Self::tick).
    pub fn run_read_command(&mut self, index: usize) -> Result<(), EngineError> {
        self.begin(Mode::ReadCommand);
        self.log.clear();
        self.current_read = Some(index);
        self.start_read(index)
    }

    /// Runs every command a `RBatch:` line references, in order.
    pub fn run_read_batch(&mut self, index: usize) -> Result<(), EngineError> {
        self.begin(Mode::ReadBatch);
        self.log.clear();
        let references = match self.catalog.read_batches().get(index) {
            Some(script) => script.entries().map(|entries| {
                entries.into_iter().map(String::from).collect::<Vec<_>>()
            }),
            None => Err(CatalogError::EntryNotFound(format!("RBatch #{}", index))),
        };
        let references = match references {
            Ok(refs) => refs,
            Err(e) => return Err(self.fail(e)),
        };
        self.read_batch = Some(ActiveBatch::new(index, references.len()));
        self.read_refs = references;
        self.run_read_batch_step(0)
    }

    /// Toggles automatic re-running of the current read command.
    pub fn set_read_repeat(&mut self, enabled: bool) {
        self.read_repeat = enabled;
    }

    pub fn read_repeat(&self) -> bool {
        self.read_repeat
    }

    pub(super) fn run_read_batch_step(&mut self, step: usize) -> Result<(), EngineError> {
        let Some(reference) = self.read_refs.get(step).cloned() else {
            return Err(self.fail(CatalogError::NoActiveBatch));
        };
        match self.catalog.position_read(&reference) {
            Some(index) => self.start_read(index),
            None => {
                log::debug!("Read batch entry not found: {}", reference);
                match self.log.push(reference.clone()) {
                    Ok(line) => self.error_line = Some(line),
                    Err(e) => return Err(self.fail(e)),
                }
                Err(self.fail(CatalogError::EntryNotFound(reference)))
            }
        }
    }

    /// Compiles and sends the first packet of a read, appending its log line.
    pub(super) fn start_read(&mut self, index: usize) -> Result<(), EngineError> {
        let Some(command) = self.catalog.read_commands().get(index).cloned() else {
            return Err(self.fail(CatalogError::EntryNotFound(index.to_string())));
        };

        let mut line = String::from(command.head());
        line.push_str(": ");
        let prefix_len = line.len();
        let line = match self.log.push(line) {
            Ok(line) => line,
            Err(e) => return Err(self.fail(e)),
        };

        let array_index = match compile_read(&self.catalog, &command, &mut self.payload) {
            Ok(array_index) => array_index,
            Err(e) => return Err(self.fail(e)),
        };
        let array = match (command.array_len(), array_index) {
            (Some(remaining), Some(offset)) => Some(ArrayProgress { offset, remaining }),
            _ => None,
        };
        self.read = Some(ReadProgress {
            line,
            prefix_len,
            width: command.width(),
            hex: command.is_hex(),
            array,
        });

        self.prepare_link(LinkRole::Command)?;
        self.state = TxState::Sending;
        self.retries = 0;
        self.continuation = false;
        self.send_packet();
        Ok(())
    }

    /// Sending state of a read: the previous attempt was not acknowledged, or the
    /// next array element is due.
    pub(super) fn tick_sending(&mut self) {
        if self.elapsed() <= self.catalog.settings().packet_delay {
            return;
        }
        if self.continuation {
            self.continuation = false;
            self.resend_read_packet();
        } else if self.retries < self.catalog.settings().resend {
            self.retries += 1;
            self.resend_read_packet();
        } else {
            self.fail(TransportError::NoAck);
        }
    }

    fn resend_read_packet(&mut self) {
        if let Some(read) = self.read {
            if read.array.is_none() {
                self.log.truncate_line(read.line, read.prefix_len);
            }
        }
        self.send_packet();
    }

    /// Receiving state: polls a few times per tick for the response.
    pub(super) fn poll_receive(&mut self, mode: Mode) {
        let max_width = if self.catalog.settings().dynamic_payload {
            0
        } else {
            self.catalog.schema().payload_size() as u8
        };

        for _ in 0..RECEIVE_POLLS_PER_TICK {
            match self.interface.poll_receive(max_width) {
                Ok(frame) => {
                    log::debug!("READ: {}", HexBytes(&frame));
                    self.last_activity = Some(self.interface.now());
                    if mode == Mode::Listen {
                        self.accept_listen_frame(&frame);
                        continue;
                    }
                    if let Err(e) = self.accept_response(&frame) {
                        self.fail(e);
                    }
                    if self.state != TxState::Receiving {
                        break;
                    }
                }
                Err(nb::Error::WouldBlock) => {
                    if mode != Mode::Listen && self.elapsed() > READ_TIMEOUT {
                        self.read_timed_out();
                    }
                    break;
                }
                Err(nb::Error::Other(e)) => {
                    log::warn!("Receive failed: {:?}", e);
                    self.link = None;
                    self.fail(TransportError::HardwareFault);
                    break;
                }
            }
        }
    }

    fn read_timed_out(&mut self) {
        if self.retries < self.catalog.settings().resend {
            self.retries += 1;
            self.state = TxState::Sending;
            self.resend_read_packet();
        } else {
            self.fail_with(TxState::Timeout, TransportError::Timeout.into());
        }
    }

    /// Decodes one response into the log line and decides what comes next.
    fn accept_response(&mut self, frame: &[u8]) -> Result<(), EngineError> {
        let Some(mut read) = self.read else {
            return Ok(());
        };
        let decoded = decode(frame, read.width, read.hex);
        self.log.append(read.line, &decoded.text)?;

        if let Some(array) = read.array.as_mut() {
            array.remaining = array.remaining.saturating_sub(1);
            if array.remaining > 0 {
                self.log.append(read.line, ",")?;
                if let Some(index) = self.payload.get_mut(array.offset) {
                    *index = index.wrapping_add(read.width.step());
                }
                self.retries = 0;
                self.continuation = true;
                self.state = TxState::Sending;
            } else {
                self.step_succeeded();
            }
        } else if read.width == FieldWidth::Text && decoded.value != 0 {
            // Text arrives one character per packet until NUL.
        } else {
            self.step_succeeded();
        }
        self.read = Some(read);
        Ok(())
    }
}
