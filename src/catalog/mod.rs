// src/catalog/mod.rs

pub mod batch;
pub mod command;
pub mod settings;

pub use batch::{Assignment, BatchScript, ListenField, ListenSpec};
pub use command::{ReadCommand, WriteDefinition};
pub use settings::Settings;

use crate::common::constants::ConstantStore;
use crate::common::error::ConfigError;
use crate::common::number::{parse_hex_bytes, parse_int};
use crate::common::radio::{clamp_channel, CrcMode, DataRate};
use crate::common::schema::FieldSchema;
use alloc::string::String;
use alloc::vec::Vec;
use core::time::Duration;

// --- Configuration line prefixes ---
const INFO: &str = "Info:";
const CHANNEL: &str = "Ch:";
const RATE: &str = "Rate:";
const DPL: &str = "DPL:";
const CRC: &str = "CRC:";
const RETR: &str = "RETR:";
const ADDRESS: &str = "Address:";
const RESEND: &str = "Resend:";
const DELAY: &str = "Delay_ms:";
const WRITE_START: &str = "Write start:";
const PAYLOAD: &str = "Payload struct:";
const READ_DEFAULT: &str = "R default:";
const WRITE_DEFAULT: &str = "W default:";
const READ: &str = "R:";
const WRITE: &str = "W:";
const SET: &str = "S:";
const READ_BATCH: &str = "RBatch:";
const WRITE_BATCH: &str = "WBatch:";
const SET_BATCH: &str = "SBatch:";
const LISTEN: &str = "Listen:";
const READ_REPEAT: &str = "ReadCmd repeat:";

/// Everything loaded from one configuration text: link settings, constants,
/// read commands and the three kinds of batches.
///
/// `W:`/`S:` definitions are not indexed; they are looked up in the source text
/// each time a write step runs, so definitions appended later are picked up.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    settings: Settings,
    constants: ConstantStore,
    read_commands: Vec<ReadCommand>,
    read_batches: Vec<BatchScript>,
    write_batches: Vec<BatchScript>,
    set_batches: Vec<BatchScript>,
    read_default: Option<String>,
    write_default: Option<String>,
    write_start: Option<String>,
    source: String,
}

impl Catalog {
    /// Parses a configuration text.
    ///
    /// Blank lines, lines starting with `;` or a control/space character are
    /// ignored. Lines without `:` are constant definitions. Unknown `key:` lines
    /// are skipped.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let mut catalog = Catalog::default();
        catalog
            .source
            .try_reserve(text.len())
            .map_err(|_| ConfigError::OutOfMemory)?;
        catalog.source.push_str(text);

        for line in text.lines() {
            match line.as_bytes().first() {
                None => continue,
                Some(&c) if c <= b'!' || c == b';' => continue,
                Some(_) => {}
            }
            if !line.contains(':') {
                catalog.constants.append_line(line)?;
                continue;
            }
            catalog.apply_line(line.trim_end())?;
        }
        log::debug!(
            "Loaded catalog: {} read, {} rbatch, {} wbatch, {} sbatch, payload {} bytes",
            catalog.read_commands.len(),
            catalog.read_batches.len(),
            catalog.write_batches.len(),
            catalog.set_batches.len(),
            catalog.settings.schema.payload_size()
        );
        Ok(catalog)
    }

    fn apply_line(&mut self, line: &str) -> Result<(), ConfigError> {
        let settings = &mut self.settings;
        if let Some(v) = value_of(line, RATE) {
            settings.data_rate = DataRate::from_setting(parse_int(v));
        } else if let Some(v) = value_of(line, INFO) {
            settings.info = String::from(v);
        } else if let Some(v) = value_of(line, CHANNEL) {
            settings.channel = clamp_channel(parse_int(v));
        } else if let Some(v) = value_of(line, ADDRESS) {
            settings.address = parse_hex_bytes(v).ok_or(ConfigError::InvalidAddress)?;
        } else if let Some(v) = value_of(line, CRC) {
            settings.crc = CrcMode::from_setting(parse_int(v));
        } else if let Some(v) = value_of(line, DPL) {
            settings.dynamic_payload = parse_int(v) != 0;
        } else if let Some(v) = value_of(line, RETR) {
            settings.retransmit = parse_int(v) as u8;
        } else if let Some(v) = value_of(line, RESEND) {
            settings.resend = parse_int(v).clamp(0, i32::from(u8::MAX)) as u8;
        } else if let Some(v) = value_of(line, DELAY) {
            settings.packet_delay = Duration::from_millis(parse_int(v).max(0) as u64);
        } else if let Some(v) = value_of(line, READ_REPEAT) {
            settings.read_repeat_period = Duration::from_secs(parse_int(v).max(0) as u64);
        } else if let Some(v) = value_of(line, PAYLOAD) {
            settings.schema = FieldSchema::parse(v)?;
        } else if let Some(v) = value_of(line, READ_DEFAULT) {
            self.read_default = Some(String::from(v));
        } else if let Some(v) = value_of(line, WRITE_START) {
            self.write_start = Some(String::from(v));
        } else if let Some(v) = value_of(line, WRITE_DEFAULT) {
            self.write_default = Some(String::from(v));
        } else if let Some(v) = value_of(line, READ) {
            match ReadCommand::parse(v) {
                Some(cmd) => push(&mut self.read_commands, cmd)?,
                None => log::warn!("Read command without '=': {}", v),
            }
        } else if let Some(v) = value_of(line, READ_BATCH) {
            push(&mut self.read_batches, BatchScript::new(v))?;
        } else if let Some(v) = value_of(line, WRITE_BATCH) {
            push(&mut self.write_batches, BatchScript::new(v))?;
        } else if let Some(v) = value_of(line, SET_BATCH) {
            push(&mut self.set_batches, BatchScript::new(v))?;
        } else if let Some(v) = value_of(line, LISTEN) {
            settings.listen = ListenSpec::parse(v);
            if settings.listen.is_none() {
                log::warn!("Ignoring malformed listen line: {}", v);
            }
        }
        // W:/S: lines stay in `source` only.
        Ok(())
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    pub fn schema(&self) -> &FieldSchema {
        &self.settings.schema
    }

    pub fn constants(&self) -> &ConstantStore {
        &self.constants
    }

    pub fn read_commands(&self) -> &[ReadCommand] {
        &self.read_commands
    }

    pub fn read_batches(&self) -> &[BatchScript] {
        &self.read_batches
    }

    pub fn write_batches(&self) -> &[BatchScript] {
        &self.write_batches
    }

    pub fn set_batches(&self) -> &[BatchScript] {
        &self.set_batches
    }

    pub fn read_default(&self) -> Option<&str> {
        self.read_default.as_deref()
    }

    pub fn write_default(&self) -> Option<&str> {
        self.write_default.as_deref()
    }

    /// Packet sent once before a write batch (not before set batches).
    pub fn write_start(&self) -> Option<&str> {
        self.write_start.as_deref()
    }

    /// The configuration text, including lines appended since loading.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Index of the first read command a batch reference names.
    pub fn position_read(&self, reference: &str) -> Option<usize> {
        self.read_commands.iter().position(|cmd| cmd.matches_reference(reference))
    }

    /// First `W:` or `S:` definition whose base name equals `name`.
    pub fn find_write_definition(&self, name: &str) -> Option<WriteDefinition<'_>> {
        self.source
            .lines()
            .filter_map(|line| value_of(line, WRITE).or_else(|| value_of(line, SET)))
            .filter_map(|body| WriteDefinition::parse(body.trim_end()))
            .find(|def| def.name == name)
    }

    /// Adds a `WBatch:` line, both to the source text and the write batch list.
    pub fn append_write_batch(&mut self, line: &str) -> Result<(), ConfigError> {
        let body = value_of(line, WRITE_BATCH).unwrap_or(line);
        self.source
            .try_reserve(line.len() + 1)
            .map_err(|_| ConfigError::OutOfMemory)?;
        if !self.source.is_empty() && !self.source.ends_with('\n') {
            self.source.push('\n');
        }
        self.source.push_str(line);
        self.source.push('\n');
        push(&mut self.write_batches, BatchScript::new(body))
    }
}

/// Text after `prefix` with leading whitespace removed.
fn value_of<'l>(line: &'l str, prefix: &str) -> Option<&'l str> {
    line.strip_prefix(prefix).map(str::trim_start)
}

fn push<T>(list: &mut Vec<T>, item: T) -> Result<(), ConfigError> {
    list.try_reserve(1).map_err(|_| ConfigError::OutOfMemory)?;
    list.push(item);
    Ok(())
}
