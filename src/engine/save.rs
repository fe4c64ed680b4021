// src/engine/save.rs

use super::{EngineContext, Mode};
use crate::common::{
    error::{CatalogError, EngineError},
    hal_traits::{RadioClock, Transceiver},
};
use alloc::string::String;
use alloc::vec::Vec;

/// Drops a `*w` width suffix from a head.
fn strip_width(head: &str) -> &str {
    match head.as_bytes() {
        [.., b'*', _] => &head[..head.len() - 2],
        _ => head,
    }
}

/// Leading characters of an array element that belong to the number itself.
fn element_value(element: &str) -> &str {
    let element = element.trim_start();
    let end = element
        .find(|c: char| !(c.is_ascii_hexdigit() || c == 'x' || c == '-'))
        .unwrap_or(element.len());
    &element[..end]
}

/// Turns one read log line into a write assignment.
///
/// `Temp: 23 (17)` gives `Temp=23`, `Arr[3]: 1,2,3` gives `Arr={1,2,3}`.
/// Text fields and lines without a value separator yield `None`.
pub fn assignment_from_log_line(line: &str) -> Option<String> {
    let (head, value) = line.split_once(':')?;
    if head.ends_with('*') {
        return None;
    }
    let value = value.strip_prefix(' ').unwrap_or(value);
    let mut out = String::new();

    match head.find('[').filter(|_| head.ends_with(']')) {
        Some(open) => {
            out.push_str(strip_width(&head[..open]));
            out.push_str("={");
            let elements: Vec<&str> = value.split(',').map(element_value).collect();
            out.push_str(&elements.join(","));
            out.push('}');
        }
        None => {
            out.push_str(strip_width(head));
            out.push('=');
            out.push_str(value.split(' ').next().unwrap_or(""));
        }
    }
    Some(out)
}

/// Builds `WBatch: <label> <stamp>: a=1;b={1,2}` from read log lines.
pub fn write_batch_line<S: AsRef<str>>(label: &str, stamp: &str, lines: &[S]) -> String {
    let assignments: Vec<String> = lines
        .iter()
        .filter_map(|line| assignment_from_log_line(line.as_ref()))
        .collect();
    let mut out = String::from("WBatch: ");
    out.push_str(label);
    out.push(' ');
    out.push_str(stamp);
    out.push_str(": ");
    out.push_str(&assignments.join(";"));
    out
}

impl<IF> EngineContext<IF>
where
    IF: Transceiver + RadioClock,
{
    /// Saves the results of the read batch that just finished as a new write batch.
    ///
    /// Only valid while the log still holds a completed read batch; after any other
    /// operation, or a batch that stopped early, this is `NoActiveBatch`. The line is
    /// appended to the catalog (source text and write batch list) and returned so
    /// the caller can persist it. `stamp` distinguishes repeated saves, typically a
    /// date/time.
    pub fn save_as_write_batch(&mut self, stamp: &str) -> Result<String, EngineError> {
        let script = self
            .read_batch
            .filter(|batch| self.mode == Some(Mode::ReadBatch) && batch.cursor.is_finished())
            .and_then(|batch| self.catalog.read_batches().get(batch.script))
            .ok_or(CatalogError::NoActiveBatch)?;
        let line = write_batch_line(script.label(), stamp, self.log.lines());
        self.catalog.append_write_batch(&line)?;
        log::debug!("Saved: {}", line);
        Ok(line)
    }
}
