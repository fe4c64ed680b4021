// src/engine/batch_log.rs

use crate::common::error::CompileError;
use alloc::string::String;
use alloc::vec::Vec;

/// Ordered text lines produced by the running operation: one per read result,
/// one per write assignment, one per listened field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchLog {
    lines: Vec<String>,
    edited: bool,
}

impl BatchLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.edited = false;
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(String::as_str)
    }

    /// True once a line was replaced by the caller.
    pub fn is_edited(&self) -> bool {
        self.edited
    }

    /// Appends a line and returns its index.
    pub fn push(&mut self, line: String) -> Result<usize, CompileError> {
        self.lines.try_reserve(1).map_err(|_| CompileError::OutOfMemory)?;
        self.lines.push(line);
        Ok(self.lines.len() - 1)
    }

    /// Replaces a line (editing a write value before running). Returns false if out of range.
    pub fn replace(&mut self, index: usize, line: String) -> bool {
        match self.lines.get_mut(index) {
            Some(slot) => {
                *slot = line;
                self.edited = true;
                true
            }
            None => false,
        }
    }

    /// Removes a line so a write batch skips it.
    pub fn remove(&mut self, index: usize) -> Option<String> {
        (index < self.lines.len()).then(|| self.lines.remove(index))
    }

    pub(crate) fn append(&mut self, index: usize, text: &str) -> Result<(), CompileError> {
        if let Some(line) = self.lines.get_mut(index) {
            line.try_reserve(text.len()).map_err(|_| CompileError::OutOfMemory)?;
            line.push_str(text);
        }
        Ok(())
    }

    pub(crate) fn truncate_line(&mut self, index: usize, len: usize) {
        if let Some(line) = self.lines.get_mut(index) {
            line.truncate(len);
        }
    }
}
