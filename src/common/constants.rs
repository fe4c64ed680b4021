// src/common/constants.rs

use super::error::ConfigError;
use super::number::parse_int;
use alloc::string::String;

/// Named integer constants collected from the configuration.
///
/// Every configuration line without a `:` is appended verbatim to one text pool
/// (`FOO=5;BAR=0x10`). Lookups search that pool for `NAME=` where `NAME` starts
/// the pool or follows a `;` or whitespace, so `ABAR` never matches `BAR`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConstantStore {
    pool: String,
}

impl ConstantStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one raw definition line to the pool.
    pub fn append_line(&mut self, line: &str) -> Result<(), ConfigError> {
        self.pool
            .try_reserve(line.len() + 1)
            .map_err(|_| ConfigError::OutOfMemory)?;
        if !self.pool.is_empty() {
            self.pool.push('\n');
        }
        self.pool.push_str(line);
        Ok(())
    }

    /// Value of the first definition of `name`, if any.
    pub fn resolve(&self, name: &str) -> Option<i32> {
        if name.is_empty() {
            return None;
        }
        let bytes = self.pool.as_bytes();
        let mut from = 0;
        while let Some(pos) = self.pool[from..].find(name) {
            let start = from + pos;
            let end = start + name.len();
            let bounded = start == 0 || matches!(bytes[start - 1], b';' | b'\0'..=b' ');
            if bounded && bytes.get(end) == Some(&b'=') {
                return Some(parse_int(&self.pool[end + 1..]));
            }
            from = end;
        }
        None
    }

    pub fn is_empty(&self) -> bool {
        self.pool.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.pool
    }
}
