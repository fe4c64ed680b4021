// src/catalog/batch.rs

use crate::common::error::CatalogError;
use crate::common::number::{parse_hex_bytes, parse_int};
use crate::common::radio::Address;
use alloc::string::String;
use alloc::vec::Vec;

/// One `RBatch:`/`WBatch:`/`SBatch:` line: `label: entry;entry;...`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchScript {
    raw: String,
}

impl BatchScript {
    pub fn new(text: &str) -> Self {
        BatchScript { raw: String::from(text.trim()) }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn label(&self) -> &str {
        match self.raw.split_once(':') {
            Some((label, _)) => label.trim_end(),
            None => &self.raw,
        }
    }

    /// Entries in execution order. Empty entries are dropped.
    pub fn entries(&self) -> Result<Vec<&str>, CatalogError> {
        let (_, rest) = self.raw.split_once(':').ok_or(CatalogError::MalformedBatchLine)?;
        let entries: Vec<&str> = rest.split(';').map(str::trim).filter(|e| !e.is_empty()).collect();
        if entries.is_empty() {
            return Err(CatalogError::MalformedBatchLine);
        }
        Ok(entries)
    }
}

/// A write/set batch entry: `name=value` or `name={v1,v2,...}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment<'a> {
    pub name: &'a str,
    pub values: Vec<i32>,
    pub is_array: bool,
}

impl<'a> Assignment<'a> {
    pub fn parse(entry: &'a str) -> Self {
        let (name, value) = entry.split_once('=').unwrap_or((entry, ""));
        let value = value.trim_start();
        match value.strip_prefix('{') {
            Some(list) => {
                let list = list.split('}').next().unwrap_or(list);
                Assignment {
                    name: name.trim(),
                    values: list.split(',').map(|v| parse_int(v.trim())).collect(),
                    is_array: true,
                }
            }
            None => Assignment {
                name: name.trim(),
                values: alloc::vec![parse_int(value)],
                is_array: false,
            },
        }
    }
}

/// A field shown in listen mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenField {
    pub name: String,
    pub hex: bool,
}

/// The `Listen:` line: `ADDRESS=field1,field2#,...`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenSpec {
    pub address: Address,
    pub fields: Vec<ListenField>,
}

impl ListenSpec {
    pub fn parse(text: &str) -> Option<Self> {
        let (address, fields) = text.split_once('=')?;
        let address = parse_hex_bytes(address.trim())?;
        if address.is_empty() {
            return None;
        }
        let fields = fields
            .split(',')
            .map(|field| {
                let field = field.trim();
                match field.strip_suffix('#') {
                    Some(name) => ListenField { name: String::from(name), hex: true },
                    None => ListenField { name: String::from(field), hex: false },
                }
            })
            .collect();
        Some(ListenSpec { address, fields })
    }
}
