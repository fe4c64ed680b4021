// src/lib.rs

#![no_std] // Specify no_std at the crate root

//! Configuration-driven command compiler and transaction engine for
//! ACK-based packet radios such as the nRF24L01+.
//!
//! A [`Catalog`] is parsed from a line-oriented text file describing the link,
//! the payload layout, named constants, read commands and read/write batches.
//! An [`EngineContext`] owns a transceiver implementing
//! [`Transceiver`] + [`RadioClock`] and runs those commands, advancing on
//! periodic [`tick`](EngineContext::tick) calls.

extern crate alloc;

pub mod catalog;
pub mod common;
pub mod engine;

// Re-export key types for convenience
pub use catalog::Catalog;
pub use common::{EngineError, FieldSchema, RadioClock, Transceiver};
pub use engine::{EngineContext, Status};
