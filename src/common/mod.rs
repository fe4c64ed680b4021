// src/common/mod.rs

// --- Declare all public modules within common ---
pub mod compiler;
pub mod constants;
pub mod decoder;
pub mod error;
pub mod hal_traits;
pub mod number;
pub mod radio;
pub mod schema;
pub mod timing;

// --- Re-export key types/traits/functions for easier access ---

pub use compiler::{split_hex_hint, Compiled, PayloadCompiler};
pub use constants::ConstantStore;
pub use decoder::{decode, field_value, DecodedValue, FieldWidth};
pub use error::{
    CatalogError, CompileError, ConfigError, Diagnostic, EngineError, Failure, TransportError,
};
pub use hal_traits::{Frame, RadioClock, RadioInstant, Transceiver};
pub use number::{parse_hex_bytes, parse_int, HexBytes};
pub use radio::{Address, CrcMode, DataRate, LinkConfig, LinkRole};
pub use schema::{FieldSchema, PayloadBuf, MAX_FIELDS, MAX_PAYLOAD};

// timing constants are accessed via common::timing::*
