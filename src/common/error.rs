// src/common/error.rs

use alloc::string::String;
use core::fmt::Write;

/// Short human-readable failure text, sized for a one-line status display.
pub type Diagnostic = heapless::String<24>;

/// Failures while turning a payload expression into bytes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    /// Token starts with a character that is neither a digit, `i:`, `n` nor a name.
    #[error("unexpected character '{0}' in payload expression")]
    BadToken(char),

    /// Token names a constant that is not defined in the configuration.
    #[error("constant not found: {0}")]
    ConstantNotFound(String),

    /// Could not grow a log or text buffer.
    #[error("out of memory")]
    OutOfMemory,
}

/// Radio-level failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("no acknowledgement from peer")]
    NoAck,

    #[error("no response within the read timeout")]
    Timeout,

    /// Transceiver failed to configure or reported a fault while receiving.
    #[error("transceiver hardware fault")]
    HardwareFault,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    /// A batch references a command (or the caller an index) that does not exist.
    #[error("entry not found: {0}")]
    EntryNotFound(String),

    /// A batch line has no `label:` part or no entries.
    #[error("malformed batch line")]
    MalformedBatchLine,

    /// Operation needs a prepared/executed batch and there is none.
    #[error("no active batch")]
    NoActiveBatch,
}

/// Problems in the configuration text itself.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid payload field width: {0} (expected 1..=4)")]
    InvalidFieldWidth(i32),

    #[error("payload fields total {0} bytes, more than 32")]
    PayloadTooLarge(usize),

    #[error("too many payload fields")]
    TooManyFields,

    #[error("invalid radio address")]
    InvalidAddress,

    #[error("out of memory while loading configuration")]
    OutOfMemory,
}

/// Everything the transaction engine can fail with.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl EngineError {
    /// Short status text for a display line ("No FOO", "NO ACK!", "char: ?").
    pub fn diagnostic(&self) -> Diagnostic {
        let mut text = Diagnostic::new();
        match self {
            EngineError::Compile(CompileError::BadToken(c)) => {
                push_truncated(&mut text, "char: ");
                let mut buf = [0u8; 4];
                push_truncated(&mut text, c.encode_utf8(&mut buf));
            }
            EngineError::Compile(CompileError::ConstantNotFound(name)) => {
                push_truncated(&mut text, "No ");
                push_truncated(&mut text, name);
            }
            EngineError::Compile(CompileError::OutOfMemory)
            | EngineError::Config(ConfigError::OutOfMemory) => push_truncated(&mut text, "Memory low"),
            EngineError::Transport(TransportError::NoAck) => push_truncated(&mut text, "NO ACK!"),
            EngineError::Transport(TransportError::Timeout) => push_truncated(&mut text, "TIMEOUT!"),
            EngineError::Transport(TransportError::HardwareFault) => push_truncated(&mut text, "nRF24 ERROR!"),
            EngineError::Catalog(CatalogError::EntryNotFound(_)) => push_truncated(&mut text, "NOT FOUND"),
            EngineError::Catalog(CatalogError::MalformedBatchLine) => push_truncated(&mut text, "WRONG FORMAT"),
            EngineError::Catalog(CatalogError::NoActiveBatch) => push_truncated(&mut text, "NO BATCH"),
            EngineError::Config(other) => {
                // Display text is longer than the line; keep what fits.
                let _ = write!(TruncatingWriter(&mut text), "{}", other);
            }
        }
        text
    }
}

/// A recorded failure: the reason plus the diagnostic captured when it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub reason: EngineError,
    pub message: Diagnostic,
}

impl Failure {
    pub fn new(reason: EngineError) -> Self {
        let message = reason.diagnostic();
        Failure { reason, message }
    }
}

fn push_truncated(text: &mut Diagnostic, s: &str) {
    for c in s.chars() {
        if text.push(c).is_err() {
            return;
        }
    }
}

struct TruncatingWriter<'a>(&'a mut Diagnostic);

impl Write for TruncatingWriter<'_> {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        push_truncated(self.0, s);
        Ok(())
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn test_diagnostics() {
        let missing: EngineError = CompileError::ConstantNotFound("BAZ".to_string()).into();
        assert_eq!(missing.diagnostic().as_str(), "No BAZ");

        let bad: EngineError = CompileError::BadToken('$').into();
        assert_eq!(bad.diagnostic().as_str(), "char: $");

        let no_ack: EngineError = TransportError::NoAck.into();
        assert_eq!(no_ack.diagnostic().as_str(), "NO ACK!");
    }

    #[test]
    fn test_diagnostic_truncates_long_names() {
        let long_name = "A_VERY_LONG_CONSTANT_NAME_THAT_DOES_NOT_FIT";
        let err: EngineError = CompileError::ConstantNotFound(long_name.to_string()).into();
        let text = err.diagnostic();
        assert_eq!(text.len(), 24);
        assert!(text.starts_with("No A_VERY"));
    }

    #[test]
    fn test_failure_captures_message() {
        let failure = Failure::new(TransportError::Timeout.into());
        assert_eq!(failure.reason, EngineError::Transport(TransportError::Timeout));
        assert_eq!(failure.message.as_str(), "TIMEOUT!");
    }

    #[test]
    fn test_display_passthrough() {
        let err: EngineError = ConfigError::PayloadTooLarge(40).into();
        assert_eq!(err.to_string(), "payload fields total 40 bytes, more than 32");
    }
}
