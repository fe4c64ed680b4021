// src/engine/state.rs

/// Where the current transaction is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TxState {
    #[default]
    Idle,
    /// Waiting to (re)send a packet.
    Sending,
    /// Request acknowledged, waiting for the answer (or listening).
    Receiving,
    /// Last step completed.
    Ok,
    Error,
    Timeout,
}

/// What kind of operation is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    ReadCommand,
    ReadBatch,
    WriteBatch,
    SetBatch,
    Listen,
}

impl Mode {
    /// Modes where an acknowledged packet is followed by a response.
    pub fn expects_response(self) -> bool {
        matches!(self, Mode::ReadCommand | Mode::ReadBatch)
    }

    pub fn is_write(self) -> bool {
        matches!(self, Mode::WriteBatch | Mode::SetBatch)
    }
}

/// Position inside a batch. Moves on the tick after a step succeeds;
/// `Finished` follows the last step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchCursor {
    Active(usize),
    Finished,
}

impl BatchCursor {
    pub fn index(self) -> Option<usize> {
        match self {
            BatchCursor::Active(i) => Some(i),
            BatchCursor::Finished => None,
        }
    }

    pub fn is_finished(self) -> bool {
        self == BatchCursor::Finished
    }

    /// Numeric position, with `Finished` counting as `len`.
    pub fn position(self, len: usize) -> usize {
        self.index().unwrap_or(len)
    }
}

/// A running (or last run) batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveBatch {
    /// Index of the batch line in the catalog.
    pub script: usize,
    pub len: usize,
    pub cursor: BatchCursor,
}

impl ActiveBatch {
    pub fn new(script: usize, len: usize) -> Self {
        ActiveBatch { script, len, cursor: BatchCursor::Active(0) }
    }

    /// Moves to the next step, or finishes the batch after the last one.
    pub(crate) fn advance(&mut self) -> Option<usize> {
        match self.cursor {
            BatchCursor::Active(i) if i + 1 < self.len => {
                self.cursor = BatchCursor::Active(i + 1);
                Some(i + 1)
            }
            BatchCursor::Active(_) => {
                self.cursor = BatchCursor::Finished;
                None
            }
            BatchCursor::Finished => None,
        }
    }
}

/// Caller-facing summary of the engine state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Idle,
    Sending,
    Receiving,
    /// A step finished and the batch continues on the next tick.
    Working,
    /// The command or the whole batch completed.
    Ok,
    Failed,
    Timeout,
    Listening,
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_cursor_progression() {
        let mut batch = ActiveBatch::new(0, 3);
        assert_eq!(batch.cursor, BatchCursor::Active(0));
        assert_eq!(batch.advance(), Some(1));
        assert_eq!(batch.advance(), Some(2));
        assert_eq!(batch.cursor, BatchCursor::Active(2));
        assert_eq!(batch.advance(), None);
        assert_eq!(batch.cursor, BatchCursor::Finished);
        assert_eq!(batch.advance(), None);
        assert_eq!(batch.cursor.position(batch.len), 3);
    }

    #[test]
    fn test_single_step_batch_finishes() {
        let mut batch = ActiveBatch::new(2, 1);
        assert_eq!(batch.advance(), None);
        assert!(batch.cursor.is_finished());
    }

    #[test]
    fn test_mode_kinds() {
        assert!(Mode::ReadBatch.expects_response());
        assert!(!Mode::SetBatch.expects_response());
        assert!(Mode::SetBatch.is_write());
        assert!(!Mode::Listen.is_write());
    }
}
