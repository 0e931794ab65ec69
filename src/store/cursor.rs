//! Sequence cursor
//!
//! Forward-only iteration state for [`RecordStore::sequence`].
//!
//! ## State Machine
//! ```text
//!               Start / Next
//!  NotStarted ───────────────► fetch position 1
//!
//!               Next                       Start
//!  Positioned(n) ──► fetch position n     ───────► fetch position 1
//!
//!               Next                       Start
//!  Exhausted ──────► NotFound             ───────► fetch position 1
//!
//!  fetch p succeeded       ──► Positioned(p + 1)
//!  p beyond record count   ──► Exhausted (NotFound)
//! ```
//!
//! [`RecordStore::sequence`]: super::RecordStore::sequence

use crate::error::{RecordStoreError, Result};

/// Where a `sequence` call should start from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceMode {
    /// Restart from the first record
    Start,

    /// Continue after the last record returned
    Next,
}

/// Cursor state between `sequence` calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorState {
    /// No record has been returned since open
    NotStarted,

    /// The next `Next` request fetches this 1-based position
    Positioned(u64),

    /// The last request ran past the final record; only `Start` recovers
    Exhausted,
}

/// Single-consumer iteration cursor owned by a store instance
#[derive(Debug, Clone)]
pub struct Cursor {
    state: CursorState,
}

impl Cursor {
    pub fn new() -> Self {
        Self {
            state: CursorState::NotStarted,
        }
    }

    pub fn state(&self) -> CursorState {
        self.state
    }

    /// The 1-based position a request in `mode` should fetch
    ///
    /// Fails with `NotFound` when the cursor is exhausted and the caller
    /// did not ask to start over.
    pub fn target(&self, mode: SequenceMode) -> Result<u64> {
        match (mode, self.state) {
            (SequenceMode::Start, _) => Ok(1),
            (SequenceMode::Next, CursorState::NotStarted) => Ok(1),
            (SequenceMode::Next, CursorState::Positioned(n)) => Ok(n),
            (SequenceMode::Next, CursorState::Exhausted) => Err(RecordStoreError::NotFound(
                "No record at position; sequence must be restarted".to_string(),
            )),
        }
    }

    /// Record a successful fetch at `position`
    pub fn advance(&mut self, position: u64) {
        self.state = CursorState::Positioned(position + 1);
    }

    /// Record that the requested position is past the last record
    pub fn exhaust(&mut self) {
        self.state = CursorState::Exhausted;
    }
}

impl Default for Cursor {
    fn default() -> Self {
        Self::new()
    }
}
