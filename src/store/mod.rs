//! Store Module
//!
//! The record store contract and its file-backed implementation.
//!
//! ## Responsibilities
//! - Map string keys to records, one file per record
//! - Keep the running record count equal to the record area's contents
//! - Sequence through every record exactly once per pass
//! - Persist store metadata (name, description, count)

mod cursor;
mod enumerate;
mod file;
mod meta;
mod shared;

pub use cursor::{Cursor, CursorState, SequenceMode};
pub use enumerate::{DirectoryOrder, EntryEnumerator, SortedOrder};
pub use file::{FileRecordStore, RECORD_AREA_NAME};
pub use meta::{StoreMeta, CONTROL_FILENAME};
pub use shared::SharedRecordStore;

use crate::error::Result;

/// A persistent mapping from string keys to opaque byte records
///
/// Keys are non-empty, contain no path separators and do not begin with
/// whitespace. Failures are reported as `AlreadyExists`, `NotFound` or
/// `Strategy` errors.
pub trait RecordStore {
    /// Store name
    fn name(&self) -> &str;

    /// Human-readable store description
    fn description(&self) -> &str;

    /// Number of records currently held
    fn count(&self) -> u64;

    fn change_description(&mut self, description: &str) -> Result<()>;

    /// Write store metadata to disk
    fn sync(&mut self) -> Result<()>;

    /// Allocated space of all records plus the store metadata
    fn space_used(&self) -> Result<u64>;

    /// Add a record; the key must not already be present
    fn insert(&mut self, key: &str, data: &[u8]) -> Result<()>;

    /// Full contents of a record
    fn read(&self, key: &str) -> Result<Vec<u8>>;

    /// Overwrite an existing record
    fn replace(&mut self, key: &str, data: &[u8]) -> Result<()>;

    fn remove(&mut self, key: &str) -> Result<()>;

    /// Byte length of a record
    fn length(&self, key: &str) -> Result<u64>;

    /// Commit any buffered contents of a record
    fn flush(&mut self, key: &str) -> Result<()>;

    /// Return the next record in sequence
    ///
    /// `Start` restarts from the first record. `NotFound` marks the end of
    /// the sequence; only a `Start` request resumes after it.
    fn sequence(&mut self, mode: SequenceMode) -> Result<(String, Vec<u8>)>;
}
