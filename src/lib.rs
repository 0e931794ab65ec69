//! # filerecstore
//!
//! A persistent record store mapping string keys to variable-length
//! binary records, one regular file per record:
//! - No on-disk index; the record area directory is the index
//! - Running record count kept in a checksummed control file
//! - Forward-only sequencing over the record area with a restartable cursor
//! - Single-writer semantics; share an instance through a mutex
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 RecordStore (contract)                       │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                  FileRecordStore                             │
//! │       (keys → paths, count, cursor, space accounting)        │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │  StoreMeta  │          │ Enumerator  │
//!   │ (.rscontrol)│          │ (read_dir)  │
//!   └──────┬──────┘          └──────┬──────┘
//!          │                        │
//!          ▼                        ▼
//!   ┌─────────────────────────────────────┐
//!   │        Filesystem primitives         │
//!   │  (exists, size, atomic_replace)      │
//!   └─────────────────────────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod fs;
pub mod store;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{ErrorKind, RecordStoreError, Result};
pub use config::{Config, SyncStrategy};
pub use store::{FileRecordStore, RecordStore, SequenceMode, SharedRecordStore};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of filerecstore
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
