//! Filesystem Module
//!
//! Path-level primitives and directory housekeeping. Nothing in here knows
//! about keys or records.
//!
//! ## Responsibilities
//! - Existence and size queries that keep "not found" apart from I/O failure
//! - Whole-buffer writes where a short write is a hard failure
//! - Recursive directory removal, copy and size summation

mod primitives;
mod utility;

pub use primitives::{allocated_size, atomic_replace, exists, read_exact_file, size};
pub use utility::{copy_directory, directory_size, remove_directory, validate_root_name};
