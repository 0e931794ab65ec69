//! Record area enumeration
//!
//! There is no on-disk index: the record area directory is the index. The
//! order in which its entries are visited is supplied by an
//! [`EntryEnumerator`], so it can be made deterministic when needed.

use std::fs;
use std::path::Path;

use crate::error::{RecordStoreError, Result};

/// Strategy yielding the record names in a record area
///
/// Implementations return regular entries only (never `.`, `..` or
/// subdirectories). The order must be stable for an unchanged directory.
pub trait EntryEnumerator {
    fn record_names(&self, area: &Path) -> Result<Vec<String>>;
}

/// Raw directory order, as the filesystem hands it out
///
/// Stable between calls only while the directory is not modified.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectoryOrder;

/// Names sorted by byte value, independent of the filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct SortedOrder;

impl EntryEnumerator for DirectoryOrder {
    fn record_names(&self, area: &Path) -> Result<Vec<String>> {
        read_record_names(area)
    }
}

impl EntryEnumerator for SortedOrder {
    fn record_names(&self, area: &Path) -> Result<Vec<String>> {
        let mut names = read_record_names(area)?;
        names.sort_unstable();
        Ok(names)
    }
}

/// List non-directory entries of `area` in `read_dir` order
fn read_record_names(area: &Path) -> Result<Vec<String>> {
    let entries = fs::read_dir(area)
        .map_err(|e| RecordStoreError::io("Cannot open store directory", area, e))?;

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| RecordStoreError::io("Cannot read store directory", area, e))?;
        let file_type = entry
            .file_type()
            .map_err(|e| RecordStoreError::io("Cannot stat", &entry.path(), e))?;
        if file_type.is_dir() {
            continue;
        }

        let name = entry.file_name().into_string().map_err(|raw| {
            RecordStoreError::Strategy(format!(
                "Malformed record name {:?} in {}",
                raw,
                area.display()
            ))
        })?;
        names.push(name);
    }

    Ok(names)
}
