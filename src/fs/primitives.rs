//! Filesystem primitives
//!
//! Single-path operations used by the record store engine.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::Path;

use crate::error::{RecordStoreError, Result};

/// Check whether `path` exists
///
/// Only a plain "not found" maps to `Ok(false)`. Permission and other stat
/// failures are reported as strategy errors.
pub fn exists(path: &Path) -> Result<bool> {
    match fs::metadata(path) {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(RecordStoreError::io("Cannot stat", path, e)),
    }
}

/// Get the logical byte length of the file at `path`
pub fn size(path: &Path) -> Result<u64> {
    fs::metadata(path)
        .map(|m| m.len())
        .map_err(|e| RecordStoreError::io("Getting stats on", path, e))
}

/// Get the space allocated on disk for `path`
///
/// This is the block allocation, not the logical length, so a sparse or
/// tiny file may report a different value than [`size`].
pub fn allocated_size(path: &Path) -> Result<u64> {
    let metadata = fs::metadata(path).map_err(|e| RecordStoreError::io("Cannot stat", path, e))?;
    Ok(allocated_bytes(&metadata))
}

#[cfg(unix)]
fn allocated_bytes(metadata: &fs::Metadata) -> u64 {
    use std::os::unix::fs::MetadataExt;
    // st_blocks is always counted in 512-byte units
    metadata.blocks() * 512
}

#[cfg(not(unix))]
fn allocated_bytes(metadata: &fs::Metadata) -> u64 {
    metadata.len()
}

/// Create or truncate `path` and write all of `data` to it
///
/// Fewer bytes written than supplied is a failure, never a partial success.
/// With `sync` set the file is fsynced before returning.
pub fn atomic_replace(path: &Path, data: &[u8], sync: bool) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)
        .map_err(|e| RecordStoreError::io("Could not open", path, e))?;

    let written = write_fully(&mut file, data)
        .map_err(|e| RecordStoreError::io("Could not write", path, e))?;
    if written != data.len() {
        return Err(RecordStoreError::Strategy(format!(
            "Short write to {}: {} of {} bytes",
            path.display(),
            written,
            data.len()
        )));
    }

    if sync {
        file.sync_all()
            .map_err(|e| RecordStoreError::io("Could not sync", path, e))?;
    }

    Ok(())
}

/// Read the whole file at `path`, which must hold `expected_len` bytes
///
/// Fewer bytes available than expected is a short read and fails.
pub fn read_exact_file(path: &Path, expected_len: u64) -> Result<Vec<u8>> {
    let file = File::open(path).map_err(|e| RecordStoreError::io("Could not open", path, e))?;

    let mut data = Vec::with_capacity(expected_len as usize);
    file.take(expected_len)
        .read_to_end(&mut data)
        .map_err(|e| RecordStoreError::io("Could not read", path, e))?;

    if data.len() as u64 != expected_len {
        return Err(RecordStoreError::Strategy(format!(
            "Short read from {}: {} of {} bytes",
            path.display(),
            data.len(),
            expected_len
        )));
    }

    Ok(data)
}

/// Write until the buffer is drained or the writer stops accepting bytes
///
/// Returns the number of bytes actually written.
fn write_fully<W: Write>(writer: &mut W, data: &[u8]) -> io::Result<usize> {
    let mut written = 0;
    while written < data.len() {
        match writer.write(&data[written..]) {
            Ok(0) => break,
            Ok(n) => written += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    writer.flush()?;
    Ok(written)
}
