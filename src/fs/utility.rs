//! Directory housekeeping
//!
//! Recursive helpers used for store removal, backups and test setup.

use std::fs;
use std::path::Path;

use crate::error::{RecordStoreError, Result};

use super::primitives::{allocated_size, exists};

/// Check whether `name` can name a rooted entity (a store or a record)
///
/// A valid name is non-empty, contains no path separators (`/` or `\`),
/// does not begin with whitespace and is not `.` or `..`.
pub fn validate_root_name(name: &str) -> bool {
    if name == "." || name == ".." {
        return false;
    }
    match name.chars().next() {
        None => false,
        Some(first) if first.is_whitespace() => false,
        Some(_) => !name.contains(|c: char| c == '/' || c == '\\'),
    }
}

/// Recursively remove `dir` and everything beneath it
pub fn remove_directory(dir: &Path) -> Result<()> {
    if !exists(dir)? {
        return Err(RecordStoreError::NotFound(format!(
            "{} does not exist",
            dir.display()
        )));
    }
    if !dir.is_dir() {
        return Err(RecordStoreError::Strategy(format!(
            "{} is not a directory",
            dir.display()
        )));
    }

    fs::remove_dir_all(dir).map_err(|e| RecordStoreError::io("Could not remove", dir, e))
}

/// Sum the allocated space of `dir` and everything beneath it
pub fn directory_size(dir: &Path) -> Result<u64> {
    let entries = fs::read_dir(dir).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => {
            RecordStoreError::NotFound(format!("{} does not exist", dir.display()))
        }
        _ => RecordStoreError::io("Cannot open directory", dir, e),
    })?;

    let mut total = allocated_size(dir)?;
    for entry in entries {
        let entry = entry.map_err(|e| RecordStoreError::io("Cannot read directory", dir, e))?;
        let path = entry.path();
        let file_type = entry
            .file_type()
            .map_err(|e| RecordStoreError::io("Cannot stat", &path, e))?;

        if file_type.is_dir() {
            total += directory_size(&path)?;
        } else {
            total += allocated_size(&path)?;
        }
    }

    Ok(total)
}

/// Recursively copy `src` into a new directory `dst`
pub fn copy_directory(src: &Path, dst: &Path) -> Result<()> {
    if !exists(src)? {
        return Err(RecordStoreError::NotFound(format!(
            "{} does not exist",
            src.display()
        )));
    }
    if exists(dst)? {
        return Err(RecordStoreError::AlreadyExists(format!(
            "{} already exists",
            dst.display()
        )));
    }

    copy_tree(src, dst)
}

fn copy_tree(src: &Path, dst: &Path) -> Result<()> {
    fs::create_dir(dst).map_err(|e| RecordStoreError::io("Could not create", dst, e))?;

    let entries = fs::read_dir(src).map_err(|e| RecordStoreError::io("Cannot open directory", src, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| RecordStoreError::io("Cannot read directory", src, e))?;
        let from = entry.path();
        let to = dst.join(entry.file_name());
        let file_type = entry
            .file_type()
            .map_err(|e| RecordStoreError::io("Cannot stat", &from, e))?;

        if file_type.is_dir() {
            copy_tree(&from, &to)?;
        } else {
            fs::copy(&from, &to).map_err(|e| RecordStoreError::io("Could not copy", &from, e))?;
        }
    }

    Ok(())
}
