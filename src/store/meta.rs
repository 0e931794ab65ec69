//! Store metadata
//!
//! Owns the store directory and its control file: the store name, the
//! description and the running record count.
//!
//! ## Control File Format
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ Header (14 bytes)                                       │
//! │   Magic: "FRSC" (4) | Version: u16 (2) | CRC32: u32 (4) │
//! │   PayloadLen: u32 (4)                                   │
//! ├─────────────────────────────────────────────────────────┤
//! │ Payload (variable)                                      │
//! │   bincode(ControlRecord { name, description, count })   │
//! └─────────────────────────────────────────────────────────┘
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{RecordStoreError, Result};
use crate::fs::{allocated_size, atomic_replace, exists, read_exact_file, remove_directory, size, validate_root_name};

/// Name of the control file inside a store directory
pub const CONTROL_FILENAME: &str = ".rscontrol";

/// Scratch name used while replacing the control file
const CONTROL_SCRATCH: &str = ".rscontrol.tmp";

/// Magic bytes identifying a control file
const MAGIC: &[u8; 4] = b"FRSC";

/// Current control file format version
const VERSION: u16 = 1;

/// Header size: Magic (4) + Version (2) + CRC (4) + PayloadLen (4) = 14 bytes
const HEADER_SIZE: usize = 14;

/// Persisted store properties
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ControlRecord {
    name: String,
    description: String,
    count: u64,
}

/// Metadata for one store on disk
///
/// Every count change is written through to the control file before the
/// call returns, so the persisted count moves together with the record
/// area.
#[derive(Debug)]
pub struct StoreMeta {
    /// `<root>/<name>`
    dir: PathBuf,

    /// In-memory copy of the control file
    record: ControlRecord,

    /// fsync control file updates
    sync: bool,
}

impl StoreMeta {
    /// Create a new store directory with an empty control file
    pub fn create(root: &Path, name: &str, description: &str, sync: bool) -> Result<Self> {
        Self::check_name(name)?;
        let dir = root.join(name);
        if exists(&dir)? {
            return Err(RecordStoreError::AlreadyExists(format!(
                "Store {} already exists in {}",
                name,
                root.display()
            )));
        }

        fs::create_dir_all(root).map_err(|e| RecordStoreError::io("Could not create", root, e))?;
        fs::create_dir(&dir).map_err(|e| match e.kind() {
            io::ErrorKind::AlreadyExists => {
                RecordStoreError::AlreadyExists(format!("Store {} already exists", name))
            }
            _ => RecordStoreError::io("Could not create", &dir, e),
        })?;

        let meta = Self {
            dir,
            record: ControlRecord {
                name: name.to_string(),
                description: description.to_string(),
                count: 0,
            },
            sync,
        };

        if let Err(e) = meta.persist() {
            // Leave nothing half-created behind
            let _ = fs::remove_dir_all(&meta.dir);
            return Err(e);
        }

        tracing::debug!("Created store {} at {}", name, meta.dir.display());
        Ok(meta)
    }

    /// Load the metadata of an existing store
    pub fn open(root: &Path, name: &str, sync: bool) -> Result<Self> {
        Self::check_name(name)?;
        let dir = root.join(name);
        let control = dir.join(CONTROL_FILENAME);
        if !exists(&dir)? || !exists(&control)? {
            return Err(RecordStoreError::NotFound(format!(
                "Store {} does not exist in {}",
                name,
                root.display()
            )));
        }

        let len = size(&control)?;
        let bytes = read_exact_file(&control, len)?;
        let record = decode(&bytes, &control)?;

        if record.name != name {
            return Err(RecordStoreError::Strategy(format!(
                "Control file {} names store {}, expected {}",
                control.display(),
                record.name,
                name
            )));
        }

        tracing::debug!("Opened store {} ({} records)", name, record.count);
        Ok(Self { dir, record, sync })
    }

    /// Delete a whole store, records and metadata included
    pub fn remove_store(root: &Path, name: &str) -> Result<()> {
        Self::check_name(name)?;
        let dir = root.join(name);
        if !exists(&dir.join(CONTROL_FILENAME))? {
            return Err(RecordStoreError::NotFound(format!(
                "Store {} does not exist in {}",
                name,
                root.display()
            )));
        }

        remove_directory(&dir)?;
        tracing::debug!("Removed store {} from {}", name, root.display());
        Ok(())
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn name(&self) -> &str {
        &self.record.name
    }

    pub fn description(&self) -> &str {
        &self.record.description
    }

    pub fn count(&self) -> u64 {
        self.record.count
    }

    /// The store directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Resolve a component name to its path inside the store directory
    pub fn resolve(&self, component: &str) -> PathBuf {
        self.dir.join(component)
    }

    /// Space charged for the metadata itself
    pub fn space_used(&self) -> Result<u64> {
        allocated_size(&self.dir.join(CONTROL_FILENAME))
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    pub fn increment_count(&mut self) -> Result<()> {
        self.set_count(self.record.count + 1)
    }

    pub fn decrement_count(&mut self) -> Result<()> {
        let count = self.record.count.checked_sub(1).ok_or_else(|| {
            RecordStoreError::Strategy(format!("Record count underflow in store {}", self.record.name))
        })?;
        self.set_count(count)
    }

    /// Set the count and persist it
    ///
    /// The in-memory count takes the new value even if persisting fails.
    pub fn set_count(&mut self, count: u64) -> Result<()> {
        self.record.count = count;
        self.persist()
    }

    /// Set the in-memory count without touching the control file
    ///
    /// Used to undo a count change whose persist failed.
    pub(crate) fn restore_count(&mut self, count: u64) {
        self.record.count = count;
    }

    pub fn change_description(&mut self, description: &str) -> Result<()> {
        let previous = std::mem::replace(&mut self.record.description, description.to_string());
        if let Err(e) = self.persist() {
            self.record.description = previous;
            return Err(e);
        }
        Ok(())
    }

    /// Write the in-memory state to the control file
    pub fn sync(&self) -> Result<()> {
        self.persist()
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn check_name(name: &str) -> Result<()> {
        if validate_root_name(name) {
            Ok(())
        } else {
            Err(RecordStoreError::Strategy(format!("Invalid store name {:?}", name)))
        }
    }

    /// Replace the control file via a scratch file and rename
    fn persist(&self) -> Result<()> {
        let bytes = encode(&self.record)?;
        let scratch = self.dir.join(CONTROL_SCRATCH);
        let control = self.dir.join(CONTROL_FILENAME);

        atomic_replace(&scratch, &bytes, self.sync)?;
        fs::rename(&scratch, &control).map_err(|e| RecordStoreError::io("Could not replace", &control, e))
    }
}

fn encode(record: &ControlRecord) -> Result<Vec<u8>> {
    let payload = bincode::serialize(record)
        .map_err(|e| RecordStoreError::Strategy(format!("Cannot encode control record: {}", e)))?;

    let mut bytes = Vec::with_capacity(HEADER_SIZE + payload.len());
    bytes.extend_from_slice(MAGIC);
    bytes.extend_from_slice(&VERSION.to_le_bytes());
    bytes.extend_from_slice(&crc32fast::hash(&payload).to_le_bytes());
    bytes.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    bytes.extend_from_slice(&payload);
    Ok(bytes)
}

fn decode(bytes: &[u8], path: &Path) -> Result<ControlRecord> {
    let corrupt = |detail: &str| {
        RecordStoreError::Strategy(format!("Corrupt control file {}: {}", path.display(), detail))
    };

    if bytes.len() < HEADER_SIZE {
        return Err(corrupt("truncated header"));
    }
    if &bytes[0..4] != MAGIC {
        return Err(corrupt("bad magic"));
    }

    let version = u16::from_le_bytes([bytes[4], bytes[5]]);
    if version != VERSION {
        return Err(corrupt(&format!("unsupported version {}", version)));
    }

    let crc = u32::from_le_bytes([bytes[6], bytes[7], bytes[8], bytes[9]]);
    let len = u32::from_le_bytes([bytes[10], bytes[11], bytes[12], bytes[13]]) as usize;
    let payload = &bytes[HEADER_SIZE..];
    if payload.len() != len {
        return Err(corrupt("payload length mismatch"));
    }
    if crc32fast::hash(payload) != crc {
        return Err(corrupt("checksum mismatch"));
    }

    bincode::deserialize(payload).map_err(|e| corrupt(&e.to_string()))
}
