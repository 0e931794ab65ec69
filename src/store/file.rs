//! File Record Store
//!
//! One regular file per record inside the store's record area.
//!
//! ## On-Disk Layout
//! ```text
//! {root_dir}/{name}/
//!   ├── .rscontrol        name, description, count
//!   └── theFiles/
//!         ├── {key}       record contents, verbatim
//!         └── ...
//! ```
//!
//! ## Concurrency
//! A store instance is single-writer and single-reader-at-a-time. The
//! cursor and count are plain fields with no internal locking; wrap the
//! store in a [`SharedRecordStore`](super::SharedRecordStore) to share it.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::{RecordStoreError, Result};
use crate::fs::{allocated_size, atomic_replace, read_exact_file, size, validate_root_name};

use super::cursor::{Cursor, CursorState, SequenceMode};
use super::enumerate::{DirectoryOrder, EntryEnumerator};
use super::meta::StoreMeta;
use super::RecordStore;

/// Name of the record area directory inside a store
pub const RECORD_AREA_NAME: &str = "theFiles";

/// A record store keeping each record in its own file
pub struct FileRecordStore<E: EntryEnumerator = DirectoryOrder> {
    /// Name, description and running count
    meta: StoreMeta,

    /// `<store dir>/theFiles`, resolved once at create/open
    record_area: PathBuf,

    /// Sequence state
    cursor: Cursor,

    /// Visiting order for `sequence` and `space_used`
    enumerator: E,

    /// fsync record writes
    sync: bool,
}

impl FileRecordStore<DirectoryOrder> {
    /// Create a new store visiting records in directory order
    pub fn create(config: &Config, name: &str, description: &str) -> Result<Self> {
        Self::create_with(config, name, description, DirectoryOrder)
    }

    /// Open an existing store visiting records in directory order
    pub fn open(config: &Config, name: &str) -> Result<Self> {
        Self::open_with(config, name, DirectoryOrder)
    }
}

impl<E: EntryEnumerator> FileRecordStore<E> {
    /// Create a new store with a custom enumeration strategy
    ///
    /// Fails with `AlreadyExists` if a store of that name is present.
    pub fn create_with(config: &Config, name: &str, description: &str, enumerator: E) -> Result<Self> {
        let sync = config.sync_strategy.sync_each_write();
        let meta = StoreMeta::create(&config.root_dir, name, description, sync)?;
        let record_area = meta.resolve(RECORD_AREA_NAME);

        if let Err(e) = fs::create_dir(&record_area) {
            let _ = fs::remove_dir_all(meta.dir());
            return Err(RecordStoreError::io(
                "Could not create file area directory",
                &record_area,
                e,
            ));
        }

        Ok(Self {
            meta,
            record_area,
            cursor: Cursor::new(),
            enumerator,
            sync,
        })
    }

    /// Open an existing store with a custom enumeration strategy
    ///
    /// Fails with `NotFound` if there is no such store, and with a strategy
    /// error if the metadata exists but the record area does not.
    pub fn open_with(config: &Config, name: &str, enumerator: E) -> Result<Self> {
        let sync = config.sync_strategy.sync_each_write();
        let meta = StoreMeta::open(&config.root_dir, name, sync)?;
        let record_area = meta.resolve(RECORD_AREA_NAME);

        match fs::metadata(&record_area) {
            Ok(m) if m.is_dir() => {}
            Ok(_) => {
                return Err(RecordStoreError::Strategy(format!(
                    "Record area {} is not a directory",
                    record_area.display()
                )))
            }
            Err(e) => return Err(RecordStoreError::io("Missing record area", &record_area, e)),
        }

        let mut store = Self {
            meta,
            record_area,
            cursor: Cursor::new(),
            enumerator,
            sync,
        };
        store.reconcile_count()?;
        Ok(store)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The store directory
    pub fn root(&self) -> &Path {
        self.meta.dir()
    }

    /// The directory holding one file per record
    pub fn record_area(&self) -> &Path {
        &self.record_area
    }

    pub fn cursor_state(&self) -> CursorState {
        self.cursor.state()
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Canonical path of the record named `key`
    fn record_path(&self, key: &str) -> Result<PathBuf> {
        if !validate_root_name(key) {
            return Err(RecordStoreError::Strategy(format!("Invalid key {:?}", key)));
        }
        Ok(self.record_area.join(key))
    }

    /// Canonical path of an existing record
    ///
    /// Only a regular file counts as a record; a directory or other entry
    /// under the key's name is reported as absent.
    fn existing_record_path(&self, key: &str) -> Result<PathBuf> {
        let path = self.record_path(key)?;
        match occupant(&path)? {
            Occupant::Record => Ok(path),
            Occupant::Vacant | Occupant::Other => {
                Err(RecordStoreError::NotFound(format!("No record for key {}", key)))
            }
        }
    }

    /// Make the count agree with the record area
    ///
    /// A crash between a record write and the control file update leaves
    /// the two apart; the record area wins.
    fn reconcile_count(&mut self) -> Result<()> {
        let on_disk = self.enumerator.record_names(&self.record_area)?.len() as u64;
        if on_disk != self.meta.count() {
            tracing::warn!(
                "Store {}: control file count {} disagrees with {} records on disk; using {}",
                self.meta.name(),
                self.meta.count(),
                on_disk,
                on_disk
            );
            self.meta.set_count(on_disk)?;
        }
        Ok(())
    }

    /// Remove a record file written by a failed insert
    fn discard(&self, path: &Path) {
        match fs::remove_file(path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!("Could not discard {}: {}", path.display(), e),
        }
    }
}

/// What sits at a record's canonical path
enum Occupant {
    Vacant,
    Record,
    /// A directory or anything else that is not a regular file
    Other,
}

fn occupant(path: &Path) -> Result<Occupant> {
    match fs::metadata(path) {
        Ok(m) if m.is_file() => Ok(Occupant::Record),
        Ok(_) => Ok(Occupant::Other),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Occupant::Vacant),
        Err(e) => Err(RecordStoreError::io("Cannot stat", path, e)),
    }
}

impl<E: EntryEnumerator> RecordStore for FileRecordStore<E> {
    fn name(&self) -> &str {
        self.meta.name()
    }

    fn description(&self) -> &str {
        self.meta.description()
    }

    fn count(&self) -> u64 {
        self.meta.count()
    }

    fn change_description(&mut self, description: &str) -> Result<()> {
        self.meta.change_description(description)
    }

    fn sync(&mut self) -> Result<()> {
        self.meta.sync()
    }

    fn space_used(&self) -> Result<u64> {
        let mut total = self.meta.space_used()?;
        for name in self.enumerator.record_names(&self.record_area)? {
            total += allocated_size(&self.record_area.join(name))?;
        }
        Ok(total)
    }

    fn insert(&mut self, key: &str, data: &[u8]) -> Result<()> {
        let path = self.record_path(key)?;
        match occupant(&path)? {
            Occupant::Vacant => {}
            Occupant::Record => {
                return Err(RecordStoreError::AlreadyExists(format!("Record {} already exists", key)))
            }
            Occupant::Other => {
                return Err(RecordStoreError::Strategy(format!(
                    "Key {} is occupied by a non-record entry in {}",
                    key,
                    self.record_area.display()
                )))
            }
        }

        if let Err(e) = atomic_replace(&path, data, self.sync) {
            self.discard(&path);
            return Err(e);
        }

        let previous = self.meta.count();
        if let Err(e) = self.meta.increment_count() {
            self.discard(&path);
            self.meta.restore_count(previous);
            return Err(e);
        }

        tracing::debug!("Inserted {} ({} bytes) into {}", key, data.len(), self.meta.name());
        Ok(())
    }

    fn read(&self, key: &str) -> Result<Vec<u8>> {
        let path = self.existing_record_path(key)?;
        let len = size(&path)?;
        let data = read_exact_file(&path, len)?;

        tracing::trace!("Read {} ({} bytes) from {}", key, len, self.meta.name());
        Ok(data)
    }

    fn replace(&mut self, key: &str, data: &[u8]) -> Result<()> {
        let path = self.existing_record_path(key)?;
        atomic_replace(&path, data, self.sync)?;

        tracing::debug!("Replaced {} ({} bytes) in {}", key, data.len(), self.meta.name());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let path = self.existing_record_path(key)?;
        fs::remove_file(&path).map_err(|e| RecordStoreError::io("Could not remove", &path, e))?;

        // The file is gone, so the in-memory count drops even if the
        // control file update fails; the next open reconciles it.
        self.meta.decrement_count()?;

        tracing::debug!("Removed {} from {}", key, self.meta.name());
        Ok(())
    }

    fn length(&self, key: &str) -> Result<u64> {
        let path = self.existing_record_path(key)?;
        size(&path)
    }

    fn flush(&mut self, key: &str) -> Result<()> {
        // Every write closes its file before returning; nothing is buffered
        self.existing_record_path(key)?;
        Ok(())
    }

    fn sequence(&mut self, mode: SequenceMode) -> Result<(String, Vec<u8>)> {
        let position = self.cursor.target(mode)?;
        if position > self.meta.count() {
            self.cursor.exhaust();
            return Err(RecordStoreError::NotFound(format!(
                "No record at position {}",
                position
            )));
        }

        let names = self.enumerator.record_names(&self.record_area)?;
        let key = names.into_iter().nth((position - 1) as usize).ok_or_else(|| {
            RecordStoreError::Strategy(format!(
                "Record cursor position {} out of sync with {}",
                position,
                self.record_area.display()
            ))
        })?;

        let data = self.read(&key)?;
        self.cursor.advance(position);

        tracing::trace!("Sequenced {} at position {}", key, position);
        Ok((key, data))
    }
}
