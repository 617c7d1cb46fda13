//! Record persistence with id-keyed collections.
//!
//! Two collections exist, `workouts` and `goals`. Every store supports
//! listing a collection, upserting a record by id and deleting by id.
//!
//! [`JsonFileStore`] keeps one JSON array file per collection and rewrites
//! it atomically on every mutation. [`MemoryStore`] keeps everything in
//! process.

use crate::{Error, Goal, Result, Workout};
use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Named record collection
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Collection {
    Workouts,
    Goals,
}

impl Collection {
    pub fn name(&self) -> &'static str {
        match self {
            Collection::Workouts => "workouts",
            Collection::Goals => "goals",
        }
    }
}

/// A persistable record bound to its collection
pub trait Record: Serialize + DeserializeOwned + Clone {
    const COLLECTION: Collection;

    fn id(&self) -> &str;

    /// Invariant violations; a record with any cannot be stored
    fn validate(&self) -> Vec<String>;
}

impl Record for Workout {
    const COLLECTION: Collection = Collection::Workouts;

    fn id(&self) -> &str {
        &self.id
    }

    fn validate(&self) -> Vec<String> {
        Workout::validate(self)
    }
}

impl Record for Goal {
    const COLLECTION: Collection = Collection::Goals;

    fn id(&self) -> &str {
        &self.id
    }

    fn validate(&self) -> Vec<String> {
        Goal::validate(self)
    }
}

/// Id-keyed record store
pub trait RecordStore {
    /// All records of a collection, ordered by id
    fn get_all<R: Record>(&self) -> Result<Vec<R>>;

    /// Insert or replace a record by id
    fn put<R: Record>(&mut self, record: &R) -> Result<()>;

    /// Delete a record by id; returns whether it existed
    fn delete<R: Record>(&mut self, id: &str) -> Result<bool>;

    fn get<R: Record>(&self, id: &str) -> Result<Option<R>> {
        Ok(self.get_all::<R>()?.into_iter().find(|r| r.id() == id))
    }
}

fn ensure_valid<R: Record>(record: &R) -> Result<()> {
    let errors = record.validate();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(Error::Validation(errors.join("; ")))
    }
}

// ============================================================================
// JSON file store
// ============================================================================

/// One `{collection}.json` file per collection inside a data directory
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, collection: Collection) -> PathBuf {
        self.dir.join(format!("{}.json", collection.name()))
    }

    /// Read a collection file with a shared lock
    ///
    /// A missing file is an empty collection. An unreadable one is an error:
    /// treating it as empty would let the next write wipe the history.
    fn read_records<R: Record>(path: &Path) -> Result<Vec<R>> {
        if !path.exists() {
            tracing::debug!("No collection file at {:?}, treating as empty", path);
            return Ok(Vec::new());
        }

        let file = File::open(path)?;
        file.lock_shared()?;

        let mut contents = String::new();
        let read = std::io::BufReader::new(&file).read_to_string(&mut contents);
        file.unlock()?;
        read?;

        if contents.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str::<Vec<R>>(&contents)
            .map_err(|e| Error::Store(format!("Failed to parse {:?}: {}", path, e)))
    }

    /// Atomically replace a collection file
    ///
    /// Writes to a temp file in the same directory, syncs it, then renames it
    /// over the original.
    fn write_records<R: Record>(&self, path: &Path, records: &mut [R]) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        records.sort_by(|a, b| a.id().cmp(b.id()));

        let temp = NamedTempFile::new_in(&self.dir)?;
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            serde_json::to_writer_pretty(&mut writer, records)?;
            writer.write_all(b"\n")?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;
        temp.persist(path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Wrote {} record(s) to {:?}", records.len(), path);
        Ok(())
    }
}

impl RecordStore for JsonFileStore {
    fn get_all<R: Record>(&self) -> Result<Vec<R>> {
        let records = Self::read_records(&self.path_for(R::COLLECTION))?;
        tracing::debug!(
            "Loaded {} record(s) from {}",
            records.len(),
            R::COLLECTION.name()
        );
        Ok(records)
    }

    fn put<R: Record>(&mut self, record: &R) -> Result<()> {
        ensure_valid(record)?;

        let path = self.path_for(R::COLLECTION);
        let mut records: Vec<R> = Self::read_records(&path)?;
        match records.iter_mut().find(|r| r.id() == record.id()) {
            Some(existing) => *existing = record.clone(),
            None => records.push(record.clone()),
        }
        self.write_records(&path, &mut records)?;

        tracing::debug!("Saved {} record {}", R::COLLECTION.name(), record.id());
        Ok(())
    }

    fn delete<R: Record>(&mut self, id: &str) -> Result<bool> {
        let path = self.path_for(R::COLLECTION);
        let mut records: Vec<R> = Self::read_records(&path)?;
        let before = records.len();
        records.retain(|r| r.id() != id);

        if records.len() == before {
            return Ok(false);
        }

        self.write_records(&path, &mut records)?;
        tracing::debug!("Deleted {} record {}", R::COLLECTION.name(), id);
        Ok(true)
    }
}

// ============================================================================
// In-memory store
// ============================================================================

/// Process-local store; records are held as JSON values keyed by id
#[derive(Default)]
pub struct MemoryStore {
    collections: HashMap<Collection, BTreeMap<String, serde_json::Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for MemoryStore {
    fn get_all<R: Record>(&self) -> Result<Vec<R>> {
        self.collections
            .get(&R::COLLECTION)
            .map(|records| {
                records
                    .values()
                    .map(|v| serde_json::from_value(v.clone()).map_err(Error::from))
                    .collect()
            })
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    fn put<R: Record>(&mut self, record: &R) -> Result<()> {
        ensure_valid(record)?;
        let value = serde_json::to_value(record)?;
        self.collections
            .entry(R::COLLECTION)
            .or_default()
            .insert(record.id().to_string(), value);
        Ok(())
    }

    fn delete<R: Record>(&mut self, id: &str) -> Result<bool> {
        Ok(self
            .collections
            .get_mut(&R::COLLECTION)
            .map(|records| records.remove(id).is_some())
            .unwrap_or(false))
    }
}
