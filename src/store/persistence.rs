//! Persistence layer for the result store

use crate::error::StorageError;
use crate::slot::Slot;
use crate::store::{GenerationResult, InsertOutcome, ResultStore};
use crate::types::CategoryId;
use std::collections::HashSet;
use std::path::Path;

const RESULTS_TREE: &str = "results";

/// Sled-based implementation of ResultStore
pub struct SledResultStore {
    results: sled::Tree,
    db: sled::Db,
}

impl SledResultStore {
    /// Open (or create) the result store at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let path = path.as_ref();
        let db = sled::open(path).map_err(|e| StorageError::Open {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_db(db)
    }

    pub fn from_db(db: sled::Db) -> Result<Self, StorageError> {
        Ok(Self {
            results: db.open_tree(RESULTS_TREE)?,
            db,
        })
    }

    /// Flush all pending writes to disk
    pub fn flush(&self) -> Result<(), StorageError> {
        self.db
            .flush()
            .map_err(|e| StorageError::Write(format!("Failed to flush database: {}", e)))?;
        Ok(())
    }
}

impl ResultStore for SledResultStore {
    fn satisfied_slots(
        &self,
        category_id: &CategoryId,
    ) -> Result<HashSet<(String, String)>, StorageError> {
        let prefix = Slot::category_prefix(category_id);
        let mut satisfied = HashSet::new();
        for item in self.results.scan_prefix(&prefix) {
            let (key, _) = item.map_err(|e| StorageError::Read(e.to_string()))?;
            match Slot::decode_suffix(&key, prefix.len()) {
                Some(pair) => {
                    satisfied.insert(pair);
                }
                None => {
                    return Err(StorageError::Decode(format!(
                        "Malformed result key under category '{}'",
                        category_id
                    )))
                }
            }
        }
        Ok(satisfied)
    }

    fn insert_if_absent(&self, result: &GenerationResult) -> Result<InsertOutcome, StorageError> {
        let key = result.slot().key();
        let value =
            bincode::serialize(result).map_err(|e| StorageError::Encode(e.to_string()))?;

        let swap = self
            .results
            .compare_and_swap(key, None as Option<&[u8]>, Some(value))
            .map_err(|e| StorageError::Write(e.to_string()))?;

        match swap {
            Ok(()) => Ok(InsertOutcome::Inserted),
            Err(_) => Ok(InsertOutcome::Duplicate),
        }
    }

    fn get(&self, slot: &Slot) -> Result<Option<GenerationResult>, StorageError> {
        match self
            .results
            .get(slot.key())
            .map_err(|e| StorageError::Read(e.to_string()))?
        {
            Some(value) => {
                let result: GenerationResult = bincode::deserialize(&value)
                    .map_err(|e| StorageError::Decode(e.to_string()))?;
                Ok(Some(result))
            }
            None => Ok(None),
        }
    }

    fn count(&self) -> Result<usize, StorageError> {
        Ok(self.results.len())
    }
}
