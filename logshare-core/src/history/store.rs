use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;
use tracing::{debug, warn};

use super::backend::HistoryBackend;
use super::record::{reorder, SortOrder, SubjectKey, UploadRecord};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to persist history for {subject}: {message}")]
    Persist { subject: String, message: String },
}

/// Durable per-subject upload history.
///
/// Every mutation re-reads the persisted collection under the subject's
/// lock before writing the merged result back, so two uploads finishing
/// close together both land in the history.
pub struct HistoryStore {
    backend: Arc<dyn HistoryBackend>,
    locks: Mutex<HashMap<SubjectKey, Arc<Mutex<()>>>>,
}

impl HistoryStore {
    pub fn new(backend: Arc<dyn HistoryBackend>) -> Self {
        Self {
            backend,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Persisted records in stored order. Missing, unreadable or corrupt
    /// state reads as an empty history.
    pub fn load(&self, subject: &SubjectKey) -> Vec<UploadRecord> {
        let key = subject.storage_key();
        let raw = match self.backend.read(&key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!("Could not read history for {}, treating as empty: {:#}", subject, e);
                return Vec::new();
            }
        };

        parse_or_empty(subject, &raw)
    }

    /// Persisted records sorted by upload time.
    pub fn load_sorted(&self, subject: &SubjectKey, order: SortOrder) -> Vec<UploadRecord> {
        reorder(self.load(subject), order)
    }

    /// Add a record. A record whose id is already present is ignored.
    pub fn append(&self, subject: &SubjectKey, record: UploadRecord) -> Result<(), StoreError> {
        self.mutate(subject, |records| {
            if records.iter().any(|r| r.id == record.id) {
                debug!("Upload {} already recorded for {}", record.id, subject);
                return false;
            }
            records.push(record);
            true
        })
    }

    /// Drop the record with `id`. Absent ids are a no-op.
    pub fn remove(&self, subject: &SubjectKey, id: &str) -> Result<(), StoreError> {
        self.mutate(subject, |records| {
            let before = records.len();
            records.retain(|r| r.id != id);
            records.len() != before
        })
    }

    /// Drop every record for the subject.
    pub fn clear(&self, subject: &SubjectKey) -> Result<(), StoreError> {
        let lock = self.lock_for(subject);
        let _guard = lock_ignoring_poison(lock.as_ref());

        self.backend
            .remove(&subject.storage_key())
            .map_err(|e| persist_error(subject, e))?;
        debug!("Cleared history for {}", subject);
        Ok(())
    }

    fn mutate<F>(&self, subject: &SubjectKey, change: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut Vec<UploadRecord>) -> bool,
    {
        let lock = self.lock_for(subject);
        let _guard = lock_ignoring_poison(lock.as_ref());

        // Never write a merge over a history that could not be read
        let mut records = match self.backend.read(&subject.storage_key()) {
            Ok(Some(raw)) => parse_or_empty(subject, &raw),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("Could not read history for {}, leaving it untouched: {:#}", subject, e);
                return Err(persist_error(subject, format!("{:#}", e)));
            }
        };
        if !change(&mut records) {
            return Ok(());
        }

        let encoded = serde_json::to_string(&records).map_err(|e| persist_error(subject, e))?;
        self.backend
            .write(&subject.storage_key(), &encoded)
            .map_err(|e| persist_error(subject, e))?;
        debug!("Persisted {} history records for {}", records.len(), subject);
        Ok(())
    }

    fn lock_for(&self, subject: &SubjectKey) -> Arc<Mutex<()>> {
        let mut locks = lock_ignoring_poison(&self.locks);
        locks.entry(subject.clone()).or_default().clone()
    }
}

/// Corrupt state degrades to an empty history; the next write replaces it.
fn parse_or_empty(subject: &SubjectKey, raw: &str) -> Vec<UploadRecord> {
    match serde_json::from_str::<Vec<UploadRecord>>(raw) {
        Ok(records) => records,
        Err(e) => {
            warn!("Corrupt history for {}, treating as empty: {}", subject, e);
            Vec::new()
        }
    }
}

fn lock_ignoring_poison<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

fn persist_error(subject: &SubjectKey, e: impl std::fmt::Display) -> StoreError {
    StoreError::Persist {
        subject: subject.to_string(),
        message: e.to_string(),
    }
}
