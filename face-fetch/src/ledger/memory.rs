use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;

use crate::{ledger::DedupLedger, FetchResult, LedgerEntry, NewPhoto};

#[derive(Debug, Default)]
struct Entries {
    by_key: BTreeMap<(i64, i64), LedgerEntry>,
    next_id: i64,
}

/// In-memory ledger for testing and development
#[derive(Debug, Default)]
pub struct MemoryLedger {
    entries: Mutex<Entries>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DedupLedger for MemoryLedger {
    async fn photo_exists(&self, user_id: i64, photo_id: i64) -> FetchResult<bool> {
        Ok(self.entries.lock().by_key.contains_key(&(user_id, photo_id)))
    }

    async fn add_photo(&self, photo: &NewPhoto) -> FetchResult<bool> {
        let mut entries = self.entries.lock();
        let key = (photo.user_id, photo.photo_id);
        if entries.by_key.contains_key(&key) {
            return Ok(false);
        }

        entries.next_id += 1;
        let entry = LedgerEntry {
            id: entries.next_id,
            user_id: photo.user_id,
            photo_id: photo.photo_id,
            url: photo.url.clone(),
            file_path: photo.file_path.clone(),
            embedding: photo.embedding.clone(),
            added_at: Utc::now(),
        };
        entries.by_key.insert(key, entry);
        Ok(true)
    }

    async fn get(&self, user_id: i64, photo_id: i64) -> FetchResult<Option<LedgerEntry>> {
        Ok(self.entries.lock().by_key.get(&(user_id, photo_id)).cloned())
    }

    async fn count(&self) -> FetchResult<u64> {
        Ok(self.entries.lock().by_key.len() as u64)
    }
}
