//! Record of which (owner, photo) pairs have already been fetched.
//!
//! The ledger is the only authority on "already fetched". Entries are created
//! once and never updated; inserting a key that exists is a successful no-op.

mod memory;
mod sqlite;

pub use memory::MemoryLedger;
pub use sqlite::SqliteLedger;

use async_trait::async_trait;

use crate::{FetchResult, LedgerEntry, NewPhoto};

/// Dedup ledger operations - implemented by every ledger backend
#[async_trait]
pub trait DedupLedger: Send + Sync {
    /// Check whether `(user_id, photo_id)` has been recorded
    async fn photo_exists(&self, user_id: i64, photo_id: i64) -> FetchResult<bool>;

    /// Record a fetched photo.
    ///
    /// Returns `true` when a new entry was written and `false` when the key
    /// was already present; the existing entry is left untouched.
    async fn add_photo(&self, photo: &NewPhoto) -> FetchResult<bool>;

    /// Look up a recorded photo
    async fn get(&self, user_id: i64, photo_id: i64) -> FetchResult<Option<LedgerEntry>>;

    /// Number of recorded photos
    async fn count(&self) -> FetchResult<u64>;
}
