use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::{
    ledger::DedupLedger, source::ByteSource, store::LocalPhotoStore, FetchResult, NewPhoto,
    RemoteItem,
};

/// What a fetch call did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The photo was downloaded, written and recorded
    Fetched { path: PathBuf, url: String },

    /// The ledger already had the photo; nothing was downloaded
    AlreadyFetched,

    /// The item has no variants; nothing to do
    NoVariants,
}

/// Fetches the best variant of a remote photo exactly once per (owner, item).
///
/// Steps, in order: pick the variant, check the ledger, download, write the
/// file, record the ledger entry. A failure at any step stops the pipeline,
/// so a ledger entry always has a file behind it.
pub struct ContentFetcher {
    ledger: Arc<dyn DedupLedger>,
    source: Arc<dyn ByteSource>,
    store: LocalPhotoStore,
}

impl ContentFetcher {
    pub fn new<L, S>(ledger: L, source: S, store: LocalPhotoStore) -> Self
    where
        L: DedupLedger + 'static,
        S: ByteSource + 'static,
    {
        Self::from_shared(Arc::new(ledger), Arc::new(source), store)
    }

    pub fn from_shared(
        ledger: Arc<dyn DedupLedger>,
        source: Arc<dyn ByteSource>,
        store: LocalPhotoStore,
    ) -> Self {
        Self {
            ledger,
            source,
            store,
        }
    }

    pub fn ledger(&self) -> &Arc<dyn DedupLedger> {
        &self.ledger
    }

    pub fn store(&self) -> &LocalPhotoStore {
        &self.store
    }

    /// Fetch and record `item` for `owner_id`.
    ///
    /// Errors:
    /// - `FetchFailed`: download failed; no file written, nothing recorded
    /// - `PersistFailed`: the file could not be written; nothing recorded
    /// - `StoreUnavailable`: the ledger failed; the file may be on disk but
    ///   is not recorded, so the next call fetches it again
    #[instrument(skip(self, item), fields(item_id = item.item_id))]
    pub async fn fetch_item(&self, owner_id: i64, item: &RemoteItem) -> FetchResult<FetchOutcome> {
        let Some(best) = item.best_variant() else {
            debug!("Item has no variants, skipping");
            return Ok(FetchOutcome::NoVariants);
        };

        if self.ledger.photo_exists(owner_id, item.item_id).await? {
            debug!("Already fetched");
            return Ok(FetchOutcome::AlreadyFetched);
        }

        let bytes = match self.source.fetch(&best.url).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Download failed: {}", e);
                return Err(e);
            }
        };

        let path = self.store.persist(owner_id, item.item_id, &bytes).await?;

        let photo = NewPhoto::new(
            owner_id,
            item.item_id,
            best.url.clone(),
            path.to_string_lossy().into_owned(),
        );
        if let Err(e) = self.ledger.add_photo(&photo).await {
            warn!(
                "Wrote {} but could not record it: {}",
                path.display(),
                e
            );
            return Err(e);
        }

        info!("Fetched {} ({}x{})", path.display(), best.width, best.height);
        Ok(FetchOutcome::Fetched {
            path,
            url: best.url.clone(),
        })
    }
}
