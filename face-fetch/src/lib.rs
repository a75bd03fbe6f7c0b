//! # face-fetch: idempotent fetch-and-record pipeline
//!
//! Downloads the best rendition of remote photos into a local directory and
//! records each one in a dedup ledger, so that every (owner, photo) pair is
//! fetched at most once.
//!
//! - **Ledger first, ledger last**: the ledger is consulted before any
//!   network access and written only after the file is on disk.
//! - **No partial state**: a failed download leaves neither a file nor a
//!   ledger entry; files are written to a temporary sibling and renamed.
//! - **Typed failures**: every step reports a [`FetchError`]; nothing retries
//!   internally.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use face_fetch::prelude::*;
//!
//! # #[tokio::main]
//! # async fn main() -> FetchResult<()> {
//! let config = FetchConfig::default().with_download_dir("downloads");
//! let ledger = SqliteLedger::connect(&config.ledger_url).await?;
//! let fetcher = ContentFetcher::new(
//!     ledger,
//!     HttpSource::from_config(&config),
//!     LocalPhotoStore::from_config(&config),
//! );
//!
//! let item = RemoteItem::new(42, vec![
//!     Variant::new(800, 600, "https://cdn.example/42_m.jpg"),
//!     Variant::new(1920, 1080, "https://cdn.example/42_z.jpg"),
//! ]);
//!
//! // Downloads the 1920x1080 variant; a second call is a no-op
//! fetcher.fetch_item(7, &item).await?;
//! assert_eq!(fetcher.fetch_item(7, &item).await?, FetchOutcome::AlreadyFetched);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod fetcher;
pub mod ingest;
pub mod ledger;
pub mod source;
pub mod store;
pub mod types;
pub mod vk;

pub use config::{FetchConfig, IngestConfig, VkConfig};
pub use error::{FetchError, FetchResult};
pub use fetcher::{ContentFetcher, FetchOutcome};
pub use ingest::{IngestFailure, IngestReport, Ingestor};
pub use ledger::{DedupLedger, MemoryLedger, SqliteLedger};
pub use source::{ByteSource, HttpSource, ItemSource};
pub use store::LocalPhotoStore;
pub use types::{LedgerEntry, NewPhoto, OwnerProfile, RemoteItem, Variant};
pub use vk::VkClient;

/// Prelude for common imports
pub mod prelude {
    pub use crate::{
        ByteSource, ContentFetcher, DedupLedger, FetchConfig, FetchError, FetchOutcome,
        FetchResult, HttpSource, IngestConfig, IngestReport, Ingestor, ItemSource,
        LocalPhotoStore, MemoryLedger, RemoteItem, SqliteLedger, Variant, VkClient, VkConfig,
    };
}
