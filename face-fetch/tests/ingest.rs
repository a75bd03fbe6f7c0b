mod common;

use std::collections::HashMap;
use std::sync::Arc;

use tempfile::TempDir;

use common::{owner, StubItems, StubSource};
use face_fetch::{
    ContentFetcher, DedupLedger, IngestConfig, Ingestor, LocalPhotoStore, MemoryLedger, RemoteItem,
    Variant,
};

fn photo(item_id: i64, url: &str) -> RemoteItem {
    RemoteItem::new(item_id, vec![Variant::new(640, 480, url)])
}

/// Owner 7 has two good photos and one without sizes, owner 8 has one
/// photo whose download fails, owner 9 is private.
fn catalogue() -> StubItems {
    let mut items = HashMap::new();
    items.insert(
        7,
        vec![photo(1, "a.jpg"), photo(2, "b.jpg"), RemoteItem::new(3, Vec::new())],
    );
    items.insert(8, vec![photo(4, "broken.jpg")]);

    StubItems {
        owners: vec![owner(7), owner(8), owner(9)],
        items,
    }
}

fn stub_source() -> Arc<StubSource> {
    Arc::new(
        StubSource::new()
            .serving("a.jpg", b"a")
            .serving("b.jpg", b"b")
            .failing("broken.jpg", "HTTP 500 Internal Server Error"),
    )
}

fn create_ingestor(dir: &TempDir, ledger: Arc<MemoryLedger>, source: Arc<StubSource>) -> Ingestor {
    let fetcher = ContentFetcher::from_shared(ledger, source, LocalPhotoStore::new(dir.path()));
    Ingestor::new(catalogue(), fetcher, IngestConfig::default())
}

/// I1. One Owner Is Processed Item By Item
#[tokio::test]
async fn test_ingest_owner_counts_outcomes() {
    let dir = TempDir::new().unwrap();
    let ledger = Arc::new(MemoryLedger::new());
    let ingestor = create_ingestor(&dir, ledger.clone(), stub_source());

    let report = ingestor.ingest_owner(7).await.unwrap();

    assert_eq!(report.owners, 1);
    assert_eq!(report.fetched, 2);
    assert_eq!(report.no_variants, 1);
    assert!(report.failures.is_empty());
    assert_eq!(ledger.count().await.unwrap(), 2);
}

/// I2. Second Run Fetches Nothing New
#[tokio::test]
async fn test_ingest_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let source = stub_source();
    let ingestor = create_ingestor(&dir, Arc::new(MemoryLedger::new()), source.clone());

    ingestor.ingest_owner(7).await.unwrap();
    let second = ingestor.ingest_owner(7).await.unwrap();

    assert_eq!(second.fetched, 0);
    assert_eq!(second.already_fetched, 2);
    assert_eq!(source.calls(), 2);
}

/// I3. Failures Do Not Stop The Batch
#[tokio::test]
async fn test_ingest_city_continues_past_failures() {
    let dir = TempDir::new().unwrap();
    let ledger = Arc::new(MemoryLedger::new());
    let ingestor = create_ingestor(&dir, ledger.clone(), stub_source());

    let report = ingestor.ingest_city(1).await.unwrap();

    assert_eq!(report.owners, 3);
    assert_eq!(report.fetched, 2);
    assert_eq!(report.failures.len(), 2);

    let broken = report
        .failures
        .iter()
        .find(|f| f.owner_id == 8)
        .unwrap();
    assert_eq!(broken.item_id, Some(4));

    let private = report
        .failures
        .iter()
        .find(|f| f.owner_id == 9)
        .unwrap();
    assert_eq!(private.item_id, None);

    assert!(!ledger.photo_exists(8, 4).await.unwrap());
}

/// I4. Owner Limit Caps The Search
#[tokio::test]
async fn test_owner_limit_is_respected() {
    let dir = TempDir::new().unwrap();
    let fetcher = ContentFetcher::from_shared(
        Arc::new(MemoryLedger::new()),
        stub_source(),
        LocalPhotoStore::new(dir.path()),
    );
    let config = IngestConfig {
        owner_limit: 1,
        ..IngestConfig::default()
    };
    let ingestor = Ingestor::new(catalogue(), fetcher, config);

    let report = ingestor.ingest_city(1).await.unwrap();

    assert_eq!(report.owners, 1);
    assert_eq!(report.fetched, 2);
}
