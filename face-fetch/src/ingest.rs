use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tracing::{info, instrument, warn};

use crate::{
    fetcher::{ContentFetcher, FetchOutcome},
    source::ItemSource,
    FetchResult, IngestConfig,
};

/// One item or owner that could not be processed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestFailure {
    pub owner_id: i64,

    /// `None` when the owner's photo list itself could not be read
    pub item_id: Option<i64>,

    pub error: String,
}

/// Totals of a batch run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub owners: usize,
    pub fetched: usize,
    pub already_fetched: usize,
    pub no_variants: usize,
    pub failures: Vec<IngestFailure>,
}

impl IngestReport {
    fn record(&mut self, outcome: &FetchOutcome) {
        match outcome {
            FetchOutcome::Fetched { .. } => self.fetched += 1,
            FetchOutcome::AlreadyFetched => self.already_fetched += 1,
            FetchOutcome::NoVariants => self.no_variants += 1,
        }
    }

    pub fn merge(&mut self, other: IngestReport) {
        self.owners += other.owners;
        self.fetched += other.fetched;
        self.already_fetched += other.already_fetched;
        self.no_variants += other.no_variants;
        self.failures.extend(other.failures);
    }
}

/// Runs the fetcher over every photo of a set of owners.
///
/// Items of one owner are processed one after another so the ledger
/// check-then-write for that owner is never contended. Different owners
/// never share ledger keys and run concurrently.
pub struct Ingestor {
    items: Arc<dyn ItemSource>,
    fetcher: Arc<ContentFetcher>,
    config: IngestConfig,
}

impl Ingestor {
    pub fn new<I: ItemSource + 'static>(items: I, fetcher: ContentFetcher, config: IngestConfig) -> Self {
        Self {
            items: Arc::new(items),
            fetcher: Arc::new(fetcher),
            config,
        }
    }

    pub fn fetcher(&self) -> &ContentFetcher {
        &self.fetcher
    }

    /// Fetch every listed photo of one owner, continuing past item failures
    #[instrument(skip(self))]
    pub async fn ingest_owner(&self, owner_id: i64) -> FetchResult<IngestReport> {
        let items = self.items.list_items(owner_id, self.config.item_limit).await?;

        let mut report = IngestReport {
            owners: 1,
            ..IngestReport::default()
        };

        for item in &items {
            match self.fetcher.fetch_item(owner_id, item).await {
                Ok(outcome) => report.record(&outcome),
                Err(e) => {
                    warn!("Skipping photo {} of owner {}: {}", item.item_id, owner_id, e);
                    report.failures.push(IngestFailure {
                        owner_id,
                        item_id: Some(item.item_id),
                        error: e.to_string(),
                    });
                }
            }
        }

        info!(
            fetched = report.fetched,
            already_fetched = report.already_fetched,
            failed = report.failures.len(),
            "Owner {} done",
            owner_id
        );
        Ok(report)
    }

    /// Ingest several owners, up to `owner_concurrency` at a time
    pub async fn ingest_owners(&self, owner_ids: &[i64]) -> IngestReport {
        let results: Vec<(i64, FetchResult<IngestReport>)> = stream::iter(owner_ids.iter().copied())
            .map(|owner_id| async move { (owner_id, self.ingest_owner(owner_id).await) })
            .buffer_unordered(self.config.owner_concurrency.max(1))
            .collect()
            .await;

        let mut total = IngestReport::default();
        for (owner_id, result) in results {
            match result {
                Ok(report) => total.merge(report),
                Err(e) => {
                    warn!("Could not list photos of owner {}: {}", owner_id, e);
                    total.owners += 1;
                    total.failures.push(IngestFailure {
                        owner_id,
                        item_id: None,
                        error: e.to_string(),
                    });
                }
            }
        }
        total
    }

    /// Find owners in a city and ingest all of them
    #[instrument(skip(self))]
    pub async fn ingest_city(&self, city_id: i64) -> FetchResult<IngestReport> {
        let owners = self
            .items
            .owners_in_city(city_id, self.config.owner_limit)
            .await?;
        let owner_ids: Vec<i64> = owners.iter().map(|owner| owner.id).collect();

        info!("Ingesting {} owners from city {}", owner_ids.len(), city_id);
        Ok(self.ingest_owners(&owner_ids).await)
    }
}
