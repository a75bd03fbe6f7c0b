use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use face_core::{ConfigError, ConfigSnapshot};
use futures::FutureExt;
use rand::Rng;
use tokio::sync::oneshot::{self, error::TryRecvError};
use tokio::task::{JoinError, JoinHandle};
use tokio::time::sleep;
use tracing::{debug, error, info, info_span, trace, warn, Instrument};

use crate::{backend::PriorityStore, JobError, JobRecord, JobStatus, QueueResult, TaskQueue};

/// Polling behaviour of a [`Worker`]
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Base delay between polls of an empty queue
    pub poll_interval: Duration,
    /// Upper bound of the random delay added to every poll
    pub jitter: Duration,
    /// Stop the loop the first time the queue is found empty
    pub shutdown_when_empty: bool,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            jitter: Duration::from_millis(250),
            shutdown_when_empty: false,
        }
    }
}

impl WorkerConfig {
    /// Read the `worker.*` keys
    pub fn from_config(config: &ConfigSnapshot) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            poll_interval: config
                .parse::<u64>("worker.poll_interval_ms")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.poll_interval),
            jitter: config
                .parse::<u64>("worker.jitter_ms")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.jitter),
            shutdown_when_empty: config
                .parse::<bool>("worker.shutdown_when_empty")?
                .unwrap_or(defaults.shutdown_when_empty),
        })
    }

    fn sleep_duration_with_jitter(&self) -> Duration {
        if self.jitter.is_zero() {
            return self.poll_interval;
        }

        let jitter_millis = u64::try_from(self.jitter.as_millis()).unwrap_or(u64::MAX);
        let random_jitter = rand::thread_rng().gen_range(0..=jitter_millis);
        self.poll_interval + Duration::from_millis(random_jitter)
    }
}

/// Processes one dequeued job
#[async_trait]
pub trait TaskHandler: Send + Sync + 'static {
    async fn handle(&self, record: JobRecord) -> Result<(), JobError>;
}

/// Counters shared between a worker and its handle
#[derive(Debug, Default)]
pub struct WorkerStats {
    processed: AtomicU64,
    failed: AtomicU64,
}

impl WorkerStats {
    /// Jobs the handler finished successfully
    pub fn processed(&self) -> u64 {
        self.processed.load(Ordering::Relaxed)
    }

    /// Jobs the handler failed or panicked on
    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }
}

/// Handle for managing worker lifecycle
pub struct WorkerHandle {
    shutdown_tx: oneshot::Sender<()>,
    join_handle: JoinHandle<()>,
    stats: Arc<WorkerStats>,
}

impl WorkerHandle {
    /// Ask the worker to stop and wait for it.
    ///
    /// A job that is already running is finished first.
    pub async fn shutdown(self) -> Result<(), JoinError> {
        let _ = self.shutdown_tx.send(());
        self.join_handle.await
    }

    /// Wait for the worker to stop on its own
    pub async fn join(self) -> Result<(), JoinError> {
        let Self {
            shutdown_tx,
            join_handle,
            ..
        } = self;
        let result = join_handle.await;
        drop(shutdown_tx);
        result
    }

    pub fn stats(&self) -> &WorkerStats {
        &self.stats
    }
}

/// Pulls jobs off a [`TaskQueue`] one at a time and hands them to a handler.
///
/// A dequeued job is never put back: whatever the handler returns, the job is
/// counted and the worker moves on.
pub struct Worker<S: PriorityStore + ?Sized, H: TaskHandler> {
    queue: TaskQueue<S>,
    handler: Arc<H>,
    config: WorkerConfig,
    stats: Arc<WorkerStats>,
}

impl<S: PriorityStore + ?Sized + 'static, H: TaskHandler> Worker<S, H> {
    pub fn new(queue: TaskQueue<S>, handler: H, config: WorkerConfig) -> Self {
        Self {
            queue,
            handler: Arc::new(handler),
            config,
            stats: Arc::new(WorkerStats::default()),
        }
    }

    pub fn stats(&self) -> &WorkerStats {
        &self.stats
    }

    /// Run the next job in the queue, if there is one.
    ///
    /// Returns the final status of the job that ran, `None` when the queue
    /// was empty, or the dequeue error.
    pub async fn run_next(&self) -> QueueResult<Option<JobStatus>> {
        trace!("Looking for next job");

        let Some(mut record) = self.queue.dequeue_task().await? else {
            return Ok(None);
        };
        record.status = JobStatus::InProgress;

        let span = info_span!("job", job.id = %record.job_id, user.id = record.user_id);
        let job_id = record.job_id.clone();

        let result = AssertUnwindSafe(self.handler.handle(record))
            .catch_unwind()
            .instrument(span.clone())
            .await
            .map_err(|panic| JobError::Panicked(panic_message(&*panic)))
            .and_then(std::convert::identity);

        let _enter = span.enter();
        match result {
            Ok(()) => {
                self.stats.processed.fetch_add(1, Ordering::Relaxed);
                debug!("Job {} done", job_id);
                Ok(Some(JobStatus::Done))
            }
            Err(e) => {
                self.stats.failed.fetch_add(1, Ordering::Relaxed);
                warn!("Job {} failed: {}", job_id, e);
                Ok(Some(JobStatus::Error))
            }
        }
    }

    /// Run jobs until `shutdown` fires or its sender is dropped.
    ///
    /// With `shutdown_when_empty` set, the loop also stops the first time
    /// the queue is found empty.
    pub async fn run(self, mut shutdown: oneshot::Receiver<()>) {
        info!("Worker started on {} store", self.queue.store().backend_name());

        loop {
            match shutdown.try_recv() {
                Err(TryRecvError::Empty) => {}
                _ => {
                    info!("Worker shutdown requested");
                    break;
                }
            }

            let delay = match self.run_next().await {
                Ok(Some(_)) => continue,
                Ok(None) if self.config.shutdown_when_empty => {
                    debug!("No pending jobs found, shutting down the worker");
                    break;
                }
                Ok(None) => {
                    let delay = self.config.sleep_duration_with_jitter();
                    trace!("No pending jobs found, polling again in {delay:?}");
                    delay
                }
                Err(e) => {
                    error!("Failed to fetch next job: {e}");
                    self.config.sleep_duration_with_jitter()
                }
            };

            tokio::select! {
                _ = &mut shutdown => {
                    info!("Worker shutdown requested");
                    break;
                }
                _ = sleep(delay) => {}
            }
        }

        info!(
            processed = self.stats.processed(),
            failed = self.stats.failed(),
            "Worker stopped"
        );
    }

    /// Start the run loop on the tokio runtime
    pub fn spawn(self) -> WorkerHandle {
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let stats = Arc::clone(&self.stats);
        let join_handle = tokio::spawn(self.run(shutdown_rx));

        WorkerHandle {
            shutdown_tx,
            join_handle,
            stats,
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
