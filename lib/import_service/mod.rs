//! Adaptive batch import scheduler.
//!
//! Imports record details from the board game XMLv2 API and stores them
//! through the record sink, recording a per-id outcome in the import ledger.
//!
//! The importer works through the batch API: it requests `STARTING_BATCH_SIZE`
//! records in a single request, persists what comes back, and walks the id
//! space upward. If the process is interrupted, the frontier resolver asks
//! the ledger for the highest id resolved so far and picks up from there.
//!
//! The upstream complicates this by rejecting an entire batch request when
//! any one requested id is a deleted record. One bad id ruins the whole
//! batch. The importer handles this by recursively splitting failed batches
//! and re-requesting them through a retry queue: a failed batch of
//! `[1-400]` produces follow-up requests `[1-200]` and `[201-400]`; if
//! `[1-200]` fails again it splits into `[1-100]` and `[101-200]`, and so on
//! until the specific bad ids are isolated and recorded so they are never
//! requested again by the normal flow.

pub mod fetcher;
pub mod frontier;
pub mod ledger;
pub mod queue;
pub mod sink;
pub mod types;

#[cfg(test)]
mod test_support;


pub use fetcher::{BggGameFetcher, FetchError, GameFetcher};
pub use ledger::{ImportLedger, LedgerError, PgImportLedger, LEDGER_RECORD_TYPE};
pub use queue::RetryQueue;
pub use sink::{PgRecordSink, RecordSink, SinkError};
pub use types::{
    BatchError, DispatchId, GameId, IdBatch, ImportOutcome, SINGLETON_SPLIT_THRESHOLD,
};

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use log::{debug, error, info, warn};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::bgg_client::GameRecord;
use crate::server::monitoring::IMPORT_METRICS;

/// Scheduling knobs; see the matching environment variables in `config`.
#[derive(Debug, Clone, Copy)]
pub struct SchedulerConfig {
    /// Cap on simultaneously active batch requests.
    pub max_connections: usize,
    /// Fixed tick period of the dispatch timer.
    pub wait_between_requests: Duration,
    /// Size of freshly generated forward-progress batches.
    pub starting_batch_size: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_connections: 2,
            wait_between_requests: Duration::from_millis(1000),
            starting_batch_size: 400,
        }
    }
}

/// Batches currently dispatched and awaiting resolution, keyed by an opaque
/// dispatch handle so identical id ranges are never conflated.
#[derive(Debug, Default)]
struct ActiveBatches {
    batches: HashMap<DispatchId, IdBatch>,
    dispatch_counter: u64,
}

impl ActiveBatches {
    fn insert(&mut self, batch: IdBatch) -> DispatchId {
        self.dispatch_counter += 1;
        let dispatch = DispatchId::new(self.dispatch_counter);
        self.batches.insert(dispatch, batch);
        dispatch
    }

    fn remove(&mut self, dispatch: DispatchId) -> Option<IdBatch> {
        self.batches.remove(&dispatch)
    }

    fn len(&self) -> usize {
        self.batches.len()
    }

    /// Highest end id over all active batches; the frontier continues after
    /// this while work is in flight.
    fn max_end_id(&self) -> Option<GameId> {
        self.batches.values().map(IdBatch::last).max()
    }

    #[cfg(test)]
    fn iter(&self) -> impl Iterator<Item = &IdBatch> {
        self.batches.values()
    }
}

/// Mutable scheduler state. Everything here is only touched while holding the
/// scheduler lock, which also serializes ledger and sink writes.
struct SchedulerState {
    queue: RetryQueue,
    active: ActiveBatches,
}

#[derive(Error, Debug)]
enum PersistBatchError {
    #[error(transparent)]
    Sink(#[from] SinkError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

struct ImporterCore {
    fetcher: Arc<dyn GameFetcher>,
    sink: Arc<dyn RecordSink>,
    ledger: Arc<dyn ImportLedger>,
    config: SchedulerConfig,
    state: Mutex<SchedulerState>,
}

struct Ticker {
    cancel: CancellationToken,
    _handle: JoinHandle<()>,
}

/// Point-in-time view of the scheduler, served by the status endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImporterSnapshot {
    pub running: bool,
    pub active_batches: usize,
    pub queued_batches: usize,
    pub queued_ids: usize,
}

/// The periodic batch import driver.
///
/// Cheaply cloneable; all clones share the same scheduler state and ticker.
#[derive(Clone)]
pub struct Importer {
    core: Arc<ImporterCore>,
    ticker: Arc<StdMutex<Option<Ticker>>>,
}

impl Importer {
    pub fn new(
        fetcher: Arc<dyn GameFetcher>,
        sink: Arc<dyn RecordSink>,
        ledger: Arc<dyn ImportLedger>,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            core: Arc::new(ImporterCore {
                fetcher,
                sink,
                ledger,
                config,
                state: Mutex::new(SchedulerState {
                    queue: RetryQueue::new(),
                    active: ActiveBatches::default(),
                }),
            }),
            ticker: Arc::new(StdMutex::new(None)),
        }
    }

    /// Begins periodic batch dispatch. Repeated calls have no additional
    /// effect while the ticker is running.
    pub fn start(&self) {
        let mut ticker = self.ticker.lock().expect("ticker lock poisoned");
        if ticker.is_some() {
            return;
        }

        info!("Starting...");
        let cancel = CancellationToken::new();
        let loop_cancel = cancel.clone();
        let core = Arc::clone(&self.core);
        let handle = tokio::spawn(async move {
            let period = core.config.wait_between_requests;
            let mut interval =
                tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        core.process_tick().await;
                    }
                    _ = loop_cancel.cancelled() => {
                        break;
                    }
                }
            }
            debug!("Importer tick loop exited");
        });

        *ticker = Some(Ticker {
            cancel,
            _handle: handle,
        });
    }

    /// Halts new dispatches. Batches already dispatched still resolve and
    /// their outcomes are applied. A no-op when already stopped.
    pub fn stop(&self) {
        let mut ticker = self.ticker.lock().expect("ticker lock poisoned");
        if let Some(ticker) = ticker.take() {
            info!("Stopping; in-flight batches will still resolve");
            ticker.cancel.cancel();
        }
    }

    pub fn is_running(&self) -> bool {
        self.ticker.lock().expect("ticker lock poisoned").is_some()
    }

    /// Imports a single record on demand. See [`Importer::import_ids`].
    pub async fn import_id(&self, id: GameId) -> Result<(), BatchError> {
        self.import_ids(vec![id]).await
    }

    /// Imports an explicit id list through the normal dispatch/outcome path,
    /// bypassing frontier/queue selection and the connection cap.
    ///
    /// This is the repair entry point: it is the only path that requests an
    /// id already recorded `bad`, and a success overwrites that entry.
    pub async fn import_ids(&self, ids: Vec<GameId>) -> Result<(), BatchError> {
        let batch = IdBatch::from_unordered(ids)?;
        self.core.run_batch(batch).await;
        Ok(())
    }

    pub async fn snapshot(&self) -> ImporterSnapshot {
        let state = self.core.state.lock().await;
        ImporterSnapshot {
            running: self.is_running(),
            active_batches: state.active.len(),
            queued_batches: state.queue.len(),
            queued_ids: state.queue.queued_ids(),
        }
    }
}

impl ImporterCore {
    /// One scheduler tick: dispatches at most one batch if there is headroom.
    ///
    /// Returns the handle of the spawned dispatch so callers that need to
    /// observe completion (tests, drain paths) can await it.
    async fn process_tick(self: &Arc<Self>) -> Option<JoinHandle<()>> {
        let mut state = self.state.lock().await;
        if state.active.len() >= self.config.max_connections {
            debug!("Too many active batches, not starting a new one");
            return None;
        }

        let batch = if let Some(batch) = state.queue.pop() {
            debug!("Getting batch from the queue...");
            batch
        } else {
            let active_max_end = state.active.max_end_id();
            if active_max_end.is_some() {
                debug!("Getting batch that follows current work...");
            } else {
                debug!("Getting batch from the database...");
            }
            match frontier::next_fresh_batch(
                self.ledger.as_ref(),
                active_max_end,
                self.config.starting_batch_size,
            )
            .await
            {
                Ok(batch) => batch,
                Err(err) => {
                    error!("Could not resolve the next fresh batch: {err}");
                    return None;
                }
            }
        };

        let dispatch = state.active.insert(batch.clone());
        self.publish_depth_metrics(&state);
        drop(state);

        let core = Arc::clone(self);
        Some(tokio::spawn(async move {
            core.dispatch(dispatch, batch).await;
        }))
    }

    /// Registers and runs one batch inline; the on-demand path.
    async fn run_batch(self: &Arc<Self>, batch: IdBatch) {
        let dispatch = {
            let mut state = self.state.lock().await;
            let dispatch = state.active.insert(batch.clone());
            self.publish_depth_metrics(&state);
            dispatch
        };
        self.dispatch(dispatch, batch).await;
    }

    /// Fetches one dispatched batch and applies its outcome exactly once.
    ///
    /// The fetch runs without the scheduler lock so the connection cap, not
    /// the lock, bounds concurrency; outcome application re-acquires it.
    async fn dispatch(&self, dispatch: DispatchId, batch: IdBatch) {
        info!("Requesting batch {batch}");
        if let Some(metrics) = IMPORT_METRICS.get() {
            metrics.batches_dispatched.inc();
        }

        let result = self.fetcher.fetch_games(batch.ids()).await;

        let mut state = self.state.lock().await;
        match result {
            Ok(records) => match self.record_batch_loaded(&batch, records).await {
                Ok(()) => {
                    if let Some(metrics) = IMPORT_METRICS.get() {
                        metrics.batches_loaded.inc();
                    }
                }
                Err(err) => {
                    warn!("Failed to persist batch {batch}: {err}");
                    self.quarantine_or_split(&mut state, &batch).await;
                }
            },
            Err(err) => {
                debug!("Batch {batch} failed upstream: {err}");
                self.quarantine_or_split(&mut state, &batch).await;
            }
        }
        state.active.remove(dispatch);
        self.publish_depth_metrics(&state);
    }

    /// Persists records and ledger outcomes for one successful batch.
    ///
    /// Every requested id gets an entry: `loaded` when the response carried a
    /// record for it, `empty` when it was absent.
    async fn record_batch_loaded(
        &self,
        batch: &IdBatch,
        records: Vec<GameRecord>,
    ) -> Result<(), PersistBatchError> {
        info!("Received batch {batch}");

        let mut received: HashSet<GameId> = HashSet::with_capacity(records.len());
        for record in &records {
            self.sink.save(record).await?;
            received.insert(record.id);
        }
        if let Some(metrics) = IMPORT_METRICS.get() {
            metrics.records_persisted.inc_by(records.len() as u64);
        }

        for &id in batch.ids() {
            let outcome = if received.contains(&id) {
                ImportOutcome::Loaded
            } else {
                ImportOutcome::Empty
            };
            self.ledger.record(id, outcome).await?;
        }
        Ok(())
    }

    /// The failure splitter: isolates a bad singleton or bisects the batch
    /// and requeues the children ahead of older backlog.
    ///
    /// This path never fails: every failed batch resolves into a ledger write
    /// or queued children, so batch size strictly decreases until isolation.
    async fn quarantine_or_split(&self, state: &mut SchedulerState, batch: &IdBatch) {
        if let Some(metrics) = IMPORT_METRICS.get() {
            metrics.batches_failed.inc();
        }

        if batch.len() == 1 {
            let id = batch.first();
            warn!("-------------------------------------------");
            warn!("Record {id} was bad and will be skipped!");
            warn!("-------------------------------------------");
            if let Some(metrics) = IMPORT_METRICS.get() {
                metrics.ids_quarantined.inc();
            }
            if let Err(err) = self.ledger.record(id, ImportOutcome::Bad).await {
                error!("Could not record {id} as bad: {err}");
            }
        } else {
            warn!("Batch {batch} was corrupt. Splitting batch...");
            state.queue.requeue_at_head(batch.split_for_retry());
        }
    }

    fn publish_depth_metrics(&self, state: &SchedulerState) {
        if let Some(metrics) = IMPORT_METRICS.get() {
            metrics.active_batches.set(state.active.len() as i64);
            metrics.queued_batches.set(state.queue.len() as i64);
        }
    }
}
