use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use futures::future::BoxFuture;

use crate::bgg_client::{GameName, GameRecord, GameStats};

use super::fetcher::{FetchError, GameFetcher};
use super::ledger::{ImportLedger, LedgerError};
use super::sink::{RecordSink, SinkError};
use super::types::{GameId, ImportOutcome};

pub(super) fn sample_record(id: GameId) -> GameRecord {
    GameRecord {
        id,
        thing_type: "boardgame".to_string(),
        name: Some(format!("record-{id}")),
        names: vec![GameName {
            name_type: "primary".to_string(),
            value: format!("record-{id}"),
        }],
        thumbnail: None,
        image: None,
        description: Some("a test record".to_string()),
        year_published: 2004,
        min_players: 2,
        max_players: 4,
        play_time: 60,
        min_age: 10,
        stats: GameStats {
            users_rated: 128,
            average: 7.1,
            bayes_average: 6.8,
            owned: 512,
            trading: 3,
            wanting: 9,
            wishing: 27,
            num_comments: 41,
        },
        ranks: Vec::new(),
        links: Vec::new(),
    }
}

/// Deterministic fetcher: any batch containing a poisoned id fails wholesale
/// (the upstream's all-or-nothing behavior); ids in `missing` are simply
/// absent from otherwise successful responses.
#[derive(Default)]
pub(super) struct ScriptedFetcher {
    poisoned: HashSet<GameId>,
    missing: HashSet<GameId>,
    calls: Mutex<Vec<Vec<GameId>>>,
}

impl ScriptedFetcher {
    pub(super) fn new(poisoned: &[GameId], missing: &[GameId]) -> Self {
        Self {
            poisoned: poisoned.iter().copied().collect(),
            missing: missing.iter().copied().collect(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn requested_batches(&self) -> Vec<Vec<GameId>> {
        self.calls.lock().expect("calls mutex poisoned").clone()
    }
}

impl GameFetcher for ScriptedFetcher {
    fn fetch_games<'a>(
        &'a self,
        ids: &'a [GameId],
    ) -> BoxFuture<'a, Result<Vec<GameRecord>, FetchError>> {
        Box::pin(async move {
            self.calls
                .lock()
                .expect("calls mutex poisoned")
                .push(ids.to_vec());

            if let Some(bad) = ids.iter().find(|id| self.poisoned.contains(id)) {
                return Err(FetchError::new(format!(
                    "upstream rejected a batch containing {bad}"
                )));
            }

            Ok(ids
                .iter()
                .filter(|id| !self.missing.contains(id))
                .map(|&id| sample_record(id))
                .collect())
        })
    }
}

/// Fetcher whose requests register and then never complete; used to keep
/// batches pinned in the active set.
#[derive(Default)]
pub(super) struct StalledFetcher {
    calls: Mutex<Vec<Vec<GameId>>>,
}

impl GameFetcher for StalledFetcher {
    fn fetch_games<'a>(
        &'a self,
        ids: &'a [GameId],
    ) -> BoxFuture<'a, Result<Vec<GameRecord>, FetchError>> {
        Box::pin(async move {
            self.calls
                .lock()
                .expect("calls mutex poisoned")
                .push(ids.to_vec());
            futures::future::pending::<Result<Vec<GameRecord>, FetchError>>().await
        })
    }
}

/// In-memory ledger double with optional scripted write failures.
#[derive(Default)]
pub(super) struct MemoryLedger {
    entries: Mutex<HashMap<GameId, ImportOutcome>>,
    fail_writes: AtomicBool,
}

impl MemoryLedger {
    pub(super) fn with_max(max: GameId) -> Self {
        let ledger = Self::default();
        ledger
            .entries
            .lock()
            .expect("entries mutex poisoned")
            .insert(max, ImportOutcome::Loaded);
        ledger
    }

    pub(super) fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub(super) fn outcome(&self, id: GameId) -> Option<ImportOutcome> {
        self.entries
            .lock()
            .expect("entries mutex poisoned")
            .get(&id)
            .copied()
    }

    pub(super) fn entries(&self) -> HashMap<GameId, ImportOutcome> {
        self.entries.lock().expect("entries mutex poisoned").clone()
    }
}

impl ImportLedger for MemoryLedger {
    fn record<'a>(
        &'a self,
        target_id: GameId,
        outcome: ImportOutcome,
    ) -> BoxFuture<'a, Result<(), LedgerError>> {
        Box::pin(async move {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(LedgerError::Query(diesel::result::Error::NotFound));
            }
            self.entries
                .lock()
                .expect("entries mutex poisoned")
                .insert(target_id, outcome);
            Ok(())
        })
    }

    fn max_recorded_id<'a>(&'a self) -> BoxFuture<'a, Result<Option<GameId>, LedgerError>> {
        Box::pin(async move {
            Ok(self
                .entries
                .lock()
                .expect("entries mutex poisoned")
                .keys()
                .max()
                .copied())
        })
    }
}

/// In-memory sink double; saves for ids in `fail_ids` error to exercise the
/// persistence-failure path.
#[derive(Default)]
pub(super) struct MemorySink {
    fail_ids: HashSet<GameId>,
    saved: Mutex<Vec<GameId>>,
}

impl MemorySink {
    pub(super) fn failing_for(fail_ids: &[GameId]) -> Self {
        Self {
            fail_ids: fail_ids.iter().copied().collect(),
            saved: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn saved_ids(&self) -> Vec<GameId> {
        self.saved.lock().expect("saved mutex poisoned").clone()
    }
}

impl RecordSink for MemorySink {
    fn save<'a>(&'a self, record: &'a GameRecord) -> BoxFuture<'a, Result<(), SinkError>> {
        Box::pin(async move {
            if self.fail_ids.contains(&record.id) {
                return Err(SinkError::Query(diesel::result::Error::NotFound));
            }
            self.saved
                .lock()
                .expect("saved mutex poisoned")
                .push(record.id);
            Ok(())
        })
    }
}
