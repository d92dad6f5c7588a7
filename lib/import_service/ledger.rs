use std::sync::Arc;

use diesel::dsl::max;
use diesel::insert_into;
use diesel::pg::upsert::excluded;
use diesel::prelude::*;
use diesel_async::pooled_connection::deadpool::{Pool, PoolError};
use diesel_async::RunQueryDsl;
use futures::future::BoxFuture;
use thiserror::Error;

use crate::db::models::ImportRow;
use crate::db::schema::bg_imports;

use super::types::{GameId, ImportOutcome};

/// Ledger rows written by this importer are keyed under one record type.
pub const LEDGER_RECORD_TYPE: &str = "game";

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error(transparent)]
    Pool(#[from] PoolError),

    #[error(transparent)]
    Query(#[from] diesel::result::Error),
}

/// Durable store of the latest terminal outcome per record id.
///
/// Writes are idempotent upserts: the latest write wins and entries are never
/// deleted, so the ledger only ever fills in monotonically.
pub trait ImportLedger: Send + Sync {
    fn record<'a>(
        &'a self,
        target_id: GameId,
        outcome: ImportOutcome,
    ) -> BoxFuture<'a, Result<(), LedgerError>>;

    /// Highest id with any recorded outcome, the durable cold-start
    /// resumption point for the frontier.
    fn max_recorded_id<'a>(&'a self) -> BoxFuture<'a, Result<Option<GameId>, LedgerError>>;
}

impl<T> ImportLedger for Arc<T>
where
    T: ImportLedger + ?Sized,
{
    fn record<'a>(
        &'a self,
        target_id: GameId,
        outcome: ImportOutcome,
    ) -> BoxFuture<'a, Result<(), LedgerError>> {
        (**self).record(target_id, outcome)
    }

    fn max_recorded_id<'a>(&'a self) -> BoxFuture<'a, Result<Option<GameId>, LedgerError>> {
        (**self).max_recorded_id()
    }
}

/// Postgres-backed ledger used by the production runtime.
pub struct PgImportLedger {
    pool: Pool<diesel_async::AsyncPgConnection>,
}

impl PgImportLedger {
    pub fn new(pool: Pool<diesel_async::AsyncPgConnection>) -> Self {
        Self { pool }
    }
}

impl ImportLedger for PgImportLedger {
    fn record<'a>(
        &'a self,
        target_id: GameId,
        outcome: ImportOutcome,
    ) -> BoxFuture<'a, Result<(), LedgerError>> {
        Box::pin(async move {
            let mut conn = self.pool.get().await?;
            let row = ImportRow {
                target_id,
                type_: LEDGER_RECORD_TYPE.to_string(),
                result: outcome.as_db_str().to_string(),
            };

            insert_into(bg_imports::dsl::bg_imports)
                .values(&row)
                .on_conflict((bg_imports::target_id, bg_imports::type_))
                .do_update()
                .set(bg_imports::result.eq(excluded(bg_imports::result)))
                .execute(&mut conn)
                .await?;
            Ok(())
        })
    }

    fn max_recorded_id<'a>(&'a self) -> BoxFuture<'a, Result<Option<GameId>, LedgerError>> {
        Box::pin(async move {
            let mut conn = self.pool.get().await?;
            let max_id: Option<GameId> = bg_imports::dsl::bg_imports
                .filter(bg_imports::type_.eq(LEDGER_RECORD_TYPE))
                .select(max(bg_imports::target_id))
                .first(&mut conn)
                .await?;
            Ok(max_id)
        })
    }
}
