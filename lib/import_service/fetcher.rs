use std::sync::Arc;

use futures::future::BoxFuture;
use thiserror::Error;

use crate::bgg_client::{BggClient, BggClientErr, GameRecord};

use super::types::GameId;

/// Opaque failure covering one whole batch request.
///
/// The upstream gives no indication of which id(s) caused a rejection, so
/// there is nothing finer-grained to carry here; the scheduler isolates the
/// offender by splitting instead.
#[derive(Error, Debug, Clone)]
#[error("{message}")]
pub struct FetchError {
    message: String,
}

impl FetchError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<BggClientErr> for FetchError {
    fn from(err: BggClientErr) -> Self {
        Self::new(err.to_string())
    }
}

/// Fetches one batch of records by id.
///
/// This trait exists so scheduler logic can be unit-tested against
/// deterministic scripted failures without requiring live network access.
pub trait GameFetcher: Send + Sync {
    fn fetch_games<'a>(
        &'a self,
        ids: &'a [GameId],
    ) -> BoxFuture<'a, Result<Vec<GameRecord>, FetchError>>;
}

impl<T> GameFetcher for Arc<T>
where
    T: GameFetcher + ?Sized,
{
    fn fetch_games<'a>(
        &'a self,
        ids: &'a [GameId],
    ) -> BoxFuture<'a, Result<Vec<GameRecord>, FetchError>> {
        (**self).fetch_games(ids)
    }
}

/// Production fetcher backed by the board game XML API.
pub struct BggGameFetcher {
    client: BggClient,
}

impl BggGameFetcher {
    pub fn new(client: BggClient) -> Self {
        Self { client }
    }
}

impl GameFetcher for BggGameFetcher {
    fn fetch_games<'a>(
        &'a self,
        ids: &'a [GameId],
    ) -> BoxFuture<'a, Result<Vec<GameRecord>, FetchError>> {
        Box::pin(async move { self.client.fetch_things(ids).await.map_err(FetchError::from) })
    }
}
