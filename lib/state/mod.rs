use diesel_async::{pg::AsyncPgConnection, pooled_connection::deadpool::Pool};
use prometheus_client::registry::Registry;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use crate::import_service::Importer;

pub struct AppState {
    pub pool: Pool<AsyncPgConnection>,
    pub registry: RwLock<Registry>,
    pub importer: Importer,
    pub shutdown_token: CancellationToken,
}

impl AppState {
    pub fn new(
        pool: Pool<AsyncPgConnection>,
        registry: Registry,
        importer: Importer,
        shutdown_token: CancellationToken,
    ) -> Self {
        Self {
            pool,
            registry: RwLock::new(registry),
            importer,
            shutdown_token,
        }
    }
}
