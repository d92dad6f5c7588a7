use std::sync::Arc;
use std::time::Duration;

use diesel_async::pooled_connection::deadpool::Pool;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use dotenv::dotenv;
use log::{error, info};
use prometheus_client::registry::Registry;
use tokio::signal::unix::{signal, SignalKind};
use tokio_util::sync::CancellationToken;

use importer_lib::bgg_client::BggClient;
use importer_lib::cli;
use importer_lib::config::Config;
use importer_lib::db;
use importer_lib::import_service::{
    BggGameFetcher, Importer, PgImportLedger, PgRecordSink, SchedulerConfig,
};
use importer_lib::server::monitoring::{ImporterMetrics, IMPORT_METRICS};
use importer_lib::server::setup_server;
use importer_lib::state::AppState;

#[tokio::main]
async fn main() {
    dotenv().ok();
    let config = Config::from_env().expect("Config incorrectly specified");
    env_logger::init();
    let args = cli::parse_args();
    info!("Starting board game importer");

    db::run_migrations(&config.db_url);

    let pool_config =
        AsyncDieselConnectionManager::<diesel_async::AsyncPgConnection>::new(&config.db_url);
    let pool = Pool::builder(pool_config)
        .build()
        .expect("Could not establish connection!");

    let mut registry = Registry::default();
    let metrics = ImporterMetrics::register(&mut registry);
    let _ = IMPORT_METRICS.set(metrics);

    let scheduler_config = SchedulerConfig {
        max_connections: config.max_connections,
        wait_between_requests: Duration::from_millis(config.wait_between_requests_ms),
        starting_batch_size: config.starting_batch_size,
    };
    let fetcher = Arc::new(BggGameFetcher::new(BggClient::new(
        config.bgg_api_url.clone(),
    )));
    let sink = Arc::new(PgRecordSink::new(pool.clone()));
    let ledger = Arc::new(PgImportLedger::new(pool.clone()));
    let importer = Importer::new(fetcher, sink, ledger, scheduler_config);

    let shutdown_token = CancellationToken::new();
    let state = Arc::new(AppState::new(
        pool.clone(),
        registry,
        importer.clone(),
        shutdown_token.clone(),
    ));
    let server_handle = setup_server(state).await;

    // Targeted one-shot import: run the requested ids through the normal
    // dispatch/outcome path and exit.
    if let Some(raw_ids) = args.ids {
        let ids =
            cli::parse_id_list(&raw_ids).expect("--ids must be a comma-separated list of integers");
        info!("Importing {} requested ids", ids.len());
        if let Err(err) = importer.import_ids(ids).await {
            error!("On-demand import failed: {err}");
        }
        shutdown_token.cancel();
        server_handle.abort();
        return;
    }

    importer.start();

    let mut sigterm = signal(SignalKind::terminate()).expect("Failed to register SIGTERM handler");
    let mut sigint = signal(SignalKind::interrupt()).expect("Failed to register SIGINT handler");

    tokio::select! {
        _ = sigterm.recv() => {
            info!("SIGTERM received, shutting down.");
        }
        _ = sigint.recv() => {
            info!("SIGINT received, shutting down.");
        }
    }

    importer.stop();
    drain_in_flight(&importer).await;
    shutdown_token.cancel();
    server_handle.abort();
}

/// Waits for already-dispatched batches to resolve so their outcomes are
/// still applied, bounded so a hung fetch cannot block shutdown forever.
async fn drain_in_flight(importer: &Importer) {
    const DRAIN_TIMEOUT: Duration = Duration::from_secs(30);
    let deadline = tokio::time::Instant::now() + DRAIN_TIMEOUT;

    loop {
        let snapshot = importer.snapshot().await;
        if snapshot.active_batches == 0 {
            break;
        }
        if tokio::time::Instant::now() >= deadline {
            info!(
                "Giving up on {} in-flight batches after {:?}",
                snapshot.active_batches, DRAIN_TIMEOUT
            );
            break;
        }
        tokio::time::sleep(Duration::from_millis(200)).await;
    }
}
