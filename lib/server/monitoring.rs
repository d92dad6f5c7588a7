use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::gauge::Gauge;
use prometheus_client::registry::Registry;
use tokio::sync::OnceCell;

#[derive(Clone)]
pub struct ImporterMetrics {
    pub batches_dispatched: Counter,
    pub batches_loaded: Counter,
    pub batches_failed: Counter,
    pub records_persisted: Counter,
    pub ids_quarantined: Counter,
    pub active_batches: Gauge,
    pub queued_batches: Gauge,
}

impl ImporterMetrics {
    fn init() -> Self {
        Self {
            batches_dispatched: Counter::default(),
            batches_loaded: Counter::default(),
            batches_failed: Counter::default(),
            records_persisted: Counter::default(),
            ids_quarantined: Counter::default(),
            active_batches: Gauge::default(),
            queued_batches: Gauge::default(),
        }
    }

    pub fn register(registry: &mut Registry) -> Self {
        let metrics = Self::init();

        registry.register(
            "batches_dispatched",
            "Total number of batch requests dispatched",
            metrics.batches_dispatched.clone(),
        );
        registry.register(
            "batches_loaded",
            "Total number of batches that resolved successfully",
            metrics.batches_loaded.clone(),
        );
        registry.register(
            "batches_failed",
            "Total number of batches that failed and were split or quarantined",
            metrics.batches_failed.clone(),
        );
        registry.register(
            "records_persisted",
            "Total number of records written through the sink",
            metrics.records_persisted.clone(),
        );
        registry.register(
            "ids_quarantined",
            "Total number of ids isolated as bad",
            metrics.ids_quarantined.clone(),
        );
        registry.register(
            "active_batches",
            "Batches currently dispatched and awaiting resolution",
            metrics.active_batches.clone(),
        );
        registry.register(
            "queued_batches",
            "Batches waiting in the retry queue",
            metrics.queued_batches.clone(),
        );

        metrics
    }
}

pub static IMPORT_METRICS: OnceCell<ImporterMetrics> = OnceCell::const_new();
