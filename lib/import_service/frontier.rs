use super::ledger::{ImportLedger, LedgerError};
use super::types::{GameId, IdBatch};

/// First id the upstream ever assigned; where a fresh database starts.
pub(crate) const FIRST_ID: GameId = 1;

/// Resolves where the next fresh forward-progress batch should start.
///
/// Prefers extending past in-flight work, which avoids a storage round-trip
/// while batches are already outstanding; otherwise falls back to the highest
/// id the ledger has resolved, the durable cold-start resumption point.
pub(crate) async fn next_fresh_batch(
    ledger: &dyn ImportLedger,
    active_max_end: Option<GameId>,
    batch_size: usize,
) -> Result<IdBatch, LedgerError> {
    let start = match active_max_end {
        Some(end) => end + 1,
        None => ledger
            .max_recorded_id()
            .await?
            .map_or(FIRST_ID, |max| max + 1),
    };
    Ok(IdBatch::contiguous(start, batch_size))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::MemoryLedger;
    use super::next_fresh_batch;

    #[tokio::test]
    async fn cold_start_resumes_after_the_ledger_max() {
        let ledger = MemoryLedger::with_max(57);
        let batch = next_fresh_batch(&ledger, None, 400)
            .await
            .expect("ledger read should succeed");
        assert_eq!(batch.to_string(), "[58-457](400)");
    }

    #[tokio::test]
    async fn empty_ledger_starts_at_the_first_id() {
        let ledger = MemoryLedger::default();
        let batch = next_fresh_batch(&ledger, None, 400)
            .await
            .expect("ledger read should succeed");
        assert_eq!(batch.to_string(), "[1-400](400)");
    }

    #[tokio::test]
    async fn active_work_takes_priority_over_the_ledger() {
        // Ledger says 57, but a batch ending at 800 is already in flight.
        let ledger = MemoryLedger::with_max(57);
        let batch = next_fresh_batch(&ledger, Some(800), 400)
            .await
            .expect("no ledger read should be needed");
        assert_eq!(batch.to_string(), "[801-1200](400)");
    }
}
