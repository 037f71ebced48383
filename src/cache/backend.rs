use super::error::FactStoreResult;
use super::types::{FactRecord, UpsertOutcome};

/// Key-value storage for [`FactRecord`]s.
///
/// Each method is one short critical section. Implementations apply
/// [`merge_upsert`](super::types::merge_upsert) under the same lock as the read so the
/// monotonic rule holds under concurrent writers.
pub trait FactBackend: Send + Sync {
    /// Returns the record for `key`, incrementing its access count and setting
    /// `last_accessed = now` in the same step.
    fn get_and_touch(&self, key: &str, now: i64) -> FactStoreResult<Option<FactRecord>>;

    /// Inserts `incoming`, or overwrites only if its confidence is strictly greater.
    fn upsert(&self, incoming: FactRecord) -> FactStoreResult<UpsertOutcome>;

    /// Snapshot of all records, in no particular order.
    fn records(&self) -> FactStoreResult<Vec<FactRecord>>;

    /// Short backend name for readiness reporting.
    fn kind(&self) -> &'static str;
}
