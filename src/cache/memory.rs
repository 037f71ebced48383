use std::collections::HashMap;

use parking_lot::Mutex;

use super::backend::FactBackend;
use super::error::FactStoreResult;
use super::types::{FactRecord, UpsertOutcome, merge_upsert};

#[derive(Debug, Default)]
/// Process-local backend. Contents are lost on exit.
pub struct MemoryFactBackend {
    records: Mutex<HashMap<String, FactRecord>>,
}

impl MemoryFactBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

impl FactBackend for MemoryFactBackend {
    fn get_and_touch(&self, key: &str, now: i64) -> FactStoreResult<Option<FactRecord>> {
        let mut records = self.records.lock();
        Ok(records.get_mut(key).map(|record| {
            record.touch(now);
            record.clone()
        }))
    }

    fn upsert(&self, incoming: FactRecord) -> FactStoreResult<UpsertOutcome> {
        let mut records = self.records.lock();
        let key = incoming.question_hash.clone();
        let (outcome, write) = merge_upsert(records.get(&key), incoming);
        if let Some(record) = write {
            records.insert(key, record);
        }
        Ok(outcome)
    }

    fn records(&self) -> FactStoreResult<Vec<FactRecord>> {
        Ok(self.records.lock().values().cloned().collect())
    }

    fn kind(&self) -> &'static str {
        "memory"
    }
}
