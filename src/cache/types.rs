use std::cmp::Ordering;

/// A promoted answer, keyed by the hash of its normalized question.
///
/// Stored as `rkyv` bytes on disk and rendered as JSON at the HTTP boundary.
///
/// # Example
/// ```rust
/// use arbiter::cache::FactRecord;
///
/// let record = FactRecord::new("abc123", "What is X?", "X is Y.", vec!["d1".into()], 0.9, 100);
/// assert_eq!(record.access_count, 0);
/// assert_eq!(record.created_at, record.last_accessed);
/// ```
#[derive(
    rkyv::Archive,
    rkyv::Serialize,
    rkyv::Deserialize,
    serde::Serialize,
    serde::Deserialize,
    Debug,
    Clone,
    PartialEq,
)]
pub struct FactRecord {
    /// Hex SHA-256 of the normalized question.
    pub question_hash: String,
    /// Question as first promoted.
    pub question_text: String,
    pub answer: String,
    pub citations: Vec<String>,
    pub confidence: f64,
    /// Unix seconds.
    pub created_at: i64,
    /// Unix seconds of the last hit or overwrite.
    pub last_accessed: i64,
    pub access_count: u64,
}

impl FactRecord {
    pub fn new(
        question_hash: impl Into<String>,
        question_text: impl Into<String>,
        answer: impl Into<String>,
        citations: Vec<String>,
        confidence: f64,
        now: i64,
    ) -> Self {
        Self {
            question_hash: question_hash.into(),
            question_text: question_text.into(),
            answer: answer.into(),
            citations,
            confidence,
            created_at: now,
            last_accessed: now,
            access_count: 0,
        }
    }

    /// Records one lookup hit.
    pub fn touch(&mut self, now: i64) {
        self.access_count = self.access_count.saturating_add(1);
        self.last_accessed = now;
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
/// Result of an upsert attempt.
pub enum UpsertOutcome {
    /// No record existed; one was created.
    Inserted,
    /// Existing record replaced by a strictly more confident answer.
    Updated { previous_confidence: f64 },
    /// Existing record was at least as confident; nothing written.
    Retained { stored_confidence: f64 },
    /// Below the promotion thresholds; nothing written.
    Rejected,
    /// Storage error; nothing written.
    Failed,
}

impl UpsertOutcome {
    /// Returns `true` if the store now holds the offered answer.
    pub fn is_stored(&self) -> bool {
        matches!(self, UpsertOutcome::Inserted | UpsertOutcome::Updated { .. })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UpsertOutcome::Inserted => "inserted",
            UpsertOutcome::Updated { .. } => "updated",
            UpsertOutcome::Retained { .. } => "retained",
            UpsertOutcome::Rejected => "rejected",
            UpsertOutcome::Failed => "failed",
        }
    }
}

/// Applies the monotonic-confidence rule.
///
/// Returns the outcome and, when something must be written, the record to write. On
/// overwrite only `answer`, `citations`, `confidence` and `last_accessed` change.
pub fn merge_upsert(
    existing: Option<&FactRecord>,
    incoming: FactRecord,
) -> (UpsertOutcome, Option<FactRecord>) {
    match existing {
        None => (UpsertOutcome::Inserted, Some(incoming)),
        Some(current) if incoming.confidence > current.confidence => {
            let updated = FactRecord {
                answer: incoming.answer,
                citations: incoming.citations,
                confidence: incoming.confidence,
                last_accessed: incoming.last_accessed,
                ..current.clone()
            };
            (
                UpsertOutcome::Updated {
                    previous_confidence: current.confidence,
                },
                Some(updated),
            )
        }
        Some(current) => (
            UpsertOutcome::Retained {
                stored_confidence: current.confidence,
            },
            None,
        ),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FactStats {
    pub count: u64,
    pub avg_confidence: f64,
    pub total_accesses: u64,
}

impl FactStats {
    pub fn from_records(records: &[FactRecord]) -> Self {
        if records.is_empty() {
            return Self::default();
        }
        let total_confidence: f64 = records.iter().map(|r| r.confidence).sum();
        Self {
            count: records.len() as u64,
            avg_confidence: total_confidence / records.len() as f64,
            total_accesses: records.iter().map(|r| r.access_count).sum(),
        }
    }
}

/// Filters by `min_confidence`, orders by confidence then access count (both descending)
/// and keeps at most `limit` records.
pub fn rank_facts(mut records: Vec<FactRecord>, limit: usize, min_confidence: f64) -> Vec<FactRecord> {
    records.retain(|r| r.confidence >= min_confidence);
    records.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(Ordering::Equal)
            .then_with(|| b.access_count.cmp(&a.access_count))
    });
    records.truncate(limit);
    records
}
