//! Fact store: the persistent answer cache.
//!
//! Keys are `sha256(normalize(question))` in hex. A record is written only when the answer
//! clears the [`PromotionPolicy`] and is replaced only by a strictly more confident answer.
//! Every lookup hit increments `access_count` in the same critical section that reads it.
//!
//! Two backends share the [`FactBackend`] trait: [`MemoryFactBackend`] for tests and
//! ephemeral runs, [`DiskFactBackend`] for durable storage.

pub mod backend;
pub mod disk;
pub mod error;
pub mod memory;
pub mod policy;
pub mod store;
pub mod types;


pub use backend::FactBackend;
pub use disk::DiskFactBackend;
pub use error::{FactStoreError, FactStoreResult};
pub use memory::MemoryFactBackend;
pub use policy::PromotionPolicy;
pub use store::FactStore;
pub use types::{FactRecord, FactStats, UpsertOutcome, merge_upsert, rank_facts};
