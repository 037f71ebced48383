//! Durable file-per-record backend.
//!
//! Layout: `<root>/<key[0..2]>/<key>.rkyv`. Writes go to a `.rkyv.tmp` sibling, are
//! fsynced, then renamed over the final path, so readers never see a partial record.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use rkyv::rancor::Error as RkyvError;
use rkyv::util::AlignedVec;
use tracing::warn;

use super::backend::FactBackend;
use super::error::{FactStoreError, FactStoreResult};
use super::types::{FactRecord, UpsertOutcome, merge_upsert};

const RKYV_EXTENSION: &str = "rkyv";

const TEMP_EXTENSION: &str = "rkyv.tmp";

#[derive(Debug)]
pub struct DiskFactBackend {
    root: PathBuf,
    lock: Mutex<()>,
}

impl DiskFactBackend {
    /// Opens (creating if needed) a store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> FactStoreResult<Self> {
        let backend = Self {
            root: root.into(),
            lock: Mutex::new(()),
        };
        backend.ensure_root()?;
        Ok(backend)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn ensure_root(&self) -> FactStoreResult<()> {
        if self.root.exists() && !self.root.is_dir() {
            return Err(FactStoreError::StorageUnavailable {
                path: self.root.clone(),
            });
        }
        fs::create_dir_all(&self.root).map_err(|_| FactStoreError::StorageUnavailable {
            path: self.root.clone(),
        })
    }

    fn shard_dir(&self, key: &str) -> PathBuf {
        self.root.join(&key[..2])
    }

    fn record_path(&self, key: &str) -> PathBuf {
        self.shard_dir(key)
            .join(format!("{}.{}", key, RKYV_EXTENSION))
    }

    fn temp_record_path(&self, key: &str) -> PathBuf {
        self.shard_dir(key)
            .join(format!("{}.{}", key, TEMP_EXTENSION))
    }

    fn read_record(&self, key: &str) -> FactStoreResult<Option<FactRecord>> {
        let path = self.record_path(key);
        if !path.exists() {
            return Ok(None);
        }
        read_record_at(&path).map(Some)
    }

    fn write_record(&self, record: &FactRecord) -> FactStoreResult<()> {
        let key = record.question_hash.as_str();
        fs::create_dir_all(self.shard_dir(key))?;

        let bytes = rkyv::to_bytes::<RkyvError>(record)
            .map_err(|e| FactStoreError::Serialization(format!("{:?}", e)))?;

        let temp_path = self.temp_record_path(key);
        let final_path = self.record_path(key);

        {
            let mut file = File::create(&temp_path)?;
            file.write_all(&bytes)?;
            file.sync_all()?;
        }

        fs::rename(&temp_path, &final_path)?;
        Ok(())
    }
}

fn validate_key(key: &str) -> FactStoreResult<()> {
    if key.len() < 2 || !key.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(FactStoreError::InvalidKey {
            key: key.to_string(),
        });
    }
    Ok(())
}

fn read_record_at(path: &Path) -> FactStoreResult<FactRecord> {
    let raw = fs::read(path)?;

    // archived data must be aligned before validation
    let mut bytes = AlignedVec::<16>::with_capacity(raw.len());
    bytes.extend_from_slice(&raw);

    rkyv::from_bytes::<FactRecord, RkyvError>(&bytes).map_err(|e| FactStoreError::Corrupt {
        path: path.to_path_buf(),
        reason: format!("{:?}", e),
    })
}

impl FactBackend for DiskFactBackend {
    fn get_and_touch(&self, key: &str, now: i64) -> FactStoreResult<Option<FactRecord>> {
        validate_key(key)?;
        let _guard = self.lock.lock();

        let Some(mut record) = self.read_record(key)? else {
            return Ok(None);
        };
        record.touch(now);
        self.write_record(&record)?;
        Ok(Some(record))
    }

    fn upsert(&self, incoming: FactRecord) -> FactStoreResult<UpsertOutcome> {
        validate_key(&incoming.question_hash)?;
        let _guard = self.lock.lock();

        let existing = self.read_record(&incoming.question_hash)?;
        let (outcome, write) = merge_upsert(existing.as_ref(), incoming);
        if let Some(record) = write {
            self.write_record(&record)?;
        }
        Ok(outcome)
    }

    /// Lock-free scan. Each file is replaced by rename, so every read sees a whole record.
    fn records(&self) -> FactStoreResult<Vec<FactRecord>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let mut records = Vec::new();

        for shard in fs::read_dir(&self.root)? {
            let shard = shard?.path();
            if !shard.is_dir() {
                continue;
            }

            for entry in fs::read_dir(&shard)? {
                let path = entry?.path();

                if path.extension().is_some_and(|ext| ext == RKYV_EXTENSION) {
                    match read_record_at(&path) {
                        Ok(record) => records.push(record),
                        Err(e) => warn!(path = %path.display(), error = %e, "Skipping unreadable fact record"),
                    }
                }
            }
        }

        Ok(records)
    }

    fn kind(&self) -> &'static str {
        "disk"
    }
}
