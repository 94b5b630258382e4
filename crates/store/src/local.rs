//! Authoritative local persistence.
//!
//! Two named buckets, each a whole JSON array rewritten on every change: the
//! quote collection and the saved-quote id list. A missing or corrupt bucket
//! reads as empty (logged, never an error); a failed write is a hard error
//! because this store is the source of truth.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::warn;

use coverquote_core::domain::quote::{Quote, QuoteId};

const QUOTES_BUCKET: &str = "quote_submissions.json";
const SAVED_BUCKET: &str = "saved_quotes.json";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("could not read bucket `{bucket}`: {source}")]
    Read { bucket: String, source: io::Error },
    #[error("could not write bucket `{bucket}`: {source}")]
    Write { bucket: String, source: io::Error },
    #[error("could not serialize bucket `{bucket}`: {source}")]
    Serialize { bucket: String, source: serde_json::Error },
}

pub trait LocalStore: Send + Sync {
    fn read_quotes(&self) -> Result<Vec<Quote>, StoreError>;
    fn write_quotes(&self, quotes: &[Quote]) -> Result<(), StoreError>;
    fn read_saved_ids(&self) -> Result<Vec<QuoteId>, StoreError>;
    fn write_saved_ids(&self, ids: &[QuoteId]) -> Result<(), StoreError>;
}

/// One JSON file per bucket under a data directory.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    data_dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self { data_dir: data_dir.into() }
    }

    fn read_bucket<T: DeserializeOwned>(&self, bucket: &str) -> Result<Vec<T>, StoreError> {
        let path = self.data_dir.join(bucket);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(source) if source.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(StoreError::Read { bucket: bucket.to_string(), source }),
        };

        match serde_json::from_str(&raw) {
            Ok(items) => Ok(items),
            Err(error) => {
                warn!(bucket, %error, "bucket holds unparseable JSON, treating as empty");
                Ok(Vec::new())
            }
        }
    }

    fn write_bucket<T: Serialize>(&self, bucket: &str, items: &[T]) -> Result<(), StoreError> {
        fs::create_dir_all(&self.data_dir)
            .map_err(|source| StoreError::Write { bucket: bucket.to_string(), source })?;

        let raw = serde_json::to_string_pretty(items)
            .map_err(|source| StoreError::Serialize { bucket: bucket.to_string(), source })?;

        write_atomic(&self.data_dir.join(bucket), &raw)
            .map_err(|source| StoreError::Write { bucket: bucket.to_string(), source })
    }
}

// Write through a sibling temp file so a crash mid-write cannot leave a
// truncated bucket behind.
fn write_atomic(path: &Path, contents: &str) -> io::Result<()> {
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, contents)?;
    fs::rename(&tmp, path)
}

impl LocalStore for JsonFileStore {
    fn read_quotes(&self) -> Result<Vec<Quote>, StoreError> {
        self.read_bucket(QUOTES_BUCKET)
    }

    fn write_quotes(&self, quotes: &[Quote]) -> Result<(), StoreError> {
        self.write_bucket(QUOTES_BUCKET, quotes)
    }

    fn read_saved_ids(&self) -> Result<Vec<QuoteId>, StoreError> {
        self.read_bucket(SAVED_BUCKET)
    }

    fn write_saved_ids(&self, ids: &[QuoteId]) -> Result<(), StoreError> {
        self.write_bucket(SAVED_BUCKET, ids)
    }
}

/// Test double. `fail_writes` makes every write return an error so callers
/// can exercise the hard-failure path.
#[derive(Default)]
pub struct InMemoryLocalStore {
    quotes: Mutex<Vec<Quote>>,
    saved_ids: Mutex<Vec<QuoteId>>,
    fail_writes: AtomicBool,
}

impl InMemoryLocalStore {
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self, bucket: &str) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Write {
                bucket: bucket.to_string(),
                source: io::Error::new(io::ErrorKind::PermissionDenied, "writes disabled"),
            });
        }
        Ok(())
    }
}

impl LocalStore for InMemoryLocalStore {
    fn read_quotes(&self) -> Result<Vec<Quote>, StoreError> {
        Ok(lock_unpoisoned(&self.quotes).clone())
    }

    fn write_quotes(&self, quotes: &[Quote]) -> Result<(), StoreError> {
        self.check_writable(QUOTES_BUCKET)?;
        *lock_unpoisoned(&self.quotes) = quotes.to_vec();
        Ok(())
    }

    fn read_saved_ids(&self) -> Result<Vec<QuoteId>, StoreError> {
        Ok(lock_unpoisoned(&self.saved_ids).clone())
    }

    fn write_saved_ids(&self, ids: &[QuoteId]) -> Result<(), StoreError> {
        self.check_writable(SAVED_BUCKET)?;
        *lock_unpoisoned(&self.saved_ids) = ids.to_vec();
        Ok(())
    }
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use chrono::Utc;
    use rust_decimal::Decimal;
    use tempfile::TempDir;

    use coverquote_core::domain::customer::CustomerInfo;
    use coverquote_core::domain::policy::{InsuranceType, PolicyDetails};
    use coverquote_core::domain::quote::{Quote, QuoteId, QuoteStatus};
    use coverquote_core::rating::calculate_premium;

    use super::{JsonFileStore, LocalStore};

    fn quote(id: &str) -> Quote {
        let insurance_type = InsuranceType::WorkersComp;
        let policy_details = PolicyDetails::WorkersComp {
            number_of_employees: 10,
            annual_payroll: Decimal::from(200_000),
            safety_training: true,
        };
        let premium = calculate_premium(&insurance_type, &policy_details);
        Quote {
            id: QuoteId(id.to_string()),
            created_at: Utc::now(),
            insurance_type,
            customer_info: CustomerInfo {
                name: "Acme Staffing".to_string(),
                email: "ops@acme.example".to_string(),
                phone: "555-0100".to_string(),
                location: "Austin, TX".to_string(),
            },
            policy_details,
            premium,
            status: QuoteStatus::New,
            modification_history: vec![],
        }
    }

    #[test]
    fn file_store_round_trips_both_buckets() {
        let dir = TempDir::new().expect("tempdir");
        let store = JsonFileStore::new(dir.path());

        store.write_quotes(&[quote("q-1"), quote("q-2")]).expect("write quotes");
        store
            .write_saved_ids(&[QuoteId("q-2".to_string())])
            .expect("write saved ids");

        let quotes = store.read_quotes().expect("read quotes");
        assert_eq!(quotes.len(), 2);
        assert_eq!(quotes[0].id.0, "q-1");

        let saved = store.read_saved_ids().expect("read saved ids");
        assert_eq!(saved, vec![QuoteId("q-2".to_string())]);
    }

    #[test]
    fn missing_bucket_reads_as_empty() {
        let dir = TempDir::new().expect("tempdir");
        let store = JsonFileStore::new(dir.path().join("never-written"));

        assert!(store.read_quotes().expect("read quotes").is_empty());
        assert!(store.read_saved_ids().expect("read saved ids").is_empty());
    }

    #[test]
    fn corrupt_bucket_reads_as_empty() {
        let dir = TempDir::new().expect("tempdir");
        let store = JsonFileStore::new(dir.path());
        fs::write(dir.path().join("quote_submissions.json"), "{not json").expect("write corrupt");

        assert!(store.read_quotes().expect("read quotes").is_empty());
    }

    #[test]
    fn rewrite_replaces_the_whole_bucket() {
        let dir = TempDir::new().expect("tempdir");
        let store = JsonFileStore::new(dir.path());

        store.write_quotes(&[quote("q-1"), quote("q-2")]).expect("first write");
        store.write_quotes(&[quote("q-3")]).expect("second write");

        let quotes = store.read_quotes().expect("read quotes");
        assert_eq!(quotes.len(), 1);
        assert_eq!(quotes[0].id.0, "q-3");
    }
}
