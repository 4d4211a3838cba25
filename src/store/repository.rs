use std::marker::PhantomData;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use fjall::{Database, Keyspace};
use tokio::task;

use super::{Criteria, Everything, Record};
use crate::{GeoApiError, Result};

/// Typed access to one keyspace
pub struct Repository<R> {
    db: Arc<Database>,
    keyspace: Keyspace,
    sequence: Arc<AtomicU64>,
    _record: PhantomData<fn() -> R>,
}

impl<R> Clone for Repository<R> {
    fn clone(&self) -> Self {
        Self {
            db: Arc::clone(&self.db),
            keyspace: self.keyspace.clone(),
            sequence: Arc::clone(&self.sequence),
            _record: PhantomData,
        }
    }
}

impl<R: Record> Repository<R> {
    pub(super) fn new(db: Arc<Database>, keyspace: Keyspace, sequence: Arc<AtomicU64>) -> Self {
        Self {
            db,
            keyspace,
            sequence,
            _record: PhantomData,
        }
    }

    /// All records matching `criteria`, in key order
    #[tracing::instrument(name = "repository_find", level = "debug", skip(self, criteria), fields(keyspace = R::KEYSPACE))]
    pub async fn find<C: Criteria<R>>(&self, criteria: C) -> Result<Vec<R>> {
        let keyspace = self.keyspace.clone();

        let found = task::spawn_blocking(move || -> Result<Vec<R>> {
            let mut found = Vec::new();
            for guard in keyspace.iter() {
                let (_key, value) = guard.into_inner()?;
                let record: R = postcard::from_bytes(&value)?;
                if criteria.matches(&record) {
                    found.push(record);
                }
            }
            Ok(found)
        })
        .await??;

        tracing::debug!("Found {} records", found.len());
        Ok(found)
    }

    pub async fn all(&self) -> Result<Vec<R>> {
        self.find(Everything).await
    }

    pub async fn create(&self, record: R) -> Result<()> {
        self.create_many(vec![record]).await
    }

    /// Writes all records in one atomic batch: either every record is
    /// persisted or none is.
    #[tracing::instrument(name = "repository_create", level = "debug", skip(self, records), fields(keyspace = R::KEYSPACE, count = records.len()))]
    pub async fn create_many(&self, records: Vec<R>) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        let mut entries = Vec::with_capacity(records.len());
        for record in &records {
            let key = match record.natural_key() {
                Some(key) => key,
                None => self.next_sequence_key()?,
            };
            entries.push((key.into_bytes(), postcard::to_stdvec(record)?));
        }

        let db = Arc::clone(&self.db);
        let keyspace = self.keyspace.clone();
        task::spawn_blocking(move || -> Result<()> {
            let mut batch = db.batch();
            for (key, value) in entries {
                batch.insert(&keyspace, key, value);
            }
            batch.commit()?;
            Ok(())
        })
        .await??;

        Ok(())
    }

    /// Wall-clock nanoseconds plus a process-wide counter, zero padded so
    /// lexicographic key order equals insertion order.
    fn next_sequence_key(&self) -> Result<String> {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| GeoApiError::storage(format!("system clock before epoch: {e}")))?
            .as_nanos();
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        Ok(format!("{nanos:032}-{seq:020}"))
    }
}
