//! Embedded record store
//!
//! Every record type lives in its own `fjall` keyspace, encoded with
//! `postcard`. Records with a natural key are stored under it (a second
//! write replaces the first); all others are appended under a
//! time-ordered sequence key so iteration follows insertion order.

use std::fmt::Debug;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::AtomicU64;

use fjall::Database;
use serde::{Serialize, de::DeserializeOwned};
use tracing::info;

use crate::Result;

mod repository;

pub use repository::Repository;

/// A type persisted in the store
pub trait Record: Serialize + DeserializeOwned + Clone + Debug + Send + Sync + 'static {
    /// Keyspace holding all records of this type
    const KEYSPACE: &'static str;

    /// Unique identity, if the type has one
    fn natural_key(&self) -> Option<String> {
        None
    }
}

/// Query predicate evaluated against stored records
pub trait Criteria<R>: Send + 'static {
    fn matches(&self, record: &R) -> bool;
}

/// Matches every record
#[derive(Debug, Clone, Copy)]
pub struct Everything;

impl<R> Criteria<R> for Everything {
    fn matches(&self, _record: &R) -> bool {
        true
    }
}

/// Handle on the on-disk database, hands out typed repositories
#[derive(Clone)]
pub struct Store {
    db: Arc<Database>,
    sequence: Arc<AtomicU64>,
}

impl Store {
    /// Opens (or creates) the database at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = Database::builder(path.as_ref()).open()?;
        info!("Opened record store at {}", path.as_ref().display());
        Ok(Self {
            db: Arc::new(db),
            sequence: Arc::new(AtomicU64::new(0)),
        })
    }

    /// Repository over the keyspace of `R`
    pub fn repository<R: Record>(&self) -> Result<Repository<R>> {
        let keyspace = self
            .db
            .keyspace(R::KEYSPACE, fjall::KeyspaceCreateOptions::default)?;
        Ok(Repository::new(
            Arc::clone(&self.db),
            keyspace,
            Arc::clone(&self.sequence),
        ))
    }
}
