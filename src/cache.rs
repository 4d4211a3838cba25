//! On-disk response cache with per-entry expiry

use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use fjall::Keyspace;
use rand::RngExt;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tokio::task;

const RESPONSES_KEYSPACE: &str = "responses";

#[derive(Serialize, Deserialize)]
struct ExpiringEntry<T> {
    value: T,
    /// Seconds since the Unix epoch
    expires_at: u64,
}

impl<T> ExpiringEntry<T> {
    fn is_fresh(&self, now: u64) -> bool {
        now < self.expires_at
    }
}

fn unix_now() -> Result<u64> {
    Ok(SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs())
}

/// Key/value cache on disk whose entries expire after a TTL
pub struct PersistentCache {
    entries: Keyspace,
}

impl PersistentCache {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let db = fjall::Database::builder(path)
            .open()
            .with_context(|| format!("Failed to open cache at {}", path.display()))?;
        let entries = db.keyspace(RESPONSES_KEYSPACE, fjall::KeyspaceCreateOptions::default)?;
        Ok(Self { entries })
    }

    /// Stores `value` under `key` until `ttl` has elapsed
    #[tracing::instrument(name = "cache_put", level = "debug", skip(self, value))]
    pub async fn put<T: Serialize + ?Sized>(&self, key: &str, value: &T, ttl: Duration) -> Result<()> {
        let expires_at = unix_now()?
            .checked_add(ttl.as_secs())
            .context("TTL overflow")?;
        let bytes = postcard::to_stdvec(&ExpiringEntry { value, expires_at })?;

        let entries = self.entries.clone();
        let key = key.as_bytes().to_vec();
        task::spawn_blocking(move || entries.insert(key, bytes)).await??;
        Ok(())
    }

    /// The value under `key`, or `None` when absent or expired. Expired
    /// entries are dropped on read.
    #[tracing::instrument(name = "cache_get", level = "debug", skip(self))]
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let entries = self.entries.clone();
        let raw_key = key.as_bytes().to_vec();
        let stored = task::spawn_blocking(move || {
            entries
                .get(raw_key)
                .map(|slice| slice.map(|bytes| bytes.to_vec()))
        })
        .await??;

        let Some(bytes) = stored else {
            tracing::debug!("Cache miss");
            return Ok(None);
        };

        let entry: ExpiringEntry<T> = postcard::from_bytes(&bytes)?;
        if entry.is_fresh(unix_now()?) {
            tracing::debug!("Cache hit");
            return Ok(Some(entry.value));
        }

        tracing::debug!("Cache entry expired");
        self.remove(key).await?;
        Ok(None)
    }

    pub async fn remove(&self, key: &str) -> Result<()> {
        let entries = self.entries.clone();
        let key = key.as_bytes().to_vec();
        task::spawn_blocking(move || entries.remove(key)).await??;
        Ok(())
    }
}

/// Cache consulted in front of a resource service
///
/// Only non-empty results are written back; an empty result always goes to
/// the loader again on the next request.
#[derive(Clone)]
pub struct ResponseCache {
    cache: Arc<PersistentCache>,
    ttl: Duration,
}

impl ResponseCache {
    #[must_use]
    pub fn new(cache: Arc<PersistentCache>, ttl: Duration) -> Self {
        Self { cache, ttl }
    }

    /// Returns the cached list for `key`, or runs `load` and caches its
    /// result when non-empty. Cache backend failures never fail the request.
    #[tracing::instrument(name = "response_cache", level = "debug", skip(self, load))]
    pub async fn get_or_load<T, F, Fut>(&self, key: &str, load: F) -> crate::Result<Vec<T>>
    where
        T: Serialize + DeserializeOwned + Send + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = crate::Result<Vec<T>>>,
    {
        match self.cache.get::<Vec<T>>(key).await {
            Ok(Some(cached)) if !cached.is_empty() => {
                tracing::debug!("Serving {} records from cache", cached.len());
                return Ok(cached);
            }
            Ok(_) => {}
            Err(e) => tracing::warn!("Cache read failed, falling through: {e:#}"),
        }

        let fresh = load().await?;
        if !fresh.is_empty() {
            if let Err(e) = self.cache.put(key, &fresh, self.jittered_ttl()).await {
                tracing::warn!("Cache write failed: {e:#}");
            }
        }
        Ok(fresh)
    }

    fn jittered_ttl(&self) -> Duration {
        let jitter: f64 = rand::rng().random_range(0.9..1.1);
        self.ttl.mul_f64(jitter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    fn response_cache(temp_dir: &TempDir) -> ResponseCache {
        let cache = PersistentCache::open(temp_dir.path()).unwrap();
        ResponseCache::new(Arc::new(cache), Duration::from_secs(600))
    }

    #[tokio::test]
    async fn test_put_then_get() {
        let temp_dir = TempDir::new().unwrap();
        let cache = PersistentCache::open(temp_dir.path()).unwrap();

        cache
            .put("currency:usd", &vec!["EUR".to_string()], Duration::from_secs(60))
            .await
            .unwrap();
        let value: Option<Vec<String>> = cache.get("currency:usd").await.unwrap();
        assert_eq!(value, Some(vec!["EUR".to_string()]));

        let missing: Option<Vec<String>> = cache.get("currency:gbp").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_expired_entry_is_a_miss() {
        let temp_dir = TempDir::new().unwrap();
        let cache = PersistentCache::open(temp_dir.path()).unwrap();

        cache.put("k", &1u32, Duration::ZERO).await.unwrap();
        let value: Option<u32> = cache.get("k").await.unwrap();
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn test_second_request_is_served_from_cache() {
        let temp_dir = TempDir::new().unwrap();
        let cache = response_cache(&temp_dir);
        let calls = AtomicUsize::new(0);

        for _ in 0..2 {
            let records = cache
                .get_or_load("weather:de_berlin", || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, crate::GeoApiError>(vec![21.5f64])
                })
                .await
                .unwrap();
            assert_eq!(records, vec![21.5]);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_result_is_never_cached() {
        let temp_dir = TempDir::new().unwrap();
        let cache = response_cache(&temp_dir);
        let calls = AtomicUsize::new(0);

        for _ in 0..2 {
            let records: Vec<f64> = cache
                .get_or_load("weather:zz_nowhere", || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, crate::GeoApiError>(Vec::new())
                })
                .await
                .unwrap();
            assert!(records.is_empty());
        }

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_loader_error_is_propagated_and_not_cached() {
        let temp_dir = TempDir::new().unwrap();
        let cache = response_cache(&temp_dir);

        let result: crate::Result<Vec<f64>> = cache
            .get_or_load("currency:usd", || async {
                Err::<Vec<f64>, _>(crate::GeoApiError::api("malformed body"))
            })
            .await;
        assert!(result.is_err());

        let cached: Option<Vec<f64>> = cache.cache.get("currency:usd").await.unwrap();
        assert!(cached.is_none());
    }
}
