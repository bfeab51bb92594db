//! In-memory collection cache backed by DashMap

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::DateTime;
use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::Mutex;

use crate::error::Error;
use crate::model::Resource;
use crate::response::Response;

/// How long a fetched collection is served from cache by default.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

#[derive(Debug, Clone)]
struct CachedRows<R> {
    rows: Vec<R>,
    cached_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl<R> CachedRows<R> {
    fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

/// Snapshots of resource collections keyed by query.
///
/// Concurrent loads of the same key are de-duplicated: the first caller
/// runs its loader and the rest wait and read its result.
///
/// # Example
///
/// ```ignore
/// let cache: QueryCache<Party> = QueryCache::new();
/// let parties = cache.fetch_or_load("parties", service.list()).await?;
///
/// // Optimistic delete: the row disappears now, comes back on failure.
/// cache
///     .run_optimistic_delete("parties", party.id, service.delete(party.id))
///     .await?;
/// ```
#[derive(Debug)]
pub struct QueryCache<R> {
    store: DashMap<String, CachedRows<R>>,
    loading: DashMap<String, Arc<Mutex<()>>>,
    ttl: Duration,
}

impl<R: Resource> Default for QueryCache<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Resource> QueryCache<R> {
    /// Creates an empty cache with [`DEFAULT_TTL`].
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            store: DashMap::new(),
            loading: DashMap::new(),
            ttl,
        }
    }

    /// Cached rows for `key`, unless missing or expired.
    pub fn get(&self, key: &str) -> Option<Response<Vec<R>>> {
        let entry = self.store.get(key)?;
        if entry.is_expired() {
            drop(entry);
            self.store.remove(key);
            return None;
        }
        Some(Response::cache_hit(entry.rows.clone(), entry.cached_at))
    }

    /// Stores rows for `key`, replacing any previous snapshot.
    pub fn set(&self, key: &str, rows: Vec<R>) -> DateTime<Utc> {
        let cached_at = Utc::now();
        let expires_at =
            cached_at + chrono::Duration::from_std(self.ttl).unwrap_or(chrono::Duration::zero());
        self.store.insert(
            key.to_string(),
            CachedRows {
                rows,
                cached_at,
                expires_at,
            },
        );
        cached_at
    }

    /// Drops the snapshot for `key` so the next read refetches.
    pub fn invalidate(&self, key: &str) {
        log::debug!("cache invalidate {key}");
        self.store.remove(key);
    }

    /// Drops every snapshot whose key starts with `prefix`.
    pub fn invalidate_prefix(&self, prefix: &str) {
        self.store.retain(|key, _| !key.starts_with(prefix));
    }

    pub fn clear(&self) {
        self.store.clear();
    }

    /// Number of stored snapshots, expired ones included.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Returns the cached rows for `key`, or awaits `loader` and caches its
    /// result.
    ///
    /// Loader errors are returned and nothing is cached.
    pub async fn fetch_or_load<F>(&self, key: &str, loader: F) -> Result<Response<Vec<R>>, Error>
    where
        F: Future<Output = Result<Vec<R>, Error>>,
    {
        if let Some(hit) = self.get(key) {
            return Ok(hit);
        }

        let lock = Arc::clone(&self.loading.entry(key.to_string()).or_default());
        let result = {
            let _guard = lock.lock().await;
            self.load_once(key, loader).await
        };

        // The last caller out drops the key's lock entry.
        drop(lock);
        self.loading
            .remove_if(key, |_, lock| Arc::strong_count(lock) == 1);
        result
    }

    async fn load_once<F>(&self, key: &str, loader: F) -> Result<Response<Vec<R>>, Error>
    where
        F: Future<Output = Result<Vec<R>, Error>>,
    {
        // Filled by whoever held the lock before us.
        if let Some(hit) = self.get(key) {
            return Ok(hit);
        }

        log::debug!("cache miss {key}, loading");
        let rows = loader.await?;
        let cached_at = self.set(key, rows.clone());
        Ok(Response::cache_miss(rows, cached_at))
    }

    /// Removes the row with `id` from the snapshot immediately.
    ///
    /// The returned token restores the previous snapshot on
    /// [`Rollback::rollback`]. One optimistic mutation per key is assumed
    /// in flight: a second one taken before the first settles snapshots the
    /// already-edited rows, so rolling the first back after the second
    /// committed resurrects stale data.
    pub fn optimistic_remove(&self, key: &str, id: i64) -> Rollback<'_, R> {
        self.edit(key, |rows| rows.retain(|r| r.id() != id))
    }

    /// Replaces the row with the same id in the snapshot immediately.
    pub fn optimistic_replace(&self, key: &str, row: R) -> Rollback<'_, R> {
        self.edit(key, move |rows| {
            if let Some(slot) = rows.iter_mut().find(|r| r.id() == row.id()) {
                *slot = row;
            }
        })
    }

    fn edit(&self, key: &str, f: impl FnOnce(&mut Vec<R>)) -> Rollback<'_, R> {
        let previous = self.store.get_mut(key).map(|mut entry| {
            let previous = entry.rows.clone();
            f(&mut entry.rows);
            previous
        });
        Rollback {
            cache: self,
            key: key.to_string(),
            previous,
        }
    }

    /// Optimistically removes `id` from `key`, then awaits `request`.
    ///
    /// On success the key is invalidated so the next read refetches. On
    /// failure the snapshot is restored, the row back in its original
    /// position, and the error returned.
    pub async fn run_optimistic_delete<T, F>(&self, key: &str, id: i64, request: F) -> Result<T, Error>
    where
        F: Future<Output = Result<T, Error>>,
    {
        let rollback = self.optimistic_remove(key, id);
        self.settle(rollback, request.await)
    }

    /// Optimistically replaces `row` in `key`, then awaits `request`.
    pub async fn run_optimistic_update<T, F>(&self, key: &str, row: R, request: F) -> Result<T, Error>
    where
        F: Future<Output = Result<T, Error>>,
    {
        let rollback = self.optimistic_replace(key, row);
        self.settle(rollback, request.await)
    }

    fn settle<T>(&self, rollback: Rollback<'_, R>, result: Result<T, Error>) -> Result<T, Error> {
        match result {
            Ok(value) => {
                let key = rollback.key.clone();
                rollback.commit();
                self.invalidate(&key);
                Ok(value)
            }
            Err(e) => {
                log::error!("mutation on {} failed, rolling back: {e}", rollback.key);
                rollback.rollback();
                Err(e)
            }
        }
    }
}

/// Undo token for an optimistic edit.
#[must_use = "an optimistic edit must be committed or rolled back"]
#[derive(Debug)]
pub struct Rollback<'a, R> {
    cache: &'a QueryCache<R>,
    key: String,
    /// `None` when nothing was cached under the key.
    previous: Option<Vec<R>>,
}

impl<R: Resource> Rollback<'_, R> {
    /// Restores the snapshot taken before the edit.
    pub fn rollback(self) {
        let Some(previous) = self.previous else {
            return;
        };
        match self.cache.store.get_mut(&self.key) {
            Some(mut entry) => entry.rows = previous,
            None => {
                self.cache.set(&self.key, previous);
            }
        }
    }

    /// Keeps the edit.
    pub fn commit(self) {}
}
