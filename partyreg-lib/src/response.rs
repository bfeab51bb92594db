//! Response wrapper with cache status

use chrono::DateTime;
use chrono::Utc;

/// Data returned through the query cache, tagged with where it came from.
///
/// # Example
///
/// ```ignore
/// let response = cache.fetch_or_load("parties", service.list()).await?;
///
/// if response.is_cached() {
///     log::debug!("parties from cache, cached at {:?}", response.cached_at());
/// }
///
/// let parties = response.into_inner();
/// ```
#[derive(Debug, Clone)]
pub struct Response<T> {
    data: T,
    /// Information about whether this response came from cache.
    pub cache: CacheStatus,
}

impl<T> Response<T> {
    /// Creates a new response indicating a cache miss (fresh fetch, now cached).
    pub fn cache_miss(data: T, cached_at: DateTime<Utc>) -> Self {
        Self {
            data,
            cache: CacheStatus::Miss { cached_at },
        }
    }

    /// Creates a new response indicating a cache hit.
    pub fn cache_hit(data: T, cached_at: DateTime<Utc>) -> Self {
        Self {
            data,
            cache: CacheStatus::Hit { cached_at },
        }
    }

    /// Returns `true` if this response came from the cache.
    pub fn is_cached(&self) -> bool {
        self.cache.is_hit()
    }

    /// Returns when the data was cached.
    pub fn cached_at(&self) -> DateTime<Utc> {
        match self.cache {
            CacheStatus::Miss { cached_at } | CacheStatus::Hit { cached_at } => cached_at,
        }
    }

    /// Consumes the response and returns the inner data.
    pub fn into_inner(self) -> T {
        self.data
    }
}

/// Cache status for a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    /// Data was freshly fetched and is now cached.
    Miss { cached_at: DateTime<Utc> },
    /// Data was returned from cache.
    Hit { cached_at: DateTime<Utc> },
}

impl CacheStatus {
    pub fn is_hit(&self) -> bool {
        matches!(self, Self::Hit { .. })
    }

    pub fn is_miss(&self) -> bool {
        matches!(self, Self::Miss { .. })
    }
}
