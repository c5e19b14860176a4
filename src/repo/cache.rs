use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};

use log::trace;
use lru::LruCache;
use parking_lot::Mutex;

use crate::{query, types};

/// Rows kept by the query-result cache
#[derive(Debug, Clone)]
pub enum CachedRows {
    Facets(Vec<types::SearchFacet>),
    Values(Vec<query::Value>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// LRU cache of query results, keyed by a fingerprint of the request shape
/// and its parameters. A zero capacity disables caching.
///
/// Every [`QueryCache::invalidate`] starts a new generation. Results are only
/// stored if no invalidation happened since the read that produced them
/// started, see [`QueryCache::generation`].
pub struct QueryCache {
    entries: Option<Mutex<LruCache<String, CachedRows>>>,
    generation: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl QueryCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: NonZeroUsize::new(capacity).map(|c| Mutex::new(LruCache::new(c))),
            generation: AtomicU64::new(0),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn disabled() -> Self {
        Self::new(0)
    }

    pub fn is_enabled(&self) -> bool {
        self.entries.is_some()
    }

    pub fn get(&self, fingerprint: &str) -> Option<CachedRows> {
        let entries = self.entries.as_ref()?;

        let found = entries.lock().get(fingerprint).cloned();
        if found.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            trace!("cache hit `{fingerprint}`");
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            trace!("cache miss `{fingerprint}`");
        }
        found
    }

    /// Current generation, to be read before querying the rows passed to
    /// [`QueryCache::put`].
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Stores `rows` read during `generation`. Rows are discarded if the cache
    /// was invalidated in the meantime.
    pub fn put(&self, fingerprint: String, rows: CachedRows, generation: u64) {
        if let Some(entries) = &self.entries {
            let mut entries = entries.lock();
            if self.generation.load(Ordering::Acquire) != generation {
                trace!("discarding stale result `{fingerprint}`");
                return;
            }
            entries.put(fingerprint, rows);
        }
    }

    /// Drops every cached result and starts a new generation.
    pub fn invalidate(&self) {
        match &self.entries {
            Some(entries) => {
                let mut entries = entries.lock();
                self.generation.fetch_add(1, Ordering::AcqRel);
                if !entries.is_empty() {
                    trace!("invalidating {} cached results", entries.len());
                }
                entries.clear();
            }
            None => {
                self.generation.fetch_add(1, Ordering::AcqRel);
            }
        }
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.entries.as_ref().map_or(0, |e| e.lock().len()),
        }
    }
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new(crate::params::DEFAULT_QUERY_CACHE_CAPACITY)
    }
}

/// Cache key of a facet request
pub fn facets_fingerprint(filter: &query::FacetFilter) -> String {
    format!("facets:{filter:?}")
}

/// Cache key of a distinct values request
pub fn distinct_values_fingerprint(q: &query::DistinctValuesQuery) -> String {
    format!("distinct:{}:{}", q.path, q.value_type)
}
