//! LRU cache of listing pages.
//!
//! Entries are tagged with the invalidation generation they were fetched at.
//! The first access at a newer generation drops every entry.

use std::num::NonZeroUsize;

use lru::LruCache;
use parking_lot::Mutex;

use super::invalidation::Generation;
use super::service::ListPage;

/// Key of one cached listing page.
///
/// The search text is lowercased because matching is case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ListingKey {
    page: u32,
    search: Option<String>,
}

impl ListingKey {
    /// Creates a key from a normalized 1-based page and search text.
    #[must_use]
    pub fn new(page: u32, search: Option<&str>) -> Self {
        Self {
            page,
            search: search.map(str::to_lowercase),
        }
    }
}

/// Cache statistics for monitoring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of cache hits.
    pub hits: u64,
    /// Number of cache misses.
    pub misses: u64,
}

struct Entries {
    generation: Generation,
    pages: LruCache<ListingKey, ListPage>,
    stats: CacheStats,
}

impl Entries {
    fn sync(&mut self, generation: Generation) {
        if self.generation != generation {
            if !self.pages.is_empty() {
                tracing::debug!(
                    from = self.generation,
                    to = generation,
                    dropped = self.pages.len(),
                    "Listing cache invalidated"
                );
            }
            self.pages.clear();
            self.generation = generation;
        }
    }
}

/// Bounded cache of listing pages.
pub struct ListingCache {
    entries: Mutex<Entries>,
}

impl ListingCache {
    /// Creates a cache holding at most `capacity` pages.
    ///
    /// Returns `None` when `capacity` is 0, which disables caching.
    #[must_use]
    pub fn new(capacity: usize) -> Option<Self> {
        let capacity = NonZeroUsize::new(capacity)?;
        Some(Self {
            entries: Mutex::new(Entries {
                generation: 0,
                pages: LruCache::new(capacity),
                stats: CacheStats::default(),
            }),
        })
    }

    /// Returns the cached page if it was stored at `generation`.
    pub fn get(&self, key: &ListingKey, generation: Generation) -> Option<ListPage> {
        let mut entries = self.entries.lock();
        entries.sync(generation);
        let found = entries.pages.get(key).cloned();
        if found.is_some() {
            entries.stats.hits += 1;
        } else {
            entries.stats.misses += 1;
        }
        found
    }

    /// Stores a page fetched at `generation`.
    ///
    /// A page fetched before a newer generation was observed is discarded.
    pub fn put(&self, key: ListingKey, page: ListPage, generation: Generation) {
        let mut entries = self.entries.lock();
        if generation < entries.generation {
            return;
        }
        entries.sync(generation);
        entries.pages.put(key, page);
    }

    /// Returns the current cache statistics.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.entries.lock().stats
    }

    /// Returns the number of cached pages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().pages.len()
    }

    /// Returns true if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for ListingCache {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let entries = self.entries.lock();
        formatter
            .debug_struct("ListingCache")
            .field("generation", &entries.generation)
            .field("len", &entries.pages.len())
            .field("cap", &entries.pages.cap())
            .field("stats", &entries.stats)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn page(total_pages: u64) -> ListPage {
        ListPage {
            records: vec![],
            total_pages,
        }
    }

    #[rstest]
    fn test_zero_capacity_disables() {
        assert!(ListingCache::new(0).is_none());
    }

    #[rstest]
    fn test_hit_at_same_generation() {
        let cache = ListingCache::new(4).unwrap();
        let key = ListingKey::new(1, None);

        assert!(cache.get(&key, 0).is_none());
        cache.put(key.clone(), page(3), 0);

        assert_eq!(cache.get(&key, 0), Some(page(3)));
        assert_eq!(cache.stats(), CacheStats { hits: 1, misses: 1 });
    }

    #[rstest]
    fn test_search_key_ignores_case() {
        assert_eq!(ListingKey::new(1, Some("Milk")), ListingKey::new(1, Some("milk")));
        assert_ne!(ListingKey::new(1, Some("milk")), ListingKey::new(2, Some("milk")));
    }

    #[rstest]
    fn test_newer_generation_drops_entries() {
        let cache = ListingCache::new(4).unwrap();
        cache.put(ListingKey::new(1, None), page(1), 0);
        cache.put(ListingKey::new(2, None), page(1), 0);

        assert!(cache.get(&ListingKey::new(1, None), 1).is_none());
        assert!(cache.is_empty());
    }

    #[rstest]
    fn test_stale_put_is_discarded() {
        let cache = ListingCache::new(4).unwrap();
        cache.get(&ListingKey::new(1, None), 2);

        cache.put(ListingKey::new(1, None), page(1), 1);

        assert!(cache.is_empty());
    }

    #[rstest]
    fn test_evicts_least_recently_used() {
        let cache = ListingCache::new(2).unwrap();
        cache.put(ListingKey::new(1, None), page(1), 0);
        cache.put(ListingKey::new(2, None), page(2), 0);
        cache.get(&ListingKey::new(1, None), 0);
        cache.put(ListingKey::new(3, None), page(3), 0);

        assert!(cache.get(&ListingKey::new(2, None), 0).is_none());
        assert_eq!(cache.get(&ListingKey::new(1, None), 0), Some(page(1)));
        assert_eq!(cache.len(), 2);
    }
}
