//! LRU+TTL result cache (spec §4.10), keyed by a 256-bit fingerprint of the
//! normalized query and search options.
//!
//! Grounded on the teacher's `language/tree_cache.rs` — its `Mutex<LruCache
//! <K,V>>` shape and its peek-then-get pattern for avoiding a spurious LRU
//! promotion on an invalid/expired hit — generalized to add TTL expiry and
//! hit/miss/eviction counters, and on `search/cache.rs`'s `hash_query`
//! (ahash-based query hashing) generalized to a `blake3` 256-bit
//! fingerprint as spec §4.10 specifies.

use crate::models::{CacheStats, SearchOptions, SearchResult};
use chrono::{DateTime, Utc};
use lru::LruCache;
use serde::Serialize;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::Duration;

/// 256-bit cache key, the blake3 hash of the canonical fingerprint input.
pub type CacheKey = [u8; 32];

#[derive(Debug, Clone)]
struct Entry {
    results: Vec<SearchResult>,
    created_at: DateTime<Utc>,
    last_accessed_at: DateTime<Utc>,
    access_count: u64,
}

/// Canonical, hashable projection of `SearchOptions` — `contextBoosts` is a
/// map, so its entries are sorted before serializing to keep the
/// fingerprint stable regardless of insertion order.
#[derive(Serialize)]
struct FingerprintInput<'a> {
    normalized_query: &'a str,
    limit: usize,
    context_boosts: Vec<(&'a String, f64)>,
    pipeline_only: bool,
    pipeline_boost: f64,
    use_fuzzy: bool,
    fuzzy_threshold: Option<i64>,
    use_nlp: bool,
    top_terms_cap: usize,
    all_platforms: bool,
}

/// Lowercase + whitespace-trim the raw query, per spec §4.10.
pub fn normalize_query(query: &str) -> String {
    query.trim().to_lowercase()
}

/// Compute the 256-bit fingerprint of `(normalized_query, options)`, with
/// the stable `"search:"` prefix spec §4.10 requires.
pub fn fingerprint(normalized_query: &str, options: &SearchOptions) -> CacheKey {
    let mut sorted_boosts: Vec<(&String, f64)> = options
        .context_boosts
        .iter()
        .map(|(k, v)| (k, *v))
        .collect();
    sorted_boosts.sort_by(|a, b| a.0.cmp(b.0));

    let input = FingerprintInput {
        normalized_query,
        limit: options.limit,
        context_boosts: sorted_boosts,
        pipeline_only: options.pipeline_only,
        pipeline_boost: options.pipeline_boost,
        use_fuzzy: options.use_fuzzy,
        fuzzy_threshold: options.fuzzy_threshold,
        use_nlp: options.use_nlp,
        top_terms_cap: options.top_terms_cap,
        all_platforms: options.all_platforms,
    };

    let canonical = serde_json::to_string(&input).expect("FingerprintInput always serializes");
    let mut hasher = blake3::Hasher::new();
    hasher.update(b"search:");
    hasher.update(canonical.as_bytes());
    *hasher.finalize().as_bytes()
}

struct Inner {
    entries: LruCache<CacheKey, Entry>,
    ttl: Duration,
}

/// The single concrete instantiation of the result cache (spec §9: a
/// generic cache isn't required, one instantiation over `SearchResult`
/// vectors suffices). Guarded by one `RwLock`, with atomic counters per
/// spec §5's "counters may alternatively be atomic" allowance.
pub struct ResultCache {
    inner: RwLock<Inner>,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
    capacity: usize,
}

impl ResultCache {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let capacity_nz = NonZeroUsize::new(capacity.max(1)).unwrap();
        Self {
            inner: RwLock::new(Inner {
                entries: LruCache::new(capacity_nz),
                ttl,
            }),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
            capacity,
        }
    }

    /// Look up `key`. A live hit promotes the entry to the front and
    /// returns a value copy (mutating the caller's copy never affects
    /// cached state); an expired or missing entry counts as a miss, and an
    /// expired entry is evicted.
    pub fn get(&self, key: &CacheKey) -> Option<Vec<SearchResult>> {
        let now = Utc::now();
        let mut inner = self.inner.write().expect("result cache lock poisoned");

        // Peek first so a stale/expired hit doesn't get an LRU promotion
        // it doesn't deserve.
        let is_live = inner
            .entries
            .peek(key)
            .map(|e| now.signed_duration_since(e.created_at).to_std().unwrap_or(Duration::MAX) <= inner.ttl)
            .unwrap_or(false);

        if !is_live {
            if inner.entries.contains(key) {
                inner.entries.pop(key);
            }
            self.misses.fetch_add(1, Ordering::Relaxed);
            return None;
        }

        let entry = inner.entries.get_mut(key).expect("checked live above");
        entry.last_accessed_at = now;
        entry.access_count += 1;
        let results = entry.results.clone();
        self.hits.fetch_add(1, Ordering::Relaxed);
        Some(results)
    }

    /// Insert or overwrite `key`. Eviction (capacity overflow) is handled
    /// internally by the `lru` crate; we only need to detect it to bump the
    /// eviction counter.
    pub fn put(&self, key: CacheKey, results: Vec<SearchResult>) {
        let now = Utc::now();
        let mut inner = self.inner.write().expect("result cache lock poisoned");

        if let Some(existing) = inner.entries.get_mut(&key) {
            existing.results = results;
            existing.created_at = now;
            existing.last_accessed_at = now;
            return;
        }

        let was_full = inner.entries.len() >= inner.entries.cap().get();
        inner.entries.put(
            key,
            Entry {
                results,
                created_at: now,
                last_accessed_at: now,
                access_count: 0,
            },
        );
        if was_full {
            self.evictions.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn delete(&self, key: &CacheKey) -> bool {
        let mut inner = self.inner.write().expect("result cache lock poisoned");
        inner.entries.pop(key).is_some()
    }

    pub fn clear(&self) {
        let mut inner = self.inner.write().expect("result cache lock poisoned");
        inner.entries.clear();
    }

    pub fn keys(&self) -> Vec<CacheKey> {
        let inner = self.inner.read().expect("result cache lock poisoned");
        inner.entries.iter().map(|(k, _)| *k).collect()
    }

    pub fn size(&self) -> usize {
        let inner = self.inner.read().expect("result cache lock poisoned");
        inner.entries.len()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            size: self.size(),
            capacity: self.capacity,
        }
    }

    /// Walk back-to-front (least-recently-used first), removing expired
    /// entries until a live one is found — per spec §4.10.
    pub fn cleanup_expired(&self) -> usize {
        let now = Utc::now();
        let mut inner = self.inner.write().expect("result cache lock poisoned");
        let ttl = inner.ttl;
        let mut removed = 0;
        loop {
            let lru_key = match inner.entries.iter().last() {
                Some((k, e)) => {
                    let expired = now.signed_duration_since(e.created_at).to_std().unwrap_or(Duration::MAX) > ttl;
                    if expired {
                        Some(*k)
                    } else {
                        None
                    }
                }
                None => None,
            };
            match lru_key {
                Some(k) => {
                    inner.entries.pop(&k);
                    removed += 1;
                }
                None => break,
            }
        }
        removed
    }
}
