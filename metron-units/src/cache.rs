//! Memoisation of simplification results
//!
//! Keys are normalised so that scales differing only in the last few bits
//! of floating-point noise share an entry.

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use tracing::trace;
use crate::Dimension;

/// Significant digits kept when quantising scales and offsets
const KEY_DIGITS: usize = 12;

/// Normalised cache key: dimension plus quantised scale and offset
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    dimension: Dimension,
    scale: String,
    offset: Option<String>,
}

impl CacheKey {
    pub fn linear(dimension: &Dimension, scale: f64) -> Self {
        CacheKey { dimension: dimension.clone(), scale: quantise(scale), offset: None }
    }

    pub fn affine(dimension: &Dimension, scale: f64, offset: f64) -> Self {
        CacheKey { dimension: dimension.clone(), scale: quantise(scale), offset: Some(quantise(offset)) }
    }
}

fn quantise(value: f64) -> String {
    format!("{:.*e}", KEY_DIGITS - 1, value)
}

/// Hit and miss counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
}

/// Thread-safe, append-only map from normalised keys to simplification results
#[derive(Debug, Default)]
pub struct SimplifyCache {
    entries: RwLock<HashMap<CacheKey, Arc<BTreeSet<String>>>>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl SimplifyCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a key without touching the counters
    pub fn get(&self, key: &CacheKey) -> Option<Arc<BTreeSet<String>>> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.get(key).cloned()
    }

    /// Return the cached value, or compute and publish it.
    ///
    /// The computation runs outside the lock, so concurrent misses on the
    /// same key may both compute; the first insert wins and every caller
    /// gets the stored value.
    pub fn get_or_insert_with(
        &self,
        key: CacheKey,
        compute: impl FnOnce() -> BTreeSet<String>,
    ) -> Arc<BTreeSet<String>> {
        if let Some(found) = self.get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            trace!(?key, "simplify cache hit");
            return found;
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let value = Arc::new(compute());
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        Arc::clone(entries.entry(key).or_insert(value))
    }

    /// Pre-seed an entry; an existing entry is kept
    pub fn insert(&self, key: CacheKey, value: BTreeSet<String>) -> Arc<BTreeSet<String>> {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        Arc::clone(entries.entry(key).or_insert_with(|| Arc::new(value)))
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry; counters are kept
    pub fn clear(&self) {
        self.entries.write().unwrap_or_else(|e| e.into_inner()).clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use crate::dimension::BaseDimension;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_key_quantisation() {
        let length = Dimension::base(BaseDimension::Length);
        assert_eq!(CacheKey::linear(&length, 0.1 + 0.2), CacheKey::linear(&length, 0.3));
        assert_ne!(CacheKey::linear(&length, 1.0), CacheKey::linear(&length, 1.001));
        assert_ne!(CacheKey::linear(&length, 1.0), CacheKey::affine(&length, 1.0, 0.0));
    }

    #[test]
    fn test_hit_and_miss() {
        let cache = SimplifyCache::new();
        let key = CacheKey::linear(&Dimension::base(BaseDimension::Time), 60.0);

        let first = cache.get_or_insert_with(key.clone(), || set(&["min"]));
        let second = cache.get_or_insert_with(key, || panic!("should be cached"));
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.stats(), CacheStats { hits: 1, misses: 1 });
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_first_insert_wins() {
        let cache = SimplifyCache::new();
        let key = CacheKey::linear(&Dimension::dimensionless(), 0.01);
        cache.insert(key.clone(), set(&["%"]));
        let kept = cache.insert(key.clone(), set(&["percent"]));
        assert_eq!(*kept, set(&["%"]));
        assert_eq!(*cache.get(&key).unwrap(), set(&["%"]));
    }

    #[test]
    fn test_clear() {
        let cache = SimplifyCache::new();
        cache.insert(CacheKey::linear(&Dimension::dimensionless(), 1.0), set(&[""]));
        assert!(!cache.is_empty());
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_concurrent_readers_agree() {
        let cache = Arc::new(SimplifyCache::new());
        let key = CacheKey::linear(&Dimension::base(BaseDimension::Mass), 1.0);

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cache = Arc::clone(&cache);
                let key = key.clone();
                thread::spawn(move || cache.get_or_insert_with(key, || set(&[format!("kg{}", i).as_str()])))
            })
            .collect();

        let results: Vec<Arc<BTreeSet<String>>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let stored = cache.get(&key).unwrap();
        assert!(results.iter().all(|r| **r == *stored));
        assert_eq!(cache.len(), 1);
        let stats = cache.stats();
        assert_eq!(stats.hits + stats.misses, 8);
    }
}
