//! TTL cache for whole searches, keyed by query plus serialized options.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use crate::search::models::{JobResult, SearchOptions};

pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

struct CacheEntry {
    stored_at: Instant,
    results: Vec<JobResult>,
}

/// Upper bound on stored searches; the oldest entry goes first when full.
pub const MAX_ENTRIES: usize = 256;

pub struct SearchCache {
    ttl: Duration,
    max_entries: usize,
    clock: Arc<dyn Clock>,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl SearchCache {
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl,
            max_entries: MAX_ENTRIES,
            clock,
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn key(query: &str, options: &SearchOptions) -> String {
        let options = serde_json::to_string(options).unwrap_or_default();
        format!("{query}\u{0}{options}")
    }

    /// Returns a fresh entry. Expired entries are evicted on the way.
    pub fn get(&self, query: &str, options: &SearchOptions) -> Option<Vec<JobResult>> {
        let key = Self::key(query, options);
        let now = self.clock.now();
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);

        let fresh = entries
            .get(&key)
            .map(|entry| now.saturating_duration_since(entry.stored_at) < self.ttl)?;
        if fresh {
            entries.get(&key).map(|entry| entry.results.clone())
        } else {
            entries.remove(&key);
            None
        }
    }

    /// Stores `results`, first dropping every expired entry. When still at
    /// capacity the oldest entry is evicted.
    pub fn insert(&self, query: &str, options: &SearchOptions, results: Vec<JobResult>) {
        let key = Self::key(query, options);
        let now = self.clock.now();
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);

        entries.retain(|_, entry| now.saturating_duration_since(entry.stored_at) < self.ttl);
        if entries.len() >= self.max_entries && !entries.contains_key(&key) {
            let oldest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.stored_at)
                .map(|(key, _)| key.clone());
            if let Some(oldest) = oldest {
                entries.remove(&oldest);
            }
        }

        entries.insert(
            key,
            CacheEntry {
                stored_at: now,
                results,
            },
        );
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Clock that only moves when told to.
    pub(crate) struct ManualClock {
        now: Mutex<Instant>,
    }

    impl ManualClock {
        pub(crate) fn new() -> Self {
            Self {
                now: Mutex::new(Instant::now()),
            }
        }

        pub(crate) fn advance(&self, by: Duration) {
            let mut now = self.now.lock().unwrap();
            *now += by;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> Instant {
            *self.now.lock().unwrap()
        }
    }

    fn results() -> Vec<JobResult> {
        vec![JobResult {
            title: "Engineer".to_string(),
            company: "X".to_string(),
            location: "Remote".to_string(),
            is_remote: true,
            job_url: "https://x.com/1".to_string(),
            source: "lever".to_string(),
            date_posted: None,
            salary: None,
            description: String::new(),
        }]
    }

    #[test]
    fn test_hit_within_ttl() {
        let clock = Arc::new(ManualClock::new());
        let cache = SearchCache::with_clock(Duration::from_secs(1800), clock.clone());
        let opts = SearchOptions::default();
        cache.insert("rust", &opts, results());

        clock.advance(Duration::from_secs(1799));
        assert_eq!(cache.get("rust", &opts), Some(results()));
    }

    #[test]
    fn test_expires_after_ttl() {
        let clock = Arc::new(ManualClock::new());
        let cache = SearchCache::with_clock(Duration::from_secs(1800), clock.clone());
        let opts = SearchOptions::default();
        cache.insert("rust", &opts, results());

        clock.advance(Duration::from_secs(1800));
        assert_eq!(cache.get("rust", &opts), None);
    }

    #[test]
    fn test_insert_reclaims_expired_entries() {
        let clock = Arc::new(ManualClock::new());
        let cache = SearchCache::with_clock(Duration::from_secs(1800), clock.clone());
        let opts = SearchOptions::default();

        for i in 0..100 {
            cache.insert(&format!("query {i}"), &opts, results());
            clock.advance(Duration::from_secs(3600));
        }

        assert_eq!(cache.len(), 1);
        assert!(cache.get("query 99", &opts).is_none());
    }

    #[test]
    fn test_full_cache_evicts_oldest() {
        let clock = Arc::new(ManualClock::new());
        let cache = SearchCache::with_clock(Duration::from_secs(1800), clock.clone());
        let opts = SearchOptions::default();

        for i in 0..=MAX_ENTRIES {
            cache.insert(&format!("query {i}"), &opts, results());
            clock.advance(Duration::from_millis(1));
        }

        assert_eq!(cache.len(), MAX_ENTRIES);
        assert!(cache.get("query 0", &opts).is_none());
        assert!(cache.get("query 1", &opts).is_some());
        assert!(cache.get(&format!("query {MAX_ENTRIES}"), &opts).is_some());
    }

    #[test]
    fn test_options_are_part_of_key() {
        let cache = SearchCache::new(Duration::from_secs(60));
        let remote = SearchOptions {
            remote: Some(true),
            ..SearchOptions::default()
        };
        cache.insert("rust", &remote, results());

        assert!(cache.get("rust", &SearchOptions::default()).is_none());
        assert!(cache.get("go", &remote).is_none());
        assert!(cache.get("rust", &remote).is_some());
    }
}
