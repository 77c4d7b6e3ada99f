use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::search::cache::SearchCache;
use crate::search::dedup::dedupe;
use crate::search::models::{JobResult, SearchOptions};
use crate::search::sources::{
    build_http_client, AggregatorSource, GreenhouseSource, JobSource, LeverSource,
};

/// Fans a query out to every source, merges in source order, dedupes, and
/// caches the merged list.
pub struct SearchEngine {
    sources: Vec<Arc<dyn JobSource>>,
    cache: SearchCache,
}

impl SearchEngine {
    pub fn new(sources: Vec<Arc<dyn JobSource>>, cache: SearchCache) -> Self {
        Self { sources, cache }
    }

    /// Aggregator, Greenhouse and Lever sharing one HTTP client.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let client = build_http_client(Duration::from_secs(config.http_timeout_secs))?;
        let sources: Vec<Arc<dyn JobSource>> = vec![
            Arc::new(AggregatorSource::new(
                client.clone(),
                config.aggregator_url.clone(),
            )),
            Arc::new(GreenhouseSource::new(
                client.clone(),
                config.greenhouse_boards.clone(),
            )),
            Arc::new(LeverSource::new(client, config.lever_companies.clone())),
        ];
        let cache = SearchCache::new(Duration::from_secs(config.search_cache_ttl_secs));
        Ok(Self::new(sources, cache))
    }

    /// Never fails: a source that errors contributes nothing.
    pub async fn search(&self, query: &str, options: &SearchOptions) -> Vec<JobResult> {
        if let Some(hit) = self.cache.get(query, options) {
            debug!("Search cache hit for '{query}'");
            return hit;
        }

        let fetches = self.sources.iter().map(|source| async move {
            match source.fetch(query, options).await {
                Ok(jobs) => {
                    debug!("Source {} returned {} jobs", source.name(), jobs.len());
                    jobs
                }
                Err(e) => {
                    warn!("Source {} failed: {e}", source.name());
                    Vec::new()
                }
            }
        });
        let per_source = join_all(fetches).await;

        let results = dedupe(per_source.into_iter().flatten().collect());
        info!("Search '{query}' produced {} unique jobs", results.len());

        self.cache.insert(query, options, results.clone());
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::cache::tests::ManualClock;
    use crate::search::sources::SourceError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubSource {
        name: &'static str,
        urls: Vec<&'static str>,
        delay_ms: u64,
        fail: bool,
        calls: AtomicUsize,
    }

    impl StubSource {
        fn new(name: &'static str, urls: Vec<&'static str>) -> Self {
            Self {
                name,
                urls,
                delay_ms: 0,
                fail: false,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl JobSource for StubSource {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn fetch(
            &self,
            _query: &str,
            _options: &SearchOptions,
        ) -> Result<Vec<JobResult>, SourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
            }
            if self.fail {
                return Err(SourceError::NotConfigured("stub"));
            }
            Ok(self
                .urls
                .iter()
                .map(|url| JobResult {
                    title: "Engineer".to_string(),
                    company: "X".to_string(),
                    location: String::new(),
                    is_remote: false,
                    job_url: url.to_string(),
                    source: self.name.to_string(),
                    date_posted: None,
                    salary: None,
                    description: String::new(),
                })
                .collect())
        }
    }

    fn engine(sources: Vec<Arc<StubSource>>) -> SearchEngine {
        SearchEngine::new(
            sources
                .into_iter()
                .map(|s| s as Arc<dyn JobSource>)
                .collect(),
            SearchCache::new(Duration::from_secs(1800)),
        )
    }

    #[tokio::test]
    async fn test_merges_in_source_order_and_dedupes() {
        let mut slow = StubSource::new("first", vec!["https://x.com/job/1?ref=a", "https://x.com/job/2"]);
        slow.delay_ms = 50;
        let fast = StubSource::new("second", vec!["https://x.com/job/1/", "https://x.com/job/3"]);
        let engine = engine(vec![Arc::new(slow), Arc::new(fast)]);

        let results = engine.search("engineer", &SearchOptions::default()).await;
        let view: Vec<_> = results
            .iter()
            .map(|j| (j.source.as_str(), j.job_url.as_str()))
            .collect();
        assert_eq!(
            view,
            vec![
                ("first", "https://x.com/job/1?ref=a"),
                ("first", "https://x.com/job/2"),
                ("second", "https://x.com/job/3"),
            ]
        );
    }

    #[tokio::test]
    async fn test_failing_source_degrades_to_empty() {
        let mut broken = StubSource::new("broken", vec!["https://x.com/never"]);
        broken.fail = true;
        let healthy = StubSource::new("healthy", vec!["https://x.com/job/9"]);
        let engine = engine(vec![Arc::new(broken), Arc::new(healthy)]);

        let results = engine.search("engineer", &SearchOptions::default()).await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].source, "healthy");
    }

    #[tokio::test]
    async fn test_cache_hit_skips_sources() {
        let source = Arc::new(StubSource::new("only", vec!["https://x.com/job/1"]));
        let engine = engine(vec![source.clone()]);
        let options = SearchOptions::default();

        let first = engine.search("rust", &options).await;
        let second = engine.search("rust", &options).await;
        assert_eq!(first, second);
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);

        engine
            .search(
                "rust",
                &SearchOptions {
                    remote: Some(true),
                    ..SearchOptions::default()
                },
            )
            .await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_expired_cache_refetches() {
        let source = Arc::new(StubSource::new("only", vec!["https://x.com/job/1"]));
        let clock = Arc::new(ManualClock::new());
        let engine = SearchEngine::new(
            vec![source.clone() as Arc<dyn JobSource>],
            SearchCache::with_clock(Duration::from_secs(1800), clock.clone()),
        );
        let options = SearchOptions::default();

        engine.search("rust", &options).await;
        clock.advance(Duration::from_secs(1801));
        engine.search("rust", &options).await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sources_run_concurrently() {
        let mut a = StubSource::new("a", vec!["https://x.com/a"]);
        a.delay_ms = 1000;
        let mut b = StubSource::new("b", vec!["https://x.com/b"]);
        b.delay_ms = 1000;
        let engine = engine(vec![Arc::new(a), Arc::new(b)]);

        let started = tokio::time::Instant::now();
        let results = engine.search("x", &SearchOptions::default()).await;
        assert_eq!(results.len(), 2);
        assert!(started.elapsed() < Duration::from_millis(1500));
    }
}
