//! Job sources. Each adapter fetches from one external service and maps its
//! records onto `JobResult`. Failures stay inside the source: the engine
//! logs them and carries on with the others.

pub mod aggregator;
pub mod greenhouse;
pub mod lever;

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use thiserror::Error;

use crate::search::matcher;
use crate::search::models::{JobResult, SearchOptions};

pub use aggregator::AggregatorSource;
pub use greenhouse::GreenhouseSource;
pub use lever::LeverSource;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} returned status {status}")]
    Status { status: u16, url: String },

    #[error("{0} is not configured")]
    NotConfigured(&'static str),
}

/// One job source. Carried by the search engine as `Arc<dyn JobSource>`.
#[async_trait]
pub trait JobSource: Send + Sync {
    fn name(&self) -> &'static str;

    async fn fetch(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> Result<Vec<JobResult>, SourceError>;
}

/// Shared HTTP client for all sources. The timeout bounds every fetch.
pub fn build_http_client(timeout: Duration) -> anyhow::Result<Client> {
    Ok(Client::builder()
        .timeout(timeout)
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()?)
}

/// GETs `url` and decodes JSON, mapping non-2xx statuses to `SourceError`.
pub(crate) async fn get_json<T: serde::de::DeserializeOwned>(
    client: &Client,
    url: &str,
) -> Result<T, SourceError> {
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(SourceError::Status {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }
    Ok(response.json().await?)
}

/// Whether a posting satisfies the location, remote and age options.
fn passes_filters(job: &JobResult, options: &SearchOptions, now: DateTime<Utc>) -> bool {
    if options.remote == Some(true) && !job.is_remote {
        return false;
    }
    if let Some(location) = options.location.as_deref().map(str::trim) {
        if !location.is_empty()
            && !job.location.to_lowercase().contains(&location.to_lowercase())
        {
            return false;
        }
    }
    if let (Some(hours), Some(posted)) = (options.hours_old, job.date_posted) {
        if now.signed_duration_since(posted) > chrono::Duration::hours(i64::from(hours)) {
            return false;
        }
    }
    true
}

/// Filters board listings locally and orders them by query score.
///
/// Each candidate carries extra text (description, team) that counts toward
/// the match at half the weight of the title. Zero scores are dropped; the
/// sort is stable so ties keep board order. `results` caps the output.
pub(crate) fn rank_candidates(
    candidates: Vec<(JobResult, String)>,
    query: &str,
    options: &SearchOptions,
    now: DateTime<Utc>,
) -> Vec<JobResult> {
    let mut scored: Vec<(u32, JobResult)> = candidates
        .into_iter()
        .filter(|(job, _)| passes_filters(job, options, now))
        .filter_map(|(job, extra)| {
            let score = matcher::score(query, &job.title, &extra);
            (score > 0).then_some((score, job))
        })
        .collect();

    scored.sort_by(|a, b| b.0.cmp(&a.0));

    let limit = options.results.unwrap_or(usize::MAX);
    scored.into_iter().take(limit).map(|(_, job)| job).collect()
}
