//! Aggregated job-board service (indeed, linkedin, glassdoor, ... behind one
//! endpoint). It filters by query server-side, so results pass through
//! without local scoring.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::search::models::{parse_posted_date, JobResult, SalaryRange, SearchOptions};
use crate::search::sources::{JobSource, SourceError};

const DEFAULT_SITES: &[&str] = &["indeed", "linkedin"];
const DEFAULT_RESULTS: usize = 20;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AggregatorResponse {
    Wrapped { jobs: Vec<AggregatorRecord> },
    Bare(Vec<AggregatorRecord>),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AggregatorRecord {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub is_remote: Option<bool>,
    pub job_url: Option<String>,
    pub site: Option<String>,
    pub date_posted: Option<String>,
    pub min_amount: Option<f64>,
    pub max_amount: Option<f64>,
    pub currency: Option<String>,
    pub interval: Option<String>,
    pub description: Option<String>,
}

impl AggregatorRecord {
    pub fn into_job(self) -> JobResult {
        let location = self.location.unwrap_or_default();
        let is_remote = self
            .is_remote
            .unwrap_or_else(|| location.to_lowercase().contains("remote"));
        JobResult {
            title: self.title.unwrap_or_default(),
            company: self.company.unwrap_or_default(),
            location,
            is_remote,
            job_url: self.job_url.unwrap_or_default(),
            source: self.site.unwrap_or_else(|| "aggregator".to_string()),
            date_posted: self.date_posted.as_deref().and_then(parse_posted_date),
            salary: SalaryRange::from_parts(
                self.min_amount,
                self.max_amount,
                self.currency,
                self.interval,
            ),
            description: self.description.unwrap_or_default(),
        }
    }
}

pub struct AggregatorSource {
    client: Client,
    base_url: Option<String>,
}

impl AggregatorSource {
    pub fn new(client: Client, base_url: Option<String>) -> Self {
        Self { client, base_url }
    }
}

/// Query parameters for the aggregator, with its defaults filled in.
pub fn query_params(query: &str, options: &SearchOptions) -> Vec<(&'static str, String)> {
    let sites = options
        .site
        .as_ref()
        .filter(|sites| !sites.is_empty())
        .map(|sites| sites.join(","))
        .unwrap_or_else(|| DEFAULT_SITES.join(","));

    let mut params = vec![
        ("search_term", query.to_string()),
        ("site_name", sites),
        (
            "results_wanted",
            options.results.unwrap_or(DEFAULT_RESULTS).to_string(),
        ),
    ];
    if let Some(location) = &options.location {
        params.push(("location", location.clone()));
    }
    if let Some(remote) = options.remote {
        params.push(("is_remote", remote.to_string()));
    }
    if let Some(job_type) = &options.job_type {
        params.push(("job_type", job_type.clone()));
    }
    if let Some(hours) = options.hours_old {
        params.push(("hours_old", hours.to_string()));
    }
    params
}

#[async_trait]
impl JobSource for AggregatorSource {
    fn name(&self) -> &'static str {
        "aggregator"
    }

    async fn fetch(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> Result<Vec<JobResult>, SourceError> {
        let base_url = self
            .base_url
            .as_deref()
            .ok_or(SourceError::NotConfigured("AGGREGATOR_URL"))?;

        let response = self
            .client
            .get(base_url)
            .query(&query_params(query, options))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                status: status.as_u16(),
                url: base_url.to_string(),
            });
        }

        let records = match response.json::<AggregatorResponse>().await? {
            AggregatorResponse::Wrapped { jobs } => jobs,
            AggregatorResponse::Bare(jobs) => jobs,
        };
        Ok(records.into_iter().map(AggregatorRecord::into_job).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_normalizes() {
        let record: AggregatorRecord = serde_json::from_value(json!({
            "title": "Backend Engineer",
            "company": "Initech",
            "location": "Austin, TX",
            "job_url": "https://indeed.test/viewjob?jk=1",
            "site": "indeed",
            "date_posted": "2024-05-02",
            "min_amount": 150000.0,
            "max_amount": 180000.0,
            "currency": "USD",
            "interval": "yearly",
            "description": "Build APIs"
        }))
        .unwrap();

        let job = record.into_job();
        assert_eq!(job.source, "indeed");
        assert!(!job.is_remote);
        assert!(job.date_posted.is_some());
        let salary = job.salary.unwrap();
        assert_eq!(salary.min, Some(150000.0));
        assert_eq!(salary.max, Some(180000.0));
    }

    #[test]
    fn test_sparse_record_falls_back() {
        let record: AggregatorRecord =
            serde_json::from_value(json!({"title": "SRE", "location": "Remote"})).unwrap();
        let job = record.into_job();
        assert_eq!(job.source, "aggregator");
        assert!(job.is_remote);
        assert!(job.salary.is_none());
        assert!(job.date_posted.is_none());
    }

    #[test]
    fn test_response_accepts_both_shapes() {
        let wrapped: AggregatorResponse =
            serde_json::from_value(json!({"jobs": [{"title": "a"}]})).unwrap();
        assert!(matches!(wrapped, AggregatorResponse::Wrapped { ref jobs } if jobs.len() == 1));
        let bare: AggregatorResponse = serde_json::from_value(json!([{"title": "b"}])).unwrap();
        assert!(matches!(bare, AggregatorResponse::Bare(ref jobs) if jobs.len() == 1));
    }

    #[test]
    fn test_query_params_defaults() {
        let params = query_params("rust", &SearchOptions::default());
        assert_eq!(
            params,
            vec![
                ("search_term", "rust".to_string()),
                ("site_name", "indeed,linkedin".to_string()),
                ("results_wanted", "20".to_string()),
            ]
        );
    }

    #[test]
    fn test_query_params_overrides() {
        let options = SearchOptions {
            site: Some(vec!["glassdoor".to_string()]),
            remote: Some(true),
            hours_old: Some(72),
            ..SearchOptions::default()
        };
        let params = query_params("rust", &options);
        assert!(params.contains(&("site_name", "glassdoor".to_string())));
        assert!(params.contains(&("is_remote", "true".to_string())));
        assert!(params.contains(&("hours_old", "72".to_string())));
    }

    #[tokio::test]
    async fn test_unconfigured_source_errors() {
        let source = AggregatorSource::new(Client::new(), None);
        let err = source
            .fetch("rust", &SearchOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::NotConfigured(_)));
    }
}
