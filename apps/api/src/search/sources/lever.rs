//! Lever public postings API. Like Greenhouse it lists a whole company
//! board, so matching happens locally.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::search::models::{JobResult, SalaryRange, SearchOptions};
use crate::search::sources::{get_json, rank_candidates, JobSource, SourceError};

const POSTINGS_API: &str = "https://api.lever.co/v0/postings";

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LeverPosting {
    pub text: String,
    pub hosted_url: String,
    /// Milliseconds since the epoch.
    pub created_at: Option<i64>,
    pub categories: LeverCategories,
    pub description_plain: Option<String>,
    pub workplace_type: Option<String>,
    pub salary_range: Option<LeverSalary>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LeverCategories {
    pub location: Option<String>,
    pub team: Option<String>,
    pub commitment: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LeverSalary {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub currency: Option<String>,
    pub interval: Option<String>,
}

impl LeverPosting {
    pub fn into_candidate(self, company: &str) -> (JobResult, String) {
        let location = self.categories.location.unwrap_or_default();
        let is_remote = self
            .workplace_type
            .as_deref()
            .map(|w| w.eq_ignore_ascii_case("remote"))
            .unwrap_or(false)
            || location.to_lowercase().contains("remote");
        let description = self.description_plain.unwrap_or_default();
        let extra = [
            self.categories.team.as_deref().unwrap_or_default(),
            self.categories.commitment.as_deref().unwrap_or_default(),
            description.as_str(),
        ]
        .join(" ");

        let job = JobResult {
            title: self.text,
            company: company.to_string(),
            location,
            is_remote,
            job_url: self.hosted_url,
            source: "lever".to_string(),
            date_posted: self.created_at.and_then(DateTime::<Utc>::from_timestamp_millis),
            salary: self
                .salary_range
                .and_then(|s| SalaryRange::from_parts(s.min, s.max, s.currency, s.interval)),
            description,
        };
        (job, extra)
    }
}

pub struct LeverSource {
    client: Client,
    default_companies: Vec<String>,
}

impl LeverSource {
    pub fn new(client: Client, default_companies: Vec<String>) -> Self {
        Self {
            client,
            default_companies,
        }
    }

    async fn fetch_company(&self, company: &str) -> Result<Vec<(JobResult, String)>, SourceError> {
        let url = format!("{POSTINGS_API}/{company}?mode=json");
        let postings: Vec<LeverPosting> = get_json(&self.client, &url).await?;
        Ok(postings
            .into_iter()
            .map(|posting| posting.into_candidate(company))
            .collect())
    }
}

#[async_trait]
impl JobSource for LeverSource {
    fn name(&self) -> &'static str {
        "lever"
    }

    async fn fetch(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> Result<Vec<JobResult>, SourceError> {
        let companies = options
            .lever_companies
            .as_ref()
            .unwrap_or(&self.default_companies);

        let fetched = join_all(companies.iter().map(|company| async move {
            (company, self.fetch_company(company).await)
        }))
        .await;

        let mut candidates = Vec::new();
        for (company, result) in fetched {
            match result {
                Ok(postings) => {
                    debug!("Lever company '{company}' returned {} postings", postings.len());
                    candidates.extend(postings);
                }
                Err(e) => warn!("Lever company '{company}' failed: {e}"),
            }
        }

        Ok(rank_candidates(candidates, query, options, Utc::now()))
    }
}
