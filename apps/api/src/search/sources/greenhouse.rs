//! Greenhouse public job-board API. Returns every open posting on a board,
//! so listings are scored and filtered locally.

use async_trait::async_trait;
use chrono::Utc;
use futures::future::join_all;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::search::models::{parse_posted_date, JobResult, SearchOptions};
use crate::search::sources::{get_json, rank_candidates, JobSource, SourceError};

const BOARDS_API: &str = "https://boards-api.greenhouse.io/v1/boards";

#[derive(Debug, Deserialize)]
struct BoardResponse {
    #[serde(default)]
    jobs: Vec<GreenhouseJob>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct GreenhouseJob {
    pub title: String,
    pub absolute_url: String,
    pub company_name: Option<String>,
    pub location: Option<GreenhouseName>,
    pub updated_at: Option<String>,
    pub first_published: Option<String>,
    pub content: Option<String>,
    pub departments: Vec<GreenhouseName>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct GreenhouseName {
    pub name: String,
}

impl GreenhouseJob {
    /// The normalized job plus extra match text (departments and description).
    pub fn into_candidate(self, board: &str) -> (JobResult, String) {
        let location = self.location.map(|l| l.name).unwrap_or_default();
        let description = self.content.as_deref().map(html_to_text).unwrap_or_default();
        let departments = self
            .departments
            .iter()
            .map(|d| d.name.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let extra = format!("{departments} {description}");
        let date_posted = self
            .first_published
            .as_deref()
            .or(self.updated_at.as_deref())
            .and_then(parse_posted_date);

        let job = JobResult {
            title: self.title,
            company: self.company_name.unwrap_or_else(|| board.to_string()),
            is_remote: location.to_lowercase().contains("remote"),
            location,
            job_url: self.absolute_url,
            source: "greenhouse".to_string(),
            date_posted,
            salary: None,
            description,
        };
        (job, extra)
    }
}

/// Decodes the entity-escaped HTML Greenhouse returns and strips the tags.
pub fn html_to_text(html: &str) -> String {
    let decoded = html
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&");

    let mut text = String::with_capacity(decoded.len());
    let mut in_tag = false;
    for c in decoded.chars() {
        match c {
            '<' => {
                in_tag = true;
                text.push(' ');
            }
            '>' if in_tag => in_tag = false,
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub struct GreenhouseSource {
    client: Client,
    default_boards: Vec<String>,
}

impl GreenhouseSource {
    pub fn new(client: Client, default_boards: Vec<String>) -> Self {
        Self {
            client,
            default_boards,
        }
    }

    async fn fetch_board(&self, board: &str) -> Result<Vec<(JobResult, String)>, SourceError> {
        let url = format!("{BOARDS_API}/{board}/jobs?content=true");
        let response: BoardResponse = get_json(&self.client, &url).await?;
        Ok(response
            .jobs
            .into_iter()
            .map(|job| job.into_candidate(board))
            .collect())
    }
}

#[async_trait]
impl JobSource for GreenhouseSource {
    fn name(&self) -> &'static str {
        "greenhouse"
    }

    async fn fetch(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> Result<Vec<JobResult>, SourceError> {
        let boards = options
            .greenhouse_boards
            .as_ref()
            .unwrap_or(&self.default_boards);

        let fetched = join_all(boards.iter().map(|board| async move {
            (board, self.fetch_board(board).await)
        }))
        .await;

        let mut candidates = Vec::new();
        for (board, result) in fetched {
            match result {
                Ok(jobs) => {
                    debug!("Greenhouse board '{board}' returned {} postings", jobs.len());
                    candidates.extend(jobs);
                }
                Err(e) => warn!("Greenhouse board '{board}' failed: {e}"),
            }
        }

        Ok(rank_candidates(candidates, query, options, Utc::now()))
    }
}
