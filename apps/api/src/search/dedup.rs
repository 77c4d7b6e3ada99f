use std::collections::HashSet;

use crate::search::models::JobResult;

/// Identity key for a job URL: query string and trailing slashes dropped,
/// lower-cased.
pub fn canonical_url(url: &str) -> String {
    let without_query = url.split('?').next().unwrap_or(url);
    without_query.trim().trim_end_matches('/').to_lowercase()
}

/// Keeps the first result for each canonical URL, in input order. Later
/// duplicates are dropped whole, whatever their source. Results with no URL
/// have no identity to compare and are all kept.
pub fn dedupe(results: Vec<JobResult>) -> Vec<JobResult> {
    let mut seen = HashSet::new();
    results
        .into_iter()
        .filter(|job| {
            let key = canonical_url(&job.job_url);
            key.is_empty() || seen.insert(key)
        })
        .collect()
}
