use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A job posting normalized from any source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobResult {
    pub title: String,
    pub company: String,
    pub location: String,
    pub is_remote: bool,
    pub job_url: String,
    pub source: String,
    pub date_posted: Option<DateTime<Utc>>,
    pub salary: Option<SalaryRange>,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalaryRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub currency: Option<String>,
    pub interval: Option<String>,
}

impl SalaryRange {
    /// `None` unless at least one bound is known.
    pub fn from_parts(
        min: Option<f64>,
        max: Option<f64>,
        currency: Option<String>,
        interval: Option<String>,
    ) -> Option<Self> {
        let positive = |v: Option<f64>| v.filter(|n| n.is_finite() && *n > 0.0);
        let (min, max) = (positive(min), positive(max));
        if min.is_none() && max.is_none() {
            return None;
        }
        Some(Self {
            min,
            max,
            currency: currency.filter(|c| !c.trim().is_empty()),
            interval: interval
                .map(|i| i.trim().to_lowercase())
                .filter(|i| !i.is_empty()),
        })
    }
}

/// Search options. Any field left unset falls back to the source's own
/// defaults. Serialized as part of the cache key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchOptions {
    /// Sites the aggregator should query (e.g. `indeed`, `linkedin`).
    pub site: Option<Vec<String>>,
    pub location: Option<String>,
    pub remote: Option<bool>,
    /// Result cap per source.
    pub results: Option<usize>,
    pub job_type: Option<String>,
    pub hours_old: Option<u32>,
    pub greenhouse_boards: Option<Vec<String>>,
    pub lever_companies: Option<Vec<String>>,
}

/// Parses the date formats job boards hand back: RFC 3339 timestamps or
/// bare `YYYY-MM-DD` dates (taken as midnight UTC).
pub fn parse_posted_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}
