//! Job-listing fetcher for the completion stage.
//!
//! Search records are heterogeneous: the link may live under apply options,
//! related links, or a top-level field. Extraction works on raw JSON and
//! never fails a request; any error yields an empty list.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::models::assessment::{Resource, ResourceKind};

pub mod serpapi;

pub use serpapi::SerpApiClient;

const UNTITLED_JOB: &str = "Job opening";

#[derive(Debug, Error)]
pub enum JobSearchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A job-search backend returning raw job records for a free-text query.
#[async_trait]
pub trait JobSearch: Send + Sync {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Value>, JobSearchError>;
}

/// Fetches up to `limit` job postings for `career` as resources.
/// Failures are logged and degrade to an empty list.
pub async fn fetch_jobs(search: &dyn JobSearch, career: &str, limit: usize) -> Vec<Resource> {
    let query = career.trim();
    if query.is_empty() || limit == 0 {
        return Vec::new();
    }

    match search.search(query, limit).await {
        Ok(records) => {
            let jobs: Vec<Resource> = records.iter().take(limit).map(job_resource).collect();
            info!("Job search for '{query}' returned {} listings", jobs.len());
            jobs
        }
        Err(e) => {
            warn!("Job search for '{query}' failed: {e}");
            Vec::new()
        }
    }
}

fn job_resource(record: &Value) -> Resource {
    Resource::new(ResourceKind::Job, job_title(record), resolve_link(record))
}

/// `"<title> at <company>"`, degrading gracefully when either is missing.
fn job_title(record: &Value) -> String {
    let title = non_empty_str(record.get("title")).unwrap_or(UNTITLED_JOB);
    match non_empty_str(record.get("company_name")) {
        Some(company) => format!("{title} at {company}"),
        None => title.to_string(),
    }
}

/// Link precedence: first apply option, first related link, top-level link.
fn resolve_link(record: &Value) -> Option<String> {
    first_link(record.get("apply_options"))
        .or_else(|| first_link(record.get("related_links")))
        .or_else(|| non_empty_str(record.get("link")))
        .map(str::to_string)
}

fn first_link(list: Option<&Value>) -> Option<&str> {
    list?
        .as_array()?
        .iter()
        .find_map(|entry| non_empty_str(entry.get("link")))
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::StubJobSearch;
    use serde_json::json;

    #[test]
    fn test_title_combines_role_and_company() {
        let record = json!({"title": "Junior Data Analyst", "company_name": "Acme"});
        assert_eq!(job_title(&record), "Junior Data Analyst at Acme");
    }

    #[test]
    fn test_title_without_company_or_title() {
        assert_eq!(job_title(&json!({"title": "Barista"})), "Barista");
        assert_eq!(job_title(&json!({"company_name": "Acme"})), "Job opening at Acme");
    }

    #[test]
    fn test_link_prefers_apply_options() {
        let record = json!({
            "apply_options": [{"title": "LinkedIn", "link": "https://apply.example/1"}],
            "related_links": [{"link": "https://related.example"}],
            "link": "https://top.example"
        });
        assert_eq!(resolve_link(&record).as_deref(), Some("https://apply.example/1"));
    }

    #[test]
    fn test_link_falls_back_to_related_then_top_level() {
        let related = json!({
            "apply_options": [],
            "related_links": [{"text": "Company site", "link": "https://related.example"}],
            "link": "https://top.example"
        });
        assert_eq!(resolve_link(&related).as_deref(), Some("https://related.example"));

        let top = json!({"apply_options": "weird", "link": "https://top.example"});
        assert_eq!(resolve_link(&top).as_deref(), Some("https://top.example"));

        assert!(resolve_link(&json!({"title": "x"})).is_none());
    }

    #[tokio::test]
    async fn test_fetch_jobs_respects_limit() {
        let records = (0..8)
            .map(|i| json!({"title": format!("Role {i}"), "company_name": "Acme"}))
            .collect();
        let search = StubJobSearch::ok(records);

        let jobs = fetch_jobs(&search, "Data Analyst", 5).await;
        assert_eq!(jobs.len(), 5);
        assert!(jobs.iter().all(|j| j.kind == ResourceKind::Job));
        assert_eq!(jobs[0].title, "Role 0 at Acme");
    }

    #[tokio::test]
    async fn test_fetch_jobs_degrades_to_empty_on_failure() {
        let search = StubJobSearch::failing();
        let jobs = fetch_jobs(&search, "Data Analyst", 5).await;
        assert!(jobs.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_jobs_skips_blank_query() {
        let search = StubJobSearch::ok(vec![json!({"title": "x"})]);
        assert!(fetch_jobs(&search, "  ", 5).await.is_empty());
        assert_eq!(search.calls(), 0);
    }
}
