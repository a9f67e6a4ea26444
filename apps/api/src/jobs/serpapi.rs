use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::{JobSearch, JobSearchError};

const SERPAPI_URL: &str = "https://serpapi.com/search.json";
const ENGINE: &str = "google_jobs";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    jobs_results: Vec<Value>,
    #[serde(default)]
    error: Option<String>,
}

/// Google Jobs search through SerpApi. One attempt per call, bounded by the client timeout.
#[derive(Clone)]
pub struct SerpApiClient {
    client: Client,
    api_key: String,
}

impl SerpApiClient {
    pub fn new(api_key: String, timeout: Duration) -> Result<Self, JobSearchError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_key,
        })
    }
}

#[async_trait]
impl JobSearch for SerpApiClient {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Value>, JobSearchError> {
        debug!("Job search: engine={ENGINE}, query={query:?}, limit={limit}");

        let response = self
            .client
            .get(SERPAPI_URL)
            .query(&[
                ("engine", ENGINE),
                ("q", query),
                ("api_key", self.api_key.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(JobSearchError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let parsed: SearchResponse = serde_json::from_str(&body)?;

        // SerpApi reports "no results" as a 200 with an error string.
        if parsed.jobs_results.is_empty() {
            if let Some(message) = parsed.error {
                debug!("Job search returned no results: {message}");
            }
        }

        Ok(parsed.jobs_results.into_iter().take(limit).collect())
    }
}
