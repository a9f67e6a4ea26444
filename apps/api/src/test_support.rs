//! In-memory doubles for the completion and job-search backends.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use crate::config::Config;
use crate::jobs::{JobSearch, JobSearchError};
use crate::llm_client::{CompletionProvider, LlmError, DEFAULT_MODEL};
use crate::state::AppState;

/// App state wired to the given doubles with default settings.
pub fn test_state(
    llm: Arc<dyn CompletionProvider>,
    job_search: Option<Arc<dyn JobSearch>>,
) -> AppState {
    AppState {
        llm,
        job_search,
        config: Config {
            openai_api_key: "sk-test".to_string(),
            serpapi_api_key: None,
            openai_model: DEFAULT_MODEL,
            default_total_questions: 3,
            job_result_limit: 5,
            llm_timeout_secs: 5,
            job_search_timeout_secs: 5,
            port: 0,
            rust_log: "debug".to_string(),
        },
    }
}

/// Replays scripted completion results in order; an exhausted script fails.
pub struct ScriptedCompletion {
    script: Mutex<VecDeque<Result<String, LlmError>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedCompletion {
    pub fn new(script: Vec<Result<String, LlmError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Always answers with the same text.
    pub fn always(text: &str) -> Self {
        Self::new((0..8).map(|_| Ok(text.to_string())).collect())
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionProvider for ScriptedCompletion {
    async fn complete(
        &self,
        _system: &str,
        prompt: &str,
        _max_tokens: u32,
    ) -> Result<String, LlmError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(LlmError::EmptyContent))
    }
}

/// Returns fixed records, or fails every call.
pub struct StubJobSearch {
    records: Option<Vec<Value>>,
    calls: AtomicUsize,
}

impl StubJobSearch {
    pub fn ok(records: Vec<Value>) -> Self {
        Self {
            records: Some(records),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            records: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl JobSearch for StubJobSearch {
    async fn search(&self, _query: &str, limit: usize) -> Result<Vec<Value>, JobSearchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.records {
            Some(records) => Ok(records.iter().take(limit).cloned().collect()),
            None => Err(JobSearchError::Api {
                status: 503,
                message: "search unavailable".to_string(),
            }),
        }
    }
}
