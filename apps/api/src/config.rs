use std::ops::RangeInclusive;

use anyhow::{bail, Context, Result};

use crate::assessment::handlers::MAX_TOTAL_QUESTIONS;
use crate::assessment::orchestrator::MAX_RESOURCES;
use crate::llm_client::resolve_model;

/// Accepted range for `DEFAULT_TOTAL_QUESTIONS`, matching per-request validation.
const TOTAL_QUESTIONS_RANGE: RangeInclusive<u32> = 1..=MAX_TOTAL_QUESTIONS as u32;
/// Accepted range for `JOB_RESULT_LIMIT`. A response never carries more than
/// `MAX_RESOURCES` jobs.
const JOB_RESULT_LIMIT_RANGE: RangeInclusive<usize> = 1..=MAX_RESOURCES;

/// Application configuration loaded from environment variables.
/// Fails at startup if the completion API key is missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: String,
    /// Job search is disabled when unset; completion falls back to AI job suggestions.
    pub serpapi_api_key: Option<String>,
    pub openai_model: &'static str,
    pub default_total_questions: u32,
    pub job_result_limit: usize,
    pub llm_timeout_secs: u64,
    pub job_search_timeout_secs: u64,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            openai_api_key: require_env("OPENAI_API_KEY")?,
            serpapi_api_key: optional_env("SERPAPI_API_KEY"),
            openai_model: resolve_model(optional_env("OPENAI_MODEL").as_deref()),
            default_total_questions: parse_env_in_range(
                "DEFAULT_TOTAL_QUESTIONS",
                3,
                TOTAL_QUESTIONS_RANGE,
            )?,
            job_result_limit: parse_env_in_range("JOB_RESULT_LIMIT", 5, JOB_RESULT_LIMIT_RANGE)?,
            llm_timeout_secs: parse_env("LLM_TIMEOUT_SECS", 30)?,
            job_search_timeout_secs: parse_env("JOB_SEARCH_TIMEOUT_SECS", 15)?,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Returns the variable's value, treating blank values as unset.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        None => Ok(default),
    }
}

fn parse_env_in_range<T>(key: &str, default: T, range: RangeInclusive<T>) -> Result<T>
where
    T: std::str::FromStr + PartialOrd + std::fmt::Display,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let value = parse_env(key, default)?;
    if !range.contains(&value) {
        bail!(
            "{key} must be between {} and {}, got {value}",
            range.start(),
            range.end()
        );
    }
    Ok(value)
}
