//! Assessment pipeline: one stateless pass per request.
//!
//! Flow: decide stage → (completion: job search) | (prompt → AI → normalize)
//!       → assemble response.
//!
//! The orchestrator owns control flow. `stage` and `final_step` in the
//! response always come from `decide`, never from the model.

use reqwest::Url;
use tracing::{debug, info};

use crate::assessment::normalizer::{call_and_normalize, NormalizedResult};
use crate::assessment::prompts::{build, display_career};
use crate::assessment::stage::{decide, Stage, StagePolicy};
use crate::jobs::{fetch_jobs, JobSearch};
use crate::llm_client::CompletionProvider;
use crate::models::assessment::{AssessmentRequest, AssessmentResponse, Resource, ResourceKind};

/// Upper bound on resources returned in any response.
pub const MAX_RESOURCES: usize = 5;

/// Runs the full assessment turn. Never fails: upstream problems degrade to
/// fallback content.
pub async fn run_assessment(
    llm: &dyn CompletionProvider,
    job_search: Option<&dyn JobSearch>,
    request: &AssessmentRequest,
    policy: &StagePolicy,
    job_limit: usize,
) -> AssessmentResponse {
    let history = &request.previous_answers;
    let stage = decide(history, policy, request.is_retry.unwrap_or(false));
    info!(
        "Assessment turn: career={:?}, answers={}, stage={}",
        request.career,
        history.len(),
        stage
    );

    if stage.is_completion() {
        return complete_assessment(llm, job_search, request, job_limit).await;
    }

    let prompt = build(&stage, &request.career, history);
    let label = stage.label();
    let ai = call_and_normalize(llm, &prompt, &request.career, Some(&label)).await;

    assemble(&stage, &request.career, ai, &prompt.fallback_question)
}

/// Completion goes straight to job search. Without a job-search backend the
/// model is asked for job suggestions instead.
async fn complete_assessment(
    llm: &dyn CompletionProvider,
    job_search: Option<&dyn JobSearch>,
    request: &AssessmentRequest,
    job_limit: usize,
) -> AssessmentResponse {
    let limit = job_limit.min(MAX_RESOURCES);

    match job_search {
        Some(search) => {
            let jobs = fetch_jobs(search, &request.career, limit).await;
            completion_response(&request.career, jobs, None)
        }
        None => {
            debug!("Job search not configured; asking the model for job suggestions");
            let prompt = build(&Stage::Completion, &request.career, &request.previous_answers);
            let label = Stage::Completion.label();
            let ai = call_and_normalize(llm, &prompt, &request.career, Some(&label)).await;

            let jobs = ai
                .resources
                .into_iter()
                .take(limit)
                .map(|r| Resource { kind: ResourceKind::Job, ..r })
                .collect();
            let message = (!ai.is_fallback).then_some(ai.message);
            completion_response(&request.career, jobs, message)
        }
    }
}

/// Combines the stage decision with normalized model output.
fn assemble(
    stage: &Stage,
    career: &str,
    ai: NormalizedResult,
    fallback_question: &str,
) -> AssessmentResponse {
    let label = stage.label();
    if ai.stage != label || ai.final_step {
        debug!(
            "Ignoring model control fields: stage={:?}, final_step={} (using {label})",
            ai.stage, ai.final_step
        );
    }

    let message = if ai.message.trim().is_empty() {
        default_message(stage, career)
    } else {
        ai.message
    };

    let next_question = ai
        .next_question
        .unwrap_or_else(|| fallback_question.to_string());

    let resources = stage.includes_resources().then(|| {
        let mut resources = ai.resources;
        resources.truncate(MAX_RESOURCES);
        if resources.is_empty() {
            resources = study_resources(career);
        }
        resources
    });

    AssessmentResponse {
        stage: label,
        message,
        next_question: Some(next_question),
        resources,
        final_step: false,
    }
}

fn completion_response(
    career: &str,
    jobs: Vec<Resource>,
    message: Option<String>,
) -> AssessmentResponse {
    let career = display_career(career);
    let message = message
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| {
            if jobs.is_empty() {
                format!(
                    "Congratulations! You've completed the {career} assessment. \
                    No job listings were found right now, so check back soon."
                )
            } else {
                format!(
                    "Congratulations! You've completed the {career} assessment. \
                    Here are some job opportunities to explore."
                )
            }
        });

    AssessmentResponse {
        stage: Stage::Completion.label(),
        message,
        next_question: None,
        resources: Some(jobs),
        final_step: true,
    }
}

fn default_message(stage: &Stage, career: &str) -> String {
    let career = display_career(career);
    match stage {
        Stage::Intro => format!("Welcome! Let's see where you stand on the path to becoming a {career}."),
        Stage::Question { .. } => "Great job! Here's your next question.".to_string(),
        Stage::RetryWithResources { .. } => {
            "Not quite. Review these resources, then try this question.".to_string()
        }
        Stage::Completion => format!("Congratulations! You've completed the {career} assessment."),
    }
}

/// Search-based study material used when the model supplied no resources.
fn study_resources(career: &str) -> Vec<Resource> {
    let career = display_career(career);
    vec![
        search_resource(
            ResourceKind::Course,
            format!("{career} courses on Coursera"),
            "https://www.coursera.org/search",
            "query",
            career.to_string(),
        ),
        search_resource(
            ResourceKind::Video,
            format!("{career} fundamentals on YouTube"),
            "https://www.youtube.com/results",
            "search_query",
            format!("{career} fundamentals"),
        ),
        search_resource(
            ResourceKind::Website,
            format!("{career} study guides"),
            "https://www.google.com/search",
            "q",
            format!("{career} study guide"),
        ),
    ]
}

fn search_resource(
    kind: ResourceKind,
    title: String,
    base: &str,
    param: &str,
    query: String,
) -> Resource {
    let link = Url::parse_with_params(base, &[(param, query.as_str())])
        .ok()
        .map(String::from);
    Resource::new(kind, title, link)
}
