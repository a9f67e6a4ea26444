//! Axum route handlers for the assessment API.

use axum::{extract::State, Json};
use tracing::debug;

use crate::assessment::orchestrator::run_assessment;
use crate::assessment::reveal::reveal_answer;
use crate::assessment::stage::{StageLabel, StagePolicy};
use crate::errors::AppError;
use crate::models::assessment::{
    AssessmentRequest, AssessmentResponse, RevealAnswerRequest, RevealAnswerResponse,
};
use crate::state::AppState;

/// Largest accepted `total_questions`.
pub const MAX_TOTAL_QUESTIONS: i64 = 50;

/// POST /career-assessment
///
/// Runs one assessment turn. Upstream failures never surface as errors;
/// only malformed input is rejected.
pub async fn handle_career_assessment(
    State(state): State<AppState>,
    Json(request): Json<AssessmentRequest>,
) -> Result<Json<AssessmentResponse>, AppError> {
    let policy = stage_policy(&request, state.config.default_total_questions)?;

    let response = run_assessment(
        state.llm.as_ref(),
        state.job_search.as_deref(),
        &request,
        &policy,
        state.config.job_result_limit,
    )
    .await;

    Ok(Json(response))
}

/// POST /reveal-answer
pub async fn handle_reveal_answer(
    State(state): State<AppState>,
    Json(request): Json<RevealAnswerRequest>,
) -> Result<Json<RevealAnswerResponse>, AppError> {
    if request.question.trim().is_empty() {
        return Err(AppError::Validation("question cannot be empty".to_string()));
    }

    let answer = reveal_answer(state.llm.as_ref(), &request.question).await;
    Ok(Json(RevealAnswerResponse { answer }))
}

/// Validates the request and derives the stage policy from it.
fn stage_policy(request: &AssessmentRequest, default_total: u32) -> Result<StagePolicy, AppError> {
    if request.career.trim().is_empty() {
        return Err(AppError::Validation("career cannot be empty".to_string()));
    }

    let total_questions = match request.total_questions {
        None => default_total,
        Some(n) if (1..=MAX_TOTAL_QUESTIONS).contains(&n) => n as u32,
        Some(n) => {
            return Err(AppError::Validation(format!(
                "total_questions must be between 1 and {MAX_TOTAL_QUESTIONS}, got {n}"
            )))
        }
    };

    let current = request.current_stage.as_deref().and_then(|raw| {
        let label = StageLabel::parse(raw);
        if label.is_none() {
            debug!("Ignoring unrecognized current_stage {raw:?}");
        }
        label
    });

    Ok(StagePolicy {
        current,
        ..StagePolicy::derived(total_questions)
    })
}
