// Prompt builder for the assessment flow.
// Deterministic string construction only; no I/O.

use crate::assessment::stage::Stage;
use crate::models::assessment::Answer;

pub const NO_PREVIOUS_ANSWERS: &str = "No previous answers yet.";
const UNNAMED_CAREER: &str = "your chosen career";

const QUESTION_KEYS: &[&str] = &["stage", "message", "next_question", "final_step"];
const RETRY_KEYS: &[&str] = &["stage", "message", "next_question", "resources", "final_step"];
const COMPLETION_KEYS: &[&str] = &["stage", "message", "resources", "final_step"];

const QUESTION_MAX_TOKENS: u32 = 600;
const RESOURCE_MAX_TOKENS: u32 = 900;

/// Everything the normalizer needs to call the model for one stage.
#[derive(Debug, Clone)]
pub struct StagePrompt {
    pub text: String,
    pub expected_keys: &'static [&'static str],
    pub fallback_question: String,
    pub max_tokens: u32,
}

/// Renders the answer history as `"<question>: correct|incorrect"` lines.
pub fn format_history(history: &[Answer]) -> String {
    if history.is_empty() {
        return NO_PREVIOUS_ANSWERS.to_string();
    }
    history
        .iter()
        .map(|a| {
            format!(
                "{}: {}",
                a.question.trim(),
                if a.correct { "correct" } else { "incorrect" }
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Career name as it should appear in prose; blank careers get a neutral stand-in.
pub fn display_career(career: &str) -> &str {
    let career = career.trim();
    if career.is_empty() {
        UNNAMED_CAREER
    } else {
        career
    }
}

/// Builds the instruction text, output key contract and fallback question for a stage.
pub fn build(stage: &Stage, career: &str, history: &[Answer]) -> StagePrompt {
    let career = display_career(career);
    let label = stage.label();
    let history_text = format_history(history);

    match stage {
        Stage::Intro => StagePrompt {
            text: format!(
                r#"You are a career coach AI.
The user wants to pursue a career as a '{career}'.
Stage: {label}
Previous answers:
{history_text}

Task:
- Briefly introduce the role of a {career}: common responsibilities and required skills.
- Provide the first technical, skill-testing question for a beginner in this career.
  Do NOT ask motivational or personal questions.
- Respond with a JSON object with exactly these keys: {keys}.
- "stage" must be the string "{label}" and "final_step" must be false."#,
                keys = key_list(QUESTION_KEYS),
            ),
            expected_keys: QUESTION_KEYS,
            fallback_question: fallback_question(stage, career),
            max_tokens: QUESTION_MAX_TOKENS,
        },
        Stage::Question { .. } => StagePrompt {
            text: format!(
                r#"You are a career coach AI guiding a user interested in '{career}'.
Stage: {label}
Previous answers:
{history_text}

Instructions:
- Provide the next technical, skill-testing question, slightly harder than the previous ones.
- Do NOT repeat a question from the previous answers.
- Keep the message short and encouraging.
- Respond with a JSON object with exactly these keys: {keys}.
- "stage" must be the string "{label}" and "final_step" must be false."#,
                keys = key_list(QUESTION_KEYS),
            ),
            expected_keys: QUESTION_KEYS,
            fallback_question: fallback_question(stage, career),
            max_tokens: QUESTION_MAX_TOKENS,
        },
        Stage::RetryWithResources { .. } => StagePrompt {
            text: format!(
                r#"You are a career coach AI guiding a user interested in '{career}'.
Stage: {label}
Previous answers:
{history_text}

Instructions:
- The last answer was incorrect. Explain briefly in the message what to review.
- Provide 3-5 learning resources covering the topic of the missed question.
  Each resource is an object with keys "type" (one of: book, course, website, video), "title" and "link".
- Provide a retry question on the SAME topic as the missed question. Do NOT move on to a new topic.
- Respond with a JSON object with exactly these keys: {keys}.
- "stage" must be the string "{label}" and "final_step" must be false."#,
                keys = key_list(RETRY_KEYS),
            ),
            expected_keys: RETRY_KEYS,
            fallback_question: fallback_question(stage, career),
            max_tokens: RESOURCE_MAX_TOKENS,
        },
        Stage::Completion => StagePrompt {
            text: format!(
                r#"You are a career coach AI.
The user has completed the required number of correct answers for '{career}'.
Stage: {label}
Previous answers:
{history_text}

Task:
- Congratulate the user in the message.
- Provide 3-5 job opportunities suitable for the user's skill level as resources.
  Each resource is an object with keys "type" (always "job"), "title" and "link".
- Do NOT ask any further question.
- Respond with a JSON object with exactly these keys: {keys}.
- "stage" must be the string "{label}" and "final_step" must be true."#,
                keys = key_list(COMPLETION_KEYS),
            ),
            expected_keys: COMPLETION_KEYS,
            fallback_question: fallback_question(stage, career),
            max_tokens: RESOURCE_MAX_TOKENS,
        },
    }
}

/// Prompt for the reveal-answer flow (plain-text answer, no JSON contract).
pub fn build_reveal_answer(question: &str) -> String {
    format!(
        "Provide the correct answer to the following skill-testing question. \
        Answer in 2-4 sentences and include a one-line explanation.\n\nQuestion: {}",
        question.trim()
    )
}

fn fallback_question(stage: &Stage, career: &str) -> String {
    match stage {
        Stage::Intro => format!("What is one core skill every beginner {career} must master, and why?"),
        Stage::Question { .. } => {
            format!("Describe a common problem a {career} solves day to day and how you would approach it.")
        }
        Stage::RetryWithResources { .. } => {
            "Review the resources above, then explain the concept behind the question you missed.".to_string()
        }
        Stage::Completion => format!("Here are example jobs for a {career} at your skill level."),
    }
}

fn key_list(keys: &[&str]) -> String {
    keys.join(", ")
}
