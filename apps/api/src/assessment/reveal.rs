//! Reveal-answer flow: a single plain-text completion with an apology on failure.

use tracing::warn;

use crate::assessment::prompts::build_reveal_answer;
use crate::llm_client::prompts::ANSWER_SYSTEM;
use crate::llm_client::CompletionProvider;

pub const REVEAL_APOLOGY: &str =
    "Sorry, I couldn't retrieve the answer right now. Please try again later.";
const REVEAL_MAX_TOKENS: u32 = 300;

pub async fn reveal_answer(llm: &dyn CompletionProvider, question: &str) -> String {
    let prompt = build_reveal_answer(question);
    match llm.complete(ANSWER_SYSTEM, &prompt, REVEAL_MAX_TOKENS).await {
        Ok(answer) if !answer.trim().is_empty() => answer.trim().to_string(),
        Ok(_) => {
            warn!("Reveal-answer call returned empty output");
            REVEAL_APOLOGY.to_string()
        }
        Err(e) => {
            warn!("Reveal-answer call failed: {e}");
            REVEAL_APOLOGY.to_string()
        }
    }
}
