// Shared prompt constants used across LLM calls.
// Stage-specific prompts live in assessment::prompts.

/// System prompt for every JSON-producing assessment call.
pub const JSON_ONLY_SYSTEM: &str = "You are a career assessment AI. Provide output as JSON. \
    Respond with a single valid JSON object only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

/// System prompt for the reveal-answer flow, which returns plain text.
pub const ANSWER_SYSTEM: &str = "You are a knowledgeable career mentor. \
    Answer skill-testing questions accurately and concisely in plain text.";
