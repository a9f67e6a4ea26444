// Career assessment engine
// Implements: stage selection, prompt building, AI output normalization,
// response assembly, and the reveal-answer helper.
// All model calls go through llm_client; job listings come from jobs.

pub mod handlers;
pub mod normalizer;
pub mod orchestrator;
pub mod prompts;
pub mod reveal;
pub mod stage;
