//! Stage orchestrator: decides which phase of the quiz a request is in.
//!
//! Pure function of the request: the caller resends the full answer history
//! each turn, so nothing here touches state.

use std::fmt;

use crate::models::assessment::Answer;

const INTRO_LABEL: &str = "intro";
const COMPLETION_LABEL: &str = "jobs";
const LEVEL_PREFIX: &str = "level_";

/// Where the user is in the assessment flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Intro,
    /// A fresh skill-testing question at `level` (1-based).
    Question { level: u32 },
    /// The last answer was wrong: offer resources plus a retry question.
    RetryWithResources { level: u32 },
    Completion,
}

impl Stage {
    /// Wire label returned to the client and echoed back as `current_stage`.
    pub fn label(&self) -> String {
        match self {
            Stage::Intro => INTRO_LABEL.to_string(),
            Stage::Question { level } | Stage::RetryWithResources { level } => {
                format!("{LEVEL_PREFIX}{level}")
            }
            Stage::Completion => COMPLETION_LABEL.to_string(),
        }
    }

    pub fn is_completion(&self) -> bool {
        matches!(self, Stage::Completion)
    }

    pub fn includes_resources(&self) -> bool {
        matches!(self, Stage::RetryWithResources { .. } | Stage::Completion)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// A stage label carried by the caller between calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageLabel {
    Intro,
    Level(u32),
    Jobs,
}

impl StageLabel {
    /// Parses `intro`, `jobs`, or `level_<n>`. Anything else is ignored.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim().to_lowercase();
        match raw.as_str() {
            INTRO_LABEL => Some(StageLabel::Intro),
            COMPLETION_LABEL => Some(StageLabel::Jobs),
            other => other
                .strip_prefix(LEVEL_PREFIX)
                .and_then(|n| n.parse::<u32>().ok())
                .filter(|n| *n >= 1)
                .map(StageLabel::Level),
        }
    }
}

/// Inputs that steer stage selection besides the history itself.
#[derive(Debug, Clone, Copy)]
pub struct StagePolicy {
    /// Correct answers required before the completion stage.
    pub total_questions: u32,
    /// Explicit label from the caller. When absent the level is derived
    /// from the number of correct answers.
    pub current: Option<StageLabel>,
}

impl StagePolicy {
    pub fn derived(total_questions: u32) -> Self {
        Self {
            total_questions,
            current: None,
        }
    }
}

pub fn correct_count(history: &[Answer]) -> u32 {
    history.iter().filter(|a| a.correct).count() as u32
}

/// Decides the stage for this turn.
///
/// Priority: completion threshold (or explicit `jobs`) > caller retry flag >
/// empty history > last answer correctness.
pub fn decide(history: &[Answer], policy: &StagePolicy, is_retry: bool) -> Stage {
    let correct = correct_count(history);

    if correct >= policy.total_questions || policy.current == Some(StageLabel::Jobs) {
        return Stage::Completion;
    }

    let (attempting, next) = levels(correct, policy);

    if is_retry {
        return Stage::Question { level: attempting };
    }

    match history.last() {
        None => Stage::Intro,
        Some(last) if last.correct => Stage::Question { level: next },
        Some(_) => Stage::RetryWithResources { level: attempting },
    }
}

/// Returns `(level being attempted, level after a correct answer)`.
fn levels(correct: u32, policy: &StagePolicy) -> (u32, u32) {
    let cap = policy.total_questions.max(1);
    match policy.current {
        Some(StageLabel::Level(n)) => {
            let current = n.min(cap);
            (current, (current + 1).min(cap))
        }
        // The intro question is the first level-1 attempt.
        Some(StageLabel::Intro) => (1, 1),
        Some(StageLabel::Jobs) => (cap, cap),
        // Same numbering as the label path: the intro counts as level 1 and
        // each correct answer after it moves up one level.
        None => {
            let current = correct.max(1).min(cap);
            (current, current)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answer(question: &str, correct: bool) -> Answer {
        Answer {
            question: question.to_string(),
            correct,
        }
    }

    #[test]
    fn test_empty_history_is_intro() {
        let stage = decide(&[], &StagePolicy::derived(3), false);
        assert_eq!(stage, Stage::Intro);
        assert_eq!(stage.label(), "intro");
        assert!(!stage.includes_resources());
    }

    #[test]
    fn test_threshold_reached_is_completion() {
        let history = vec![answer("q1", true), answer("q2", true), answer("q3", true)];
        let stage = decide(&history, &StagePolicy::derived(3), false);
        assert_eq!(stage, Stage::Completion);
        assert_eq!(stage.label(), "jobs");
    }

    #[test]
    fn test_completion_ignores_wrong_last_answer() {
        let history = vec![
            answer("q1", true),
            answer("q2", true),
            answer("q3", true),
            answer("q4", false),
        ];
        assert_eq!(
            decide(&history, &StagePolicy::derived(3), false),
            Stage::Completion
        );
    }

    #[test]
    fn test_completion_beats_retry_flag() {
        let history = vec![answer("q1", true)];
        assert_eq!(
            decide(&history, &StagePolicy::derived(1), true),
            Stage::Completion
        );
    }

    #[test]
    fn test_wrong_answer_retries_with_resources() {
        let history = vec![answer("q1", false)];
        let stage = decide(&history, &StagePolicy::derived(3), false);
        assert_eq!(stage, Stage::RetryWithResources { level: 1 });
        assert!(stage.includes_resources());
    }

    #[test]
    fn test_correct_answer_advances_level() {
        let history = vec![answer("q1", false), answer("q1b", true)];
        assert_eq!(
            decide(&history, &StagePolicy::derived(3), false),
            Stage::Question { level: 1 }
        );
        let history = vec![answer("q1", true), answer("q2", true)];
        assert_eq!(
            decide(&history, &StagePolicy::derived(3), false),
            Stage::Question { level: 2 }
        );
    }

    #[test]
    fn test_retry_flag_forces_plain_question() {
        let history = vec![answer("q1", true), answer("q2", false)];
        let stage = decide(&history, &StagePolicy::derived(3), true);
        assert_eq!(stage, Stage::Question { level: 1 });
        assert!(!stage.includes_resources());
    }

    #[test]
    fn test_derived_and_labelled_numbering_agree() {
        // Walk a run of correct answers, feeding each returned label back in.
        let mut history: Vec<Answer> = Vec::new();
        let mut label = Some(StageLabel::Intro);
        let mut derived_labels = vec![decide(&history, &StagePolicy::derived(4), false).label()];
        let mut labelled = vec![decide(&history, &StagePolicy::derived(4), false).label()];

        for i in 0..4 {
            history.push(answer(&format!("q{i}"), true));
            let policy = StagePolicy {
                total_questions: 4,
                current: label,
            };
            let from_label = decide(&history, &policy, false);
            let derived = decide(&history, &StagePolicy::derived(4), false);
            labelled.push(from_label.label());
            derived_labels.push(derived.label());
            label = StageLabel::parse(&from_label.label());
        }

        assert_eq!(labelled, ["intro", "level_1", "level_2", "level_3", "jobs"]);
        assert_eq!(derived_labels, labelled);
    }

    #[test]
    fn test_wrong_answer_retries_the_same_level_on_both_paths() {
        let history = vec![answer("q1", true), answer("q2", true), answer("q3", false)];
        let labelled = StagePolicy {
            total_questions: 4,
            current: Some(StageLabel::Level(2)),
        };
        assert_eq!(
            decide(&history, &labelled, false),
            Stage::RetryWithResources { level: 2 }
        );
        assert_eq!(
            decide(&history, &StagePolicy::derived(4), false),
            Stage::RetryWithResources { level: 2 }
        );
    }

    #[test]
    fn test_explicit_jobs_label_forces_completion() {
        let policy = StagePolicy {
            total_questions: 5,
            current: Some(StageLabel::Jobs),
        };
        assert_eq!(decide(&[], &policy, false), Stage::Completion);
    }

    #[test]
    fn test_explicit_label_advances_one_step() {
        let policy = StagePolicy {
            total_questions: 5,
            current: Some(StageLabel::Level(2)),
        };
        let history = vec![answer("q1", true), answer("q2", true)];
        assert_eq!(decide(&history, &policy, false), Stage::Question { level: 3 });

        let history = vec![answer("q1", true), answer("q2", false)];
        assert_eq!(
            decide(&history, &policy, false),
            Stage::RetryWithResources { level: 2 }
        );
    }

    #[test]
    fn test_explicit_intro_label_moves_to_level_one() {
        let policy = StagePolicy {
            total_questions: 3,
            current: Some(StageLabel::Intro),
        };
        let history = vec![answer("q1", true)];
        assert_eq!(decide(&history, &policy, false), Stage::Question { level: 1 });
    }

    #[test]
    fn test_explicit_level_is_capped_at_total() {
        let policy = StagePolicy {
            total_questions: 2,
            current: Some(StageLabel::Level(9)),
        };
        let history = vec![answer("q1", true)];
        assert_eq!(decide(&history, &policy, false), Stage::Question { level: 2 });
    }

    #[test]
    fn test_completion_and_resources_over_all_histories() {
        // Every history of up to 4 answers, threshold 2.
        for mask in 0u32..(1 << 4) {
            for len in 0..=4usize {
                let history: Vec<Answer> = (0..len)
                    .map(|i| answer(&format!("q{i}"), mask & (1 << i) != 0))
                    .collect();
                let stage = decide(&history, &StagePolicy::derived(2), false);
                let reached = correct_count(&history) >= 2;
                let last_wrong = history.last().is_some_and(|a| !a.correct);
                assert_eq!(stage.is_completion(), reached);
                if !reached {
                    assert_eq!(stage.includes_resources(), last_wrong, "history {history:?}");
                }
            }
        }
    }

    #[test]
    fn test_stage_label_parse() {
        assert_eq!(StageLabel::parse("intro"), Some(StageLabel::Intro));
        assert_eq!(StageLabel::parse(" Level_2 "), Some(StageLabel::Level(2)));
        assert_eq!(StageLabel::parse("jobs"), Some(StageLabel::Jobs));
        assert_eq!(StageLabel::parse("level_0"), None);
        assert_eq!(StageLabel::parse("bonus"), None);
    }
}
