use serde::{Deserialize, Serialize};

/// One answered question from the caller's history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    pub question: String,
    pub correct: bool,
}

/// Kind tag on a resource. Unknown tags from the model collapse to `Generic`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Job,
    Book,
    Course,
    Website,
    Video,
    #[default]
    Generic,
}

impl ResourceKind {
    /// Lenient tag parsing for model output ("Online Course", "YouTube video", ...).
    pub fn from_tag(tag: &str) -> Self {
        let tag = tag.trim().to_lowercase();
        if tag.contains("job") || tag.contains("position") || tag.contains("opening") {
            ResourceKind::Job
        } else if tag.contains("book") {
            ResourceKind::Book
        } else if tag.contains("course") || tag.contains("class") {
            ResourceKind::Course
        } else if tag.contains("video") || tag.contains("youtube") {
            ResourceKind::Video
        } else if tag.contains("website") || tag.contains("article") || tag.contains("site") {
            ResourceKind::Website
        } else {
            ResourceKind::Generic
        }
    }
}

/// A learning material or job posting surfaced to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    #[serde(rename = "type", default)]
    pub kind: ResourceKind,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl Resource {
    /// Builds a resource, dropping blank links.
    pub fn new(kind: ResourceKind, title: impl Into<String>, link: Option<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            link: link
                .map(|l| l.trim().to_string())
                .filter(|l| !l.is_empty()),
        }
    }
}

/// Request body for POST /career-assessment. The client resends the full
/// history on every call; nothing is kept server-side.
#[derive(Debug, Clone, Deserialize)]
pub struct AssessmentRequest {
    pub career: String,
    #[serde(default)]
    pub previous_answers: Vec<Answer>,
    #[serde(default)]
    pub current_stage: Option<String>,
    /// Signed so negative values reach validation instead of failing deserialization.
    #[serde(default)]
    pub total_questions: Option<i64>,
    #[serde(default)]
    pub is_retry: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentResponse {
    pub stage: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_question: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<Vec<Resource>>,
    pub final_step: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RevealAnswerRequest {
    pub question: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevealAnswerResponse {
    pub answer: String,
}
