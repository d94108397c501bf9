//! Briefing content sources: the generative backend, static sources and the
//! fallback briefing used whenever generation fails.

use async_trait::async_trait;
use shared::domain::{QuizQuestion, SafetyContent};
use thiserror::Error;

mod gemini;

pub use gemini::{GeminiConfig, GeminiContentSource, DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL};

pub const QUIZ_QUESTION_COUNT: usize = 3;
pub const QUIZ_OPTION_COUNT: usize = 3;

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("no API key configured for the content service")]
    MissingApiKey,
    #[error("invalid content endpoint: {0}")]
    InvalidEndpoint(String),
    #[error("content request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("content service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("content service returned no text")]
    EmptyResponse,
    #[error("content response is not valid briefing JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("content response failed validation: {0}")]
    Invalid(String),
    #[error("content source unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn generate(&self, role: &str, department: &str) -> Result<SafetyContent, ContentError>;
}

/// Always serves the same briefing, regardless of role.
pub struct StaticContentSource {
    content: SafetyContent,
}

impl StaticContentSource {
    pub fn new(content: SafetyContent) -> Self {
        Self { content }
    }

    pub fn fallback() -> Self {
        Self::new(fallback_content())
    }
}

#[async_trait]
impl ContentSource for StaticContentSource {
    async fn generate(&self, _role: &str, _department: &str) -> Result<SafetyContent, ContentError> {
        Ok(self.content.clone())
    }
}

/// Source used when no generative backend is configured.
pub struct UnavailableContentSource {
    reason: String,
}

impl UnavailableContentSource {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl ContentSource for UnavailableContentSource {
    async fn generate(&self, _role: &str, _department: &str) -> Result<SafetyContent, ContentError> {
        Err(ContentError::Unavailable(self.reason.clone()))
    }
}

pub fn fallback_content() -> SafetyContent {
    SafetyContent {
        title: "Allgemeine Arbeitssicherheit".into(),
        intro: "Sicherheit geht vor. Bitte beachte die grundlegenden Regeln am Arbeitsplatz."
            .into(),
        steps: vec![
            "Trage immer deine persönliche Schutzausrüstung (PSA).".into(),
            "Halte Fluchtwege und Notausgänge stets frei.".into(),
            "Melde Beschädigungen an Werkzeugen sofort deinem Vorgesetzten.".into(),
        ],
        duration: "60 Sekunden".into(),
        quiz: vec![
            question(
                "Was musst du bei der Arbeit immer tragen?",
                [
                    "Persönliche Schutzausrüstung (PSA)",
                    "Bequeme Freizeitkleidung",
                    "Nur bei Regen Handschuhe",
                ],
                0,
            ),
            question(
                "Was gilt für Fluchtwege und Notausgänge?",
                [
                    "Sie dürfen kurzzeitig mit Material zugestellt werden",
                    "Sie müssen stets frei bleiben",
                    "Sie sind nur bei Alarm wichtig",
                ],
                1,
            ),
            question(
                "Du bemerkst ein beschädigtes Werkzeug. Was tust du?",
                [
                    "Bis zum Schichtende weiterarbeiten",
                    "Es selbst notdürftig reparieren",
                    "Sofort deinem Vorgesetzten melden",
                ],
                2,
            ),
        ],
    }
}

fn question(text: &str, options: [&str; QUIZ_OPTION_COUNT], correct_index: usize) -> QuizQuestion {
    QuizQuestion {
        question: text.into(),
        options: options.iter().map(|o| (*o).to_string()).collect(),
        correct_index,
    }
}

/// Rejects content that parses but cannot drive the quiz: the learner must get
/// exactly three answerable questions and at least one rule.
pub fn validate_content(content: &SafetyContent) -> Result<(), ContentError> {
    if content.title.trim().is_empty() {
        return Err(ContentError::Invalid("title is empty".into()));
    }
    if content.steps.is_empty() || content.steps.iter().any(|s| s.trim().is_empty()) {
        return Err(ContentError::Invalid("steps must be non-empty".into()));
    }
    if content.quiz.len() != QUIZ_QUESTION_COUNT {
        return Err(ContentError::Invalid(format!(
            "expected {QUIZ_QUESTION_COUNT} quiz questions, got {}",
            content.quiz.len()
        )));
    }
    for (index, question) in content.quiz.iter().enumerate() {
        if question.options.len() != QUIZ_OPTION_COUNT {
            return Err(ContentError::Invalid(format!(
                "question {} has {} options, expected {QUIZ_OPTION_COUNT}",
                index + 1,
                question.options.len()
            )));
        }
        if question.correct_index >= question.options.len() {
            return Err(ContentError::Invalid(format!(
                "question {} has correct index {} out of range",
                index + 1,
                question.correct_index
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
