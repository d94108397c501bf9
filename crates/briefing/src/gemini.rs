use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use shared::domain::SafetyContent;
use tracing::debug;
use url::Url;

use crate::{validate_content, ContentError, ContentSource, QUIZ_OPTION_COUNT, QUIZ_QUESTION_COUNT};

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: Url,
    pub timeout: Duration,
}

impl GeminiConfig {
    pub fn new(api_key: Option<String>, base_url: &str) -> Result<Self, ContentError> {
        let base_url =
            Url::parse(base_url).map_err(|e| ContentError::InvalidEndpoint(e.to_string()))?;
        Ok(Self {
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            model: DEFAULT_GEMINI_MODEL.into(),
            base_url,
            timeout: Duration::from_secs(30),
        })
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn endpoint(&self) -> Result<Url, ContentError> {
        let action = format!("{}:generateContent", self.model);
        let mut endpoint = self.base_url.clone();
        endpoint
            .path_segments_mut()
            .map_err(|_| ContentError::InvalidEndpoint(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(["v1beta", "models", action.as_str()]);
        Ok(endpoint)
    }
}

/// `generateContent` client that asks for a structured JSON briefing.
pub struct GeminiContentSource {
    http: Client,
    config: GeminiConfig,
}

impl GeminiContentSource {
    pub fn new(config: GeminiConfig) -> Result<Self, ContentError> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { http, config })
    }

    pub fn is_configured(&self) -> bool {
        self.config.api_key.is_some()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<RequestContent>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct RequestContent {
    role: &'static str,
    parts: Vec<TextPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct TextPart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: Value,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<TextPart>,
}

impl GenerateResponse {
    fn first_text(&self) -> Option<&str> {
        self.candidates
            .iter()
            .filter_map(|c| c.content.as_ref())
            .flat_map(|c| c.parts.iter())
            .filter_map(|p| p.text.as_deref())
            .find(|text| !text.trim().is_empty())
    }
}

pub(crate) fn briefing_prompt(role: &str, department: &str) -> String {
    format!(
        "Erstelle eine ultra-kurze Sicherheitsunterweisung für einen Mitarbeiter als {role} im Bereich {department}.\n\
         Zielgruppe: Einfache Sprache, keine Fachbegriffe, direkt anwendbar.\n\
         \n\
         Format:\n\
         - Ein motivierender Titel\n\
         - Ein kurzer Einleitungssatz (max 15 Wörter)\n\
         - Genau 3 konkrete, lebenswichtige Sicherheitsregeln (kurz und knackig)\n\
         - Geschätzte Lesezeit (z.B. \"45 Sekunden\")\n\
         - Genau {QUIZ_QUESTION_COUNT} Quizfragen zu den Regeln mit jeweils genau {QUIZ_OPTION_COUNT} Antwortmöglichkeiten \
         und dem Index (ab 0) der richtigen Antwort\n\
         \n\
         Antworte im JSON Format."
    )
}

fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "title": { "type": "STRING" },
            "intro": { "type": "STRING" },
            "steps": { "type": "ARRAY", "items": { "type": "STRING" } },
            "duration": { "type": "STRING" },
            "quiz": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "question": { "type": "STRING" },
                        "options": { "type": "ARRAY", "items": { "type": "STRING" } },
                        "correctIndex": { "type": "INTEGER" }
                    },
                    "required": ["question", "options", "correctIndex"]
                }
            }
        },
        "required": ["title", "intro", "steps", "duration", "quiz"]
    })
}

#[async_trait]
impl ContentSource for GeminiContentSource {
    async fn generate(&self, role: &str, department: &str) -> Result<SafetyContent, ContentError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(ContentError::MissingApiKey)?;
        let endpoint = self.config.endpoint()?;

        let request = GenerateRequest {
            contents: vec![RequestContent {
                role: "user",
                parts: vec![TextPart {
                    text: Some(briefing_prompt(role, department)),
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: response_schema(),
            },
        };

        debug!(model = %self.config.model, %role, %department, "requesting briefing content");
        let response = self
            .http
            .post(endpoint)
            .header(API_KEY_HEADER, api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ContentError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: GenerateResponse = response.json().await?;
        let text = body.first_text().ok_or(ContentError::EmptyResponse)?;
        let content: SafetyContent = serde_json::from_str(text)?;
        validate_content(&content)?;
        Ok(content)
    }
}

#[cfg(test)]
#[path = "tests/gemini_tests.rs"]
mod tests;
