use std::{fs, path::Path};

use anyhow::Context;
use briefing::{DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL};
use serde::Deserialize;
use server_api::DEFAULT_ORGANIZATION;

pub const SETTINGS_FILE: &str = "server.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server_bind: String,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub content_timeout_seconds: u64,
    pub quiz_enabled: bool,
    pub organization: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_bind: "127.0.0.1:8080".into(),
            gemini_api_key: None,
            gemini_model: DEFAULT_GEMINI_MODEL.into(),
            gemini_base_url: DEFAULT_GEMINI_BASE_URL.into(),
            content_timeout_seconds: 20,
            quiz_enabled: true,
            organization: DEFAULT_ORGANIZATION.into(),
        }
    }
}

/// Keys accepted in `server.toml`; anything absent keeps its default.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    bind_addr: Option<String>,
    gemini_api_key: Option<String>,
    gemini_model: Option<String>,
    gemini_base_url: Option<String>,
    content_timeout_seconds: Option<u64>,
    quiz_enabled: Option<bool>,
    organization: Option<String>,
}

pub fn load_settings() -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    if Path::new(SETTINGS_FILE).exists() {
        let raw = fs::read_to_string(SETTINGS_FILE)
            .with_context(|| format!("failed to read {SETTINGS_FILE}"))?;
        apply_file(&mut settings, &raw)?;
    }
    apply_env(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

pub fn apply_file(settings: &mut Settings, raw: &str) -> anyhow::Result<()> {
    let file: FileSettings =
        toml::from_str(raw).with_context(|| format!("invalid {SETTINGS_FILE}"))?;

    if let Some(v) = file.bind_addr {
        settings.server_bind = v;
    }
    if let Some(v) = file.gemini_api_key {
        settings.gemini_api_key = Some(v);
    }
    if let Some(v) = file.gemini_model {
        settings.gemini_model = v;
    }
    if let Some(v) = file.gemini_base_url {
        settings.gemini_base_url = v;
    }
    if let Some(v) = file.content_timeout_seconds {
        settings.content_timeout_seconds = v;
    }
    if let Some(v) = file.quiz_enabled {
        settings.quiz_enabled = v;
    }
    if let Some(v) = file.organization {
        settings.organization = v;
    }
    Ok(())
}

/// Later keys in each group win, so `APP__*` overrides the short names.
pub fn apply_env(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    for key in ["SERVER_BIND", "APP__BIND_ADDR"] {
        if let Some(v) = lookup(key) {
            settings.server_bind = v;
        }
    }
    for key in ["API_KEY", "GEMINI_API_KEY", "APP__GEMINI_API_KEY"] {
        if let Some(v) = lookup(key) {
            settings.gemini_api_key = Some(v);
        }
    }
    if let Some(v) = lookup("APP__GEMINI_MODEL") {
        settings.gemini_model = v;
    }
    if let Some(v) = lookup("APP__GEMINI_BASE_URL") {
        settings.gemini_base_url = v;
    }
    if let Some(v) = lookup("APP__CONTENT_TIMEOUT_SECONDS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.content_timeout_seconds = parsed;
        }
    }
    if let Some(v) = lookup("APP__QUIZ_ENABLED") {
        if let Ok(parsed) = v.trim().parse::<bool>() {
            settings.quiz_enabled = parsed;
        }
    }
    if let Some(v) = lookup("APP__ORGANIZATION") {
        settings.organization = v;
    }

    settings.gemini_api_key = settings
        .gemini_api_key
        .take()
        .filter(|key| !key.trim().is_empty());
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
