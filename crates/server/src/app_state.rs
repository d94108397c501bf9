use std::{sync::Arc, time::Duration};

use briefing::{ContentSource, GeminiConfig, GeminiContentSource, UnavailableContentSource};
use server_api::ApiContext;
use storage::InMemoryRoster;
use tracing::{info, warn};
use training::FlowConfig;

use crate::config::Settings;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) api: ApiContext,
}

impl AppState {
    pub(crate) fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let api = ApiContext::new(
            Arc::new(InMemoryRoster::seeded()),
            content_source(settings)?,
            FlowConfig {
                quiz_enabled: settings.quiz_enabled,
            },
        )
        .with_organization(settings.organization.clone());
        Ok(Self { api })
    }
}

fn content_source(settings: &Settings) -> anyhow::Result<Arc<dyn ContentSource>> {
    if settings.gemini_api_key.is_none() {
        warn!("no Gemini API key configured; every briefing uses the fallback content");
        return Ok(Arc::new(UnavailableContentSource::new(
            "no Gemini API key configured",
        )));
    }
    let config = GeminiConfig::new(settings.gemini_api_key.clone(), &settings.gemini_base_url)?
        .with_model(settings.gemini_model.clone())
        .with_timeout(Duration::from_secs(settings.content_timeout_seconds));
    info!(model = %config.model, "briefing content from Gemini");
    Ok(Arc::new(GeminiContentSource::new(config)?))
}
