use std::{
    io::{self, BufWriter, Write},
    path::PathBuf,
    sync::Arc,
    time::Duration,
};

use anyhow::{Context, Result};
use briefing::{
    ContentSource, GeminiConfig, GeminiContentSource, UnavailableContentSource,
    DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL,
};
use clap::{Parser, Subcommand};
use server_api::{ApiContext, DEFAULT_ORGANIZATION};
use shared::{domain::EmployeeId, error::ApiException};
use storage::InMemoryRoster;
use tracing_subscriber::EnvFilter;
use training::FlowConfig;

mod render;
mod session;

#[derive(Parser, Debug)]
#[command(name = "kiosk", about = "SafetyFirst terminal for safety briefings")]
struct Cli {
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
    #[arg(long, env = "APP__GEMINI_MODEL", default_value = DEFAULT_GEMINI_MODEL)]
    model: String,
    #[arg(long, env = "APP__GEMINI_BASE_URL", default_value = DEFAULT_GEMINI_BASE_URL)]
    base_url: String,
    #[arg(long, env = "APP__CONTENT_TIMEOUT_SECONDS", default_value_t = 20)]
    timeout_seconds: u64,
    #[arg(long, env = "APP__ORGANIZATION", default_value = DEFAULT_ORGANIZATION)]
    organization: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Employees to pick from.
    Roster,
    /// Employer overview.
    Dashboard,
    /// Fetch and print briefing content for a role.
    Briefing {
        #[arg(long)]
        role: String,
        #[arg(long)]
        department: String,
    },
    /// Walk an employee through the briefing interactively.
    Train {
        #[arg(long)]
        employee: String,
        #[arg(long)]
        no_quiz: bool,
        #[arg(long)]
        certificate_out: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(io::stderr)
        .init();
    let cli = Cli::parse();
    let content = content_source(&cli)?;
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    match cli.command {
        Command::Roster => {
            let ctx = context(content, FlowConfig::default(), &cli.organization);
            let employees = server_api::list_employees(&ctx)
                .await
                .map_err(ApiException::from)?;
            out.write_all(render::roster(&employees).as_bytes())?;
        }
        Command::Dashboard => {
            let ctx = context(content, FlowConfig::default(), &cli.organization);
            let summary = server_api::dashboard(&ctx)
                .await
                .map_err(ApiException::from)?;
            out.write_all(render::dashboard(&summary).as_bytes())?;
        }
        Command::Briefing { role, department } => {
            let briefing = match content.generate(&role, &department).await {
                Ok(briefing) => briefing,
                Err(err) => {
                    writeln!(out, "Inhalt nicht verfügbar ({err}), zeige Standardunterweisung.\n")?;
                    briefing::fallback_content()
                }
            };
            out.write_all(render::content(&briefing).as_bytes())?;
        }
        Command::Train {
            employee,
            no_quiz,
            certificate_out,
        } => {
            let config = FlowConfig {
                quiz_enabled: !no_quiz,
            };
            let ctx = context(content, config, &cli.organization);
            let stdin = io::stdin();
            let outcome = session::run(
                &ctx,
                &EmployeeId::new(employee),
                &mut stdin.lock(),
                &mut out,
            )
            .await?;
            if let Some(path) = certificate_out {
                std::fs::write(&path, &outcome.export_html).with_context(|| {
                    format!("failed to write certificate to {}", path.display())
                })?;
                writeln!(out, "Zertifikat gespeichert: {}", path.display())?;
            }
        }
    }
    out.flush()?;
    Ok(())
}

fn context(content: Arc<dyn ContentSource>, config: FlowConfig, organization: &str) -> ApiContext {
    ApiContext::new(Arc::new(InMemoryRoster::seeded()), content, config)
        .with_organization(organization)
}

fn content_source(cli: &Cli) -> Result<Arc<dyn ContentSource>> {
    let api_key = cli.api_key.clone().filter(|key| !key.trim().is_empty());
    if api_key.is_none() {
        return Ok(Arc::new(UnavailableContentSource::new(
            "no Gemini API key configured",
        )));
    }
    let config = GeminiConfig::new(api_key, &cli.base_url)?
        .with_model(cli.model.clone())
        .with_timeout(Duration::from_secs(cli.timeout_seconds));
    Ok(Arc::new(GeminiContentSource::new(config)?))
}
