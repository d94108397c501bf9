use std::{io::Cursor, sync::Arc};

use super::*;
use briefing::UnavailableContentSource;
use shared::domain::EmployeeStatus;
use storage::{InMemoryRoster, RosterStore};
use training::FlowConfig;

fn context(config: FlowConfig) -> (ApiContext, Arc<InMemoryRoster>) {
    let roster = Arc::new(InMemoryRoster::seeded());
    let ctx = ApiContext::new(
        roster.clone(),
        Arc::new(UnavailableContentSource::new("offline")),
        config,
    );
    (ctx, roster)
}

async fn run_script(ctx: &ApiContext, script: &str) -> (Result<Outcome>, String) {
    let mut input = Cursor::new(script.as_bytes().to_vec());
    let mut out = Vec::new();
    let result = run(ctx, &EmployeeId::new("1"), &mut input, &mut out).await;
    (result, String::from_utf8(out).expect("utf8"))
}

#[tokio::test]
async fn scripted_training_completes_and_reports_delta() {
    let (ctx, roster) = context(FlowConfig::default());
    let (result, output) = run_script(&ctx, "\n\nx\n2\n2\n3\n1\nj\n").await;
    let outcome = result.expect("training");

    assert!(output.starts_with("Moin, Max!"));
    assert!(output.contains("Bitte eine Zahl von 1 bis 3 eingeben."));
    assert!(output.contains("Frage 1: Leider falsch."));
    assert!(output.contains("Erfüllungsquote 33% -> 67%   Offen 1 -> 0"));
    assert!(output.contains("Digitally Signed: 1"));
    assert!(outcome.export_html.contains("certificate-area"));
    assert!(!outcome.export_html.contains("PDF Speichern"));

    let max = roster
        .get(&EmployeeId::new("1"))
        .await
        .expect("get")
        .expect("max");
    assert_eq!(max.status, EmployeeStatus::Completed);
    assert!(ctx.sessions.lock().await.is_empty());
}

#[tokio::test]
async fn quizless_training_goes_straight_to_confirmation() {
    let (ctx, _) = context(FlowConfig {
        quiz_enabled: false,
    });
    let (result, output) = run_script(&ctx, "\n\nn\nj\n").await;
    result.expect("training");
    assert!(!output.contains("Wissens-Check"));
    assert!(output.contains("Erfüllungsquote 33% -> 67%"));
}

#[tokio::test]
async fn closed_input_abandons_session_without_roster_change() {
    let (ctx, roster) = context(FlowConfig::default());
    let (result, _) = run_script(&ctx, "\n\n").await;
    assert!(result.is_err());
    assert!(ctx.sessions.lock().await.is_empty());

    let max = roster
        .get(&EmployeeId::new("1"))
        .await
        .expect("get")
        .expect("max");
    assert_eq!(max.status, EmployeeStatus::Open);
}
