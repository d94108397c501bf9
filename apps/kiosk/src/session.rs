use std::io::{BufRead, Write};

use anyhow::{bail, Result};
use server_api::ApiContext;
use shared::{
    domain::{EmployeeId, SessionToken},
    error::ApiException,
    protocol::{FlowStepKind, FlowView, QuestionMark},
};
use tracing::debug;
use training::Surface;

use crate::render;

pub struct Outcome {
    pub export_html: String,
}

/// Drives one employee through the full briefing on a line-based terminal.
pub async fn run(
    ctx: &ApiContext,
    employee_id: &EmployeeId,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> Result<Outcome> {
    let before = server_api::dashboard(ctx).await.map_err(ApiException::from)?;
    let welcome = server_api::open_session(ctx, employee_id)
        .await
        .map_err(ApiException::from)?;
    let token = welcome.session.clone();
    if let Err(err) = walk(ctx, &welcome, input, out).await {
        let _ = server_api::abandon(ctx, &token).await;
        return Err(err);
    }

    let certificate_text = server_api::certificate_text(ctx, &token)
        .await
        .map_err(ApiException::from)?;
    let export_html = server_api::certificate_html(ctx, &token, Surface::Export)
        .await
        .map_err(ApiException::from)?;
    server_api::leave(ctx, &token)
        .await
        .map_err(ApiException::from)?;
    let after = server_api::dashboard(ctx).await.map_err(ApiException::from)?;

    writeln!(out, "\n{certificate_text}")?;
    writeln!(
        out,
        "Erfüllungsquote {}% -> {}%   Offen {} -> {}",
        before.completion_rate, after.completion_rate, before.open_count, after.open_count
    )?;
    Ok(Outcome { export_html })
}

async fn walk(
    ctx: &ApiContext,
    welcome: &FlowView,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> Result<()> {
    let token = &welcome.session;
    writeln!(out, "{}", welcome.greeting)?;
    writeln!(
        out,
        "Zeit für deine Sicherheitsunterweisung als {} ({}).",
        welcome.employee.role, welcome.employee.department
    )?;
    prompt(input, out, "[Enter] Unterweisung starten")?;

    let (_, delivery) = server_api::start_training(ctx, token)
        .await
        .map_err(ApiException::from)?;
    writeln!(out, "Inhalte werden geladen ...")?;
    let delivery = delivery.await?;
    debug!(?delivery, "briefing content delivered");

    let learning = view(ctx, token).await?;
    let Some(content) = learning.content.as_ref() else {
        bail!("briefing content is missing after delivery");
    };
    writeln!(out, "\n{}", render::content(content))?;
    prompt(input, out, "[Enter] Weiter")?;

    let mut current = server_api::proceed(ctx, token)
        .await
        .map_err(ApiException::from)?;
    if current.step == FlowStepKind::Quiz {
        current = quiz(ctx, token, current, input, out).await?;
    }

    while !current.confirmed {
        let line = prompt(
            input,
            out,
            "Ich habe die Unterweisung verstanden und werde die Regeln einhalten. [j/n]",
        )?;
        if line.eq_ignore_ascii_case("j") {
            current = server_api::set_confirmation(ctx, token, true)
                .await
                .map_err(ApiException::from)?;
        }
    }
    server_api::complete(ctx, token)
        .await
        .map_err(ApiException::from)?;
    Ok(())
}

async fn quiz(
    ctx: &ApiContext,
    token: &SessionToken,
    mut current: FlowView,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> Result<FlowView> {
    writeln!(out, "\nKurzer Wissens-Check:")?;
    loop {
        let Some(quiz) = current.quiz.clone() else {
            bail!("quiz step without quiz");
        };
        if quiz.passed {
            break;
        }
        for (index, question) in quiz.questions.iter().enumerate() {
            if question.mark == QuestionMark::Correct {
                continue;
            }
            out.write_all(render::quiz_question(&quiz, index).as_bytes())?;
            let option = loop {
                let line = prompt(input, out, "Antwort")?;
                match line.parse::<usize>() {
                    Ok(n) if (1..=question.options.len()).contains(&n) => break n - 1,
                    _ => writeln!(out, "Bitte eine Zahl von 1 bis {} eingeben.", question.options.len())?,
                }
            };
            server_api::select_answer(ctx, token, index, option)
                .await
                .map_err(ApiException::from)?;
        }
        current = server_api::check_answers(ctx, token)
            .await
            .map_err(ApiException::from)?;
        if let Some(graded) = current.quiz.as_ref() {
            out.write_all(render::quiz_marks(graded).as_bytes())?;
        }
    }
    server_api::proceed(ctx, token)
        .await
        .map_err(|e| ApiException::from(e).into())
}

async fn view(ctx: &ApiContext, token: &SessionToken) -> Result<FlowView> {
    Ok(server_api::session_view(ctx, token)
        .await
        .map_err(ApiException::from)?)
}

fn prompt(input: &mut impl BufRead, out: &mut impl Write, label: &str) -> Result<String> {
    write!(out, "{label}: ")?;
    out.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        bail!("input closed before the briefing was finished");
    }
    Ok(line.trim().to_string())
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
