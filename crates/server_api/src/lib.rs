use std::{collections::HashMap, sync::Arc};

use briefing::ContentSource;
use chrono::Utc;
use shared::{
    domain::{CompletionRecord, Employee, EmployeeId, SessionToken},
    error::{ApiError, ErrorCode},
    protocol::{DashboardSummary, EmployeeSummary, FlowView},
};
use storage::RosterStore;
use tokio::{sync::Mutex, task::JoinHandle};
use tracing::{debug, info, warn};
use training::{Delivery, FlowConfig, FlowError, Surface, TrainingFlow};

pub mod dashboard;

pub const DEFAULT_ORGANIZATION: &str = "Mustermann GmbH & Co. KG";

pub type SessionRegistry = Arc<Mutex<HashMap<SessionToken, TrainingFlow>>>;

#[derive(Clone)]
pub struct ApiContext {
    pub roster: Arc<dyn RosterStore>,
    pub content: Arc<dyn ContentSource>,
    pub flow_config: FlowConfig,
    pub organization: String,
    pub sessions: SessionRegistry,
}

impl ApiContext {
    pub fn new(
        roster: Arc<dyn RosterStore>,
        content: Arc<dyn ContentSource>,
        flow_config: FlowConfig,
    ) -> Self {
        Self {
            roster,
            content,
            flow_config,
            organization: DEFAULT_ORGANIZATION.to_string(),
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn with_organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = organization.into();
        self
    }
}

pub async fn list_employees(ctx: &ApiContext) -> Result<Vec<EmployeeSummary>, ApiError> {
    let employees = ctx.roster.list().await.map_err(internal)?;
    Ok(employees.iter().map(EmployeeSummary::from).collect())
}

pub async fn get_employee(ctx: &ApiContext, id: &EmployeeId) -> Result<Employee, ApiError> {
    ctx.roster
        .get(id)
        .await
        .map_err(internal)?
        .ok_or_else(|| ApiError::not_found(format!("employee {id} not found")))
}

pub async fn dashboard(ctx: &ApiContext) -> Result<DashboardSummary, ApiError> {
    let employees = ctx.roster.list().await.map_err(internal)?;
    Ok(dashboard::summarize(&employees, &ctx.organization))
}

pub async fn completions(ctx: &ApiContext) -> Result<Vec<CompletionRecord>, ApiError> {
    ctx.roster.completions().await.map_err(internal)
}

/// Opens a training session on the welcome screen for a roster snapshot of the employee.
pub async fn open_session(ctx: &ApiContext, employee_id: &EmployeeId) -> Result<FlowView, ApiError> {
    let employee = get_employee(ctx, employee_id).await?;
    let flow = TrainingFlow::new(employee, ctx.flow_config);
    let view = flow.view();
    ctx.sessions.lock().await.insert(flow.token().clone(), flow);
    info!(%employee_id, session = %view.session, "training session opened");
    Ok(view)
}

pub async fn session_view(ctx: &ApiContext, token: &SessionToken) -> Result<FlowView, ApiError> {
    with_session(ctx, token, |flow| Ok(flow.view())).await
}

/// Moves the session to learning and fetches its content in the background.
///
/// The fetch is keyed by the session's ticket; the returned handle resolves to
/// whether the result was applied or discarded.
pub async fn start_training(
    ctx: &ApiContext,
    token: &SessionToken,
) -> Result<(FlowView, JoinHandle<Delivery>), ApiError> {
    let (view, request) = with_session(ctx, token, |flow| {
        let request = flow.start().map_err(flow_error)?;
        Ok((flow.view(), request))
    })
    .await?;

    let source = Arc::clone(&ctx.content);
    let sessions = Arc::clone(&ctx.sessions);
    let handle = tokio::spawn(async move {
        let result = source.generate(&request.role, &request.department).await;
        let mut sessions = sessions.lock().await;
        match sessions.get_mut(&request.ticket.session) {
            Some(flow) => flow.deliver_content(&request.ticket, result),
            None => {
                debug!(session = %request.ticket.session, "session closed before content arrived");
                Delivery::Discarded
            }
        }
    });
    Ok((view, handle))
}

pub async fn proceed(ctx: &ApiContext, token: &SessionToken) -> Result<FlowView, ApiError> {
    with_session(ctx, token, |flow| {
        flow.proceed().map_err(flow_error)?;
        Ok(flow.view())
    })
    .await
}

pub async fn select_answer(
    ctx: &ApiContext,
    token: &SessionToken,
    question: usize,
    option: usize,
) -> Result<FlowView, ApiError> {
    with_session(ctx, token, |flow| {
        flow.select_answer(question, option).map_err(flow_error)?;
        Ok(flow.view())
    })
    .await
}

pub async fn check_answers(ctx: &ApiContext, token: &SessionToken) -> Result<FlowView, ApiError> {
    with_session(ctx, token, |flow| {
        flow.check_answers().map_err(flow_error)?;
        Ok(flow.view())
    })
    .await
}

pub async fn set_confirmation(
    ctx: &ApiContext,
    token: &SessionToken,
    confirmed: bool,
) -> Result<FlowView, ApiError> {
    with_session(ctx, token, |flow| {
        flow.set_confirmed(confirmed).map_err(flow_error)?;
        Ok(flow.view())
    })
    .await
}

/// Completes the briefing and records it in the roster.
pub async fn complete(ctx: &ApiContext, token: &SessionToken) -> Result<FlowView, ApiError> {
    let mut sessions = ctx.sessions.lock().await;
    let flow = sessions
        .get_mut(token)
        .ok_or_else(|| session_not_found(token))?;
    let request = flow.complete(Utc::now()).map_err(flow_error)?;

    let record = ctx
        .roster
        .mark_completed(&request.employee_id, &request.topic, request.completed_at)
        .await
        .map_err(internal)?;
    if record.is_none() {
        warn!(employee_id = %request.employee_id, "completed employee is no longer in the roster");
    }
    if let Some(latest) = ctx.roster.get(&request.employee_id).await.map_err(internal)? {
        flow.refresh_employee(latest);
    }
    Ok(flow.view())
}

pub async fn certificate_html(
    ctx: &ApiContext,
    token: &SessionToken,
    surface: Surface,
) -> Result<String, ApiError> {
    with_session(ctx, token, |flow| {
        flow.certificate()
            .map(|certificate| certificate.render_html(surface))
            .ok_or_else(certificate_pending)
    })
    .await
}

pub async fn certificate_text(ctx: &ApiContext, token: &SessionToken) -> Result<String, ApiError> {
    with_session(ctx, token, |flow| {
        flow.certificate()
            .map(|certificate| certificate.render_text())
            .ok_or_else(certificate_pending)
    })
    .await
}

/// Leaves the flow from the welcome or certificate screen.
pub async fn leave(ctx: &ApiContext, token: &SessionToken) -> Result<(), ApiError> {
    let mut sessions = ctx.sessions.lock().await;
    let flow = sessions.get(token).ok_or_else(|| session_not_found(token))?;
    flow.back().map_err(flow_error)?;
    sessions.remove(token);
    Ok(())
}

/// Drops the session from any step; a content fetch still in flight is discarded.
pub async fn abandon(ctx: &ApiContext, token: &SessionToken) -> Result<(), ApiError> {
    ctx.sessions
        .lock()
        .await
        .remove(token)
        .map(|_| ())
        .ok_or_else(|| session_not_found(token))
}

async fn with_session<T>(
    ctx: &ApiContext,
    token: &SessionToken,
    f: impl FnOnce(&mut TrainingFlow) -> Result<T, ApiError>,
) -> Result<T, ApiError> {
    let mut sessions = ctx.sessions.lock().await;
    let flow = sessions
        .get_mut(token)
        .ok_or_else(|| session_not_found(token))?;
    f(flow)
}

fn certificate_pending() -> ApiError {
    ApiError::new(ErrorCode::Conflict, "certificate is issued after completion")
}

fn session_not_found(token: &SessionToken) -> ApiError {
    ApiError::not_found(format!("training session {token} not found"))
}

pub fn flow_error(err: FlowError) -> ApiError {
    let code = match err {
        FlowError::InvalidAnswer { .. } => ErrorCode::Validation,
        _ => ErrorCode::Conflict,
    };
    ApiError::new(code, err.to_string())
}

fn internal(err: anyhow::Error) -> ApiError {
    ApiError::new(ErrorCode::Internal, err.to_string())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
