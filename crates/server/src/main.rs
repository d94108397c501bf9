use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Html,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use shared::{
    domain::{Employee, EmployeeId, SessionToken},
    error::{ApiError, ErrorCode},
    protocol::{
        CompletionList, ConfirmationRequest, DashboardSummary, EmployeeSummary, FlowView, SelectAnswerRequest,
        StartSessionRequest,
    },
};
use tower_http::limit::RequestBodyLimitLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;
use training::Surface;

mod app_state;
mod config;

use app_state::AppState;
use config::load_settings;

const MAX_BODY_BYTES: usize = 16 * 1024;

type ApiResult<T> = Result<T, (StatusCode, Json<ApiError>)>;

#[derive(Debug, Deserialize)]
struct CertificateQuery {
    #[serde(default)]
    surface: Surface,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let settings = load_settings()?;
    let state = AppState::from_settings(&settings).context("failed to build content source")?;
    let app = build_router(Arc::new(state));

    let addr: SocketAddr = settings
        .server_bind
        .parse()
        .with_context(|| format!("invalid bind address '{}'", settings.server_bind))?;
    info!(%addr, quiz_enabled = settings.quiz_enabled, "server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/employees", get(http_list_employees))
        .route("/employees/:employee_id", get(http_get_employee))
        .route("/dashboard", get(http_dashboard))
        .route("/completions", get(http_completions))
        .route("/sessions", post(http_open_session))
        .route(
            "/sessions/:token",
            get(http_session_view).delete(http_abandon),
        )
        .route("/sessions/:token/start", post(http_start))
        .route("/sessions/:token/proceed", post(http_proceed))
        .route("/sessions/:token/answers", post(http_select_answer))
        .route("/sessions/:token/check", post(http_check))
        .route("/sessions/:token/confirmation", post(http_confirmation))
        .route("/sessions/:token/complete", post(http_complete))
        .route("/sessions/:token/back", post(http_back))
        .route("/sessions/:token/certificate", get(http_certificate))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .with_state(state)
}

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Validation => StatusCode::BAD_REQUEST,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn reject(err: ApiError) -> (StatusCode, Json<ApiError>) {
    (status_for(err.code), Json(err))
}

async fn healthz() -> &'static str {
    "ok"
}

async fn http_list_employees(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<EmployeeSummary>>> {
    let employees = server_api::list_employees(&state.api)
        .await
        .map_err(reject)?;
    Ok(Json(employees))
}

async fn http_get_employee(
    State(state): State<Arc<AppState>>,
    Path(employee_id): Path<EmployeeId>,
) -> ApiResult<Json<Employee>> {
    let employee = server_api::get_employee(&state.api, &employee_id)
        .await
        .map_err(reject)?;
    Ok(Json(employee))
}

async fn http_dashboard(State(state): State<Arc<AppState>>) -> ApiResult<Json<DashboardSummary>> {
    let summary = server_api::dashboard(&state.api).await.map_err(reject)?;
    Ok(Json(summary))
}

async fn http_completions(State(state): State<Arc<AppState>>) -> ApiResult<Json<CompletionList>> {
    let records = server_api::completions(&state.api).await.map_err(reject)?;
    Ok(Json(CompletionList { records }))
}

async fn http_open_session(
    State(state): State<Arc<AppState>>,
    Json(req): Json<StartSessionRequest>,
) -> ApiResult<(StatusCode, Json<FlowView>)> {
    let view = server_api::open_session(&state.api, &req.employee_id)
        .await
        .map_err(reject)?;
    Ok((StatusCode::CREATED, Json(view)))
}

async fn http_session_view(
    State(state): State<Arc<AppState>>,
    Path(token): Path<SessionToken>,
) -> ApiResult<Json<FlowView>> {
    let view = server_api::session_view(&state.api, &token)
        .await
        .map_err(reject)?;
    Ok(Json(view))
}

async fn http_abandon(
    State(state): State<Arc<AppState>>,
    Path(token): Path<SessionToken>,
) -> ApiResult<StatusCode> {
    server_api::abandon(&state.api, &token)
        .await
        .map_err(reject)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Answers with the loading view; the content lands on the session when the fetch finishes.
async fn http_start(
    State(state): State<Arc<AppState>>,
    Path(token): Path<SessionToken>,
) -> ApiResult<(StatusCode, Json<FlowView>)> {
    let (view, _delivery) = server_api::start_training(&state.api, &token)
        .await
        .map_err(reject)?;
    Ok((StatusCode::ACCEPTED, Json(view)))
}

async fn http_proceed(
    State(state): State<Arc<AppState>>,
    Path(token): Path<SessionToken>,
) -> ApiResult<Json<FlowView>> {
    let view = server_api::proceed(&state.api, &token)
        .await
        .map_err(reject)?;
    Ok(Json(view))
}

async fn http_select_answer(
    State(state): State<Arc<AppState>>,
    Path(token): Path<SessionToken>,
    Json(req): Json<SelectAnswerRequest>,
) -> ApiResult<Json<FlowView>> {
    let view = server_api::select_answer(&state.api, &token, req.question, req.option)
        .await
        .map_err(reject)?;
    Ok(Json(view))
}

async fn http_check(
    State(state): State<Arc<AppState>>,
    Path(token): Path<SessionToken>,
) -> ApiResult<Json<FlowView>> {
    let view = server_api::check_answers(&state.api, &token)
        .await
        .map_err(reject)?;
    Ok(Json(view))
}

async fn http_confirmation(
    State(state): State<Arc<AppState>>,
    Path(token): Path<SessionToken>,
    Json(req): Json<ConfirmationRequest>,
) -> ApiResult<Json<FlowView>> {
    let view = server_api::set_confirmation(&state.api, &token, req.confirmed)
        .await
        .map_err(reject)?;
    Ok(Json(view))
}

async fn http_complete(
    State(state): State<Arc<AppState>>,
    Path(token): Path<SessionToken>,
) -> ApiResult<Json<FlowView>> {
    let view = server_api::complete(&state.api, &token)
        .await
        .map_err(reject)?;
    Ok(Json(view))
}

async fn http_back(
    State(state): State<Arc<AppState>>,
    Path(token): Path<SessionToken>,
) -> ApiResult<StatusCode> {
    server_api::leave(&state.api, &token).await.map_err(reject)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn http_certificate(
    State(state): State<Arc<AppState>>,
    Path(token): Path<SessionToken>,
    Query(q): Query<CertificateQuery>,
) -> ApiResult<Html<String>> {
    let page = server_api::certificate_html(&state.api, &token, q.surface)
        .await
        .map_err(reject)?;
    Ok(Html(page))
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
