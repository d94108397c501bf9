use super::*;
use crate::fallback_content;
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use std::sync::Arc;
use tokio::{net::TcpListener, sync::Mutex};

#[derive(Clone)]
struct MockState {
    status: StatusCode,
    body: Value,
    seen: Arc<Mutex<Vec<(String, Option<String>, Value)>>>,
}

async fn handle_generate(
    State(state): State<MockState>,
    Path(call): Path<String>,
    headers: HeaderMap,
    Json(payload): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let key = headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    state.seen.lock().await.push((call, key, payload));
    (state.status, Json(state.body.clone()))
}

async fn spawn_gemini(status: StatusCode, body: Value) -> (String, MockState) {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let state = MockState {
        status,
        body,
        seen: Arc::new(Mutex::new(Vec::new())),
    };
    let app = Router::new()
        .route("/v1beta/models/:call", post(handle_generate))
        .with_state(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (format!("http://{addr}"), state)
}

fn candidate_body(text: &str) -> Value {
    json!({
        "candidates": [
            { "content": { "role": "model", "parts": [ { "text": text } ] } }
        ]
    })
}

fn source(base_url: &str, api_key: Option<&str>) -> GeminiContentSource {
    let config = GeminiConfig::new(api_key.map(str::to_string), base_url)
        .expect("config")
        .with_model("test-model");
    GeminiContentSource::new(config).expect("client")
}

#[tokio::test]
async fn parses_structured_briefing_from_first_candidate() {
    let content = fallback_content();
    let text = serde_json::to_string(&content).expect("json");
    let (base_url, state) = spawn_gemini(StatusCode::OK, candidate_body(&text)).await;

    let generated = source(&base_url, Some("secret"))
        .generate("Lagerist", "Logistik")
        .await
        .expect("content");
    assert_eq!(generated, content);

    let seen = state.seen.lock().await;
    assert_eq!(seen.len(), 1);
    let (call, key, payload) = &seen[0];
    assert_eq!(call, "test-model:generateContent");
    assert_eq!(key.as_deref(), Some("secret"));
    assert_eq!(
        payload["generationConfig"]["responseMimeType"],
        "application/json"
    );
    let prompt = payload["contents"][0]["parts"][0]["text"]
        .as_str()
        .expect("prompt");
    assert!(prompt.contains("Lagerist"));
    assert!(prompt.contains("Logistik"));
}

#[tokio::test]
async fn missing_api_key_fails_without_request() {
    let (base_url, state) = spawn_gemini(StatusCode::OK, candidate_body("{}")).await;
    let err = source(&base_url, None)
        .generate("Lagerist", "Logistik")
        .await
        .expect_err("must fail");
    assert!(matches!(err, ContentError::MissingApiKey));
    assert!(state.seen.lock().await.is_empty());
}

#[test]
fn blank_api_key_counts_as_missing() {
    let config = GeminiConfig::new(Some("  ".into()), DEFAULT_GEMINI_BASE_URL).expect("config");
    let source = GeminiContentSource::new(config).expect("client");
    assert!(!source.is_configured());
}

#[tokio::test]
async fn non_success_status_is_reported() {
    let (base_url, _state) = spawn_gemini(
        StatusCode::UNAUTHORIZED,
        json!({ "error": { "message": "API key not valid" } }),
    )
    .await;
    let err = source(&base_url, Some("bad"))
        .generate("Lagerist", "Logistik")
        .await
        .expect_err("must fail");
    assert!(matches!(err, ContentError::Status { status: 401, .. }));
}

#[tokio::test]
async fn empty_candidates_are_an_empty_response() {
    let (base_url, _state) = spawn_gemini(StatusCode::OK, json!({ "candidates": [] })).await;
    let err = source(&base_url, Some("secret"))
        .generate("Lagerist", "Logistik")
        .await
        .expect_err("must fail");
    assert!(matches!(err, ContentError::EmptyResponse));
}

#[tokio::test]
async fn unparsable_text_is_a_parse_error() {
    let (base_url, _state) =
        spawn_gemini(StatusCode::OK, candidate_body("Hier ist deine Unterweisung")).await;
    let err = source(&base_url, Some("secret"))
        .generate("Lagerist", "Logistik")
        .await
        .expect_err("must fail");
    assert!(matches!(err, ContentError::Parse(_)));
}

#[tokio::test]
async fn semantically_short_quiz_is_rejected() {
    let mut content = fallback_content();
    content.quiz.truncate(2);
    let text = serde_json::to_string(&content).expect("json");
    let (base_url, _state) = spawn_gemini(StatusCode::OK, candidate_body(&text)).await;
    let err = source(&base_url, Some("secret"))
        .generate("Lagerist", "Logistik")
        .await
        .expect_err("must fail");
    assert!(matches!(err, ContentError::Invalid(_)));
}

#[test]
fn endpoint_appends_model_action_to_base_path() {
    let config = GeminiConfig::new(None, "http://localhost:9000/proxy/")
        .expect("config")
        .with_model("gemini-2.5-flash");
    let endpoint = config.endpoint().expect("endpoint");
    assert_eq!(
        endpoint.as_str(),
        "http://localhost:9000/proxy/v1beta/models/gemini-2.5-flash:generateContent"
    );
}

#[test]
fn invalid_base_url_is_rejected() {
    let err = GeminiConfig::new(None, "not a url").expect_err("must fail");
    assert!(matches!(err, ContentError::InvalidEndpoint(_)));
}
