//! API integration tests
//!
//! Requests go through the real router with `tower::ServiceExt::oneshot`;
//! the formatter is a stub so no network is involved.

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use sheetwrap::api::{build_router, AppState};
use sheetwrap::formatter::{Formatter, FormatterError};
use sheetwrap::memory::InMemoryStore;
use std::sync::Arc;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

struct EchoFormatter;

#[async_trait]
impl Formatter for EchoFormatter {
    fn name(&self) -> &str {
        "echo"
    }

    async fn format(
        &self,
        _prompt: &str,
        _cancel: &CancellationToken,
    ) -> Result<String, FormatterError> {
        Ok("Artikel: Wärmepumpe mit sehr langer Beschreibung die umbricht".to_string())
    }
}

fn app(with_formatter: bool) -> (Router, Arc<AppState>) {
    let formatter: Option<Arc<dyn Formatter>> = if with_formatter {
        Some(Arc::new(EchoFormatter))
    } else {
        None
    };
    let state = Arc::new(AppState::new(Box::new(InMemoryStore::new()), formatter));
    (build_router(Arc::clone(&state)), state)
}

async fn send(router: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn csv_file(dir: &TempDir, content: &str) -> String {
    let path = dir.path().join("data.csv");
    std::fs::write(&path, content).unwrap();
    path.to_string_lossy().into_owned()
}

// ═══════════════════════════════════════════════════════════════════════════
// INFO ENDPOINTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_root_lists_endpoints() {
    let (router, _) = app(false);
    let (status, body) = send(router, "GET", "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["name"], "Sheetwrap API Server");
    assert!(body["data"]["endpoints"].as_array().unwrap().len() >= 5);
}

#[tokio::test]
async fn test_health_reports_conversion_availability() {
    let (router, _) = app(false);
    let (_, body) = send(router, "GET", "/health", None).await;
    assert_eq!(body["data"]["status"], "healthy");
    assert_eq!(body["data"]["conversions_enabled"], false);

    let (router, _) = app(true);
    let (_, body) = send(router, "GET", "/health", None).await;
    assert_eq!(body["data"]["conversions_enabled"], true);
}

#[tokio::test]
async fn test_version() {
    let (router, _) = app(false);
    let (_, body) = send(router, "GET", "/version", None).await;
    assert_eq!(body["data"]["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(body["data"]["line_width"], 40);
}

// ═══════════════════════════════════════════════════════════════════════════
// REFLOW
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_reflow_with_width() {
    let (router, _) = app(false);
    let (status, body) = send(
        router,
        "POST",
        "/api/v1/reflow",
        Some(json!({ "text": "The quick brown fox jumps", "width": 10 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["text"], "The quick\nbrown fox\njumps");
    assert_eq!(body["data"]["lines"], 3);
}

#[tokio::test]
async fn test_reflow_defaults_to_line_width() {
    let (router, _) = app(false);
    let (_, body) = send(router, "POST", "/api/v1/reflow", Some(json!({ "text": "short" }))).await;
    assert_eq!(body["data"]["width"], 40);
    assert_eq!(body["data"]["text"], "short");
}

// ═══════════════════════════════════════════════════════════════════════════
// PROJECT
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_project_with_explicit_columns() {
    let dir = TempDir::new().unwrap();
    let file = csv_file(&dir, "A,B,C\n1,2,3\n");
    let (router, _) = app(false);

    let (status, body) = send(
        router,
        "POST",
        "/api/v1/project",
        Some(json!({ "file_path": file, "columns": [0, 2] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["text"], "A\tC\n1\t3");
    assert_eq!(body["data"]["raw_signature"], "A|B|C");
    assert_eq!(body["data"]["selected_signature"], "A|C");
    assert_eq!(body["data"]["selected_columns"], json!([true, false, true]));
}

#[tokio::test]
async fn test_project_removes_text_case_insensitively() {
    let dir = TempDir::new().unwrap();
    let file = csv_file(&dir, "Name\nNEU: Pumpe\n");
    let (router, _) = app(false);

    let (_, body) = send(
        router,
        "POST",
        "/api/v1/project",
        Some(json!({ "file_path": file, "remove_text": "neu: " })),
    )
    .await;
    assert_eq!(body["data"]["text"], "Name\nPumpe");
}

#[tokio::test]
async fn test_remove_text_leaves_header_signature_alone() {
    let dir = TempDir::new().unwrap();
    let file = csv_file(&dir, "NEU: Name,Preis\nNEU: Pumpe,5\n");

    let (router, _) = app(false);
    let (_, plain) = send(router, "POST", "/api/v1/project", Some(json!({ "file_path": file }))).await;

    let (router, _) = app(false);
    let (_, stripped) = send(
        router,
        "POST",
        "/api/v1/project",
        Some(json!({ "file_path": file, "remove_text": "neu: " })),
    )
    .await;

    assert_eq!(stripped["data"]["raw_signature"], plain["data"]["raw_signature"]);
    assert_eq!(stripped["data"]["raw_signature"], "NEU: Name|Preis");
    assert_eq!(stripped["data"]["text"], "NEU: Name\tPreis\nPumpe\t5");
}

#[tokio::test]
async fn test_project_missing_file_is_unprocessable() {
    let (router, _) = app(false);
    let (status, body) = send(
        router,
        "POST",
        "/api/v1/project",
        Some(json!({ "file_path": "/no/such/file.csv" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().starts_with("File error:"));
}

// ═══════════════════════════════════════════════════════════════════════════
// CONVERT + MEMORY
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_convert_without_api_key_is_unavailable() {
    let (router, _) = app(false);
    let (status, body) = send(
        router,
        "POST",
        "/api/v1/convert",
        Some(json!({ "source_text": "a", "example_text": "b" })),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body["error"].as_str().unwrap().contains("No API key configured"));
}

#[tokio::test]
async fn test_convert_pasted_text_is_reflowed() {
    let (router, state) = app(true);
    let (status, body) = send(
        router,
        "POST",
        "/api/v1/convert",
        Some(json!({ "source_text": "a\tb", "example_text": "Artikel: ..." })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let output = body["data"]["output"].as_str().unwrap();
    assert!(output.lines().all(|line| line.chars().count() <= 40));
    assert!(output.lines().count() > 1);
    assert_eq!(body["data"]["template_signature"], Value::Null);
    assert!(state.memory().entries().is_empty());
}

#[tokio::test]
async fn test_convert_missing_example_is_bad_request() {
    let (router, _) = app(true);
    let (status, body) = send(
        router,
        "POST",
        "/api/v1/convert",
        Some(json!({ "source_text": "data" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Validation error: Example format must not be empty.");
}

#[tokio::test]
async fn test_convert_file_remembers_layout_for_next_request() {
    let dir = TempDir::new().unwrap();
    let file = csv_file(&dir, "A,B\n1,2\n");
    let (router, state) = app(true);

    let (status, body) = send(
        router.clone(),
        "POST",
        "/api/v1/convert",
        Some(json!({ "file_path": file, "columns": [1], "example_text": "TPL" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["template_signature"], "B");

    let (_, body) = send(router.clone(), "GET", "/api/v1/memory/A%7CB", None).await;
    assert_eq!(body["data"]["signature"], "A|B");
    assert_eq!(body["data"]["selectedColumns"], json!([false, true]));

    // Same layout again: columns and template come from memory
    let (status, body) = send(
        router.clone(),
        "POST",
        "/api/v1/convert",
        Some(json!({ "file_path": file })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["template_auto_loaded"], true);

    let (_, body) = send(router, "GET", "/api/v1/memory", None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
    assert_eq!(state.memory().entries().len(), 2);
}

#[tokio::test]
async fn test_memory_show_unknown_signature_is_not_found() {
    let (router, _) = app(false);
    let (status, body) = send(router, "GET", "/api/v1/memory/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Nothing remembered for 'nope'");
}
