//! API request handlers
//!
//! Handlers for all REST API endpoints. Every response uses the
//! `ApiResponse` envelope; failures carry an HTTP status and an `error`.

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::server::AppState;
use crate::core::projector::{
    project as project_grid, raw_signature, selected_signature, strip_text, strip_text_str,
};
use crate::core::reflow::{reflow as reflow_lines, LINE_WIDTH};
use crate::error::SheetwrapError;
use crate::excel::read_grid;
use crate::memory::TemplateRecord;
use crate::session::{resolve_columns, ConversionOutcome, Resolution, Session};
use crate::types::{ColumnMask, Grid, Signature};

/// Standard API response wrapper
#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub request_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            request_id: Uuid::new_v4().to_string(),
            data: Some(data),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            request_id: Uuid::new_v4().to_string(),
            data: None,
            error: Some(message.into()),
        }
    }
}

type Reply<T> = (StatusCode, Json<ApiResponse<T>>);

fn reply<T: Serialize>(result: Result<T, SheetwrapError>) -> Reply<T> {
    match result {
        Ok(data) => (StatusCode::OK, Json(ApiResponse::ok(data))),
        Err(e) => (status_for(&e), Json(ApiResponse::err(e.to_string()))),
    }
}

/// HTTP status for a failed request
pub fn status_for(error: &SheetwrapError) -> StatusCode {
    match error {
        SheetwrapError::Validation(_) => StatusCode::BAD_REQUEST,
        SheetwrapError::Ingestion(_) | SheetwrapError::Csv(_) => StatusCode::UNPROCESSABLE_ENTITY,
        SheetwrapError::Formatter(_) => StatusCode::BAD_GATEWAY,
        SheetwrapError::Config(_) => StatusCode::SERVICE_UNAVAILABLE,
        SheetwrapError::Io(_) | SheetwrapError::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Root endpoint response
#[derive(Serialize)]
pub struct RootResponse {
    pub name: String,
    pub version: String,
    pub description: String,
    pub endpoints: Vec<EndpointInfo>,
}

#[derive(Serialize)]
pub struct EndpointInfo {
    pub path: String,
    pub method: String,
    pub description: String,
}

fn endpoint(method: &str, path: &str, description: &str) -> EndpointInfo {
    EndpointInfo {
        path: path.to_string(),
        method: method.to_string(),
        description: description.to_string(),
    }
}

/// GET / - Root info
pub async fn root(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(ApiResponse::ok(RootResponse {
        name: "Sheetwrap API Server".to_string(),
        version: state.version.clone(),
        description: "Spreadsheet rows to fixed-width text".to_string(),
        endpoints: vec![
            endpoint("GET", "/health", "Health check endpoint"),
            endpoint("GET", "/version", "Get server version"),
            endpoint("POST", "/api/v1/reflow", "Re-wrap text to a maximum line width"),
            endpoint("POST", "/api/v1/project", "Project a table to tab-separated text"),
            endpoint("POST", "/api/v1/convert", "Convert a table using an example layout"),
            endpoint("GET", "/api/v1/memory", "List remembered layouts"),
            endpoint("GET", "/api/v1/memory/{signature}", "Show one remembered layout"),
        ],
    }))
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub conversions_enabled: bool,
}

/// GET /health - Health check
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(ApiResponse::ok(HealthResponse {
        status: "healthy".to_string(),
        conversions_enabled: state.formatter.is_some(),
    }))
}

/// Version response
#[derive(Serialize)]
pub struct VersionResponse {
    pub version: String,
    pub line_width: usize,
}

/// GET /version - Server version
pub async fn version(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(ApiResponse::ok(VersionResponse {
        version: state.version.clone(),
        line_width: LINE_WIDTH,
    }))
}

// ─── Reflow ─────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ReflowRequest {
    pub text: String,
    pub width: Option<usize>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ReflowResponse {
    pub text: String,
    pub width: usize,
    pub lines: usize,
}

/// POST /api/v1/reflow - Re-wrap text
pub async fn reflow(Json(req): Json<ReflowRequest>) -> impl IntoResponse {
    let width = req.width.unwrap_or(LINE_WIDTH);
    let text = reflow_lines(&req.text, width);
    let lines = if text.is_empty() { 0 } else { text.split('\n').count() };
    Json(ApiResponse::ok(ReflowResponse { text, width, lines }))
}

// ─── Project ────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ProjectRequest {
    pub file_path: String,
    /// Zero-based columns to keep; remembered or all when absent
    pub columns: Option<Vec<usize>>,
    pub remove_text: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ProjectResponse {
    pub text: String,
    pub raw_signature: Signature,
    pub selected_signature: Signature,
    pub selected_columns: ColumnMask,
}

fn load_source(file_path: &str, remove_text: Option<&str>) -> Result<Grid, SheetwrapError> {
    let grid = read_grid(PathBuf::from(file_path))?;
    Ok(match remove_text {
        Some(needle) => strip_text(&grid, needle),
        None => grid,
    })
}

/// POST /api/v1/project - Project a table without converting it
pub async fn project(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ProjectRequest>,
) -> impl IntoResponse {
    reply(project_source(&state, &req))
}

fn project_source(state: &AppState, req: &ProjectRequest) -> Result<ProjectResponse, SheetwrapError> {
    let grid = load_source(&req.file_path, req.remove_text.as_deref())?;
    let mask = resolve_columns(&state.memory(), &grid, req.columns.as_deref());
    if mask.none_selected() {
        return Err(SheetwrapError::Validation(
            "Select at least one column.".to_string(),
        ));
    }

    Ok(ProjectResponse {
        text: project_grid(&grid, &mask),
        raw_signature: raw_signature(&grid),
        selected_signature: selected_signature(&grid, &mask),
        selected_columns: mask,
    })
}

// ─── Convert ────────────────────────────────────────────────────────────────

/// Either `source_text`, or `file_path` (+ optional `columns` for a new layout)
#[derive(Deserialize, Default)]
pub struct ConvertRequest {
    pub source_text: Option<String>,
    pub file_path: Option<String>,
    /// Zero-based columns for a layout not yet remembered; all when absent
    pub columns: Option<Vec<usize>>,
    pub remove_text: Option<String>,
    /// Falls back to the template remembered for the selected columns
    pub example_text: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ConvertResponse {
    pub output: String,
    pub template_signature: Option<Signature>,
    pub template_auto_loaded: bool,
}

/// POST /api/v1/convert - Run a full conversion
pub async fn convert(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ConvertRequest>,
) -> impl IntoResponse {
    reply(convert_source(&state, req).await)
}

async fn convert_source(
    state: &AppState,
    req: ConvertRequest,
) -> Result<ConvertResponse, SheetwrapError> {
    let formatter = state.formatter.clone().ok_or_else(|| {
        SheetwrapError::Config(
            "No API key configured (set SHEETWRAP_API_KEY or GEMINI_API_KEY)".to_string(),
        )
    })?;

    let mut session = Session::new(state.memory());

    match (req.source_text, req.file_path) {
        (Some(text), _) => session.set_source_text(match req.remove_text.as_deref() {
            Some(needle) => strip_text_str(&text, needle),
            None => text,
        }),
        (None, Some(path)) => {
            let grid = load_source(&path, req.remove_text.as_deref())?;
            let columns = grid.column_count();
            if session.load_grid(grid)? == Resolution::NeedsColumnSelection {
                let mask = match &req.columns {
                    Some(keep) => ColumnMask::from_indices(columns, keep),
                    None => ColumnMask::all(columns),
                };
                session.set_pending_mask(mask);
                session.confirm_selection()?;
            }
        }
        (None, None) => {
            return Err(SheetwrapError::Validation(
                "Either source_text or file_path is required.".to_string(),
            ))
        }
    }

    if let Some(example) = req.example_text {
        session.set_example_text(example);
    }

    match session.convert(formatter.as_ref()).await? {
        ConversionOutcome::Completed(output) => Ok(ConvertResponse {
            output,
            template_signature: session.template_signature().cloned(),
            template_auto_loaded: session.template_auto_loaded(),
        }),
        ConversionOutcome::Failed(e) => Err(SheetwrapError::Formatter(e)),
        ConversionOutcome::Discarded => Err(SheetwrapError::Validation(
            "Conversion was cancelled.".to_string(),
        )),
    }
}

// ─── Memory ─────────────────────────────────────────────────────────────────

#[derive(Serialize, Deserialize, Debug)]
pub struct MemoryEntry {
    pub signature: Signature,
    #[serde(flatten)]
    pub record: TemplateRecord,
}

/// GET /api/v1/memory - All remembered layouts
pub async fn memory_list(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let entries: Vec<MemoryEntry> = state
        .memory()
        .entries()
        .into_iter()
        .map(|(signature, record)| MemoryEntry { signature, record })
        .collect();
    Json(ApiResponse::ok(entries))
}

/// GET /api/v1/memory/{signature} - One remembered layout
pub async fn memory_show(
    State(state): State<Arc<AppState>>,
    Path(signature): Path<String>,
) -> impl IntoResponse {
    let signature = Signature::new(signature);
    match state.memory().get(&signature) {
        Some(record) => (
            StatusCode::OK,
            Json(ApiResponse::ok(MemoryEntry { signature, record })),
        ),
        None => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::err(format!("Nothing remembered for '{signature}'"))),
        ),
    }
}
