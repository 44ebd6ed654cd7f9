//! Student HTTP Routes
//!
//! Roster upload, upsert, listing and export.

use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::database::Student;
use crate::error::RosterError;
use crate::service::{ImportMode, ImportOutcome, RosterService};

const XLSX_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Room for multipart boundaries and part headers on top of the file itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

// ==================
// Shared State
// ==================

pub struct RosterState {
    pub service: RosterService,
    /// Largest accepted upload in bytes
    pub max_file_size: usize,
}

impl RosterState {
    pub fn new(service: RosterService, max_file_size: usize) -> Self {
        Self {
            service,
            max_file_size,
        }
    }
}

// ==================
// Request/Response Types
// ==================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct UploadQuery {
    #[serde(default)]
    pub replace: bool,
}

#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub inserted: usize,
    pub updated: usize,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub errors: Vec<String>,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            errors: vec![message.into()],
        }),
    )
}

/// Store failures are the server's fault; anything else came from the upload.
fn roster_error(err: RosterError) -> ApiError {
    match err {
        RosterError::DuckDBError(_) | RosterError::StoreUnavailable => {
            error!(error = %err, "student store failure");
            api_error(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
        err => api_error(StatusCode::BAD_REQUEST, err.to_string()),
    }
}

// ==================
// Routes
// ==================

pub fn health_routes() -> Router {
    Router::new().route("/health", get(health_handler))
}

pub fn student_routes(state: Arc<RosterState>) -> Router {
    let body_limit = state.max_file_size.saturating_add(MULTIPART_OVERHEAD);
    Router::new()
        .route("/", get(list_handler))
        .route("/upload", post(upload_handler))
        .route("/upsert", post(upsert_handler))
        .route("/export", get(export_handler))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

// ==================
// Handlers
// ==================

async fn health_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".to_string(),
        }),
    )
}

async fn list_handler(State(state): State<Arc<RosterState>>) -> Result<Json<Vec<Student>>, ApiError> {
    state.service.students().map(Json).map_err(roster_error)
}

async fn upload_handler(
    State(state): State<Arc<RosterState>>,
    Query(query): Query<UploadQuery>,
    multipart: Multipart,
) -> Result<Json<ImportResponse>, ApiError> {
    import(&state, multipart, ImportMode::Insert { replace: query.replace }).await
}

async fn upsert_handler(
    State(state): State<Arc<RosterState>>,
    multipart: Multipart,
) -> Result<Json<ImportResponse>, ApiError> {
    import(&state, multipart, ImportMode::Upsert).await
}

async fn export_handler(State(state): State<Arc<RosterState>>) -> Result<impl IntoResponse, ApiError> {
    let bytes = state.service.export().map_err(roster_error)?;
    let file_name = format!("students_{}.xlsx", chrono::Local::now().format("%Y%m%d%H%M%S"));
    Ok((
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{}\"", file_name)),
        ],
        bytes,
    ))
}

async fn import(state: &RosterState, multipart: Multipart, mode: ImportMode) -> Result<Json<ImportResponse>, ApiError> {
    let (file_name, bytes) = read_upload(multipart, state.max_file_size).await?;
    debug!(file = %file_name, bytes = bytes.len(), ?mode, "received roster upload");

    match state.service.import(bytes, &file_name, mode).map_err(roster_error)? {
        ImportOutcome::Rejected { errors } => Err((StatusCode::BAD_REQUEST, Json(ErrorResponse { errors }))),
        ImportOutcome::Imported { inserted, updated } => {
            let message = match mode {
                ImportMode::Insert { .. } => format!("{} students imported successfully.", inserted),
                ImportMode::Upsert => format!("{} students inserted, {} students updated.", inserted, updated),
            };
            Ok(Json(ImportResponse {
                inserted,
                updated,
                message,
            }))
        }
    }
}

fn too_large(max_file_size: usize) -> ApiError {
    api_error(
        StatusCode::PAYLOAD_TOO_LARGE,
        format!("File exceeds the maximum size of {} bytes.", max_file_size),
    )
}

/// Keeps the status multer assigns, so a body over the limit is still a 413.
fn multipart_error(err: MultipartError, max_file_size: usize) -> ApiError {
    match err.status() {
        StatusCode::PAYLOAD_TOO_LARGE => too_large(max_file_size),
        status => api_error(status, err.body_text()),
    }
}

/// Pulls the `file` part out of a multipart body and applies the upload guards.
async fn read_upload(mut multipart: Multipart, max_file_size: usize) -> Result<(String, Vec<u8>), ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, max_file_size))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        if !file_name.to_lowercase().ends_with(".xlsx") {
            return Err(api_error(StatusCode::BAD_REQUEST, "Only .xlsx files are supported."));
        }

        let data = field
            .bytes()
            .await
            .map_err(|e| multipart_error(e, max_file_size))?;
        if data.len() > max_file_size {
            return Err(too_large(max_file_size));
        }
        if data.is_empty() {
            return Err(api_error(StatusCode::BAD_REQUEST, "The uploaded file is empty."));
        }
        return Ok((file_name, data.to_vec()));
    }

    Err(api_error(StatusCode::BAD_REQUEST, "No file uploaded."))
}
