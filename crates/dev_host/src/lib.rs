//! Development stand-in for the host side of the print card: the upload endpoint and
//! the `ipp_printer_service.print_pdf` action, with printing simulated.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use shared::{
    error::{ApiError, ErrorCode},
    protocol::{
        last_job_route, service_route, upload_route, JobRecordStatus, LastJob, PrintPdfRequest,
        UploadResponse, PRINT_DOMAIN, PRINT_SERVICE, UPLOAD_FIELD,
    },
};
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

pub mod config;

pub use config::{load_settings, Settings};

type PlainError = (StatusCode, String);

#[derive(Clone)]
pub struct AppState {
    settings: Arc<Settings>,
    last_job: Arc<RwLock<Option<LastJob>>>,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings: Arc::new(settings),
            last_job: Arc::new(RwLock::new(None)),
        }
    }

    pub async fn last_job(&self) -> Option<LastJob> {
        self.last_job.read().await.clone()
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route(
            upload_route(),
            post(upload_pdf).layer(DefaultBodyLimit::max(state.settings.max_upload_bytes)),
        )
        .route(&service_route(PRINT_DOMAIN, PRINT_SERVICE), post(print_pdf))
        .route(last_job_route(), get(last_job))
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), PlainError> {
    let presented = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));
    match presented {
        Some(token) if token == state.settings.access_token => Ok(()),
        _ => Err((StatusCode::UNAUTHORIZED, "401: Unauthorized".to_string())),
    }
}

fn bad_request(message: impl Into<String>) -> PlainError {
    (StatusCode::BAD_REQUEST, message.into())
}

async fn upload_pdf(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, PlainError> {
    authorize(&state, &headers)?;

    let mut content = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(e.to_string()))?
    {
        if field.name() == Some(UPLOAD_FIELD) {
            content = Some(field.bytes().await.map_err(|e| bad_request(e.to_string()))?);
            break;
        }
    }
    let content = content
        .filter(|bytes| !bytes.is_empty())
        .ok_or_else(|| bad_request("No file uploaded"))?;

    let upload_dir = &state.settings.upload_dir;
    tokio::fs::create_dir_all(upload_dir)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    let path = upload_dir.join(format!("{}.pdf", Uuid::new_v4()));
    tokio::fs::write(&path, &content)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    info!(path = %path.display(), size = content.len(), "stored uploaded document");
    Ok(Json(UploadResponse {
        file_path: path.display().to_string(),
    }))
}

async fn print_pdf(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<PrintPdfRequest>,
) -> Result<Json<Vec<serde_json::Value>>, PlainError> {
    authorize(&state, &headers)?;

    if request.entity_id.as_str().is_empty() {
        return Err(bad_request("Entity ID is required"));
    }
    if request.file_path.is_empty() {
        return Err(bad_request("File path is required"));
    }
    let path = PathBuf::from(&request.file_path);
    let exists = tokio::fs::try_exists(&path)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    if !exists {
        return Err(bad_request(format!("File not found: {}", request.file_path)));
    }
    if !state
        .settings
        .entities
        .iter()
        .any(|entity| entity == request.entity_id.as_str())
    {
        remove_document(&path).await;
        return Err(bad_request(format!(
            "Entity not found: {}",
            request.entity_id
        )));
    }

    let copies = request.copies.unwrap_or(1);
    info!(
        entity_id = %request.entity_id,
        file_path = %request.file_path,
        copies,
        "simulation mode active; print simulated"
    );
    *state.last_job.write().await = Some(LastJob {
        entity_id: request.entity_id,
        file_path: request.file_path,
        copies,
        timestamp: Utc::now(),
        status: JobRecordStatus::Simulated,
    });
    remove_document(&path).await;

    Ok(Json(Vec::new()))
}

async fn last_job(
    State(state): State<AppState>,
) -> Result<Json<LastJob>, (StatusCode, Json<ApiError>)> {
    state.last_job().await.map(Json).ok_or_else(|| {
        (
            StatusCode::NOT_FOUND,
            Json(ApiError::new(ErrorCode::NotFound, "no print job recorded yet")),
        )
    })
}

async fn remove_document(path: &Path) {
    if let Err(error) = tokio::fs::remove_file(path).await {
        warn!(path = %path.display(), %error, "failed to remove uploaded document");
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
