//! REST handlers under `/api`.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;

use super::AppState;
use crate::files::{FileTreeNode, build_file_tree};
use crate::index::walker::resolve_relative;
use crate::index::{IndexSnapshot, Resolution, resolve};
use crate::parsing::Term;

/// Errors returned to HTTP clients as `{"error": message}`.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Forbidden(String),
    NotFound(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m),
            ApiError::Forbidden(m) => (StatusCode::FORBIDDEN, m),
            ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m),
            ApiError::Internal(m) => (StatusCode::INTERNAL_SERVER_ERROR, m),
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Deserialize)]
pub struct FileParams {
    pub path: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WriteBody {
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct ResolveParams {
    pub term: Option<String>,
    pub scope: Option<String>,
    pub file: Option<String>,
}

/// `GET /api/index`
pub async fn get_index(State(state): State<AppState>) -> Json<Arc<IndexSnapshot>> {
    Json(state.index.snapshot())
}

/// `GET /api/search?q=`
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Json<Vec<Arc<Term>>> {
    Json(state.index.search(&params.q))
}

/// `GET /api/files`
pub async fn list_files(
    State(state): State<AppState>,
) -> Result<Json<Vec<FileTreeNode>>, ApiError> {
    let root = state.index.root().to_path_buf();
    let extension = state.index.extension().to_string();

    let tree = tokio::task::spawn_blocking(move || build_file_tree(&root, &extension))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(Json(tree))
}

/// `GET /api/file?path=` returns the raw document text.
pub async fn read_file(
    State(state): State<AppState>,
    Query(params): Query<FileParams>,
) -> Result<Response, ApiError> {
    let (full_path, _) = checked_path(&state, params)?;

    let content = tokio::fs::read(&full_path)
        .await
        .map_err(|_| ApiError::NotFound("file not found".to_string()))?;

    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        content,
    )
        .into_response())
}

/// `POST /api/file?path=` with `{"content": "..."}`.
///
/// The index is not touched here; the watcher picks the change up.
pub async fn write_file(
    State(state): State<AppState>,
    Query(params): Query<FileParams>,
    body: Result<Json<WriteBody>, JsonRejection>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let (full_path, relative) = checked_path(&state, params)?;
    let Json(body) = body.map_err(|e| ApiError::BadRequest(format!("invalid body: {e}")))?;

    tokio::fs::write(&full_path, body.content)
        .await
        .map_err(|e| ApiError::Internal(format!("write failed: {e}")))?;

    crate::log_event!("http", "saved", "{relative}");
    Ok(Json(serde_json::json!({ "success": true })))
}

/// `GET /api/resolve?term=&scope=&file=`
pub async fn resolve_term(
    State(state): State<AppState>,
    Query(params): Query<ResolveParams>,
) -> Result<Json<Resolution>, ApiError> {
    let term = params
        .term
        .filter(|term| !term.is_empty())
        .ok_or_else(|| ApiError::BadRequest("missing term parameter".to_string()))?;

    let snapshot = state.index.snapshot();
    Ok(Json(resolve(
        &snapshot,
        &term,
        params.scope.as_deref().unwrap_or_default(),
        params.file.as_deref().unwrap_or_default(),
    )))
}

fn checked_path(state: &AppState, params: FileParams) -> Result<(PathBuf, String), ApiError> {
    let relative = params
        .path
        .filter(|path| !path.is_empty())
        .ok_or_else(|| ApiError::BadRequest("missing path parameter".to_string()))?;

    let full_path = resolve_relative(state.index.root(), &relative)
        .ok_or_else(|| ApiError::Forbidden("illegal path".to_string()))?;

    Ok((full_path, relative))
}
