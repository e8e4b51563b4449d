use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::db;
use crate::error::AppError;
use crate::forms;
use crate::models::{CustomField, Document};
use crate::service;
use crate::state::SharedState;
use crate::storage;

#[derive(Deserialize)]
pub struct AddCustomField {
    pub name: String,
    pub value: String,
}

pub async fn list_custom_fields(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<CustomField>>, AppError> {
    service::find_project(&state.pool, id).await?;
    Ok(Json(db::custom_fields::list_by_project(&state.pool, id).await?))
}

pub async fn add_custom_field(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(req): Json<AddCustomField>,
) -> Result<Json<Value>, AppError> {
    service::add_custom_field(&state.pool, id, &req.name, &req.value).await?;
    Ok(Json(json!({ "success": true })))
}

pub async fn delete_custom_field(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let project_id = service::delete_custom_field(&state.pool, id).await?;
    Ok(Json(json!({ "success": true, "project_id": project_id })))
}

pub async fn list(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Document>>, AppError> {
    service::find_project(&state.pool, id).await?;
    Ok(Json(db::documents::list_by_project(&state.pool, id).await?))
}

pub async fn upload(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Document>, AppError> {
    let upload = forms::parse_upload(&headers, body)
        .await
        .map_err(AppError::BadRequest)?;

    let document = service::store_document(
        &state,
        id,
        upload.name.as_deref(),
        &upload.filename,
        &upload.bytes,
    )
    .await?;
    Ok(Json(document))
}

pub async fn download(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let document = service::find_document(&state.pool, id).await?;
    let bytes = state.uploads.read(&document.filename).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            AppError::NotFound("Document file missing".to_string())
        } else {
            AppError::Io(e)
        }
    })?;

    let disposition = if storage::is_inline_safe(&document.filename) {
        "inline"
    } else {
        "attachment"
    };

    Ok((
        [
            (header::CONTENT_TYPE, storage::content_type(&document.filename).to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("{disposition}; filename=\"{}\"", document.filename),
            ),
            (header::CONTENT_SECURITY_POLICY, "sandbox".to_string()),
        ],
        bytes,
    ))
}

pub async fn delete(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let project_id = service::delete_document(&state, id).await?;
    Ok(Json(json!({ "success": true, "project_id": project_id })))
}
