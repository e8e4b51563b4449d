use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::Json;
use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::db;
use crate::error::AppError;
use crate::models::ProjectVersion;
use crate::schedule;
use crate::service::{self, FieldUpdate};
use crate::state::SharedState;

#[derive(Serialize)]
pub struct VersionSummary {
    pub id: Uuid,
    pub version_number: String,
    pub created_at: DateTime<Utc>,
    pub parent_id: Option<Uuid>,
}

#[derive(Deserialize, Default)]
pub struct CreateVersion {
    pub version_number: Option<String>,
}

#[derive(Deserialize)]
pub struct BatchUpdate {
    #[serde(default)]
    pub updates: Vec<FieldUpdate>,
}

#[derive(Serialize)]
pub struct ScheduleView {
    pub start_date: Option<NaiveDate>,
    pub duration_days: i32,
    pub pause_start: Option<NaiveDate>,
    pub pause_end: Option<NaiveDate>,
    pub theoretical_end_date: Option<NaiveDate>,
    pub display_start: NaiveDate,
    pub display_end: NaiveDate,
}

impl ScheduleView {
    pub fn new(version: &ProjectVersion, today: NaiveDate) -> Self {
        let theoretical_end_date = version.theoretical_end_date();
        let start = version
            .start_date
            .unwrap_or_else(|| version.created_at.date_naive());
        let (display_start, display_end) =
            schedule::display_span(start, theoretical_end_date, version.deadline, today);

        Self {
            start_date: version.start_date,
            duration_days: version.duration_days,
            pause_start: version.pause_start,
            pause_end: version.pause_end,
            theoretical_end_date,
            display_start,
            display_end,
        }
    }
}

pub async fn list_by_project(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<VersionSummary>>, AppError> {
    service::find_project(&state.pool, id).await?;
    let versions = db::versions::list_by_project(&state.pool, id).await?;
    Ok(Json(
        versions
            .into_iter()
            .map(|v| VersionSummary {
                id: v.id,
                version_number: v.version_number,
                created_at: v.created_at,
                parent_id: v.parent_id,
            })
            .collect(),
    ))
}

pub async fn create(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    body: Bytes,
) -> Result<Json<ProjectVersion>, AppError> {
    let req: CreateVersion = if body.is_empty() {
        CreateVersion::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| AppError::BadRequest(format!("Invalid JSON: {e}")))?
    };
    let version = service::create_version(&state.pool, id, req.version_number.as_deref()).await?;
    Ok(Json(version))
}

pub async fn get(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProjectVersion>, AppError> {
    Ok(Json(service::find_version(&state.pool, id).await?))
}

pub async fn delete(
    State(state): State<SharedState>,
    Path((id, version_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Value>, AppError> {
    service::delete_version(&state.pool, id, version_id).await?;
    Ok(Json(json!({ "message": "Deleted" })))
}

pub async fn update_field(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(update): Json<FieldUpdate>,
) -> Result<Json<Value>, AppError> {
    service::set_version_field(&state.pool, id, &update).await?;
    Ok(Json(json!({ "success": true, "message": "Updated" })))
}

pub async fn update_fields(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(req): Json<BatchUpdate>,
) -> Result<Json<Value>, AppError> {
    let applied = service::set_version_fields(&state.pool, id, &req.updates).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Batch update successful",
        "applied": applied,
    })))
}

pub async fn schedule(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ScheduleView>, AppError> {
    let version = service::find_version(&state.pool, id).await?;
    Ok(Json(ScheduleView::new(&version, Local::now().date_naive())))
}
