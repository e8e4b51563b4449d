use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::db;
use crate::error::AppError;
use crate::lineage::ProjectState;
use crate::service::{self, FieldUpdate, ProjectDraft};
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct CustomFieldInput {
    pub name: String,
    pub value: String,
}

#[derive(Deserialize)]
pub struct CreateProject {
    pub name: String,
    pub category: Option<String>,
    pub version_number: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldUpdate>,
    #[serde(default)]
    pub custom_fields: Vec<CustomFieldInput>,
}

#[derive(Deserialize)]
pub struct UpdateProject {
    pub name: String,
    pub category: Option<String>,
    pub version_number: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldUpdate>,
}

#[derive(Deserialize)]
pub struct StatusUpdate {
    pub status: String,
}

#[derive(Deserialize)]
pub struct PhaseUpdate {
    pub phase: String,
}

/// Project with its current version and the attributes read through it.
pub fn state_json(state: &ProjectState) -> Value {
    json!({
        "project": state.project,
        "current_version": state.current,
        "attributes": state.attributes(),
        "suggested_next_version": state.suggested_next_version(),
    })
}

pub async fn list(State(state): State<SharedState>) -> Result<Json<Vec<Value>>, AppError> {
    let states = service::load_all_states(&state.pool).await?;
    Ok(Json(states.iter().map(state_json).collect()))
}

pub async fn create(
    State(state): State<SharedState>,
    Json(req): Json<CreateProject>,
) -> Result<Json<Value>, AppError> {
    let draft = ProjectDraft {
        name: req.name,
        category: req.category,
        version_number: req.version_number,
        version_fields: req.fields,
        custom_fields: req
            .custom_fields
            .into_iter()
            .map(|f| (f.name, f.value))
            .collect(),
    };
    let created = service::create_project(&state.pool, draft).await?;
    Ok(Json(state_json(&created)))
}

pub async fn get(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let project_state = service::load_state(&state.pool, id).await?;
    let custom_fields = db::custom_fields::list_by_project(&state.pool, id).await?;
    let documents = db::documents::list_by_project(&state.pool, id).await?;

    let mut body = state_json(&project_state);
    body["custom_fields"] = json!(custom_fields);
    body["documents"] = json!(documents);
    Ok(Json(body))
}

pub async fn update(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateProject>,
) -> Result<Json<Value>, AppError> {
    let updated = service::update_project(
        &state.pool,
        id,
        &req.name,
        req.category.as_deref(),
        req.version_number.as_deref(),
        &req.fields,
    )
    .await?;
    Ok(Json(state_json(&updated)))
}

pub async fn delete(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    service::delete_project(&state, id).await?;
    Ok(Json(json!({ "message": "Deleted" })))
}

pub async fn update_status(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(req): Json<StatusUpdate>,
) -> Result<Json<Value>, AppError> {
    service::set_current_category(&state.pool, id, "status", &req.status).await?;
    Ok(Json(json!({ "success": true, "message": "Status updated" })))
}

pub async fn update_phase(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(req): Json<PhaseUpdate>,
) -> Result<Json<Value>, AppError> {
    service::set_current_category(&state.pool, id, "phase", &req.phase).await?;
    Ok(Json(json!({ "success": true, "message": "Phase updated" })))
}
