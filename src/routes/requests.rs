use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::db;
use crate::db::context_requests::{NewRequest, RequestFilter, SortOrder};
use crate::error::AppError;
use crate::fields::REQUEST_FIELDS;
use crate::models::vocabulary::{DEFAULT_PRIORITY, NOT_DECIDED};
use crate::models::{Approval, ContextRequest};
use crate::service::FieldUpdate;
use crate::state::SharedState;
use crate::stats;

/// Query string of the requests listing. Empty values and `all` mean "no filter".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequestQuery {
    pub project_id: Option<String>,
    pub version_id: Option<String>,
    pub sort: Option<String>,
    pub difficulty: Option<String>,
    pub priority: Option<String>,
    pub approved: Option<String>,
    pub role: Option<String>,
    #[serde(rename = "type")]
    pub request_type: Option<String>,
}

impl RequestQuery {
    pub fn to_filter(&self) -> RequestFilter {
        RequestFilter {
            project_id: active(&self.project_id).and_then(|s| s.parse().ok()),
            version_id: active(&self.version_id).and_then(|s| s.parse().ok()),
            difficulty: active(&self.difficulty).map(str::to_string),
            priority: active(&self.priority).map(str::to_string),
            approved: active(&self.approved).map(str::to_string),
            role: active(&self.role).map(str::to_string),
            request_type: active(&self.request_type).map(str::to_string),
            sort: SortOrder::parse(self.sort.as_deref().unwrap_or_default()),
        }
    }
}

fn active(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty() && *s != "all")
}

#[derive(Debug, Deserialize)]
pub struct CreateRequest {
    pub requester: Option<String>,
    pub requester_role: Option<String>,
    pub description: Option<String>,
    pub user_request_type: Option<String>,
    pub tech_request_type: Option<String>,
    pub planned_improvement: Option<String>,
    pub improvement_type: Option<String>,
    pub difficulty_level: Option<String>,
    pub priority_level: Option<String>,
    pub approved: Option<String>,
}

impl CreateRequest {
    pub fn into_new(self) -> Result<NewRequest, AppError> {
        let approved = match self.approved.as_deref().map(str::trim) {
            None | Some("") => Approval::default(),
            Some(raw) => Approval::parse(raw)
                .ok_or_else(|| AppError::BadRequest(format!("Invalid approval state: {raw}")))?,
        };

        Ok(NewRequest {
            requester: self.requester.unwrap_or_default(),
            requester_role: self.requester_role.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            user_request_type: self.user_request_type.unwrap_or_default(),
            tech_request_type: self.tech_request_type.unwrap_or_default(),
            planned_improvement: or_default(self.planned_improvement, NOT_DECIDED),
            improvement_type: or_default(self.improvement_type, NOT_DECIDED),
            difficulty_level: or_default(self.difficulty_level, NOT_DECIDED),
            priority_level: or_default(self.priority_level, DEFAULT_PRIORITY),
            approved: approved.as_str().to_string(),
        })
    }
}

fn or_default(value: Option<String>, default: &str) -> String {
    value
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

pub async fn list(
    State(state): State<SharedState>,
    Query(query): Query<RequestQuery>,
) -> Result<Json<Value>, AppError> {
    let rows = db::context_requests::list(&state.pool, &query.to_filter()).await?;
    let requests: Vec<ContextRequest> = rows.iter().map(|r| r.request.clone()).collect();
    let summary = stats::requests(&requests);

    Ok(Json(json!({
        "requests": rows,
        "stats": summary,
    })))
}

pub async fn create(
    State(state): State<SharedState>,
    Path(version_id): Path<Uuid>,
    Json(req): Json<CreateRequest>,
) -> Result<Json<Value>, AppError> {
    crate::service::find_version(&state.pool, version_id).await?;
    let new_request = req.into_new()?;
    let created = db::context_requests::create(&state.pool, version_id, &new_request).await?;

    tracing::info!(%version_id, request_id = %created.id, "context request created");
    Ok(Json(json!({ "success": true, "id": created.id })))
}

pub async fn get(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ContextRequest>, AppError> {
    let request = find(&state, id).await?;
    Ok(Json(request))
}

/// `{field, value}` edits one field inline; any other object edits every known key it
/// carries.
pub async fn update(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, AppError> {
    find(&state, id).await?;

    let updates: Vec<FieldUpdate> = match (body.get("field"), body.get("value")) {
        (Some(Value::String(field)), Some(value)) => {
            REQUEST_FIELDS.resolve(field, value)?;
            vec![FieldUpdate {
                field: field.clone(),
                value: value.clone(),
            }]
        }
        _ => body
            .as_object()
            .map(|obj| {
                obj.iter()
                    .filter(|(k, _)| REQUEST_FIELDS.get(k).is_some())
                    .map(|(k, v)| FieldUpdate {
                        field: k.clone(),
                        value: v.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default(),
    };

    let mut tx = state.pool.begin().await?;
    for update in &updates {
        let (spec, value) = REQUEST_FIELDS.resolve(&update.field, &update.value)?;
        db::context_requests::set_field(&mut *tx, id, spec, &value).await?;
    }
    tx.commit().await?;

    tracing::debug!(request_id = %id, fields = updates.len(), "context request updated");
    Ok(Json(json!({ "success": true })))
}

pub async fn delete(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    if !db::context_requests::delete(&state.pool, id).await? {
        return Err(AppError::NotFound("Request not found".to_string()));
    }
    tracing::info!(request_id = %id, "context request deleted");
    Ok(Json(json!({ "success": true })))
}

async fn find(state: &SharedState, id: Uuid) -> Result<ContextRequest, AppError> {
    db::context_requests::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Request not found".to_string()))
}
