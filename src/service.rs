use serde::Deserialize;
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db;
use crate::error::AppError;
use crate::fields::{FieldError, VERSION_FIELDS};
use crate::lineage::{self, INITIAL_VERSION, ProjectState};
use crate::models::vocabulary::{is_valid_phase, is_valid_status};
use crate::models::{Document, NewVersion, Project, ProjectVersion};
use crate::state::SharedState;

/// One `{field, value}` pair of an inline edit.
#[derive(Debug, Clone, Deserialize)]
pub struct FieldUpdate {
    pub field: String,
    #[serde(default)]
    pub value: Value,
}

/// Everything needed to create a project with its first version.
#[derive(Debug, Clone, Default)]
pub struct ProjectDraft {
    pub name: String,
    pub category: Option<String>,
    pub version_number: Option<String>,
    pub version_fields: Vec<FieldUpdate>,
    pub custom_fields: Vec<(String, String)>,
}

pub fn validate_name(name: &str) -> Result<(), AppError> {
    let len = name.trim().chars().count();
    if len == 0 || len > 100 {
        return Err(AppError::BadRequest(
            "Project name must be between 1 and 100 characters".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_label(label: &str) -> Result<(), AppError> {
    let len = label.trim().chars().count();
    if len == 0 || len > 20 {
        return Err(AppError::BadRequest(
            "Version number must be between 1 and 20 characters".to_string(),
        ));
    }
    Ok(())
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

pub async fn find_project(pool: &PgPool, id: Uuid) -> Result<Project, AppError> {
    db::projects::find_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Project not found".to_string()))
}

pub async fn find_version(pool: &PgPool, id: Uuid) -> Result<ProjectVersion, AppError> {
    db::versions::find_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Version not found".to_string()))
}

/// A project and its current version, resolved now.
pub async fn load_state(pool: &PgPool, id: Uuid) -> Result<ProjectState, AppError> {
    let project = find_project(pool, id).await?;
    let current = lineage::resolve_current_version(pool, id).await?;
    Ok(ProjectState { project, current })
}

pub async fn load_all_states(pool: &PgPool) -> Result<Vec<ProjectState>, AppError> {
    let projects = db::projects::list(pool).await?;
    let versions = db::versions::list_all(pool).await?;
    Ok(lineage::current_versions(projects, &versions))
}

/// Create the project, its first version and its custom fields in one transaction.
pub async fn create_project(pool: &PgPool, draft: ProjectDraft) -> Result<ProjectState, AppError> {
    validate_name(&draft.name)?;
    let label = non_empty(draft.version_number.as_deref())
        .unwrap_or(INITIAL_VERSION)
        .to_string();
    validate_label(&label)?;

    let mut tx = pool.begin().await?;

    let project = db::projects::create(
        &mut *tx,
        draft.name.trim(),
        non_empty(draft.category.as_deref()),
    )
    .await?;
    let version = db::versions::insert(&mut *tx, project.id, &NewVersion::initial(label)).await?;

    for update in &draft.version_fields {
        match VERSION_FIELDS.resolve(&update.field, &update.value) {
            Ok((spec, value)) => db::versions::set_field(&mut *tx, version.id, spec, &value).await?,
            Err(FieldError::Unknown(_)) => continue,
            Err(e) => return Err(e.into()),
        }
    }

    for (name, value) in &draft.custom_fields {
        if name.trim().is_empty() || value.trim().is_empty() {
            continue;
        }
        db::custom_fields::create(&mut *tx, project.id, name.trim(), value.trim()).await?;
    }

    tx.commit().await?;

    tracing::info!(project_id = %project.id, version_id = %version.id, "project created");
    load_state(pool, project.id).await
}

/// Rename/recategorize a project and edit its current version in one transaction.
pub async fn update_project(
    pool: &PgPool,
    id: Uuid,
    name: &str,
    category: Option<&str>,
    version_number: Option<&str>,
    version_fields: &[FieldUpdate],
) -> Result<ProjectState, AppError> {
    validate_name(name)?;
    let state = load_state(pool, id).await?;

    let mut tx = pool.begin().await?;
    db::projects::update(&mut *tx, id, name.trim(), non_empty(category)).await?;

    if let Some(current) = &state.current {
        if let Some(label) = non_empty(version_number) {
            validate_label(label)?;
            db::versions::update_label(&mut *tx, current.id, label).await?;
        }
        for update in version_fields {
            match VERSION_FIELDS.resolve(&update.field, &update.value) {
                Ok((spec, value)) => {
                    db::versions::set_field(&mut *tx, current.id, spec, &value).await?
                }
                Err(FieldError::Unknown(_)) => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    tx.commit().await?;

    tracing::info!(project_id = %id, "project updated");
    load_state(pool, id).await
}

/// Clone the current version into a new child version. Without a label the suggested
/// next label is used.
pub async fn create_version(
    pool: &PgPool,
    project_id: Uuid,
    version_number: Option<&str>,
) -> Result<ProjectVersion, AppError> {
    let state = load_state(pool, project_id).await?;
    let suggested = state.suggested_next_version();
    let label = non_empty(version_number).unwrap_or(suggested.as_str());
    validate_label(label)?;

    let draft = match &state.current {
        Some(current) => NewVersion::cloned_from(current, label),
        None => NewVersion::initial(label),
    };
    let version = db::versions::insert(pool, project_id, &draft).await?;

    tracing::info!(
        %project_id,
        version_id = %version.id,
        parent_id = ?version.parent_id,
        label = %version.version_number,
        "version created"
    );
    Ok(version)
}

/// Delete a version unless it is the project's last one.
pub async fn delete_version(pool: &PgPool, project_id: Uuid, version_id: Uuid) -> Result<(), AppError> {
    find_project(pool, project_id).await?;
    let version = find_version(pool, version_id).await?;

    if version.project_id != project_id {
        return Err(AppError::BadRequest("Version mismatch".to_string()));
    }

    if db::versions::count_for_project(pool, project_id).await? <= 1 {
        return Err(AppError::Conflict(
            "Cannot delete the last version. Delete the whole project instead.".to_string(),
        ));
    }

    db::versions::delete(pool, version_id).await?;
    tracing::info!(%project_id, %version_id, "version deleted");
    Ok(())
}

/// Inline edit of one field. Unknown fields and malformed dates are rejected.
pub async fn set_version_field(pool: &PgPool, version_id: Uuid, update: &FieldUpdate) -> Result<(), AppError> {
    if update.field.is_empty() {
        return Err(AppError::BadRequest("Field missing".to_string()));
    }
    find_version(pool, version_id).await?;
    let (spec, value) = VERSION_FIELDS.resolve(&update.field, &update.value)?;
    db::versions::set_field(pool, version_id, spec, &value).await?;
    tracing::debug!(%version_id, field = %update.field, "version field updated");
    Ok(())
}

/// Batch edit. Unknown fields and malformed dates are skipped; returns how many were written.
pub async fn set_version_fields(
    pool: &PgPool,
    version_id: Uuid,
    updates: &[FieldUpdate],
) -> Result<usize, AppError> {
    if updates.is_empty() {
        return Err(AppError::BadRequest("No updates provided".to_string()));
    }
    find_version(pool, version_id).await?;

    let mut tx = pool.begin().await?;
    let mut applied = 0;
    for update in updates {
        match VERSION_FIELDS.resolve(&update.field, &update.value) {
            Ok((spec, value)) => {
                db::versions::set_field(&mut *tx, version_id, spec, &value).await?;
                applied += 1;
            }
            Err(e) => tracing::debug!(%version_id, "skipping update: {e}"),
        }
    }
    tx.commit().await?;

    Ok(applied)
}

/// Set status or phase on the current version, checked against its vocabulary.
pub async fn set_current_category(
    pool: &PgPool,
    project_id: Uuid,
    field: &str,
    value: &str,
) -> Result<(), AppError> {
    let valid = match field {
        "status" => is_valid_status(value),
        "phase" => is_valid_phase(value),
        _ => false,
    };

    let state = load_state(pool, project_id).await?;
    let current = state
        .current
        .ok_or_else(|| AppError::NotFound("No version found".to_string()))?;

    if !valid {
        return Err(AppError::BadRequest(format!("Invalid {field}")));
    }

    let update = FieldUpdate {
        field: field.to_string(),
        value: Value::String(value.to_string()),
    };
    let (spec, value) = VERSION_FIELDS.resolve(&update.field, &update.value)?;
    db::versions::set_field(pool, current.id, spec, &value).await?;
    tracing::info!(%project_id, version_id = %current.id, field, "current version updated");
    Ok(())
}

/// Delete a project and the files of its documents.
pub async fn delete_project(state: &SharedState, id: Uuid) -> Result<(), AppError> {
    let filenames = db::documents::filenames_by_project(&state.pool, id).await?;
    if !db::projects::delete(&state.pool, id).await? {
        return Err(AppError::NotFound("Project not found".to_string()));
    }

    for filename in filenames {
        if let Err(e) = state.uploads.remove(&filename).await {
            tracing::warn!(%filename, "failed to remove document file: {e}");
        }
    }

    tracing::info!(project_id = %id, "project deleted");
    Ok(())
}

pub async fn add_custom_field(pool: &PgPool, project_id: Uuid, name: &str, value: &str) -> Result<(), AppError> {
    find_project(pool, project_id).await?;
    let (name, value) = (name.trim(), value.trim());
    if name.is_empty() || value.is_empty() {
        return Err(AppError::BadRequest("Name and value are required".to_string()));
    }
    if name.chars().count() > 50 || value.chars().count() > 200 {
        return Err(AppError::BadRequest("Custom field is too long".to_string()));
    }
    db::custom_fields::create(pool, project_id, name, value).await?;
    Ok(())
}

/// Returns the project id the field belonged to.
pub async fn delete_custom_field(pool: &PgPool, id: Uuid) -> Result<Uuid, AppError> {
    db::custom_fields::delete(pool, id)
        .await?
        .map(|field| field.project_id)
        .ok_or_else(|| AppError::NotFound("Custom field not found".to_string()))
}

pub async fn store_document(
    state: &SharedState,
    project_id: Uuid,
    display_name: Option<&str>,
    original_filename: &str,
    bytes: &[u8],
) -> Result<Document, AppError> {
    find_project(&state.pool, project_id).await?;
    if original_filename.is_empty() {
        return Err(AppError::BadRequest("No file selected".to_string()));
    }
    if bytes.len() > state.config.max_upload_size {
        return Err(AppError::BadRequest(format!(
            "File exceeds the {} byte upload limit",
            state.config.max_upload_size
        )));
    }

    let filename = state.uploads.save(original_filename, bytes).await?;
    let name: String = non_empty(display_name)
        .unwrap_or(original_filename)
        .chars()
        .take(100)
        .collect();

    let document = match db::documents::create(&state.pool, project_id, &name, &filename).await {
        Ok(document) => document,
        Err(e) => {
            if let Err(io) = state.uploads.remove(&filename).await {
                tracing::warn!(%filename, "failed to remove orphaned upload: {io}");
            }
            return Err(e.into());
        }
    };
    tracing::info!(%project_id, document_id = %document.id, %filename, "document stored");
    Ok(document)
}

pub async fn find_document(pool: &PgPool, id: Uuid) -> Result<Document, AppError> {
    db::documents::find_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Document not found".to_string()))
}

/// Returns the project id the document belonged to.
pub async fn delete_document(state: &SharedState, id: Uuid) -> Result<Uuid, AppError> {
    let document = find_document(&state.pool, id).await?;
    state.uploads.remove(&document.filename).await?;
    db::documents::delete(&state.pool, id).await?;
    tracing::info!(document_id = %id, "document deleted");
    Ok(document.project_id)
}
