use askama::Template;
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::CookieJar;
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use uuid::Uuid;

use super::flash::{self, Flash};
use super::{render, select_options, ProjectRow, SelectOption};
use crate::db;
use crate::db::context_requests::RequestFilter;
use crate::error::AppError;
use crate::forms::{self, FormData};
use crate::lineage::{LineageTree, INITIAL_VERSION};
use crate::models::vocabulary::{PHASES, STATUSES};
use crate::models::ProjectVersion;
use crate::schedule;
use crate::service::{self, ProjectDraft};
use crate::state::SharedState;

/// Form keys that are not version fields.
const PROJECT_KEYS: [&str; 5] = [
    "name",
    "category",
    "version_number",
    "custom_field_name[]",
    "custom_field_value[]",
];

#[derive(Template)]
#[template(path = "projects.html")]
struct ProjectsTemplate {
    flash: Option<Flash>,
    projects: Vec<ProjectRow>,
}

#[derive(Template)]
#[template(path = "project_form.html")]
struct ProjectFormTemplate {
    flash: Option<Flash>,
    action: String,
    is_edit: bool,
    name: String,
    category: String,
    version_number: String,
    inputs: Vec<FormInput>,
}

#[derive(Template)]
#[template(path = "project_detail.html")]
struct ProjectDetailTemplate {
    flash: Option<Flash>,
    project_id: String,
    name: String,
    category: String,
    created_at: String,
    suggested_version: String,
    versions: Vec<VersionItem>,
    selected: Option<SelectedVersion>,
    custom_fields: Vec<NamedValue>,
    documents: Vec<DocumentItem>,
}

struct VersionItem {
    id: String,
    label: String,
    created_at: String,
    selected: bool,
    current: bool,
    parent: String,
    children: usize,
}

struct SelectedVersion {
    id: String,
    label: String,
    lineage: String,
    theoretical_end: String,
    display_start: String,
    display_end: String,
    fields: Vec<FormInput>,
    requests: Vec<RequestItem>,
}

struct NamedValue {
    id: String,
    name: String,
    value: String,
}

struct DocumentItem {
    id: String,
    name: String,
    uploaded_at: String,
}

struct RequestItem {
    requester: String,
    role: String,
    description: String,
    tags: String,
    priority: String,
    difficulty: String,
    approved: String,
}

/// One input of the version form, also used as a label/value pair on the detail page.
struct FormInput {
    name: &'static str,
    label: &'static str,
    kind: &'static str,
    value: String,
    options: Vec<SelectOption>,
}

fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn date(value: Option<NaiveDate>) -> String {
    value.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default()
}

fn input(name: &'static str, label: &'static str, kind: &'static str, value: String) -> FormInput {
    FormInput {
        name,
        label,
        kind,
        value,
        options: Vec::new(),
    }
}

fn select(name: &'static str, label: &'static str, choices: &[&str], value: String) -> FormInput {
    FormInput {
        name,
        label,
        kind: "select",
        options: select_options(choices.iter().copied(), Some(value.as_str())),
        value,
    }
}

fn version_inputs(version: Option<&ProjectVersion>, planning: bool) -> Vec<FormInput> {
    let blank = ProjectVersion {
        cost_type: Some("Monthly".to_string()),
        planned_improvement: "Not decided".to_string(),
        improvement_type: "Not decided".to_string(),
        difficulty_level: "Not decided".to_string(),
        priority_level: "Medium".to_string(),
        ..Default::default()
    };
    let v = version.unwrap_or(&blank);

    let mut inputs = vec![
        select("phase", "Phase", &PHASES, v.phase.clone().unwrap_or_else(|| "Intake".to_string())),
        select(
            "status",
            "Status",
            &STATUSES,
            v.status.clone().unwrap_or_else(|| "Not started".to_string()),
        ),
        input("app_status", "Application status", "text", text(&v.app_status)),
        input("integration_level", "Integration level", "text", text(&v.integration_level)),
        input("hosting", "Hosting", "text", text(&v.hosting)),
        input("accessibility", "Accessibility", "text", text(&v.accessibility)),
        input("progress", "Progress (%)", "number", v.progress.to_string()),
        input("deadline", "Deadline", "date", date(v.deadline)),
        input("team_members", "Team", "text", text(&v.team_members)),
        input("budget_consumed", "Budget consumed (%)", "number", v.budget_consumed.to_string()),
        input("cost", "Cost", "number", v.cost.to_string()),
        select("cost_type", "Billing period", &["Monthly", "Annual"], text(&v.cost_type)),
        input("objective", "Objective", "textarea", text(&v.objective)),
        input("target_audience", "Target audience", "textarea", text(&v.target_audience)),
        input("features", "Features", "textarea", text(&v.features)),
        input("whats_new", "What's new", "textarea", text(&v.whats_new)),
        input("description", "Description", "textarea", text(&v.description)),
        input("start_date", "Start date", "date", date(v.start_date)),
        input("duration_days", "Duration (working days)", "number", v.duration_days.to_string()),
        input("pause_start", "Pause start", "date", date(v.pause_start)),
        input("pause_end", "Pause end", "date", date(v.pause_end)),
    ];

    if planning {
        inputs.extend([
            input("requester", "Requester", "text", text(&v.requester)),
            input(
                "request_description",
                "Request description",
                "textarea",
                text(&v.request_description),
            ),
            input("user_request_type", "User request types", "text", text(&v.user_request_type)),
            input("tech_request_type", "Technical request types", "text", text(&v.tech_request_type)),
            select(
                "planned_improvement",
                "Planned improvement",
                &["Yes", "No", "Not decided"],
                v.planned_improvement.clone(),
            ),
            select(
                "improvement_type",
                "Improvement size",
                &["Patch", "Minor", "Major", "Not decided"],
                v.improvement_type.clone(),
            ),
            select(
                "difficulty_level",
                "Difficulty",
                &["Easy", "Medium", "Hard", "Not decided"],
                v.difficulty_level.clone(),
            ),
            select(
                "priority_level",
                "Priority",
                &["Low", "Medium", "High", "Urgent"],
                v.priority_level.clone(),
            ),
        ]);
    }

    inputs
}

pub async fn index(
    State(state): State<SharedState>,
    jar: CookieJar,
) -> Result<impl IntoResponse, AppError> {
    let today = Local::now().date_naive();
    let states = service::load_all_states(&state.pool).await?;
    let (jar, flash) = flash::take(jar);

    let template = ProjectsTemplate {
        flash,
        projects: states.iter().map(|s| ProjectRow::new(s, today)).collect(),
    };
    Ok((jar, render(&template)))
}

pub async fn new_form(jar: CookieJar) -> impl IntoResponse {
    let (jar, flash) = flash::take(jar);
    let template = ProjectFormTemplate {
        flash,
        action: "/projects/new".to_string(),
        is_edit: false,
        name: String::new(),
        category: String::new(),
        version_number: INITIAL_VERSION.to_string(),
        inputs: version_inputs(None, false),
    };
    (jar, render(&template))
}

pub async fn create(State(state): State<SharedState>, jar: CookieJar, body: Bytes) -> Response {
    let form = FormData::parse(&body);
    let draft = ProjectDraft {
        name: form.get("name").unwrap_or_default().to_string(),
        category: form.get("category").map(str::to_string),
        version_number: form.get("version_number").map(str::to_string),
        version_fields: form.field_updates(&PROJECT_KEYS),
        custom_fields: form.custom_fields(),
    };

    match service::create_project(&state.pool, draft).await {
        Ok(_) => flash::redirect(jar, "/projects", "success", "Project created").into_response(),
        Err(e) => flash::redirect_error(jar, "/projects/new", e).into_response(),
    }
}

#[derive(Deserialize)]
pub struct ShowQuery {
    pub version_id: Option<String>,
}

pub async fn show(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Query(query): Query<ShowQuery>,
    jar: CookieJar,
) -> Result<impl IntoResponse, AppError> {
    let project_state = service::load_state(&state.pool, id).await?;
    let versions = db::versions::list_by_project(&state.pool, id).await?;
    let current_id = project_state.current.as_ref().map(|v| v.id);

    // A version id from another project falls back to the current version.
    let selected_id = query
        .version_id
        .as_deref()
        .and_then(|s| s.parse::<Uuid>().ok())
        .filter(|vid| versions.iter().any(|v| v.id == *vid))
        .or(current_id);

    let tree = LineageTree::new(versions.clone());
    let today = Local::now().date_naive();

    let version_items = versions
        .iter()
        .map(|v| VersionItem {
            id: v.id.to_string(),
            label: v.version_number.clone(),
            created_at: v.created_at.format("%Y-%m-%d %H:%M").to_string(),
            selected: Some(v.id) == selected_id,
            current: Some(v.id) == current_id,
            parent: tree
                .parent(v.id)
                .map(|p| p.version_number.clone())
                .unwrap_or_default(),
            children: tree.children(v.id).len(),
        })
        .collect();

    let selected = match selected_id.and_then(|vid| tree.get(vid)) {
        Some(version) => {
            let filter = RequestFilter {
                version_id: Some(version.id),
                ..Default::default()
            };
            let requests = db::context_requests::list(&state.pool, &filter)
                .await?
                .into_iter()
                .map(|row| RequestItem {
                    tags: row.request.tags().join(", "),
                    requester: text(&row.request.requester),
                    role: text(&row.request.requester_role),
                    description: text(&row.request.description),
                    priority: row.request.priority_level,
                    difficulty: row.request.difficulty_level,
                    approved: row.request.approved,
                })
                .collect();

            let theoretical = version.theoretical_end_date();
            let start = version
                .start_date
                .unwrap_or_else(|| version.created_at.date_naive());
            let (display_start, display_end) =
                schedule::display_span(start, theoretical, version.deadline, today);

            let lineage = std::iter::once(version)
                .chain(tree.ancestry(version.id))
                .map(|v| v.version_number.as_str())
                .collect::<Vec<_>>()
                .join(" ← ");

            Some(SelectedVersion {
                id: version.id.to_string(),
                label: version.version_number.clone(),
                lineage,
                theoretical_end: version.theoretical_end_label(),
                display_start: display_start.format("%d %b %Y").to_string(),
                display_end: display_end.format("%d %b %Y").to_string(),
                fields: version_inputs(Some(version), true),
                requests,
            })
        }
        None => None,
    };

    let custom_fields = db::custom_fields::list_by_project(&state.pool, id)
        .await?
        .into_iter()
        .map(|f| NamedValue {
            id: f.id.to_string(),
            name: f.name,
            value: f.value.unwrap_or_default(),
        })
        .collect();

    let documents = db::documents::list_by_project(&state.pool, id)
        .await?
        .into_iter()
        .map(|d| DocumentItem {
            id: d.id.to_string(),
            name: d.name,
            uploaded_at: d.uploaded_at.format("%Y-%m-%d %H:%M").to_string(),
        })
        .collect();

    let (jar, flash) = flash::take(jar);
    let template = ProjectDetailTemplate {
        flash,
        project_id: id.to_string(),
        suggested_version: project_state.suggested_next_version(),
        name: project_state.project.name,
        category: project_state.project.category.unwrap_or_default(),
        created_at: project_state.project.created_at.format("%Y-%m-%d").to_string(),
        versions: version_items,
        selected,
        custom_fields,
        documents,
    };
    Ok((jar, render(&template)))
}

pub async fn edit_form(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    jar: CookieJar,
) -> Result<impl IntoResponse, AppError> {
    let project_state = service::load_state(&state.pool, id).await?;
    let (jar, flash) = flash::take(jar);

    let template = ProjectFormTemplate {
        flash,
        action: format!("/projects/{id}/edit"),
        is_edit: true,
        version_number: project_state
            .current
            .as_ref()
            .map(|v| v.version_number.clone())
            .unwrap_or_default(),
        inputs: version_inputs(project_state.current.as_ref(), true),
        name: project_state.project.name,
        category: project_state.project.category.unwrap_or_default(),
    };
    Ok((jar, render(&template)))
}

pub async fn update(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    jar: CookieJar,
    body: Bytes,
) -> Response {
    let form = FormData::parse(&body);
    let result = service::update_project(
        &state.pool,
        id,
        form.get("name").unwrap_or_default(),
        form.get("category"),
        form.get("version_number"),
        &form.field_updates(&PROJECT_KEYS),
    )
    .await;

    match result {
        Ok(_) => flash::redirect(jar, &format!("/projects/{id}"), "success", "Project updated")
            .into_response(),
        Err(e) => flash::redirect_error(jar, &format!("/projects/{id}/edit"), e).into_response(),
    }
}

pub async fn delete(State(state): State<SharedState>, Path(id): Path<Uuid>, jar: CookieJar) -> Response {
    match service::delete_project(&state, id).await {
        Ok(()) => flash::redirect(jar, "/projects", "info", "Project deleted").into_response(),
        Err(e) => flash::redirect_error(jar, "/projects", e).into_response(),
    }
}

pub async fn new_version(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    jar: CookieJar,
    body: Bytes,
) -> Response {
    let form = FormData::parse(&body);
    match service::create_version(&state.pool, id, form.get("version_number")).await {
        Ok(_) => flash::redirect(jar, &format!("/projects/{id}/edit"), "success", "New version created")
            .into_response(),
        Err(e) => flash::redirect_error(jar, &format!("/projects/{id}"), e).into_response(),
    }
}

pub async fn delete_version(
    State(state): State<SharedState>,
    Path((id, version_id)): Path<(Uuid, Uuid)>,
    jar: CookieJar,
) -> Response {
    let back = format!("/projects/{id}");
    match service::delete_version(&state.pool, id, version_id).await {
        Ok(()) => flash::redirect(jar, &back, "success", "Version deleted").into_response(),
        Err(e) => flash::redirect_error(jar, &back, e).into_response(),
    }
}

pub async fn add_custom_field(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    jar: CookieJar,
    body: Bytes,
) -> Response {
    let form = FormData::parse(&body);
    let back = format!("/projects/{id}");
    let name = form.get("name").unwrap_or_default();
    let value = form.get("value").unwrap_or_default();

    match service::add_custom_field(&state.pool, id, name, value).await {
        Ok(()) => flash::redirect(jar, &back, "success", "Custom field added").into_response(),
        Err(e) => flash::redirect_error(jar, &back, e).into_response(),
    }
}

pub async fn delete_custom_field(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    jar: CookieJar,
) -> Response {
    match service::delete_custom_field(&state.pool, id).await {
        Ok(project_id) => {
            flash::redirect(jar, &format!("/projects/{project_id}"), "info", "Field deleted")
                .into_response()
        }
        Err(e) => flash::redirect_error(jar, "/projects", e).into_response(),
    }
}

pub async fn upload_document(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    jar: CookieJar,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let back = format!("/projects/{id}");
    let upload = match forms::parse_upload(&headers, body).await {
        Ok(upload) => upload,
        Err(e) => return flash::redirect(jar, &back, "error", &e).into_response(),
    };

    let result = service::store_document(
        &state,
        id,
        upload.name.as_deref(),
        &upload.filename,
        &upload.bytes,
    )
    .await;

    match result {
        Ok(_) => flash::redirect(jar, &back, "success", "Document added").into_response(),
        Err(e) => flash::redirect_error(jar, &back, e).into_response(),
    }
}

pub async fn delete_document(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    jar: CookieJar,
) -> Response {
    match service::delete_document(&state, id).await {
        Ok(project_id) => {
            flash::redirect(jar, &format!("/projects/{project_id}"), "success", "Document deleted")
                .into_response()
        }
        Err(e) => flash::redirect_error(jar, "/projects", e).into_response(),
    }
}
