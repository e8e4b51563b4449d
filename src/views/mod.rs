pub mod dashboard;
pub mod flash;
pub mod gantt;
pub mod projects;
pub mod requests;
pub mod stats;

use askama::Template;
use axum::response::Html;
use axum::routing::{get, post};
use axum::Router;
use chrono::NaiveDate;

use crate::lineage::ProjectState;
use crate::schedule;
use crate::state::SharedState;

pub fn view_routes() -> Router<SharedState> {
    Router::new()
        .route("/", get(dashboard::index))
        // Projects
        .route("/projects", get(projects::index))
        .route("/projects/new", get(projects::new_form).post(projects::create))
        .route("/projects/{id}", get(projects::show))
        .route("/projects/{id}/edit", get(projects::edit_form).post(projects::update))
        .route("/projects/{id}/delete", post(projects::delete))
        .route("/projects/{id}/new-version", post(projects::new_version))
        .route(
            "/projects/{id}/versions/{version_id}/delete",
            post(projects::delete_version),
        )
        .route("/projects/{id}/custom-fields", post(projects::add_custom_field))
        .route("/custom-fields/{id}/delete", post(projects::delete_custom_field))
        .route("/projects/{id}/documents", post(projects::upload_document))
        .route("/documents/{id}", get(crate::routes::documents::download))
        .route("/documents/{id}/delete", post(projects::delete_document))
        // Requests, statistics, Gantt
        .route("/requests", get(requests::index))
        .route("/stats", get(stats::index))
        .route("/gantt", get(gantt::index))
}

/// Render a template, logging (not propagating) template errors.
pub fn render<T: Template>(template: &T) -> Html<String> {
    Html(template.render().unwrap_or_else(|e| {
        tracing::error!("Template render failed: {e}");
        String::new()
    }))
}

/// A project as shown in lists: every value read through its current version.
pub struct ProjectRow {
    pub id: String,
    pub name: String,
    pub category: String,
    pub version: String,
    pub status: String,
    pub phase: String,
    pub progress: i32,
    pub deadline: String,
    pub theoretical_end: String,
    pub team: String,
    pub overdue: bool,
}

impl ProjectRow {
    pub fn new(state: &ProjectState, today: NaiveDate) -> Self {
        let status = state.status();
        let deadline = state.deadline();
        let overdue = !matches!(status.as_str(), "Done" | "Stopped" | "Gel")
            && deadline.is_some_and(|d| d < today);

        Self {
            id: state.project.id.to_string(),
            name: state.project.name.clone(),
            category: state.project.category.clone().unwrap_or_default(),
            version: state
                .current
                .as_ref()
                .map(|v| v.version_number.clone())
                .unwrap_or_default(),
            phase: state.phase(),
            progress: state.progress(),
            deadline: schedule::format_date(deadline, "Not set"),
            theoretical_end: schedule::format_date(state.theoretical_end_date(), "Not calculated"),
            team: state.team().join(", "),
            status,
            overdue,
        }
    }
}

/// Option of a `<select>`, with its selection precomputed.
pub struct SelectOption {
    pub value: String,
    pub selected: bool,
}

pub fn select_options<'a>(
    values: impl IntoIterator<Item = &'a str>,
    current: Option<&str>,
) -> Vec<SelectOption> {
    values
        .into_iter()
        .map(|value| SelectOption {
            value: value.to_string(),
            selected: current == Some(value),
        })
        .collect()
}
