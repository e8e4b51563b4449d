use askama::Template;
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum_extra::extract::CookieJar;

use super::flash::{self, Flash};
use super::{render, select_options, SelectOption};
use crate::db;
use crate::error::AppError;
use crate::models::ContextRequest;
use crate::routes::requests::RequestQuery;
use crate::state::SharedState;
use crate::stats::{self, RequestStats};

#[derive(Template)]
#[template(path = "requests.html")]
struct RequestsTemplate {
    flash: Option<Flash>,
    rows: Vec<RequestItem>,
    stats: RequestStats,
    projects: Vec<ProjectOption>,
    difficulties: Vec<SelectOption>,
    priorities: Vec<SelectOption>,
    approvals: Vec<SelectOption>,
    sorts: Vec<SelectOption>,
    role: String,
    request_type: String,
}

struct ProjectOption {
    id: String,
    name: String,
    selected: bool,
}

struct RequestItem {
    project_id: String,
    project_name: String,
    version_id: String,
    version_number: String,
    requester: String,
    role: String,
    description: String,
    tags: Vec<String>,
    priority: String,
    difficulty: String,
    improvement: String,
    approved: String,
    created_at: String,
}

pub async fn index(
    State(state): State<SharedState>,
    Query(query): Query<RequestQuery>,
    jar: CookieJar,
) -> Result<impl IntoResponse, AppError> {
    let filter = query.to_filter();
    let rows = db::context_requests::list(&state.pool, &filter).await?;
    let requests: Vec<ContextRequest> = rows.iter().map(|r| r.request.clone()).collect();
    let summary = stats::requests(&requests);

    let projects = db::projects::list(&state.pool).await?;
    let project_options = projects
        .into_iter()
        .map(|p| ProjectOption {
            selected: filter.project_id == Some(p.id),
            id: p.id.to_string(),
            name: p.name,
        })
        .collect();

    let items = rows
        .into_iter()
        .map(|row| RequestItem {
            project_id: row.project_id.to_string(),
            project_name: row.project_name,
            version_id: row.request.version_id.to_string(),
            version_number: row.version_number,
            tags: row.request.tags(),
            requester: row.request.requester.unwrap_or_default(),
            role: row.request.requester_role.unwrap_or_default(),
            description: row.request.description.unwrap_or_default(),
            priority: row.request.priority_level,
            difficulty: row.request.difficulty_level,
            improvement: row.request.planned_improvement,
            approved: row.request.approved,
            created_at: row.request.created_at.format("%Y-%m-%d %H:%M").to_string(),
        })
        .collect();

    let (jar, flash) = flash::take(jar);
    let template = RequestsTemplate {
        flash,
        rows: items,
        stats: summary,
        projects: project_options,
        difficulties: select_options(
            ["Easy", "Medium", "Hard", "Not decided"],
            filter.difficulty.as_deref(),
        ),
        priorities: select_options(["Low", "Medium", "High", "Urgent"], filter.priority.as_deref()),
        approvals: select_options(
            ["Pending", "Approved", "Rejected"],
            filter.approved.as_deref(),
        ),
        sorts: select_options(["newest", "oldest"], Some(filter.sort.as_str())),
        role: filter.role.unwrap_or_default(),
        request_type: filter.request_type.unwrap_or_default(),
    };
    Ok((jar, render(&template)))
}
