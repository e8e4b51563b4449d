use askama::Template;
use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum_extra::extract::CookieJar;
use chrono::Local;

use super::flash::{self, Flash};
use super::{render, ProjectRow};
use crate::error::AppError;
use crate::service;
use crate::state::SharedState;
use crate::stats::{self, DashboardStats};

#[derive(Template)]
#[template(path = "dashboard.html")]
struct DashboardTemplate {
    flash: Option<Flash>,
    today: String,
    stats: DashboardStats,
    total_cost: String,
    upcoming: Vec<ProjectRow>,
    projects: Vec<ProjectRow>,
}

pub async fn index(
    State(state): State<SharedState>,
    jar: CookieJar,
) -> Result<impl IntoResponse, AppError> {
    let today = Local::now().date_naive();
    let states = service::load_all_states(&state.pool).await?;

    let summary = stats::dashboard(&states, today);
    let upcoming = stats::upcoming_deliverables(&states)
        .into_iter()
        .map(|s| ProjectRow::new(s, today))
        .collect();
    let projects = states.iter().map(|s| ProjectRow::new(s, today)).collect();

    let (jar, flash) = flash::take(jar);
    let template = DashboardTemplate {
        flash,
        today: today.format("%A %d %B %Y").to_string(),
        total_cost: format!("{:.2}", summary.total_cost),
        stats: summary,
        upcoming,
        projects,
    };

    Ok((
        jar,
        [(header::CACHE_CONTROL, "no-cache, no-store, must-revalidate")],
        render(&template),
    ))
}
