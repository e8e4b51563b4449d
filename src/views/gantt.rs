use askama::Template;
use axum::extract::State;
use axum::response::IntoResponse;
use axum_extra::extract::CookieJar;
use chrono::{Local, NaiveDate};

use super::flash::{self, Flash};
use super::render;
use crate::error::AppError;
use crate::lineage::ProjectState;
use crate::schedule::{self, GanttTask};
use crate::service;
use crate::state::SharedState;

#[derive(Template)]
#[template(path = "gantt.html")]
struct GanttTemplate {
    flash: Option<Flash>,
    range_start: String,
    range_end: String,
    bars: Vec<GanttBar>,
    tasks_json: String,
}

/// A task placed on the shared timeline, in percent of its width.
pub struct GanttBar {
    pub task: GanttTask,
    pub offset: f64,
    pub width: f64,
}

/// The Gantt task of a project, or none when it has no version yet.
pub fn gantt_task(state: &ProjectState, today: NaiveDate) -> Option<GanttTask> {
    let version = state.current.as_ref()?;
    let start = version
        .start_date
        .unwrap_or_else(|| version.created_at.date_naive());
    let (start, end) =
        schedule::display_span(start, version.theoretical_end_date(), version.deadline, today);

    Some(GanttTask {
        id: state.project.id.to_string(),
        name: format!("{} ({})", state.project.name, version.version_number),
        start: start.format("%Y-%m-%d").to_string(),
        end: end.format("%Y-%m-%d").to_string(),
        progress: version.progress.clamp(0, 100),
        custom_class: schedule::bar_class(version.status.as_deref().unwrap_or_default()).to_string(),
    })
}

/// Lay the tasks out on a timeline spanning the earliest start to the latest end.
pub fn layout(tasks: Vec<GanttTask>) -> (Option<(NaiveDate, NaiveDate)>, Vec<GanttBar>) {
    let placed: Vec<(GanttTask, NaiveDate, NaiveDate)> = tasks
        .into_iter()
        .filter_map(|t| {
            let start = parse_day(&t.start)?;
            let end = parse_day(&t.end)?;
            Some((t, start, end))
        })
        .collect();
    let (Some(first), Some(last)) = (
        placed.iter().map(|(_, s, _)| *s).min(),
        placed.iter().map(|(_, _, e)| *e).max(),
    ) else {
        return (None, Vec::new());
    };
    let total = (last - first).num_days().max(1) as f64;

    let bars = placed
        .into_iter()
        .map(|(task, start, end)| GanttBar {
            offset: (start - first).num_days() as f64 * 100.0 / total,
            width: ((end - start).num_days().max(1) as f64 * 100.0 / total).min(100.0),
            task,
        })
        .collect();
    (Some((first, last)), bars)
}

fn parse_day(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

pub async fn index(
    State(state): State<SharedState>,
    jar: CookieJar,
) -> Result<impl IntoResponse, AppError> {
    let today = Local::now().date_naive();
    let states = service::load_all_states(&state.pool).await?;
    let tasks: Vec<GanttTask> = states.iter().filter_map(|s| gantt_task(s, today)).collect();

    // Embedded in a <script> block.
    let tasks_json = serde_json::to_string(&tasks)
        .unwrap_or_else(|_| "[]".to_string())
        .replace("</", "<\\/");

    let (range, bars) = layout(tasks);
    let (range_start, range_end) = range
        .map(|(s, e)| (schedule::format_date(Some(s), ""), schedule::format_date(Some(e), "")))
        .unwrap_or_default();

    let (jar, flash) = flash::take(jar);
    let template = GanttTemplate {
        flash,
        range_start,
        range_end,
        bars,
        tasks_json,
    };
    Ok((jar, render(&template)))
}
