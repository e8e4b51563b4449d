use askama::Template;
use axum::extract::State;
use axum::response::IntoResponse;
use axum_extra::extract::CookieJar;

use super::flash::{self, Flash};
use super::render;
use crate::error::AppError;
use crate::service;
use crate::state::SharedState;
use crate::stats;

#[derive(Template)]
#[template(path = "stats.html")]
struct StatsTemplate {
    flash: Option<Flash>,
    total_projects: usize,
    active_count: usize,
    total_cost: String,
    by_category: Vec<Count>,
    by_phase: Vec<Count>,
    by_status: Vec<Count>,
    cost_by_category: Vec<(String, String)>,
    progress: Vec<Count>,
}

struct Count {
    label: String,
    count: usize,
    /// Share of the largest count, for bar widths.
    percent: usize,
}

fn counts<'a, K: AsRef<str> + 'a>(entries: impl IntoIterator<Item = (&'a K, &'a usize)>) -> Vec<Count> {
    let pairs: Vec<(String, usize)> = entries
        .into_iter()
        .map(|(k, v)| (k.as_ref().to_string(), *v))
        .collect();
    let max = pairs.iter().map(|(_, v)| *v).max().unwrap_or(0).max(1);
    pairs
        .into_iter()
        .map(|(label, count)| Count {
            percent: count * 100 / max,
            label,
            count,
        })
        .collect()
}

pub async fn index(
    State(state): State<SharedState>,
    jar: CookieJar,
) -> Result<impl IntoResponse, AppError> {
    let states = service::load_all_states(&state.pool).await?;
    let portfolio = stats::portfolio(&states);

    let (jar, flash) = flash::take(jar);
    let template = StatsTemplate {
        flash,
        total_projects: portfolio.total_projects,
        active_count: portfolio.active_count,
        total_cost: format!("{:.2}", portfolio.total_cost),
        by_category: counts(&portfolio.by_category),
        by_phase: counts(&portfolio.by_phase),
        by_status: counts(&portfolio.by_status),
        cost_by_category: portfolio
            .cost_by_category
            .iter()
            .map(|(k, v)| (k.clone(), format!("{v:.2}")))
            .collect(),
        progress: counts(&portfolio.progress_distribution),
    };
    Ok((jar, render(&template)))
}
