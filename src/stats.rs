use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::lineage::ProjectState;
use crate::models::ContextRequest;

const ACTIVE_STATUSES: [&str; 2] = ["In progress", "Review"];
const CLOSED_STATUSES: [&str; 3] = ["Done", "Stopped", "Gel"];
const UPCOMING_LIMIT: usize = 10;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total_projects: usize,
    pub active_projects: usize,
    pub completed_projects: usize,
    pub overdue_projects: usize,
    /// Average budget consumed across all projects, truncated.
    pub budget_consumed: i64,
    pub total_cost: f64,
    pub status_counts: StatusCounts,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub in_progress: usize,
    pub done: usize,
    pub pending: usize,
    pub other: usize,
}

/// Headline numbers for the dashboard. Projects without a version only count toward
/// the total.
pub fn dashboard(projects: &[ProjectState], today: NaiveDate) -> DashboardStats {
    let mut stats = DashboardStats {
        total_projects: projects.len(),
        ..Default::default()
    };
    let mut total_budget: i64 = 0;

    for version in projects.iter().filter_map(|p| p.current.as_ref()) {
        let status = version.status.as_deref().unwrap_or_default();

        if ACTIVE_STATUSES.contains(&status) {
            stats.active_projects += 1;
            stats.status_counts.in_progress += 1;
        } else if status == "Done" {
            stats.completed_projects += 1;
            stats.status_counts.done += 1;
        } else if status == "Not started" {
            stats.status_counts.pending += 1;
        } else {
            stats.status_counts.other += 1;
        }

        if !CLOSED_STATUSES.contains(&status) && version.deadline.is_some_and(|d| d < today) {
            stats.overdue_projects += 1;
        }

        total_budget += i64::from(version.budget_consumed);
        stats.total_cost += version.cost;
    }

    if stats.total_projects > 0 {
        stats.budget_consumed = total_budget / stats.total_projects as i64;
    }

    stats
}

/// Projects in Review or Done, Review first, then by deadline with undated ones last.
pub fn upcoming_deliverables(projects: &[ProjectState]) -> Vec<&ProjectState> {
    let mut upcoming: Vec<&ProjectState> = projects
        .iter()
        .filter(|p| {
            p.current
                .as_ref()
                .and_then(|v| v.status.as_deref())
                .is_some_and(|s| s == "Review" || s == "Done")
        })
        .collect();

    upcoming.sort_by_key(|p| {
        let version = p.current.as_ref();
        let in_review = version.and_then(|v| v.status.as_deref()) == Some("Review");
        let deadline = version.and_then(|v| v.deadline).unwrap_or(NaiveDate::MAX);
        (!in_review, deadline)
    });
    upcoming.truncate(UPCOMING_LIMIT);
    upcoming
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PortfolioStats {
    pub total_projects: usize,
    pub active_count: usize,
    pub total_cost: f64,
    pub by_category: BTreeMap<String, usize>,
    pub by_phase: BTreeMap<String, usize>,
    pub by_status: BTreeMap<String, usize>,
    pub cost_by_category: BTreeMap<String, f64>,
    pub progress_distribution: BTreeMap<&'static str, usize>,
}

pub const PROGRESS_BUCKETS: [&str; 4] = ["0-25%", "26-50%", "51-75%", "76-100%"];

pub fn progress_bucket(progress: i32) -> &'static str {
    match progress {
        i32::MIN..=25 => PROGRESS_BUCKETS[0],
        26..=50 => PROGRESS_BUCKETS[1],
        51..=75 => PROGRESS_BUCKETS[2],
        _ => PROGRESS_BUCKETS[3],
    }
}

/// Aggregations for the statistics page.
pub fn portfolio(projects: &[ProjectState]) -> PortfolioStats {
    let mut stats = PortfolioStats {
        total_projects: projects.len(),
        progress_distribution: PROGRESS_BUCKETS.iter().map(|b| (*b, 0)).collect(),
        ..Default::default()
    };

    for state in projects {
        let category = non_empty(state.project.category.as_deref()).unwrap_or("Uncategorized");
        *stats.by_category.entry(category.to_string()).or_default() += 1;

        let Some(version) = state.current.as_ref() else {
            continue;
        };

        let phase = non_empty(version.phase.as_deref()).unwrap_or("Undefined");
        *stats.by_phase.entry(phase.to_string()).or_default() += 1;

        let status = non_empty(version.status.as_deref()).unwrap_or("Undefined");
        *stats.by_status.entry(status.to_string()).or_default() += 1;
        if ACTIVE_STATUSES.contains(&status) {
            stats.active_count += 1;
        }

        stats.total_cost += version.cost;
        *stats.cost_by_category.entry(category.to_string()).or_default() += version.cost;

        *stats
            .progress_distribution
            .entry(progress_bucket(version.progress))
            .or_default() += 1;
    }

    stats
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestStats {
    pub total_requests: usize,
    pub priority: BTreeMap<&'static str, usize>,
    pub difficulty: BTreeMap<&'static str, usize>,
    pub improvement: BTreeMap<&'static str, usize>,
    pub approval: BTreeMap<&'static str, usize>,
}

const PRIORITY_KEYS: [&str; 4] = ["Low", "Medium", "High", "Urgent"];
const DIFFICULTY_KEYS: [&str; 4] = ["Easy", "Medium", "Hard", "Not decided"];
const IMPROVEMENT_KEYS: [&str; 3] = ["Yes", "No", "Not decided"];
const APPROVAL_KEYS: [&str; 3] = ["Pending", "Approved", "Rejected"];

/// Counts over a filtered request list. Values outside the known keys are ignored.
pub fn requests(requests: &[ContextRequest]) -> RequestStats {
    let mut stats = RequestStats {
        total_requests: requests.len(),
        priority: zeroed(&PRIORITY_KEYS),
        difficulty: zeroed(&DIFFICULTY_KEYS),
        improvement: zeroed(&IMPROVEMENT_KEYS),
        approval: zeroed(&APPROVAL_KEYS),
    };

    for request in requests {
        bump(&mut stats.priority, &request.priority_level);
        bump(&mut stats.difficulty, &request.difficulty_level);
        bump(&mut stats.improvement, &request.planned_improvement);
        bump(&mut stats.approval, &request.approved);
    }

    stats
}

fn zeroed(keys: &[&'static str]) -> BTreeMap<&'static str, usize> {
    keys.iter().map(|k| (*k, 0)).collect()
}

fn bump(counts: &mut BTreeMap<&'static str, usize>, key: &str) {
    if let Some(count) = counts.get_mut(key) {
        *count += 1;
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}
