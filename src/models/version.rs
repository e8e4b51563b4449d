use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::vocabulary::{DEFAULT_COST_TYPE, DEFAULT_PRIORITY, ImprovementSize, NOT_DECIDED};
use crate::schedule::{self, PauseWindow};

/// A versioned snapshot of a project's state.
#[derive(Debug, Clone, Default, sqlx::FromRow, Serialize, Deserialize)]
pub struct ProjectVersion {
    pub id: Uuid,
    pub project_id: Uuid,
    pub version_number: String,
    pub created_at: DateTime<Utc>,
    pub parent_id: Option<Uuid>,

    pub phase: Option<String>,
    pub status: Option<String>,
    pub app_status: Option<String>,
    pub integration_level: Option<String>,
    pub hosting: Option<String>,
    pub accessibility: Option<String>,

    pub cost: f64,
    pub cost_type: Option<String>,
    pub objective: Option<String>,
    pub target_audience: Option<String>,
    pub features: Option<String>,
    pub whats_new: Option<String>,

    pub start_date: Option<NaiveDate>,
    pub duration_days: i32,
    pub pause_start: Option<NaiveDate>,
    pub pause_end: Option<NaiveDate>,

    pub requester: Option<String>,
    pub request_description: Option<String>,
    pub user_request_type: Option<String>,
    pub tech_request_type: Option<String>,
    pub planned_improvement: String,
    pub improvement_type: String,
    pub difficulty_level: String,
    pub priority_level: String,

    pub progress: i32,
    pub deadline: Option<NaiveDate>,
    pub team_members: Option<String>,
    pub budget_consumed: i32,
    pub description: Option<String>,
}

impl ProjectVersion {
    pub fn pause_window(&self) -> PauseWindow {
        PauseWindow::new(self.pause_start, self.pause_end)
    }

    pub fn theoretical_end_date(&self) -> Option<NaiveDate> {
        schedule::projected_completion_date(
            self.start_date,
            Some(self.duration_days),
            self.pause_window(),
        )
    }

    pub fn team(&self) -> Vec<String> {
        self.team_members
            .as_deref()
            .map(|members| {
                members
                    .split(',')
                    .map(str::trim)
                    .filter(|m| !m.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn improvement_size(&self) -> ImprovementSize {
        ImprovementSize::parse(&self.improvement_type)
    }

    pub fn theoretical_end_label(&self) -> String {
        schedule::format_date(self.theoretical_end_date(), "Not calculated")
    }
}

/// Column values for inserting a version.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewVersion {
    pub version_number: String,
    pub parent_id: Option<Uuid>,

    pub phase: Option<String>,
    pub status: Option<String>,
    pub app_status: Option<String>,
    pub integration_level: Option<String>,
    pub hosting: Option<String>,
    pub accessibility: Option<String>,

    pub cost: f64,
    pub cost_type: Option<String>,
    pub objective: Option<String>,
    pub target_audience: Option<String>,
    pub features: Option<String>,
    pub whats_new: Option<String>,

    pub start_date: Option<NaiveDate>,
    pub duration_days: i32,
    pub pause_start: Option<NaiveDate>,
    pub pause_end: Option<NaiveDate>,

    pub requester: Option<String>,
    pub request_description: Option<String>,
    pub user_request_type: Option<String>,
    pub tech_request_type: Option<String>,
    pub planned_improvement: String,
    pub improvement_type: String,
    pub difficulty_level: String,
    pub priority_level: String,

    pub progress: i32,
    pub deadline: Option<NaiveDate>,
    pub team_members: Option<String>,
    pub budget_consumed: i32,
    pub description: Option<String>,
}

impl NewVersion {
    /// A first version with the column defaults.
    pub fn initial(version_number: impl Into<String>) -> Self {
        Self {
            version_number: version_number.into(),
            cost_type: Some(DEFAULT_COST_TYPE.to_string()),
            planned_improvement: NOT_DECIDED.to_string(),
            improvement_type: NOT_DECIDED.to_string(),
            difficulty_level: NOT_DECIDED.to_string(),
            priority_level: DEFAULT_PRIORITY.to_string(),
            ..Default::default()
        }
    }

    /// Copy of `base` linked as its child. Forward-planning fields and the
    /// what's-new text start over.
    pub fn cloned_from(base: &ProjectVersion, version_number: impl Into<String>) -> Self {
        Self {
            version_number: version_number.into(),
            parent_id: Some(base.id),

            phase: base.phase.clone(),
            status: base.status.clone(),
            app_status: base.app_status.clone(),
            integration_level: base.integration_level.clone(),
            hosting: base.hosting.clone(),
            accessibility: base.accessibility.clone(),

            cost: base.cost,
            cost_type: base.cost_type.clone(),
            objective: base.objective.clone(),
            target_audience: base.target_audience.clone(),
            features: base.features.clone(),
            whats_new: None,

            start_date: base.start_date,
            duration_days: base.duration_days,
            pause_start: base.pause_start,
            pause_end: base.pause_end,

            requester: None,
            request_description: None,
            user_request_type: None,
            tech_request_type: None,
            planned_improvement: NOT_DECIDED.to_string(),
            improvement_type: NOT_DECIDED.to_string(),
            difficulty_level: NOT_DECIDED.to_string(),
            priority_level: DEFAULT_PRIORITY.to_string(),

            progress: base.progress,
            deadline: base.deadline,
            team_members: base.team_members.clone(),
            budget_consumed: base.budget_consumed,
            description: base.description.clone(),
        }
    }
}
