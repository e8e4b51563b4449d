use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Default, sqlx::FromRow, Serialize, Deserialize)]
pub struct ContextRequest {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub version_id: Uuid,
    pub requester: Option<String>,
    pub requester_role: Option<String>,
    pub description: Option<String>,
    /// Comma-joined tags.
    pub user_request_type: Option<String>,
    /// Comma-joined tags.
    pub tech_request_type: Option<String>,
    pub planned_improvement: String,
    pub improvement_type: String,
    pub difficulty_level: String,
    pub priority_level: String,
    pub approved: String,
}

impl ContextRequest {
    pub fn tags(&self) -> Vec<String> {
        [&self.user_request_type, &self.tech_request_type]
            .into_iter()
            .flatten()
            .flat_map(|joined| joined.split(','))
            .map(|tag| tag.trim().to_string())
            .filter(|tag| !tag.is_empty())
            .collect()
    }
}
