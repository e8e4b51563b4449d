use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    pub project_id: Uuid,
    pub name: String,
    /// Name of the stored file inside the upload directory.
    pub filename: String,
    pub uploaded_at: DateTime<Utc>,
}
