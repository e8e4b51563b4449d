use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct CustomField {
    pub id: Uuid,
    pub project_id: Uuid,
    pub name: String,
    pub value: Option<String>,
}
