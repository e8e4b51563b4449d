use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::models::CustomField;

pub async fn list_by_project(
    pool: &PgPool,
    project_id: Uuid,
) -> Result<Vec<CustomField>, sqlx::Error> {
    sqlx::query_as::<_, CustomField>(
        "SELECT * FROM custom_fields WHERE project_id = $1 ORDER BY id ASC",
    )
    .bind(project_id)
    .fetch_all(pool)
    .await
}

pub async fn create<'e, E: PgExecutor<'e>>(
    executor: E,
    project_id: Uuid,
    name: &str,
    value: &str,
) -> Result<CustomField, sqlx::Error> {
    sqlx::query_as::<_, CustomField>(
        "INSERT INTO custom_fields (id, project_id, name, value)
         VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(project_id)
    .bind(name)
    .bind(value)
    .fetch_one(executor)
    .await
}

/// Returns the deleted row so callers know which project it belonged to.
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<Option<CustomField>, sqlx::Error> {
    sqlx::query_as::<_, CustomField>("DELETE FROM custom_fields WHERE id = $1 RETURNING *")
        .bind(id)
        .fetch_optional(pool)
        .await
}
