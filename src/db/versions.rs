use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::fields::{FieldSpec, FieldValue};
use crate::models::{NewVersion, ProjectVersion};

/// Newest first.
pub async fn list_by_project(
    pool: &PgPool,
    project_id: Uuid,
) -> Result<Vec<ProjectVersion>, sqlx::Error> {
    sqlx::query_as::<_, ProjectVersion>(
        "SELECT * FROM project_versions WHERE project_id = $1
         ORDER BY created_at DESC, id DESC",
    )
    .bind(project_id)
    .fetch_all(pool)
    .await
}

pub async fn list_all(pool: &PgPool) -> Result<Vec<ProjectVersion>, sqlx::Error> {
    sqlx::query_as::<_, ProjectVersion>(
        "SELECT * FROM project_versions ORDER BY created_at DESC, id DESC",
    )
    .fetch_all(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<ProjectVersion>, sqlx::Error> {
    sqlx::query_as::<_, ProjectVersion>("SELECT * FROM project_versions WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn count_for_project(pool: &PgPool, project_id: Uuid) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM project_versions WHERE project_id = $1")
        .bind(project_id)
        .fetch_one(pool)
        .await?;
    Ok(row.0)
}

pub async fn insert<'e, E: PgExecutor<'e>>(
    executor: E,
    project_id: Uuid,
    v: &NewVersion,
) -> Result<ProjectVersion, sqlx::Error> {
    sqlx::query_as::<_, ProjectVersion>(
        "INSERT INTO project_versions (
            id, project_id, version_number, parent_id,
            phase, status, app_status, integration_level, hosting, accessibility,
            cost, cost_type, objective, target_audience, features, whats_new,
            start_date, duration_days, pause_start, pause_end,
            requester, request_description, user_request_type, tech_request_type,
            planned_improvement, improvement_type, difficulty_level, priority_level,
            progress, deadline, team_members, budget_consumed, description
         ) VALUES (
            $1, $2, $3, $4,
            $5, $6, $7, $8, $9, $10,
            $11, $12, $13, $14, $15, $16,
            $17, $18, $19, $20,
            $21, $22, $23, $24,
            $25, $26, $27, $28,
            $29, $30, $31, $32, $33
         ) RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(project_id)
    .bind(&v.version_number)
    .bind(v.parent_id)
    .bind(&v.phase)
    .bind(&v.status)
    .bind(&v.app_status)
    .bind(&v.integration_level)
    .bind(&v.hosting)
    .bind(&v.accessibility)
    .bind(v.cost)
    .bind(&v.cost_type)
    .bind(&v.objective)
    .bind(&v.target_audience)
    .bind(&v.features)
    .bind(&v.whats_new)
    .bind(v.start_date)
    .bind(v.duration_days)
    .bind(v.pause_start)
    .bind(v.pause_end)
    .bind(&v.requester)
    .bind(&v.request_description)
    .bind(&v.user_request_type)
    .bind(&v.tech_request_type)
    .bind(&v.planned_improvement)
    .bind(&v.improvement_type)
    .bind(&v.difficulty_level)
    .bind(&v.priority_level)
    .bind(v.progress)
    .bind(v.deadline)
    .bind(&v.team_members)
    .bind(v.budget_consumed)
    .bind(&v.description)
    .fetch_one(executor)
    .await
}

pub async fn update_label<'e, E: PgExecutor<'e>>(
    executor: E,
    id: Uuid,
    version_number: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE project_versions SET version_number = $2 WHERE id = $1")
        .bind(id)
        .bind(version_number)
        .execute(executor)
        .await?;
    Ok(())
}

/// Write one registry field. The column name comes from the registry, never from input.
pub async fn set_field<'e, E: PgExecutor<'e>>(
    executor: E,
    id: Uuid,
    spec: FieldSpec,
    value: &FieldValue,
) -> Result<(), sqlx::Error> {
    let sql = format!("UPDATE project_versions SET {} = $2 WHERE id = $1", spec.column);
    let query = sqlx::query(&sql).bind(id);
    let query = match value {
        FieldValue::Text(v) => query.bind(v.clone()),
        FieldValue::Float(v) => query.bind(*v),
        FieldValue::Int(v) => query.bind(*v),
        FieldValue::Date(v) => query.bind(*v),
    };
    query.execute(executor).await?;
    Ok(())
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM project_versions WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}
