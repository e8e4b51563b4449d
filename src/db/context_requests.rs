use serde::Serialize;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::fields::{FieldSpec, FieldValue};
use crate::models::ContextRequest;

/// Column values for a new request. Category fields hold their defaults when omitted.
#[derive(Debug, Clone)]
pub struct NewRequest {
    pub requester: String,
    pub requester_role: String,
    pub description: String,
    pub user_request_type: String,
    pub tech_request_type: String,
    pub planned_improvement: String,
    pub improvement_type: String,
    pub difficulty_level: String,
    pub priority_level: String,
    pub approved: String,
}

/// A request joined with the version and project it belongs to.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct RequestRow {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub request: ContextRequest,
    pub version_number: String,
    pub project_id: Uuid,
    pub project_name: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
}

impl SortOrder {
    pub fn parse(s: &str) -> Self {
        match s {
            "oldest" => SortOrder::Oldest,
            _ => SortOrder::Newest,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Newest => "newest",
            SortOrder::Oldest => "oldest",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RequestFilter {
    pub project_id: Option<Uuid>,
    pub version_id: Option<Uuid>,
    pub difficulty: Option<String>,
    pub priority: Option<String>,
    pub approved: Option<String>,
    pub role: Option<String>,
    /// Substring matched against both tag columns.
    pub request_type: Option<String>,
    pub sort: SortOrder,
}

pub async fn list(pool: &PgPool, filter: &RequestFilter) -> Result<Vec<RequestRow>, sqlx::Error> {
    let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
        "SELECT r.*, v.version_number, p.id AS project_id, p.name AS project_name
         FROM context_requests r
         JOIN project_versions v ON r.version_id = v.id
         JOIN projects p ON v.project_id = p.id
         WHERE TRUE",
    );

    if let Some(project_id) = filter.project_id {
        qb.push(" AND p.id = ").push_bind(project_id);
    }
    if let Some(version_id) = filter.version_id {
        qb.push(" AND v.id = ").push_bind(version_id);
    }
    if let Some(difficulty) = &filter.difficulty {
        qb.push(" AND r.difficulty_level = ").push_bind(difficulty.clone());
    }
    if let Some(priority) = &filter.priority {
        qb.push(" AND r.priority_level = ").push_bind(priority.clone());
    }
    if let Some(approved) = &filter.approved {
        qb.push(" AND r.approved = ").push_bind(approved.clone());
    }
    if let Some(role) = &filter.role {
        qb.push(" AND r.requester_role = ").push_bind(role.clone());
    }
    if let Some(request_type) = &filter.request_type {
        let pattern = format!("%{}%", escape_like(request_type));
        qb.push(" AND (r.user_request_type LIKE ")
            .push_bind(pattern.clone())
            .push(" OR r.tech_request_type LIKE ")
            .push_bind(pattern)
            .push(")");
    }

    qb.push(match filter.sort {
        SortOrder::Newest => " ORDER BY r.created_at DESC, r.id DESC",
        SortOrder::Oldest => " ORDER BY r.created_at ASC, r.id ASC",
    });

    qb.build_query_as::<RequestRow>().fetch_all(pool).await
}

fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}

pub async fn create(
    pool: &PgPool,
    version_id: Uuid,
    r: &NewRequest,
) -> Result<ContextRequest, sqlx::Error> {
    sqlx::query_as::<_, ContextRequest>(
        "INSERT INTO context_requests (
            id, version_id, requester, requester_role, description,
            user_request_type, tech_request_type, planned_improvement,
            improvement_type, difficulty_level, priority_level, approved
         ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
         RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(version_id)
    .bind(&r.requester)
    .bind(&r.requester_role)
    .bind(&r.description)
    .bind(&r.user_request_type)
    .bind(&r.tech_request_type)
    .bind(&r.planned_improvement)
    .bind(&r.improvement_type)
    .bind(&r.difficulty_level)
    .bind(&r.priority_level)
    .bind(&r.approved)
    .fetch_one(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<ContextRequest>, sqlx::Error> {
    sqlx::query_as::<_, ContextRequest>("SELECT * FROM context_requests WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Write one registry field. The column name comes from the registry, never from input.
pub async fn set_field<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    id: Uuid,
    spec: FieldSpec,
    value: &FieldValue,
) -> Result<(), sqlx::Error> {
    let sql = format!("UPDATE context_requests SET {} = $2 WHERE id = $1", spec.column);
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

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM context_requests WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
