use chrono::{Duration, Local};
use serde_json::{json, Value};
use sqlx::PgPool;

use crate::db;
use crate::error::AppError;
use crate::service::{self, FieldUpdate, ProjectDraft};

fn updates(fields: &[(&str, Value)]) -> Vec<FieldUpdate> {
    fields
        .iter()
        .map(|(field, value)| FieldUpdate {
            field: field.to_string(),
            value: value.clone(),
        })
        .collect()
}

/// Insert a couple of demo projects into an empty database. Returns how many were
/// created; zero when projects already exist.
pub async fn seed_demo(pool: &PgPool) -> Result<usize, AppError> {
    if db::projects::count(pool).await? > 0 {
        return Ok(0);
    }

    let today = Local::now().date_naive();
    let date = |offset: i64| (today + Duration::days(offset)).format("%Y-%m-%d").to_string();

    let drafts = vec![
        ProjectDraft {
            name: "Customer Portal Revamp".to_string(),
            category: Some("Web".to_string()),
            version_number: Some("V1.0.0".to_string()),
            version_fields: updates(&[
                ("phase", json!("Build")),
                ("status", json!("In progress")),
                ("hosting", json!("Cloud")),
                ("description", json!("Rebuild of the customer self-service portal.")),
                ("progress", json!(45)),
                ("start_date", json!(date(-30))),
                ("duration_days", json!(60)),
                ("deadline", json!(date(60))),
                ("cost", json!(18000.0)),
                ("cost_type", json!("Monthly")),
                ("team_members", json!("Alice, Bob, Chloé")),
                ("improvement_type", json!("Minor")),
            ]),
            custom_fields: vec![("Sponsor".to_string(), "Customer Care".to_string())],
        },
        ProjectDraft {
            name: "Data Platform Migration".to_string(),
            category: Some("Infrastructure".to_string()),
            version_number: Some("V2.1.0".to_string()),
            version_fields: updates(&[
                ("phase", json!("Test & QA")),
                ("status", json!("Review")),
                ("hosting", json!("On premise")),
                ("description", json!("Move the reporting warehouse to the new cluster.")),
                ("progress", json!(80)),
                ("start_date", json!(date(-90))),
                ("duration_days", json!(100)),
                ("pause_start", json!(date(-40))),
                ("pause_end", json!(date(-33))),
                ("deadline", json!(date(20))),
                ("cost", json!(42000.0)),
                ("cost_type", json!("Annual")),
                ("team_members", json!("David, Emma")),
                ("improvement_type", json!("Patch")),
            ]),
            custom_fields: Vec::new(),
        },
    ];

    let count = drafts.len();
    for draft in drafts {
        service::create_project(pool, draft).await?;
    }
    Ok(count)
}
