use chrono::NaiveDate;
use serde_json::{json, Value};

use projtrack::fields::{
    coerce, parse_date, FieldError, FieldKind, FieldRegistry, FieldValue, REQUEST_FIELDS,
    VERSION_FIELDS,
};

#[test]
fn every_editable_version_field_is_registered() {
    let names = VERSION_FIELDS.names();
    for field in [
        "phase",
        "status",
        "progress",
        "deadline",
        "team_members",
        "cost",
        "cost_type",
        "start_date",
        "duration_days",
        "pause_start",
        "pause_end",
        "budget_consumed",
        "planned_improvement",
        "improvement_type",
        "difficulty_level",
        "priority_level",
        "request_description",
        "requester",
    ] {
        assert!(names.contains(&field), "{field} should be editable");
    }
    assert!(VERSION_FIELDS.get("id").is_none());
    assert!(VERSION_FIELDS.get("project_id").is_none());
    assert!(VERSION_FIELDS.get("created_at").is_none());
}

#[test]
fn unknown_field_is_rejected() {
    let err = VERSION_FIELDS.resolve("version_number", &json!("V9")).unwrap_err();
    assert_eq!(err, FieldError::Unknown("version_number".to_string()));
    assert_eq!(err.to_string(), "Field version_number not editable");
}

#[test]
fn text_accepts_strings_and_numbers() {
    let (spec, value) = VERSION_FIELDS.resolve("hosting", &json!("Cloud")).unwrap();
    assert_eq!(spec.column, "hosting");
    assert_eq!(value, FieldValue::Text(Some("Cloud".to_string())));

    let (_, value) = VERSION_FIELDS.resolve("hosting", &json!(42)).unwrap();
    assert_eq!(value, FieldValue::Text(Some("42".to_string())));
}

#[test]
fn empty_or_null_text_clears_the_column() {
    let (_, value) = VERSION_FIELDS.resolve("description", &json!("")).unwrap();
    assert_eq!(value, FieldValue::Text(None));

    let (_, value) = VERSION_FIELDS.resolve("description", &Value::Null).unwrap();
    assert_eq!(value, FieldValue::Text(None));
}

#[test]
fn empty_category_falls_back_to_its_default() {
    let (_, value) = VERSION_FIELDS.resolve("priority_level", &json!("")).unwrap();
    assert_eq!(value, FieldValue::Text(Some("Medium".to_string())));

    let (_, value) = VERSION_FIELDS.resolve("improvement_type", &Value::Null).unwrap();
    assert_eq!(value, FieldValue::Text(Some("Not decided".to_string())));

    let (_, value) = VERSION_FIELDS.resolve("improvement_type", &json!("Major")).unwrap();
    assert_eq!(value, FieldValue::Text(Some("Major".to_string())));
}

#[test]
fn numbers_parse_leniently() {
    let (_, value) = VERSION_FIELDS.resolve("cost", &json!("1250.5")).unwrap();
    assert_eq!(value, FieldValue::Float(1250.5));

    let (_, value) = VERSION_FIELDS.resolve("cost", &json!(99)).unwrap();
    assert_eq!(value, FieldValue::Float(99.0));

    let (_, value) = VERSION_FIELDS.resolve("cost", &json!("a lot")).unwrap();
    assert_eq!(value, FieldValue::Float(0.0));

    let (_, value) = VERSION_FIELDS.resolve("progress", &json!(" 40 ")).unwrap();
    assert_eq!(value, FieldValue::Int(40));

    let (_, value) = VERSION_FIELDS.resolve("duration_days", &json!("ten")).unwrap();
    assert_eq!(value, FieldValue::Int(0));

    let (_, value) = VERSION_FIELDS.resolve("budget_consumed", &Value::Null).unwrap();
    assert_eq!(value, FieldValue::Int(0));
}

#[test]
fn dates_must_be_iso() {
    let (_, value) = VERSION_FIELDS.resolve("deadline", &json!("2024-06-30")).unwrap();
    assert_eq!(value, FieldValue::Date(NaiveDate::from_ymd_opt(2024, 6, 30)));

    let (_, value) = VERSION_FIELDS.resolve("deadline", &json!("")).unwrap();
    assert_eq!(value, FieldValue::Date(None));

    let err = VERSION_FIELDS.resolve("start_date", &json!("30/06/2024")).unwrap_err();
    assert_eq!(err, FieldError::InvalidDate("start_date".to_string()));
}

#[test]
fn dates_outside_four_digit_years_are_rejected() {
    for raw in ["+262142-12-20", "-0044-03-15", "0000-01-01", "10000-01-01"] {
        assert!(parse_date(raw).is_none(), "{raw} accepted");
        assert!(VERSION_FIELDS.resolve("deadline", &json!(raw)).is_err());
    }
    assert_eq!(parse_date("9999-12-31"), NaiveDate::from_ymd_opt(9999, 12, 31));
    assert_eq!(parse_date("0001-01-01"), NaiveDate::from_ymd_opt(1, 1, 1));
}

#[test]
fn request_approval_is_validated() {
    let (_, value) = REQUEST_FIELDS.resolve("approved", &json!("Approved")).unwrap();
    assert_eq!(value, FieldValue::Text(Some("Approved".to_string())));

    let err = REQUEST_FIELDS.resolve("approved", &json!("Maybe")).unwrap_err();
    assert_eq!(err, FieldError::InvalidApproval("Maybe".to_string()));

    assert!(REQUEST_FIELDS.resolve("approved", &json!("")).is_err());
}

#[test]
fn request_registry_is_separate() {
    assert!(REQUEST_FIELDS.get("requester_role").is_some());
    assert!(REQUEST_FIELDS.get("cost").is_none());
    assert!(VERSION_FIELDS.get("approved").is_none());
}

#[test]
fn custom_registry_maps_names_to_columns() {
    let mut registry = FieldRegistry::new();
    registry
        .register("notes", FieldKind::Text)
        .register("weight", FieldKind::Float);

    assert_eq!(registry.names(), vec!["notes", "weight"]);
    let (spec, value) = registry.resolve("weight", &json!("2.5")).unwrap();
    assert_eq!(spec.column, "weight");
    assert_eq!(value, FieldValue::Float(2.5));
}

#[test]
fn coerce_works_without_a_registry() {
    assert_eq!(
        coerce("x", FieldKind::Category("Low"), &json!("")).unwrap(),
        FieldValue::Text(Some("Low".to_string()))
    );
    assert_eq!(coerce("x", FieldKind::Int, &json!(1.5)).unwrap(), FieldValue::Int(0));
}
