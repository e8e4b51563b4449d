use std::collections::HashMap;
use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate};
use serde_json::Value;

use crate::models::vocabulary::{DEFAULT_PRIORITY, NOT_DECIDED};
use crate::models::Approval;

/// How an inline-edited value is coerced before it is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    /// Non-null text column; empty input stores the given default.
    Category(&'static str),
    Float,
    Int,
    Date,
    Approval,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub column: &'static str,
    pub kind: FieldKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(Option<String>),
    Float(f64),
    Int(i32),
    Date(Option<NaiveDate>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    Unknown(String),
    InvalidDate(String),
    InvalidApproval(String),
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldError::Unknown(name) => write!(f, "Field {name} not editable"),
            FieldError::InvalidDate(name) => write!(f, "Invalid date format for {name}"),
            FieldError::InvalidApproval(value) => write!(f, "Invalid approval state: {value}"),
        }
    }
}

/// Name → spec lookup for inline edits. Adding an editable field means adding an entry.
pub struct FieldRegistry {
    fields: HashMap<&'static str, FieldSpec>,
}

impl FieldRegistry {
    pub fn new() -> Self {
        Self {
            fields: HashMap::new(),
        }
    }

    pub fn register(&mut self, name: &'static str, kind: FieldKind) -> &mut Self {
        self.fields.insert(name, FieldSpec { column: name, kind });
        self
    }

    pub fn get(&self, name: &str) -> Option<FieldSpec> {
        self.fields.get(name).copied()
    }

    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.fields.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Look up `name` and coerce `value` to the field's kind.
    pub fn resolve(&self, name: &str, value: &Value) -> Result<(FieldSpec, FieldValue), FieldError> {
        let spec = self
            .get(name)
            .ok_or_else(|| FieldError::Unknown(name.to_string()))?;
        let value = coerce(name, spec.kind, value)?;
        Ok((spec, value))
    }
}

impl Default for FieldRegistry {
    fn default() -> Self {
        Self::new()
    }
}

pub static VERSION_FIELDS: LazyLock<FieldRegistry> = LazyLock::new(|| {
    let mut registry = FieldRegistry::new();
    for name in [
        "phase",
        "status",
        "app_status",
        "integration_level",
        "hosting",
        "accessibility",
        "description",
        "objective",
        "target_audience",
        "features",
        "whats_new",
        "cost_type",
        "team_members",
        "user_request_type",
        "tech_request_type",
        "request_description",
        "requester",
    ] {
        registry.register(name, FieldKind::Text);
    }
    register_planning(&mut registry);
    registry
        .register("cost", FieldKind::Float)
        .register("progress", FieldKind::Int)
        .register("duration_days", FieldKind::Int)
        .register("budget_consumed", FieldKind::Int);
    for name in ["deadline", "start_date", "pause_start", "pause_end"] {
        registry.register(name, FieldKind::Date);
    }
    registry
});

pub static REQUEST_FIELDS: LazyLock<FieldRegistry> = LazyLock::new(|| {
    let mut registry = FieldRegistry::new();
    for name in [
        "requester",
        "requester_role",
        "description",
        "user_request_type",
        "tech_request_type",
    ] {
        registry.register(name, FieldKind::Text);
    }
    register_planning(&mut registry);
    registry.register("approved", FieldKind::Approval);
    registry
});

fn register_planning(registry: &mut FieldRegistry) {
    registry
        .register("planned_improvement", FieldKind::Category(NOT_DECIDED))
        .register("improvement_type", FieldKind::Category(NOT_DECIDED))
        .register("difficulty_level", FieldKind::Category(NOT_DECIDED))
        .register("priority_level", FieldKind::Category(DEFAULT_PRIORITY));
}

/// Coerce a JSON value. Numbers fall back to zero on garbage; only dates and approval
/// states can fail.
pub fn coerce(name: &str, kind: FieldKind, value: &Value) -> Result<FieldValue, FieldError> {
    match kind {
        FieldKind::Text => Ok(FieldValue::Text(as_text(value))),
        FieldKind::Category(default) => Ok(FieldValue::Text(Some(
            as_text(value).unwrap_or_else(|| default.to_string()),
        ))),
        FieldKind::Float => Ok(FieldValue::Float(as_f64(value).unwrap_or(0.0))),
        FieldKind::Int => Ok(FieldValue::Int(as_i32(value).unwrap_or(0))),
        FieldKind::Date => match as_text(value) {
            None => Ok(FieldValue::Date(None)),
            Some(s) => parse_date(&s)
                .map(|d| FieldValue::Date(Some(d)))
                .ok_or_else(|| FieldError::InvalidDate(name.to_string())),
        },
        FieldKind::Approval => {
            let raw = as_text(value).unwrap_or_default();
            Approval::parse(&raw)
                .map(|a| FieldValue::Text(Some(a.as_str().to_string())))
                .ok_or(FieldError::InvalidApproval(raw))
        }
    }
}

/// Calendar dates accepted from user input: `%Y-%m-%d` with a four-digit year.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .ok()
        .filter(|d| (1..=9999).contains(&d.year()))
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_i32(value: &Value) -> Option<i32> {
    match value {
        Value::Number(n) => n.as_i64().and_then(|n| i32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
