use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db;
use crate::models::{ImprovementSize, Project, ProjectVersion};

/// Label suggested for a project that has no version yet.
pub const INITIAL_VERSION: &str = "V1.0.0";

/// Read access to the versions of a project.
#[async_trait]
pub trait VersionStore: Send + Sync {
    async fn versions_for_project(
        &self,
        project_id: Uuid,
    ) -> Result<Vec<ProjectVersion>, sqlx::Error>;
}

#[async_trait]
impl VersionStore for PgPool {
    async fn versions_for_project(
        &self,
        project_id: Uuid,
    ) -> Result<Vec<ProjectVersion>, sqlx::Error> {
        db::versions::list_by_project(self, project_id).await
    }
}

/// Current version of a project, read fresh from the store on every call.
pub async fn resolve_current_version<S: VersionStore + ?Sized>(
    store: &S,
    project_id: Uuid,
) -> Result<Option<ProjectVersion>, sqlx::Error> {
    let versions = store.versions_for_project(project_id).await?;
    Ok(current_version(&versions).cloned())
}

/// The version with the latest creation timestamp. Ties go to the larger id, which
/// for UUID v7 ids is the later insert. Independent of slice order.
pub fn current_version(versions: &[ProjectVersion]) -> Option<&ProjectVersion> {
    versions
        .iter()
        .max_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)))
}

/// Pair every project with its current version from one bulk read of versions.
pub fn current_versions(projects: Vec<Project>, versions: &[ProjectVersion]) -> Vec<ProjectState> {
    let mut by_project: HashMap<Uuid, Vec<ProjectVersion>> = HashMap::new();
    for version in versions {
        by_project
            .entry(version.project_id)
            .or_default()
            .push(version.clone());
    }

    projects
        .into_iter()
        .map(|project| {
            let current = by_project
                .get(&project.id)
                .and_then(|vs| current_version(vs))
                .cloned();
            ProjectState { project, current }
        })
        .collect()
}

/// Project-level attributes read through the current version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProxiedAttribute {
    Status,
    Progress,
    Deadline,
    Phase,
    Team,
    Description,
    TheoreticalEndDate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ProxyValue {
    Text(String),
    Number(i32),
    Date(Option<NaiveDate>),
    List(Vec<String>),
}

impl ProxiedAttribute {
    pub const ALL: [ProxiedAttribute; 7] = [
        ProxiedAttribute::Status,
        ProxiedAttribute::Progress,
        ProxiedAttribute::Deadline,
        ProxiedAttribute::Phase,
        ProxiedAttribute::Team,
        ProxiedAttribute::Description,
        ProxiedAttribute::TheoreticalEndDate,
    ];

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|attr| attr.name() == name)
    }

    pub fn name(&self) -> &'static str {
        match self {
            ProxiedAttribute::Status => "status",
            ProxiedAttribute::Progress => "progress",
            ProxiedAttribute::Deadline => "deadline",
            ProxiedAttribute::Phase => "phase",
            ProxiedAttribute::Team => "team",
            ProxiedAttribute::Description => "description",
            ProxiedAttribute::TheoreticalEndDate => "theoretical_end_date",
        }
    }

    /// Value used when the project has no version, or the column is null.
    pub fn default_value(&self) -> ProxyValue {
        match self {
            ProxiedAttribute::Status => ProxyValue::Text("Not started".to_string()),
            ProxiedAttribute::Progress => ProxyValue::Number(0),
            ProxiedAttribute::Deadline => ProxyValue::Date(None),
            ProxiedAttribute::Phase => ProxyValue::Text("Intake".to_string()),
            ProxiedAttribute::Team => ProxyValue::List(Vec::new()),
            ProxiedAttribute::Description => ProxyValue::Text(String::new()),
            ProxiedAttribute::TheoreticalEndDate => ProxyValue::Date(None),
        }
    }

    fn read(&self, version: &ProjectVersion) -> Option<ProxyValue> {
        match self {
            ProxiedAttribute::Status => version.status.clone().map(ProxyValue::Text),
            ProxiedAttribute::Progress => Some(ProxyValue::Number(version.progress)),
            ProxiedAttribute::Deadline => Some(ProxyValue::Date(version.deadline)),
            ProxiedAttribute::Phase => version.phase.clone().map(ProxyValue::Text),
            ProxiedAttribute::Team => Some(ProxyValue::List(version.team())),
            ProxiedAttribute::Description => version.description.clone().map(ProxyValue::Text),
            ProxiedAttribute::TheoreticalEndDate => {
                Some(ProxyValue::Date(version.theoretical_end_date()))
            }
        }
    }
}

pub fn proxied_attribute(current: Option<&ProjectVersion>, attr: ProxiedAttribute) -> ProxyValue {
    current
        .and_then(|version| attr.read(version))
        .unwrap_or_else(|| attr.default_value())
}

/// A project together with its resolved current version.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectState {
    pub project: Project,
    pub current: Option<ProjectVersion>,
}

impl ProjectState {
    pub fn attribute(&self, attr: ProxiedAttribute) -> ProxyValue {
        proxied_attribute(self.current.as_ref(), attr)
    }

    pub fn attributes(&self) -> serde_json::Map<String, serde_json::Value> {
        ProxiedAttribute::ALL
            .into_iter()
            .map(|attr| {
                let value = serde_json::to_value(self.attribute(attr))
                    .unwrap_or(serde_json::Value::Null);
                (attr.name().to_string(), value)
            })
            .collect()
    }

    pub fn status(&self) -> String {
        self.text(ProxiedAttribute::Status)
    }

    pub fn phase(&self) -> String {
        self.text(ProxiedAttribute::Phase)
    }

    pub fn description(&self) -> String {
        self.text(ProxiedAttribute::Description)
    }

    pub fn progress(&self) -> i32 {
        match self.attribute(ProxiedAttribute::Progress) {
            ProxyValue::Number(n) => n,
            _ => 0,
        }
    }

    pub fn deadline(&self) -> Option<NaiveDate> {
        self.date(ProxiedAttribute::Deadline)
    }

    pub fn theoretical_end_date(&self) -> Option<NaiveDate> {
        self.date(ProxiedAttribute::TheoreticalEndDate)
    }

    pub fn team(&self) -> Vec<String> {
        match self.attribute(ProxiedAttribute::Team) {
            ProxyValue::List(members) => members,
            _ => Vec::new(),
        }
    }

    /// Suggested label for the next version, from the current version's planning.
    pub fn suggested_next_version(&self) -> String {
        self.current
            .as_ref()
            .map(|v| suggest_next_version(&v.version_number, v.improvement_size()))
            .unwrap_or_else(|| INITIAL_VERSION.to_string())
    }

    fn text(&self, attr: ProxiedAttribute) -> String {
        match self.attribute(attr) {
            ProxyValue::Text(s) => s,
            _ => String::new(),
        }
    }

    fn date(&self, attr: ProxiedAttribute) -> Option<NaiveDate> {
        match self.attribute(attr) {
            ProxyValue::Date(d) => d,
            _ => None,
        }
    }
}

/// Bump a `V<major>.<minor>.<patch>` label by the planned improvement size.
///
/// Best effort: a label that does not parse comes back unchanged.
pub fn suggest_next_version(label: &str, size: ImprovementSize) -> String {
    let Some((major, minor, patch)) = parse_label(label) else {
        return label.to_string();
    };

    let bumped = match size {
        ImprovementSize::Major => major.checked_add(1).map(|m| (m, 0, 0)),
        ImprovementSize::Minor => minor.checked_add(1).map(|m| (major, m, 0)),
        ImprovementSize::Patch => patch.checked_add(1).map(|p| (major, minor, p)),
        ImprovementSize::NotDecided => Some((major, minor, patch)),
    };

    match bumped {
        Some((major, minor, patch)) => format!("V{major}.{minor}.{patch}"),
        None => label.to_string(),
    }
}

fn parse_label(label: &str) -> Option<(u64, u64, u64)> {
    let rest = label.strip_prefix('V')?;
    let parts = rest
        .split('.')
        .map(|part| part.trim().parse::<u64>().ok())
        .collect::<Option<Vec<_>>>()?;

    match parts.as_slice() {
        [major, minor, patch] => Some((*major, *minor, *patch)),
        _ => None,
    }
}

/// Parent/child relations among the versions of one project. Branches are allowed.
pub struct LineageTree {
    versions: HashMap<Uuid, ProjectVersion>,
    children: HashMap<Uuid, Vec<Uuid>>,
}

impl LineageTree {
    pub fn new(versions: Vec<ProjectVersion>) -> Self {
        let mut children: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        for version in &versions {
            if let Some(parent) = version.parent_id {
                children.entry(parent).or_default().push(version.id);
            }
        }
        for ids in children.values_mut() {
            ids.sort();
        }

        Self {
            versions: versions.into_iter().map(|v| (v.id, v)).collect(),
            children,
        }
    }

    pub fn get(&self, id: Uuid) -> Option<&ProjectVersion> {
        self.versions.get(&id)
    }

    /// Parent of `id`, if it is still part of the tree.
    pub fn parent(&self, id: Uuid) -> Option<&ProjectVersion> {
        self.get(id)
            .and_then(|v| v.parent_id)
            .and_then(|parent| self.get(parent))
    }

    pub fn children(&self, id: Uuid) -> Vec<&ProjectVersion> {
        self.children
            .get(&id)
            .map(|ids| ids.iter().filter_map(|child| self.get(*child)).collect())
            .unwrap_or_default()
    }

    /// Ancestors of `id`, nearest first. Stops on a missing parent or a cycle.
    pub fn ancestry(&self, id: Uuid) -> Vec<&ProjectVersion> {
        let mut seen = HashSet::from([id]);
        let mut chain = Vec::new();
        let mut cursor = self.parent(id);

        while let Some(version) = cursor {
            if !seen.insert(version.id) {
                break;
            }
            chain.push(version);
            cursor = self.parent(version.id);
        }

        chain
    }
}
