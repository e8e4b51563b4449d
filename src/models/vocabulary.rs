use serde::{Deserialize, Serialize};

pub const STATUSES: [&str; 6] = ["Done", "Stopped", "In progress", "Not started", "Review", "Gel"];

pub const PHASES: [&str; 11] = [
    "Intake",
    "Qualification",
    "Scoping",
    "Planning",
    "Build",
    "Test & QA",
    "Staging",
    "Release",
    "Operate",
    "Retro",
    "Closed",
];

pub const NOT_DECIDED: &str = "Not decided";
pub const DEFAULT_PRIORITY: &str = "Medium";
pub const DEFAULT_COST_TYPE: &str = "Monthly";

pub fn is_valid_status(status: &str) -> bool {
    STATUSES.contains(&status)
}

pub fn is_valid_phase(phase: &str) -> bool {
    PHASES.contains(&phase)
}

/// Size of the next planned improvement; drives version label bumps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImprovementSize {
    Patch,
    Minor,
    Major,
    #[serde(other)]
    NotDecided,
}

impl ImprovementSize {
    /// Unknown values (including "Not decided") map to [`ImprovementSize::NotDecided`].
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "Patch" => ImprovementSize::Patch,
            "Minor" => ImprovementSize::Minor,
            "Major" => ImprovementSize::Major,
            _ => ImprovementSize::NotDecided,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ImprovementSize::Patch => "Patch",
            ImprovementSize::Minor => "Minor",
            ImprovementSize::Major => "Major",
            ImprovementSize::NotDecided => NOT_DECIDED,
        }
    }
}

/// Approval state of a context request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Approval {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl Approval {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "Pending" => Some(Approval::Pending),
            "Approved" => Some(Approval::Approved),
            "Rejected" => Some(Approval::Rejected),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Approval::Pending => "Pending",
            Approval::Approved => "Approved",
            Approval::Rejected => "Rejected",
        }
    }
}
