//! Error types for offset-engine operations.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("Empty schedule: no events registered")]
    EmptySchedule,

    #[error("Empty name: entry #{index} has no name")]
    EmptyName { index: usize },

    #[error("Duplicate name: '{name}'")]
    DuplicateName { name: String },

    #[error("Invalid length: event '{event}' has length {length}, expected at least 1 day")]
    InvalidLength { event: String, length: i64 },

    #[error("Unknown anchor: '{name}' is not a registered event")]
    UnknownAnchor { name: String },

    #[error("Missing parent: event '{event}' references unknown parent '{parent}'")]
    MissingParent { event: String, parent: String },

    #[error("Cyclic dependency: {}", cycle.join(" -> "))]
    CyclicDependency { cycle: Vec<String> },

    #[error("Unsatisfiable constraint: no allowed start date found for event '{event}'")]
    UnsatisfiableConstraint { event: String },

    #[error("Date out of range while resolving event '{event}'")]
    DateOutOfRange { event: String },
}

pub type Result<T> = std::result::Result<T, ScheduleError>;
