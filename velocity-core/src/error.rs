//! Error type shared by every core operation.

use thiserror::Error;

use crate::evidence::HarvestKind;

#[derive(Error, Debug)]
pub enum VelocityError {
    #[error("task '{0}' not found")]
    TaskNotFound(String),

    #[error("task '{0}' is already closed")]
    TaskAlreadyClosed(String),

    #[error("task '{0}' already exists")]
    DuplicateTask(String),

    #[error("invalid hours: {0} (must be a positive number)")]
    InvalidHours(f64),

    #[error("invalid automation event: {0}")]
    InvalidEvent(String),

    #[error("invalid date: {0}")]
    InvalidDate(String),

    #[error("task '{task}' depends on unknown task '{missing}'")]
    UnknownDependency { task: String, missing: String },

    #[error("dependency cycle: {}", .0.join(" -> "))]
    DependencyCycle(Vec<String>),

    #[error("nothing to harvest for {0} (simulation is off)")]
    NothingToHarvest(HarvestKind),

    #[error("{0} savings were already harvested for this capacity run")]
    AlreadyHarvested(HarvestKind),

    #[error("state store error: {0}")]
    Store(String),

    #[error("failed to (de)serialize state: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T, E = VelocityError> = std::result::Result<T, E>;
