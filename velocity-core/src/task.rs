//! Task model: critical-path work items that receive pooled capacity.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Result, VelocityError};
use crate::time::add_days;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Open,
    Closed,
}

/// A scheduled task on the project plan.
///
/// `slack_days == 0` marks the critical path. Dates are calendar days; the
/// Gantt grid never needs sub-day precision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub name: String,
    pub project: String,
    pub assignees: Vec<String>,

    pub start: NaiveDate,
    pub due: NaiveDate,

    /// Planned duration in days.
    pub baseline_days: f64,
    /// Scheduling buffer in days; <= 0 is critical path.
    pub slack_days: f64,
    /// Cost of delay, dollars per day.
    pub cod_per_day: f64,
    /// Market value index (0..1), display only.
    #[serde(default)]
    pub mvi: f64,

    pub status: TaskStatus,
    #[serde(default)]
    pub allocated_minutes: f64,
    #[serde(default)]
    pub actual_close: Option<NaiveDate>,

    /// Capability work: allocated hours are valued on close.
    #[serde(default)]
    pub capability: bool,
    /// Predecessor task ids.
    #[serde(default)]
    pub depends_on: Vec<String>,
}

impl Task {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        start: NaiveDate,
        due: NaiveDate,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            project: String::new(),
            assignees: Vec::new(),
            start,
            due: due.max(start),
            baseline_days: (due - start).num_days().max(1) as f64,
            slack_days: 0.0,
            cod_per_day: 0.0,
            mvi: 0.0,
            status: TaskStatus::Open,
            allocated_minutes: 0.0,
            actual_close: None,
            capability: false,
            depends_on: Vec::new(),
        }
    }

    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.project = project.into();
        self
    }

    pub fn with_assignees<I, S>(mut self, assignees: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.assignees = assignees.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_baseline(mut self, days: f64) -> Self {
        self.baseline_days = days;
        self
    }

    pub fn with_slack(mut self, days: f64) -> Self {
        self.slack_days = days;
        self
    }

    pub fn with_cod(mut self, per_day: f64) -> Self {
        self.cod_per_day = per_day;
        self
    }

    pub fn with_mvi(mut self, mvi: f64) -> Self {
        self.mvi = mvi.clamp(0.0, 1.0);
        self
    }

    pub fn as_capability(mut self) -> Self {
        self.capability = true;
        self
    }

    pub fn depends_on<I, S>(mut self, predecessors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.depends_on = predecessors.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_open(&self) -> bool {
        self.status == TaskStatus::Open
    }

    pub fn is_critical(&self) -> bool {
        self.slack_days <= 0.0
    }
}

/// Every task must be due on or after its start.
pub fn validate_schedule(tasks: &[Task]) -> Result<()> {
    match tasks.iter().find(|t| t.due < t.start) {
        Some(t) => Err(VelocityError::InvalidDate(format!(
            "task '{}' is due {} before it starts {}",
            t.id, t.due, t.start
        ))),
        None => Ok(()),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub role: String,
}

/// Demo roster referenced by task assignees and owner shares.
pub fn demo_users() -> Vec<User> {
    [
        ("u1", "Sarah", "Marketing Analyst"),
        ("u2", "Jamal", "RevOps"),
        ("u3", "Maria", "Designer"),
        ("u4", "Diego", "Content Ops"),
    ]
    .into_iter()
    .map(|(id, name, role)| User {
        id: id.to_string(),
        name: name.to_string(),
        role: role.to_string(),
    })
    .collect()
}

/// Seed plan: two critical-path hotspots, one near-critical task and a
/// capability task chained behind the feedback synthesis.
pub fn seed_tasks(today: NaiveDate) -> Vec<Task> {
    let d = |offset: i64| add_days(today, offset);
    vec![
        Task::new("t1", "Enablement Deck v2 - Design QA", d(-6), d(4))
            .with_project("Q4 Sales Enablement")
            .with_assignees(["u3"])
            .with_baseline(4.0)
            .with_slack(0.0)
            .with_cod(7500.0)
            .with_mvi(0.84),
        Task::new("t2", "ICP Tier-A One-Pagers", d(-3), d(7))
            .with_project("ABM Acceleration")
            .with_assignees(["u4"])
            .with_baseline(5.0)
            .with_slack(2.0)
            .with_cod(4000.0)
            .with_mvi(0.72),
        Task::new("t3", "Field Pilot Feedback Synthesis", d(-2), d(5))
            .with_project("Q4 Sales Enablement")
            .with_assignees(["u2"])
            .with_baseline(3.0)
            .with_slack(0.0)
            .with_cod(3500.0)
            .with_mvi(0.77),
        Task::new("t4", "Sales Playbook Auto-Drafting", d(5), d(19))
            .with_project("Q4 Sales Enablement")
            .with_assignees(["u1", "u4"])
            .with_baseline(10.0)
            .with_slack(10.0)
            .with_cod(2500.0)
            .with_mvi(0.65)
            .as_capability()
            .depends_on(["t3"]),
    ]
}
