//! Capacity tokens (the allocatable pool) and their timeline projection.

use serde::{Deserialize, Serialize};

use crate::catalog::minutes_to_hours;

/// Coarse trust grade on a capacity estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    /// Allocation order: all High balance before Medium, Medium before Low.
    pub const PRIORITY: [Confidence; 3] = [Confidence::High, Confidence::Medium, Confidence::Low];

    pub fn label(&self) -> &'static str {
        match self {
            Confidence::High => "High",
            Confidence::Medium => "Medium",
            Confidence::Low => "Low",
        }
    }
}

/// A quantity of freed minutes with provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapacityToken {
    /// Remaining balance; never negative.
    pub minutes: f64,
    pub source: String,
    pub confidence: Confidence,
    pub team: String,
    /// Person-attributed tokens are reported but not pooled.
    #[serde(default)]
    pub person: Option<String>,
}

impl CapacityToken {
    pub fn team(
        team: impl Into<String>,
        source: impl Into<String>,
        minutes: f64,
        confidence: Confidence,
    ) -> Self {
        Self {
            minutes: minutes.max(0.0),
            source: source.into(),
            confidence,
            team: team.into(),
            person: None,
        }
    }

    pub fn with_person(mut self, person: impl Into<String>) -> Self {
        self.person = Some(person.into());
        self
    }

    /// Drawable by the allocator.
    pub fn is_pooled(&self) -> bool {
        self.person.is_none() && self.minutes > 0.0
    }

    pub fn hours(&self) -> f64 {
        minutes_to_hours(self.minutes)
    }
}

/// Timeline-display form of a token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapacityEvent {
    /// Days from the first visible day of the window.
    pub day_offset: u32,
    pub label: String,
    pub hours: f64,
    #[serde(default)]
    pub project: Option<String>,
}

/// Pool balance in hours per confidence tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PoolSummary {
    pub high: f64,
    pub medium: f64,
    pub low: f64,
    pub all: f64,
}

impl PoolSummary {
    pub fn of(tokens: &[CapacityToken]) -> Self {
        let sum = |conf: Confidence| {
            minutes_to_hours(
                tokens
                    .iter()
                    .filter(|t| t.confidence == conf)
                    .map(|t| t.minutes)
                    .sum(),
            )
        };
        Self {
            high: sum(Confidence::High),
            medium: sum(Confidence::Medium),
            low: sum(Confidence::Low),
            all: minutes_to_hours(total_minutes(tokens)),
        }
    }
}

pub fn total_minutes(tokens: &[CapacityToken]) -> f64 {
    tokens.iter().map(|t| t.minutes).sum()
}
