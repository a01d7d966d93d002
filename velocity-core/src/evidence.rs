//! Evidence Ledger: recognized dollar value, newest first.
//!
//! Value is only recognized on an outcome (a task closing early) or on a
//! harvest (a contract, seat or PO actually reduced). Records are never edited.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::catalog::{StandardTimeCatalog, minutes_to_hours};
use crate::minter::{RpaPotential, ServicePotential};
use crate::task::Task;
use crate::time::days_from;

/// Provenance strength of a recognized value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tier {
    /// Hard, harvested savings.
    A,
    /// Measured schedule acceleration on the critical path.
    B,
    /// Proxy or strategic estimate.
    C,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Tier::A => "A",
            Tier::B => "B",
            Tier::C => "C",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HarvestKind {
    Rpa,
    Service,
}

impl fmt::Display for HarvestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HarvestKind::Rpa => f.write_str("RPA"),
            HarvestKind::Service => f.write_str("service deflection"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_saved: Option<f64>,
    pub value: f64,
    pub tier: Tier,
    pub details: String,
}

/// Close-out evidence for a task finishing on `actual_close`.
///
/// Days saved are measured against the task's baseline duration from its
/// start date, not against the scheduled due date. Capability tasks with
/// allocated time also get a proxy-valued record for those hours.
pub fn close_evidence(
    task: &Task,
    actual_close: NaiveDate,
    catalog: &StandardTimeCatalog,
) -> Vec<EvidenceRecord> {
    let actual_days = days_from(task.start, actual_close).max(1) as f64;
    let days_saved = (task.baseline_days - actual_days).max(0.0);
    let value = days_saved * task.cod_per_day;
    let tier = if task.slack_days <= 0.0 && days_saved > 0.0 {
        Tier::B
    } else {
        Tier::C
    };

    let mut out = vec![EvidenceRecord {
        task_id: Some(task.id.clone()),
        label: None,
        days_saved: Some(days_saved),
        value,
        tier,
        details: format!(
            "Closed {:.1}d faster than baseline {}d. CoD/day ${:.0}.",
            days_saved, task.baseline_days, task.cod_per_day
        ),
    }];

    if task.capability && task.allocated_minutes > 0.0 {
        let hours = task.allocated_minutes / 60.0;
        out.push(EvidenceRecord {
            task_id: Some(task.id.clone()),
            label: Some("Capability hours".to_string()),
            days_saved: None,
            value: hours * catalog.capability_proxy_rate,
            tier: Tier::C,
            details: format!(
                "Capability build: {}h allocated @ ${:.0}/h proxy.",
                minutes_to_hours(task.allocated_minutes),
                catalog.capability_proxy_rate
            ),
        });
    }

    out
}

/// Dollars from reducing contractor hours by a share of freed hours.
pub fn rpa_harvest_value(freed_hours: f64, contractor_share: f64, contractor_rate: f64) -> f64 {
    freed_hours * contractor_share * contractor_rate
}

/// Tier-A record for a contractor reduction. Does not guard against repeats.
pub fn rpa_harvest_record(p: &RpaPotential) -> EvidenceRecord {
    EvidenceRecord {
        task_id: None,
        label: Some("RPA contractor reduction".to_string()),
        days_saved: None,
        value: rpa_harvest_value(p.freed_hours, p.contractor_share, p.contractor_rate),
        tier: Tier::A,
        details: format!(
            "Reduced contractors by {:.0}h @ ${:.0}/h.",
            p.contractor_hours, p.contractor_rate
        ),
    }
}

/// Tier-A record for deflected tickets. Does not guard against repeats.
pub fn service_harvest_record(p: &ServicePotential) -> EvidenceRecord {
    EvidenceRecord {
        task_id: None,
        label: Some("Service cost avoided".to_string()),
        days_saved: None,
        value: p.tickets as f64 * p.cost_per_ticket,
        tier: Tier::A,
        details: format!(
            "Recognized cost avoided: {} x ${}.",
            p.tickets, p.cost_per_ticket
        ),
    }
}

/// Append-only evidence log, newest record first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ledger {
    records: Vec<EvidenceRecord>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, rec: EvidenceRecord) {
        self.records.insert(0, rec);
    }

    pub fn records(&self) -> &[EvidenceRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn totals(&self) -> LedgerTotals {
        let mut t = LedgerTotals::default();
        for r in &self.records {
            match r.tier {
                Tier::A => t.tier_a += r.value,
                Tier::B => t.tier_b += r.value,
                Tier::C => t.tier_c += r.value,
            }
            if r.task_id.is_some() {
                t.value_created += r.value;
            } else {
                t.cost_avoided += r.value;
            }
            t.total += r.value;
        }
        t
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerTotals {
    pub tier_a: f64,
    pub tier_b: f64,
    pub tier_c: f64,
    /// Cycle-time value from closed tasks.
    pub value_created: f64,
    /// Harvested hard savings.
    pub cost_avoided: f64,
    pub total: f64,
}
