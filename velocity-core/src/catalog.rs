//! Standard-Time Catalog: the conversion constants behind every minted minute.
//!
//! Values are "manual minutes replaced per unit of automation". They are
//! deliberately conservative and can be overridden from `config.toml`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StandardTimeCatalog {
    /// Lead triage record + Slack post, per automation run.
    pub minutes_per_triage_run: f64,
    /// Manual creation of one weekly status report.
    pub minutes_per_status_report: f64,
    /// Conservative "true focus minutes" in a maker day.
    pub maker_minutes_per_day: f64,
    /// Manual minutes per transaction handled by block RPA.
    pub rpa_minutes_per_txn: f64,
    /// Average handle time for a deflectable tier-1 ticket.
    pub service_minutes_per_ticket: f64,
    /// Oversight factor applied to block automation (0..1).
    pub realization: f64,
    /// Dollar rate used to value capability hours on close.
    pub capability_proxy_rate: f64,
    /// Prior manual owner share of lead triage, by person id.
    pub owner_shares: BTreeMap<String, f64>,
}

impl Default for StandardTimeCatalog {
    fn default() -> Self {
        Self {
            minutes_per_triage_run: 1.5,
            minutes_per_status_report: 90.0,
            maker_minutes_per_day: 60.0,
            rpa_minutes_per_txn: 1.2,
            service_minutes_per_ticket: 7.0,
            realization: 0.8,
            capability_proxy_rate: 85.0,
            owner_shares: BTreeMap::from([("u1".to_string(), 0.6), ("u2".to_string(), 0.25)]),
        }
    }
}

/// Round minutes to hours with one decimal, the way every KPI displays them.
pub fn minutes_to_hours(minutes: f64) -> f64 {
    ((minutes / 60.0) * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_owner_shares_leave_a_team_remainder() {
        let c = StandardTimeCatalog::default();
        let owned: f64 = c.owner_shares.values().sum();
        assert!(owned < 1.0);
        assert!((owned - 0.85).abs() < 1e-9);
    }

    #[test]
    fn minutes_to_hours_rounds_to_tenths() {
        assert_eq!(minutes_to_hours(90.0), 1.5);
        assert_eq!(minutes_to_hours(100.0), 1.7);
        assert_eq!(minutes_to_hours(0.0), 0.0);
    }
}
