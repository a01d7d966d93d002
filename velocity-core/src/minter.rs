//! Capacity Minter: simulated automation events -> capacity tokens.
//!
//! Minting is deterministic. The same flags and catalog always produce the
//! same pool, and re-minting replaces the pool wholesale (allocations against
//! the previous pool are not carried over).

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::catalog::{StandardTimeCatalog, minutes_to_hours};
use crate::error::{Result, VelocityError};
use crate::token::{CapacityEvent, CapacityToken, Confidence};

const TEAM: &str = "marketing";

/// Which optional capacity sources are simulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintFlags {
    pub simulate_rpa: bool,
    pub simulate_service: bool,
}

impl Default for MintFlags {
    fn default() -> Self {
        Self {
            simulate_rpa: true,
            simulate_service: true,
        }
    }
}

/// One simulated automation signal. Each kind carries only what it needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AutomationEvent {
    LeadTriage {
        runs: u32,
    },
    MeetingCut {
        series: String,
        delta_minutes: f64,
        attendees: Vec<String>,
    },
    AutoStatus {
        reports: u32,
    },
    DraftSpeedup {
        items: u32,
        days_per_item: f64,
    },
    RpaBlock {
        txns: u32,
        contractor_share: f64,
        contractor_rate: f64,
    },
    ServiceDeflection {
        tickets: u32,
        cost_per_ticket: f64,
    },
}

impl AutomationEvent {
    pub fn meeting_cut(
        series: impl Into<String>,
        delta_minutes: f64,
        attendees: Vec<String>,
    ) -> Result<Self> {
        if !delta_minutes.is_finite() || delta_minutes < 0.0 {
            return Err(VelocityError::InvalidEvent(format!(
                "meeting delta must be >= 0 minutes, got {delta_minutes}"
            )));
        }
        Ok(Self::MeetingCut {
            series: series.into(),
            delta_minutes,
            attendees,
        })
    }

    pub fn draft_speedup(items: u32, days_per_item: f64) -> Result<Self> {
        if !days_per_item.is_finite() || days_per_item < 0.0 {
            return Err(VelocityError::InvalidEvent(format!(
                "days per item must be >= 0, got {days_per_item}"
            )));
        }
        Ok(Self::DraftSpeedup { items, days_per_item })
    }

    pub fn rpa_block(txns: u32, contractor_share: f64, contractor_rate: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&contractor_share) {
            return Err(VelocityError::InvalidEvent(format!(
                "contractor share must be within 0..=1, got {contractor_share}"
            )));
        }
        if !contractor_rate.is_finite() || contractor_rate < 0.0 {
            return Err(VelocityError::InvalidEvent(format!(
                "contractor rate must be >= 0, got {contractor_rate}"
            )));
        }
        Ok(Self::RpaBlock {
            txns,
            contractor_share,
            contractor_rate,
        })
    }

    pub fn service_deflection(tickets: u32, cost_per_ticket: f64) -> Result<Self> {
        if !cost_per_ticket.is_finite() || cost_per_ticket < 0.0 {
            return Err(VelocityError::InvalidEvent(format!(
                "cost per ticket must be >= 0, got {cost_per_ticket}"
            )));
        }
        Ok(Self::ServiceDeflection {
            tickets,
            cost_per_ticket,
        })
    }

    /// Freed minutes under the given catalog.
    pub fn minutes(&self, catalog: &StandardTimeCatalog) -> f64 {
        match self {
            Self::LeadTriage { runs } => *runs as f64 * catalog.minutes_per_triage_run,
            Self::MeetingCut {
                delta_minutes,
                attendees,
                ..
            } => delta_minutes * attendees.len() as f64,
            Self::AutoStatus { reports } => *reports as f64 * catalog.minutes_per_status_report,
            Self::DraftSpeedup {
                items,
                days_per_item,
            } => *items as f64 * days_per_item * catalog.maker_minutes_per_day,
            Self::RpaBlock { txns, .. } => {
                *txns as f64 * catalog.rpa_minutes_per_txn * catalog.realization
            }
            Self::ServiceDeflection { tickets, .. } => {
                *tickets as f64 * catalog.service_minutes_per_ticket
            }
        }
    }

    pub fn confidence(&self) -> Confidence {
        match self {
            Self::DraftSpeedup { .. } => Confidence::Medium,
            _ => Confidence::High,
        }
    }

    pub fn source_label(&self) -> String {
        match self {
            Self::LeadTriage { .. } => "Zap:LeadTriage".to_string(),
            Self::MeetingCut { series, .. } => format!("Meeting Cut:{series}"),
            Self::AutoStatus { .. } => "Asana Auto-Status".to_string(),
            Self::DraftSpeedup { .. } => "Faster Drafts (AI)".to_string(),
            Self::RpaBlock { .. } => "RPA Bot (Block)".to_string(),
            Self::ServiceDeflection { .. } => "Service Deflection (AI Agent)".to_string(),
        }
    }

    /// Placement on the timeline, relative to the window start.
    fn day_offset(&self) -> u32 {
        match self {
            Self::LeadTriage { .. } => 2,
            Self::MeetingCut { .. } => 4,
            Self::AutoStatus { .. } => 6,
            Self::DraftSpeedup { .. } => 9,
            Self::RpaBlock { .. } => 11,
            Self::ServiceDeflection { .. } => 16,
        }
    }

    fn project(&self) -> &'static str {
        match self {
            Self::LeadTriage { .. } => "ABM Acceleration",
            Self::MeetingCut { .. } | Self::AutoStatus { .. } | Self::DraftSpeedup { .. } => {
                "Q4 Sales Enablement"
            }
            Self::RpaBlock { .. } => "Finance Ops",
            Self::ServiceDeflection { .. } => "Customer Service",
        }
    }
}

/// Harvestable contractor reduction from block RPA.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RpaPotential {
    pub freed_hours: f64,
    pub contractor_share: f64,
    pub contractor_hours: f64,
    pub contractor_rate: f64,
    pub dollars: f64,
    #[serde(default)]
    pub harvested: bool,
}

/// Harvestable cost avoided from tier-1 service deflection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ServicePotential {
    pub tickets: u32,
    pub cost_per_ticket: f64,
    pub dollars: f64,
    #[serde(default)]
    pub harvested: bool,
}

/// Minutes attributed to a prior manual owner of an automated workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribution {
    pub person: String,
    pub source: String,
    pub minutes: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Minted {
    pub tokens: Vec<CapacityToken>,
    pub capacity_events: Vec<CapacityEvent>,
    pub rpa: Option<RpaPotential>,
    pub service: Option<ServicePotential>,
    pub attributions: Vec<Attribution>,
}

/// The fixed demo signal set: four base events plus the simulated extras.
pub fn demo_events(flags: MintFlags) -> Result<Vec<AutomationEvent>> {
    let mut events = vec![
        AutomationEvent::LeadTriage { runs: 600 },
        AutomationEvent::meeting_cut(
            "Weekly GTM",
            30.0,
            ["u1", "u2", "u3", "u4"].map(String::from).to_vec(),
        )?,
        AutomationEvent::AutoStatus { reports: 6 },
        AutomationEvent::draft_speedup(7, 1.0)?,
    ];
    if flags.simulate_rpa {
        events.push(AutomationEvent::rpa_block(10_000, 0.3, 95.0)?);
    }
    if flags.simulate_service {
        events.push(AutomationEvent::service_deflection(400, 6.5)?);
    }
    Ok(events)
}

/// Mint the demo signal set.
pub fn mint(flags: MintFlags, catalog: &StandardTimeCatalog) -> Result<Minted> {
    let minted = mint_events(&demo_events(flags)?, catalog);
    info!(
        simulate_rpa = flags.simulate_rpa,
        simulate_service = flags.simulate_service,
        tokens = minted.tokens.len(),
        "minted capacity"
    );
    Ok(minted)
}

/// Convert events 1:1 into tokens and capacity events.
pub fn mint_events(events: &[AutomationEvent], catalog: &StandardTimeCatalog) -> Minted {
    let mut out = Minted::default();

    for ev in events {
        let minutes = ev.minutes(catalog);
        let source = ev.source_label();

        out.tokens
            .push(CapacityToken::team(TEAM, source.clone(), minutes, ev.confidence()));
        out.capacity_events.push(CapacityEvent {
            day_offset: ev.day_offset(),
            label: source.clone(),
            hours: minutes_to_hours(minutes),
            project: Some(ev.project().to_string()),
        });

        match ev {
            AutomationEvent::LeadTriage { .. } => {
                for (person, share) in &catalog.owner_shares {
                    out.attributions.push(Attribution {
                        person: person.clone(),
                        source: source.clone(),
                        minutes: minutes * share,
                    });
                }
            }
            AutomationEvent::RpaBlock {
                contractor_share,
                contractor_rate,
                ..
            } => {
                let freed_hours = minutes / 60.0;
                let contractor_hours = freed_hours * contractor_share;
                out.rpa = Some(RpaPotential {
                    freed_hours,
                    contractor_share: *contractor_share,
                    contractor_hours,
                    contractor_rate: *contractor_rate,
                    dollars: contractor_hours * contractor_rate,
                    harvested: false,
                });
            }
            AutomationEvent::ServiceDeflection {
                tickets,
                cost_per_ticket,
            } => {
                out.service = Some(ServicePotential {
                    tickets: *tickets,
                    cost_per_ticket: *cost_per_ticket,
                    dollars: *tickets as f64 * cost_per_ticket,
                    harvested: false,
                });
            }
            _ => {}
        }
    }

    out
}
