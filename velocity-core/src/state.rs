//! Application state and the four core operations.
//!
//! Every operation consumes the state and hands back the updated one, so
//! there is no hidden shared session object. Callers persist the result with
//! [`AppState::save`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::allocator::{self, AllocationReport};
use crate::catalog::{StandardTimeCatalog, minutes_to_hours};
use crate::dependency::validate_dependencies;
use crate::error::{Result, VelocityError};
use crate::evidence::{
    EvidenceRecord, HarvestKind, Ledger, LedgerTotals, close_evidence, rpa_harvest_record,
    service_harvest_record,
};
use crate::minter::{self, MintFlags, Minted, RpaPotential, ServicePotential};
use crate::store::{
    KEY_EVIDENCE, KEY_POOL, KEY_SIM_RPA, KEY_SIM_SERVICE, KEY_TASKS, StateStore, get_json,
    put_json,
};
use crate::task::{Task, TaskStatus, seed_tasks, validate_schedule};
use crate::timeline::{self, GanttLayout};
use crate::token::PoolSummary;

/// Minted pool as persisted, tagged with the flags and catalog it was minted under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct PoolSnapshot {
    flags: MintFlags,
    #[serde(default)]
    catalog: StandardTimeCatalog,
    minted: Minted,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    pub tasks: Vec<Task>,
    pub ledger: Ledger,
    pub flags: MintFlags,
    pub pool: Minted,
    pub catalog: StandardTimeCatalog,
}

/// Headline numbers for the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kpis {
    pub pool: PoolSummary,
    pub allocated_hours: f64,
    pub ledger: LedgerTotals,
    pub rpa: Option<RpaPotential>,
    pub service: Option<ServicePotential>,
}

impl AppState {
    /// Fresh session: seed plan, empty ledger, pool minted from `flags`.
    pub fn seeded(
        today: NaiveDate,
        flags: MintFlags,
        catalog: StandardTimeCatalog,
    ) -> Result<Self> {
        let pool = minter::mint(flags, &catalog)?;
        Ok(Self {
            tasks: seed_tasks(today),
            ledger: Ledger::new(),
            flags,
            pool,
            catalog,
        })
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    fn task_index(&self, id: &str) -> Result<usize> {
        self.tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| VelocityError::TaskNotFound(id.to_string()))
    }

    /// Re-mint the pool. Replaces every token, event and harvest flag.
    pub fn mint_capacity(mut self, flags: MintFlags) -> Result<Self> {
        self.pool = minter::mint(flags, &self.catalog)?;
        self.flags = flags;
        Ok(self)
    }

    /// Draw `hours` from the pool for a task.
    ///
    /// The task is credited with the minutes actually consumed; any shortfall
    /// is in the report.
    pub fn allocate(mut self, task_id: &str, hours: f64) -> Result<(Self, AllocationReport)> {
        if !hours.is_finite() || hours <= 0.0 {
            return Err(VelocityError::InvalidHours(hours));
        }
        let idx = self.task_index(task_id)?;

        let (tokens, report) =
            allocator::allocate(&self.pool.tokens, hours * 60.0).into_report(task_id);
        self.pool.tokens = tokens;
        self.tasks[idx].allocated_minutes += report.consumed_minutes;

        info!(
            task = task_id,
            consumed = report.consumed_minutes,
            shortfall = report.shortfall_minutes,
            "allocated capacity"
        );
        Ok((self, report))
    }

    /// Close a task and recognize its evidence. The close date may not
    /// precede the task's start.
    pub fn close_task(
        mut self,
        task_id: &str,
        actual_close: NaiveDate,
    ) -> Result<(Self, Vec<EvidenceRecord>)> {
        let idx = self.task_index(task_id)?;
        if self.tasks[idx].status == TaskStatus::Closed {
            return Err(VelocityError::TaskAlreadyClosed(task_id.to_string()));
        }
        if actual_close < self.tasks[idx].start {
            return Err(VelocityError::InvalidDate(format!(
                "task '{task_id}' cannot close on {actual_close}, before its start {}",
                self.tasks[idx].start
            )));
        }

        let records = close_evidence(&self.tasks[idx], actual_close, &self.catalog);
        for r in &records {
            self.ledger.record(r.clone());
        }

        let task = &mut self.tasks[idx];
        task.status = TaskStatus::Closed;
        task.actual_close = Some(actual_close);

        info!(task = task_id, records = records.len(), "closed task");
        Ok((self, records))
    }

    /// Recognize harvested savings. At most once per kind per minted pool.
    pub fn harvest(mut self, kind: HarvestKind) -> Result<(Self, EvidenceRecord)> {
        let record = match kind {
            HarvestKind::Rpa => {
                let p = self
                    .pool
                    .rpa
                    .as_mut()
                    .ok_or(VelocityError::NothingToHarvest(kind))?;
                if p.harvested {
                    return Err(VelocityError::AlreadyHarvested(kind));
                }
                p.harvested = true;
                rpa_harvest_record(p)
            }
            HarvestKind::Service => {
                let p = self
                    .pool
                    .service
                    .as_mut()
                    .ok_or(VelocityError::NothingToHarvest(kind))?;
                if p.harvested {
                    return Err(VelocityError::AlreadyHarvested(kind));
                }
                p.harvested = true;
                service_harvest_record(p)
            }
        };

        self.ledger.record(record.clone());
        info!(%kind, value = record.value, "harvested savings");
        Ok((self, record))
    }

    /// Add a task to the plan; ids stay unique, dates ordered and the
    /// dependency graph acyclic.
    pub fn add_task(mut self, task: Task) -> Result<Self> {
        if self.task(&task.id).is_some() {
            return Err(VelocityError::DuplicateTask(task.id));
        }
        self.tasks.push(task);
        validate_schedule(&self.tasks)?;
        validate_dependencies(&self.tasks)?;
        Ok(self)
    }

    /// Back to the seed plan with an empty ledger; toggles are kept.
    pub fn reset(self, today: NaiveDate) -> Result<Self> {
        Self::seeded(today, self.flags, self.catalog)
    }

    pub fn layout(&self, today: NaiveDate, min_weeks: u32) -> GanttLayout {
        timeline::layout(&self.tasks, &self.pool.capacity_events, today, min_weeks)
    }

    pub fn kpis(&self) -> Kpis {
        Kpis {
            pool: PoolSummary::of(&self.pool.tokens),
            allocated_hours: minutes_to_hours(
                self.tasks.iter().map(|t| t.allocated_minutes).sum(),
            ),
            ledger: self.ledger.totals(),
            rpa: self.pool.rpa,
            service: self.pool.service,
        }
    }

    /// Load from `store`, seeding anything that was never saved.
    pub fn load(
        store: &dyn StateStore,
        today: NaiveDate,
        catalog: StandardTimeCatalog,
    ) -> Result<Self> {
        let defaults = MintFlags::default();
        let flags = MintFlags {
            simulate_rpa: get_json(store, KEY_SIM_RPA)?.unwrap_or(defaults.simulate_rpa),
            simulate_service: get_json(store, KEY_SIM_SERVICE)?
                .unwrap_or(defaults.simulate_service),
        };
        let tasks: Vec<Task> = get_json(store, KEY_TASKS)?.unwrap_or_else(|| seed_tasks(today));
        validate_schedule(&tasks)?;
        validate_dependencies(&tasks)?;
        let ledger: Ledger = get_json(store, KEY_EVIDENCE)?.unwrap_or_default();

        let pool = match get_json::<PoolSnapshot>(store, KEY_POOL)? {
            Some(snap) if snap.flags == flags && snap.catalog == catalog => snap.minted,
            _ => {
                debug!("pool snapshot missing or stale; re-minting");
                minter::mint(flags, &catalog)?
            }
        };

        Ok(Self {
            tasks,
            ledger,
            flags,
            pool,
            catalog,
        })
    }

    pub fn save(&self, store: &mut dyn StateStore) -> Result<()> {
        put_json(store, KEY_TASKS, &self.tasks)?;
        put_json(store, KEY_EVIDENCE, &self.ledger)?;
        put_json(store, KEY_SIM_RPA, &self.flags.simulate_rpa)?;
        put_json(store, KEY_SIM_SERVICE, &self.flags.simulate_service)?;
        put_json(
            store,
            KEY_POOL,
            &PoolSnapshot {
                flags: self.flags,
                catalog: self.catalog.clone(),
                minted: self.pool.clone(),
            },
        )?;
        debug!("state saved");
        Ok(())
    }
}
