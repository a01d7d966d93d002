//! velocity-core: capacity minting, allocation, Gantt layout and the evidence ledger

pub mod allocator;
pub mod catalog;
pub mod dependency;
pub mod error;
pub mod evidence;
pub mod minter;
pub mod state;
pub mod store;
pub mod task;
pub mod time;
pub mod timeline;
pub mod token;

pub use allocator::{Allocation, AllocationReport, Draw, allocate};
pub use catalog::{StandardTimeCatalog, minutes_to_hours};
pub use dependency::{find_cycle, validate_dependencies};
pub use error::{Result, VelocityError};
pub use evidence::{
    EvidenceRecord, HarvestKind, Ledger, LedgerTotals, Tier, close_evidence, rpa_harvest_record,
    rpa_harvest_value, service_harvest_record,
};
pub use minter::{
    Attribution, AutomationEvent, MintFlags, Minted, RpaPotential, ServicePotential, mint,
    mint_events,
};
pub use state::{AppState, Kpis};
pub use store::{FileStore, MemoryStore, StateStore};
pub use task::{Task, TaskStatus, User, demo_users, seed_tasks, validate_schedule};
pub use timeline::{
    DEFAULT_MIN_WEEKS, DependencyEdge, GanttLayout, GanttRow, GridPoint, SlackState, layout,
};
pub use token::{CapacityEvent, CapacityToken, Confidence, PoolSummary};
