use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use velocity_core::time::{parse_date, today_in};
use velocity_core::{AppState, FileStore, HarvestKind, MintFlags, Task};

mod config;
mod render;
mod state;

use config::Config;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("VELOCITY_BUILD_SHA"),
    ")"
);

#[derive(Parser, Debug)]
#[command(
    name = "velocity",
    version,
    long_version = LONG_VERSION,
    about = "Mint freed capacity, put it on the critical path, and keep the evidence"
)]
struct Cli {
    /// Data directory (default: $VELOCITY_HOME or ~/.velocity)
    #[arg(long, global = true)]
    home: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Pool balance, recognized value and harvestable savings
    Status,

    /// Toggle the simulated RPA / service sources and re-mint the pool
    Simulate {
        #[arg(long)]
        rpa: Option<Toggle>,
        #[arg(long)]
        service: Option<Toggle>,
    },

    /// Draw hours from the pool into a task
    Allocate { task: String, hours: f64 },

    /// Close a task and record its evidence
    Close {
        task: String,
        /// Close date, YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<String>,
    },

    /// Recognize harvested savings as hard evidence
    Harvest {
        #[arg(value_enum)]
        kind: HarvestArg,
    },

    /// Text Gantt with weekly freed capacity
    Gantt,

    /// List the evidence ledger, newest first
    Evidence {
        /// Export to CSV instead of printing
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Inspect or extend the plan
    Task {
        #[command(subcommand)]
        command: TaskCommand,
    },

    /// Back to the seed plan with an empty ledger (toggles are kept)
    Reset,

    /// Manage config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum TaskCommand {
    List,

    Add {
        id: String,
        name: String,
        /// Start date, YYYY-MM-DD
        #[arg(long)]
        start: String,
        /// Due date, YYYY-MM-DD
        #[arg(long)]
        due: String,
        #[arg(long, default_value = "")]
        project: String,
        /// Planned duration in days (default: start..due)
        #[arg(long)]
        baseline: Option<f64>,
        #[arg(long, default_value_t = 0.0)]
        slack: f64,
        /// Cost of delay, dollars per day
        #[arg(long, default_value_t = 0.0)]
        cod: f64,
        #[arg(long)]
        capability: bool,
        /// Predecessor task id (repeatable)
        #[arg(long = "after")]
        after: Vec<String>,
        /// Assignee user id (repeatable)
        #[arg(long = "assignee")]
        assignees: Vec<String>,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default config.toml if none exists
    Init,
    /// Print the effective config
    Show,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Toggle {
    On,
    Off,
}

impl Toggle {
    fn enabled(self) -> bool {
        matches!(self, Toggle::On)
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum HarvestArg {
    Rpa,
    Service,
}

impl From<HarvestArg> for HarvestKind {
    fn from(a: HarvestArg) -> Self {
        match a {
            HarvestArg::Rpa => HarvestKind::Rpa,
            HarvestArg::Service => HarvestKind::Service,
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("VELOCITY_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let home = state::ensure_velocity_home(cli.home.as_deref())?;
    let cfg = config::load_config(&home)?;

    match cli.command {
        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config(&home)?,
            ConfigCommand::Show => {
                let s = toml::to_string_pretty(&cfg).context("serialize config")?;
                println!("# {}\n", config::config_path(&home).display());
                print!("{s}");
            }
        },

        Command::Status => {
            let (_, app, _) = open(&home, &cfg)?;
            print!("{}", render::status(&app));
        }

        Command::Simulate { rpa, service } => {
            let (mut store, app, _) = open(&home, &cfg)?;
            if rpa.is_none() && service.is_none() {
                print_flags(app.flags);
                return Ok(());
            }
            let flags = MintFlags {
                simulate_rpa: rpa.map_or(app.flags.simulate_rpa, Toggle::enabled),
                simulate_service: service.map_or(app.flags.simulate_service, Toggle::enabled),
            };
            let app = app.mint_capacity(flags)?;
            app.save(&mut store).context("save state")?;
            print_flags(app.flags);
            println!("Pool re-minted: {:.1}h", app.kpis().pool.all);
        }

        Command::Allocate { task, hours } => {
            let (mut store, app, _) = open(&home, &cfg)?;
            let (app, report) = app
                .allocate(&task, hours)
                .with_context(|| format!("allocate {hours}h to {task}"))?;
            app.save(&mut store).context("save state")?;
            print!("{}", render::allocation(&report));
        }

        Command::Close { task, date } => {
            let (mut store, app, today) = open(&home, &cfg)?;
            let on = match date {
                Some(s) => parse_date(&s)?,
                None => today,
            };
            let (app, records) = app
                .close_task(&task, on)
                .with_context(|| format!("close {task}"))?;
            app.save(&mut store).context("save state")?;
            println!("Closed {task} on {on}");
            print!("{}", render::evidence(&records));
        }

        Command::Harvest { kind } => {
            let (mut store, app, _) = open(&home, &cfg)?;
            let (app, record) = app.harvest(kind.into())?;
            app.save(&mut store).context("save state")?;
            print!("{}", render::evidence(std::slice::from_ref(&record)));
        }

        Command::Gantt => {
            let (_, app, today) = open(&home, &cfg)?;
            let g = app.layout(today, cfg.display.min_weeks);
            print!("{}", render::gantt(&g));
        }

        Command::Evidence { csv } => {
            let (_, app, _) = open(&home, &cfg)?;
            match csv {
                Some(path) => {
                    export_evidence_csv(&app, &path)?;
                    println!("Wrote {} records to {}", app.ledger.len(), path.display());
                }
                None => print!("{}", render::evidence(app.ledger.records())),
            }
        }

        Command::Task { command } => match command {
            TaskCommand::List => {
                let (_, app, _) = open(&home, &cfg)?;
                print!("{}", render::tasks(&app.tasks));
            }
            TaskCommand::Add {
                id,
                name,
                start,
                due,
                project,
                baseline,
                slack,
                cod,
                capability,
                after,
                assignees,
            } => {
                let start = parse_date(&start)?;
                let due = parse_date(&due)?;
                if due < start {
                    bail!("due date {due} is before start {start}");
                }
                let mut task = Task::new(id.clone(), name, start, due)
                    .with_project(project)
                    .with_slack(slack)
                    .with_cod(cod)
                    .with_assignees(assignees)
                    .depends_on(after);
                if let Some(days) = baseline {
                    task = task.with_baseline(days);
                }
                if capability {
                    task = task.as_capability();
                }

                let (mut store, app, _) = open(&home, &cfg)?;
                let app = app.add_task(task).with_context(|| format!("add task {id}"))?;
                app.save(&mut store).context("save state")?;
                println!("Added {id} ({} tasks)", app.tasks.len());
            }
        },

        Command::Reset => {
            let (mut store, app, today) = open(&home, &cfg)?;
            velocity_core::store::clear(&mut store).context("clear state")?;
            let app = app.reset(today)?;
            app.save(&mut store).context("save state")?;
            println!("Reset to the seed plan ({} tasks)", app.tasks.len());
        }
    }

    Ok(())
}

fn open(home: &Path, cfg: &Config) -> Result<(FileStore, AppState, NaiveDate)> {
    let today = today_in(&cfg.display.timezone)
        .with_context(|| format!("resolve today in {}", cfg.display.timezone))?;
    let store = state::open_store(home)?;
    let app = AppState::load(&store, today, cfg.catalog.clone()).context("load state")?;
    debug!(home = %home.display(), %today, tasks = app.tasks.len(), "state loaded");
    Ok((store, app, today))
}

fn print_flags(flags: MintFlags) {
    let onoff = |b: bool| if b { "on" } else { "off" };
    println!(
        "RPA simulation: {} | service simulation: {}",
        onoff(flags.simulate_rpa),
        onoff(flags.simulate_service)
    );
}

#[derive(Serialize)]
struct EvidenceRow<'a> {
    tier: String,
    task_id: &'a str,
    label: &'a str,
    days_saved: Option<f64>,
    value: f64,
    details: &'a str,
}

fn export_evidence_csv(app: &AppState, path: &Path) -> Result<()> {
    let mut w = csv::Writer::from_path(path).with_context(|| format!("create {}", path.display()))?;
    for r in app.ledger.records() {
        w.serialize(EvidenceRow {
            tier: r.tier.to_string(),
            task_id: r.task_id.as_deref().unwrap_or(""),
            label: r.label.as_deref().unwrap_or(""),
            days_saved: r.days_saved,
            value: r.value,
            details: &r.details,
        })?;
    }
    w.flush().with_context(|| format!("write {}", path.display()))?;
    Ok(())
}
