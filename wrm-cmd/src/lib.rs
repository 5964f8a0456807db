//! Command implementations for WRM CLI.
//!
//! Every ledger command opens a [`session::Session`], applies at most one
//! mutation, persists it, and re-renders the dashboard when something changed.
//! `remote` commands talk to the prediction service and never touch the store.

use clap::{Args, Subcommand};
use std::io::Write;
use std::path::PathBuf;

use wrm_core::{Severity, SourceId};

pub mod files;
pub mod manage;
pub mod remote;
pub mod session;
pub mod view;

use remote::RemoteCommand;
use session::Session;

pub const DEFAULT_DB_PATH: &str = "water-resources.db";
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:5000";

#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// SQLite file holding sources, logs and settings
    #[arg(long, global = true, env = "WRM_DB", default_value = DEFAULT_DB_PATH)]
    pub db: PathBuf,

    /// Use a throw-away in-memory store instead of --db
    #[arg(long, global = true)]
    pub in_memory: bool,

    /// Base URL of the demand prediction service
    #[arg(long, global = true, env = "WRM_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Register a new water source
    AddSource {
        #[arg(long)]
        name: String,

        /// Maximum storage volume
        #[arg(long)]
        capacity: f64,

        /// Storage volume before any log entry
        #[arg(long)]
        initial_storage: f64,

        #[arg(long, default_value = "")]
        location: String,

        /// reservoir, tank, well, river, ...
        #[arg(long = "type", default_value = "reservoir")]
        source_type: String,
    },

    /// Rename a source or change its capacity
    EditSource {
        id: u64,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        capacity: Option<f64>,
    },

    /// Delete a source and every log entry recorded against it
    DeleteSource { id: u64 },

    /// List sources with their current storage
    Sources,

    /// Record one day's flows for a source
    Log {
        /// Source id as shown by `sources`
        #[arg(long)]
        source: u64,

        /// YYYY-MM-DD, YYYYMMDD or "today"
        #[arg(long, default_value = "today")]
        date: String,

        #[arg(long, default_value_t = 0.0)]
        inflow: f64,

        /// Rainfall depth in the rainfall unit
        #[arg(long, default_value_t = 0.0)]
        rainfall: f64,

        #[arg(long, default_value_t = 0.0)]
        outflow: f64,

        #[arg(long, default_value_t = 0.0)]
        demand: f64,

        #[arg(long, default_value = "")]
        notes: String,
    },

    /// List log entries
    Logs {
        /// Only entries for this source
        #[arg(long)]
        source: Option<u64>,
    },

    /// Storage over time for every source
    Chart {
        /// Emit chart data as JSON
        #[arg(long, conflicts_with = "csv")]
        json: bool,

        /// Emit chart points as CSV
        #[arg(long)]
        csv: bool,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Summary statistics
    Stats,

    /// Current alerts
    Alerts,

    /// Sources, statistics and alerts together
    Dashboard,

    /// Show settings, or change the given ones
    Settings {
        /// Fill percentage below which a low-storage alert is raised
        #[arg(long)]
        low_storage: Option<f64>,

        #[arg(long)]
        high_demand: Option<f64>,

        /// Rainfall above which a log entry raises an alert
        #[arg(long)]
        excessive_rainfall: Option<f64>,

        /// Volume unit label
        #[arg(long)]
        volume_unit: Option<String>,

        /// Rainfall unit label
        #[arg(long)]
        rainfall_unit: Option<String>,
    },

    /// Export sources, logs and settings as JSON
    Export {
        /// Defaults to water-resource-data-YYYY-MM-DD.json
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Replace all data with the contents of an export file
    Import { file: PathBuf },

    /// Delete every source and log entry (settings are kept)
    Clear {
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },

    /// Write a Markdown report
    Report {
        /// Defaults to water-resource-report-YYYY-MM-DD.md
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Talk to the demand prediction service
    Remote {
        #[command(subcommand)]
        command: RemoteCommand,
    },
}

impl Command {
    fn is_remote(&self) -> bool {
        matches!(self, Command::Remote { .. })
    }
}

pub async fn run(args: GlobalArgs, command: Command) -> anyhow::Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match command {
        Command::Remote { command } => remote::run_remote(&args.api_url, command, &mut out).await,
        command => {
            let mut session = Session::open(&args)?;
            execute(&mut session, command, &mut out)
        }
    }
}

/// Run one ledger command against an open session.
///
/// After a successful mutation the change is persisted and the dashboard is
/// printed below the command's notice.
pub fn execute(session: &mut Session, command: Command, out: &mut impl Write) -> anyhow::Result<()> {
    if command.is_remote() {
        anyhow::bail!("remote commands do not run against the local store");
    }
    match command {
        Command::AddSource {
            name,
            capacity,
            initial_storage,
            location,
            source_type,
        } => manage::add_source(session, name, capacity, initial_storage, location, source_type, out)?,
        Command::EditSource { id, name, capacity } => {
            manage::edit_source(session, SourceId(id), name, capacity, out)?
        }
        Command::DeleteSource { id } => manage::delete_source(session, SourceId(id), out)?,
        Command::Sources => write!(out, "{}", view::render_sources(session.ledger()))?,
        Command::Log {
            source,
            date,
            inflow,
            rainfall,
            outflow,
            demand,
            notes,
        } => manage::log_reading(
            session,
            SourceId(source),
            &date,
            wrm_core::Reading::new(inflow, rainfall, outflow, demand),
            notes,
            out,
        )?,
        Command::Logs { source } => {
            write!(out, "{}", view::render_logs(session.ledger(), source.map(SourceId)))?
        }
        Command::Chart { json, csv, output } => {
            files::chart(session.ledger(), files::ChartFormat::from_flags(json, csv), output, out)?
        }
        Command::Stats => write!(out, "{}", view::render_statistics(session.ledger()))?,
        Command::Alerts => write!(out, "{}", view::render_alerts(&session.ledger().check_alerts()))?,
        Command::Dashboard => write!(out, "{}", view::render_dashboard(session.ledger()))?,
        Command::Settings {
            low_storage,
            high_demand,
            excessive_rainfall,
            volume_unit,
            rainfall_unit,
        } => manage::settings(
            session,
            manage::SettingsChange {
                low_storage,
                high_demand,
                excessive_rainfall,
                volume_unit,
                rainfall_unit,
            },
            out,
        )?,
        Command::Export { output } => files::export(session.ledger(), output, out)?,
        Command::Import { file } => files::import(session, &file, out)?,
        Command::Clear { yes } => manage::clear(session, yes, out)?,
        Command::Report { output } => files::report(session.ledger(), output, out)?,
        Command::Remote { .. } => {}
    }

    if !session.commit()?.is_empty() {
        write!(out, "\n{}", view::render_dashboard(session.ledger()))?;
    }
    Ok(())
}

/// Print a failed command the way the dashboard shows errors.
pub fn report_error(err: &anyhow::Error, out: &mut impl Write) -> std::io::Result<()> {
    writeln!(out, "{}", view::notice(Severity::Danger, &format!("{err:#}")))
}
