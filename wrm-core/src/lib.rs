//! Storage ledger for water sources.
//!
//! Holds sources, dated log entries and settings, and derives everything else
//! from them: running storage per source (clamped to `[0, capacity]` at every
//! step), date-ordered time series, aggregate statistics and threshold alerts.
//! Nothing here performs I/O; persistence and rendering live in other crates
//! and follow ledger changes through [`Ledger::subscribe`].

pub mod alert;
pub mod error;
pub mod event;
pub mod ledger;
pub mod log_entry;
pub mod replay;
pub mod settings;
pub mod source;
pub mod state;
pub mod statistics;

pub use alert::{Alert, Severity};
pub use error::{LedgerError, Result};
pub use event::LedgerEvent;
pub use ledger::{DeletedSource, Ledger};
pub use log_entry::{LogEntry, LogId, NewLog, Reading};
pub use replay::{SeriesPoint, TimeSeries};
pub use settings::Settings;
pub use source::{NewSource, Source, SourceId};
pub use state::{LedgerState, StoredLog};
pub use statistics::Statistics;
