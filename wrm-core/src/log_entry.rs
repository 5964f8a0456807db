use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{LedgerError, Result};
use crate::source::SourceId;

/// Volume contributed per unit of rainfall depth (mm of rain to storage volume).
pub const RAINFALL_VOLUME_FACTOR: f64 = 10.0;

/// Identifier of a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogId(pub u64);

impl fmt::Display for LogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The four measured quantities of one daily observation.
#[derive(Debug, Default, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub struct Reading {
    pub inflow: f64,
    /// Rainfall depth, in the configured rainfall unit
    pub rainfall: f64,
    pub outflow: f64,
    pub demand: f64,
}

impl Reading {
    pub fn new(inflow: f64, rainfall: f64, outflow: f64, demand: f64) -> Self {
        Self {
            inflow,
            rainfall,
            outflow,
            demand,
        }
    }

    /// Net volume change implied by this reading.
    pub fn balance(&self) -> f64 {
        self.inflow + self.rainfall * RAINFALL_VOLUME_FACTOR - self.outflow - self.demand
    }

    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("Inflow", self.inflow),
            ("Rainfall", self.rainfall),
            ("Outflow", self.outflow),
            ("Demand", self.demand),
        ];
        for (label, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(LedgerError::validation(format!(
                    "{label} must be a non-negative number!"
                )));
            }
        }
        Ok(())
    }
}

/// One dated observation for a source. Immutable once recorded.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub id: LogId,
    pub source_id: SourceId,
    pub date: NaiveDate,
    pub reading: Reading,
    pub notes: String,
    /// Balance computed when the entry was recorded
    pub balance: f64,
    pub created_at: Option<DateTime<Utc>>,
}

/// Input for [`crate::Ledger::add_log`].
#[derive(Debug, Clone, PartialEq)]
pub struct NewLog {
    pub source_id: SourceId,
    pub date: NaiveDate,
    pub reading: Reading,
    pub notes: Option<String>,
}

impl NewLog {
    pub fn new(source_id: SourceId, date: NaiveDate, reading: Reading) -> Self {
        Self {
            source_id,
            date,
            reading,
            notes: None,
        }
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub(crate) fn into_entry(self, id: LogId, created_at: DateTime<Utc>) -> LogEntry {
        LogEntry {
            id,
            source_id: self.source_id,
            date: self.date,
            balance: self.reading.balance(),
            reading: self.reading,
            notes: self.notes.unwrap_or_default(),
            created_at: Some(created_at),
        }
    }
}
