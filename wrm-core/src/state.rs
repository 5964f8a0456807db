//! Serialized form of the ledger, shared by the blob store and export files.
//!
//! Log records carry both the stable `sourceId` and the positional
//! `sourceIdx`. When reading, `sourceId` wins; `sourceIdx` is only consulted
//! for records written before stable ids existed. A missing `balance` is
//! recomputed from the reading.

use chrono::{DateTime, NaiveDate, Utc};
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{LedgerError, Result};
use crate::event::LedgerEvent;
use crate::ledger::{IdGenerator, Ledger};
use crate::log_entry::{LogEntry, LogId, Reading};
use crate::settings::Settings;
use crate::source::{Source, SourceId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredLog {
    pub id: LogId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_id: Option<SourceId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_idx: Option<usize>,
    pub date: NaiveDate,
    #[serde(flatten)]
    pub reading: Reading,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub balance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Everything persisted for one ledger.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerState {
    pub sources: Vec<Source>,
    pub logs: Vec<StoredLog>,
    #[serde(default)]
    pub settings: Settings,
}

impl LedgerState {
    /// Check every record and turn stored logs into entries, resolving every
    /// source reference.
    fn resolve(self) -> Result<(Vec<Source>, Vec<LogEntry>, Settings)> {
        self.settings.validate()?;
        let mut known: HashSet<SourceId> = HashSet::with_capacity(self.sources.len());
        for source in &self.sources {
            source.validate()?;
            if !known.insert(source.id) {
                return Err(LedgerError::DuplicateId(source.id.0));
            }
        }
        let mut log_ids: HashSet<LogId> = HashSet::with_capacity(self.logs.len());
        for stored in &self.logs {
            if !log_ids.insert(stored.id) {
                return Err(LedgerError::DuplicateId(stored.id.0));
            }
            stored.reading.validate()?;
        }

        let logs = self
            .logs
            .into_iter()
            .map(|stored| {
                let source_id = match (stored.source_id, stored.source_idx) {
                    (Some(id), _) if known.contains(&id) => id,
                    (Some(id), _) => return Err(LedgerError::DanglingReference(id)),
                    (None, Some(idx)) => self
                        .sources
                        .get(idx)
                        .map(|s| s.id)
                        .ok_or(LedgerError::DanglingIndex(idx))?,
                    (None, None) => {
                        return Err(LedgerError::ImportFormat(format!(
                            "Invalid file format: log {} has no source reference",
                            stored.id
                        )))
                    }
                };
                Ok(LogEntry {
                    id: stored.id,
                    source_id,
                    date: stored.date,
                    balance: stored.balance.unwrap_or_else(|| stored.reading.balance()),
                    reading: stored.reading,
                    notes: stored.notes,
                    created_at: stored.created_at,
                })
            })
            .collect::<Result<Vec<LogEntry>>>()?;
        Ok((self.sources, logs, self.settings))
    }
}

impl Ledger {
    /// Build a ledger from persisted state without emitting events.
    pub fn from_state(state: LedgerState) -> Result<Self> {
        let mut ledger = Ledger::new();
        ledger.install(state)?;
        Ok(ledger)
    }

    /// Snapshot for persistence or export.
    pub fn to_state(&self) -> LedgerState {
        let logs = self
            .logs
            .iter()
            .map(|entry| StoredLog {
                id: entry.id,
                source_id: Some(entry.source_id),
                source_idx: self.source_position(entry.source_id),
                date: entry.date,
                reading: entry.reading,
                notes: entry.notes.clone(),
                balance: Some(entry.balance),
                created_at: entry.created_at,
            })
            .collect();
        LedgerState {
            sources: self.sources.clone(),
            logs,
            settings: self.settings.clone(),
        }
    }

    /// Replace sources, logs and settings wholesale. On error the ledger is untouched.
    pub fn replace_state(&mut self, state: LedgerState) -> Result<()> {
        self.install(state)?;
        info!(
            "[WRM] ledger: replaced state with {} sources and {} log entries",
            self.sources.len(),
            self.logs.len()
        );
        self.subscribers.notify(LedgerEvent::Imported {
            sources: self.sources.len(),
            logs: self.logs.len(),
        });
        Ok(())
    }

    fn install(&mut self, state: LedgerState) -> Result<()> {
        let (sources, logs, settings) = state.resolve()?;
        let last_id = sources
            .iter()
            .map(|s| s.id.0)
            .chain(logs.iter().map(|l| l.id.0))
            .max()
            .unwrap_or_default();
        self.sources = sources;
        self.logs = logs;
        self.settings = settings;
        self.ids = IdGenerator::starting_after(last_id);
        Ok(())
    }
}
