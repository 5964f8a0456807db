//! The storage ledger: sources, log entries and settings, plus every mutation.
//!
//! Derived values (storage replay, statistics, alerts) are computed in
//! [`crate::replay`], [`crate::statistics`] and [`crate::alert`] from the
//! collections held here, always from scratch.

use chrono::{DateTime, Utc};
use log::info;
use std::sync::mpsc::Receiver;

use crate::error::{LedgerError, Result};
use crate::event::{LedgerEvent, Subscribers};
use crate::log_entry::{LogEntry, LogId, NewLog};
use crate::settings::Settings;
use crate::source::{validate_capacity, validate_name, NewSource, Source, SourceId};

/// Issues ids from the wall clock in milliseconds, bumped so every id is
/// strictly greater than the previous one.
#[derive(Debug, Default)]
pub(crate) struct IdGenerator {
    last: u64,
}

impl IdGenerator {
    pub(crate) fn starting_after(last: u64) -> Self {
        Self { last }
    }

    pub(crate) fn next(&mut self, now: DateTime<Utc>) -> Result<u64> {
        let millis = u64::try_from(now.timestamp_millis()).unwrap_or_default();
        let bumped = self
            .last
            .checked_add(1)
            .ok_or(LedgerError::IdsExhausted(self.last))?;
        self.last = millis.max(bumped);
        Ok(self.last)
    }
}

/// Result of [`Ledger::delete_source`].
#[derive(Debug, Clone, PartialEq)]
pub struct DeletedSource {
    pub source: Source,
    pub removed_logs: usize,
}

/// In-memory application state: the source list, the log list and settings.
#[derive(Debug, Default)]
pub struct Ledger {
    pub(crate) sources: Vec<Source>,
    pub(crate) logs: Vec<LogEntry>,
    pub(crate) settings: Settings,
    pub(crate) ids: IdGenerator,
    pub(crate) subscribers: Subscribers,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    /// All log entries in insertion order.
    pub fn logs(&self) -> &[LogEntry] {
        &self.logs
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn source(&self, id: SourceId) -> Result<&Source> {
        self.sources
            .iter()
            .find(|s| s.id == id)
            .ok_or(LedgerError::DanglingReference(id))
    }

    /// Position of a source in display order.
    pub fn source_position(&self, id: SourceId) -> Option<usize> {
        self.sources.iter().position(|s| s.id == id)
    }

    /// Entries recorded against one source, in insertion order.
    pub fn logs_for(&self, id: SourceId) -> impl Iterator<Item = &LogEntry> + '_ {
        self.logs.iter().filter(move |log| log.source_id == id)
    }

    /// Register for a [`LedgerEvent`] after every successful mutation.
    pub fn subscribe(&mut self) -> Receiver<LedgerEvent> {
        self.subscribers.subscribe()
    }

    pub fn add_source(&mut self, new_source: NewSource) -> Result<Source> {
        new_source.validate()?;
        let now = Utc::now();
        let id = SourceId(self.ids.next(now)?);
        let source = new_source.into_source(id, now);
        info!(
            "[WRM] ledger: added source {} \"{}\" (capacity {}, initial {})",
            source.id, source.name, source.capacity, source.initial_storage
        );
        self.sources.push(source.clone());
        self.subscribers.notify(LedgerEvent::SourceAdded(id));
        Ok(source)
    }

    /// Rename a source and change its capacity. Logged entries are untouched.
    pub fn edit_source(
        &mut self,
        id: SourceId,
        name: impl Into<String>,
        capacity: f64,
    ) -> Result<Source> {
        let name = name.into();
        validate_name(&name)?;
        validate_capacity(capacity)?;
        let source = self
            .sources
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(LedgerError::DanglingReference(id))?;
        if source.initial_storage > capacity {
            return Err(LedgerError::validation(
                "Initial storage cannot exceed capacity!",
            ));
        }
        source.name = name;
        source.capacity = capacity;
        let updated = source.clone();
        info!("[WRM] ledger: updated source {} \"{}\"", updated.id, updated.name);
        self.subscribers.notify(LedgerEvent::SourceUpdated(id));
        Ok(updated)
    }

    /// Remove a source together with every log entry recorded against it.
    pub fn delete_source(&mut self, id: SourceId) -> Result<DeletedSource> {
        let position = self
            .source_position(id)
            .ok_or(LedgerError::DanglingReference(id))?;
        let source = self.sources.remove(position);
        let before = self.logs.len();
        self.logs.retain(|log| log.source_id != id);
        let removed_logs = before - self.logs.len();
        info!(
            "[WRM] ledger: deleted source {} \"{}\" and {} log entries",
            id, source.name, removed_logs
        );
        self.subscribers
            .notify(LedgerEvent::SourceDeleted { id, removed_logs });
        Ok(DeletedSource {
            source,
            removed_logs,
        })
    }

    pub fn add_log(&mut self, new_log: NewLog) -> Result<LogEntry> {
        self.source(new_log.source_id)?;
        new_log.reading.validate()?;
        let now = Utc::now();
        let id = LogId(self.ids.next(now)?);
        let entry = new_log.into_entry(id, now);
        info!(
            "[WRM] ledger: logged {} for source {} (balance {})",
            entry.date, entry.source_id, entry.balance
        );
        self.logs.push(entry.clone());
        self.subscribers.notify(LedgerEvent::LogAdded {
            id,
            source_id: entry.source_id,
        });
        Ok(entry)
    }

    pub fn update_settings(&mut self, settings: Settings) -> Result<()> {
        settings.validate()?;
        self.settings = settings;
        info!("[WRM] ledger: settings updated");
        self.subscribers.notify(LedgerEvent::SettingsChanged);
        Ok(())
    }

    /// Drop every source and log entry. Settings are kept.
    pub fn clear(&mut self) {
        info!(
            "[WRM] ledger: clearing {} sources and {} log entries",
            self.sources.len(),
            self.logs.len()
        );
        self.sources.clear();
        self.logs.clear();
        self.subscribers.notify(LedgerEvent::Cleared);
    }
}
