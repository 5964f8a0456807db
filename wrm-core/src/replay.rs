//! Storage replay.
//!
//! The running storage of a source starts at its initial storage and adds the
//! balance of each log entry, clamping to `[0, capacity]` after every step.
//! Because the clamp is applied per step, a decrease that follows an overflow
//! starts from the clamped value, not from the unbounded sum.
//!
//! Two orderings exist: [`Ledger::current_storage`] replays entries in
//! insertion order, [`Ledger::time_series`] replays them sorted by date
//! (stable for equal dates). Both are recomputed on every call.

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::Result;
use crate::ledger::Ledger;
use crate::log_entry::LogEntry;
use crate::source::{Source, SourceId};

/// One point of a storage chart line.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub storage: f64,
}

/// Lazily replays a source's entries in date order.
///
/// Yields the initial storage at the first entry's date, then one point per
/// entry. Yields nothing for a source without entries.
#[derive(Debug, Clone)]
pub struct TimeSeries<'a> {
    source: &'a Source,
    entries: std::vec::IntoIter<&'a LogEntry>,
    running: f64,
    initial_date: Option<NaiveDate>,
}

impl<'a> TimeSeries<'a> {
    fn new(source: &'a Source, mut entries: Vec<&'a LogEntry>) -> Self {
        // sort_by_key is stable: equal dates keep insertion order
        entries.sort_by_key(|entry| entry.date);
        let initial_date = entries.first().map(|entry| entry.date);
        Self {
            source,
            entries: entries.into_iter(),
            running: source.initial_storage,
            initial_date,
        }
    }
}

impl Iterator for TimeSeries<'_> {
    type Item = SeriesPoint;

    fn next(&mut self) -> Option<SeriesPoint> {
        if let Some(date) = self.initial_date.take() {
            return Some(SeriesPoint {
                date,
                storage: self.running,
            });
        }
        let entry = self.entries.next()?;
        self.running = self.source.clamp(self.running + entry.balance);
        Some(SeriesPoint {
            date: entry.date,
            storage: self.running,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.entries.len() + usize::from(self.initial_date.is_some());
        (n, Some(n))
    }
}

impl ExactSizeIterator for TimeSeries<'_> {}

/// Fold balances onto a starting storage, clamping after each step.
pub(crate) fn replay<'a>(source: &Source, entries: impl IntoIterator<Item = &'a LogEntry>) -> f64 {
    entries
        .into_iter()
        .fold(source.initial_storage, |running, entry| {
            source.clamp(running + entry.balance)
        })
}

impl Ledger {
    /// Current storage of one source, replaying its entries in insertion order.
    pub fn current_storage(&self, id: SourceId) -> Result<f64> {
        let source = self.source(id)?;
        Ok(self.storage_of(source))
    }

    /// Current storage of every source, in source order.
    pub fn current_storages(&self) -> Vec<(SourceId, f64)> {
        self.sources
            .iter()
            .map(|source| (source.id, self.storage_of(source)))
            .collect()
    }

    /// Date-ordered running storage for one source.
    pub fn time_series(&self, id: SourceId) -> Result<TimeSeries<'_>> {
        let source = self.source(id)?;
        Ok(TimeSeries::new(source, self.logs_for(id).collect()))
    }

    pub(crate) fn storage_of(&self, source: &Source) -> f64 {
        replay(source, self.logs_for(source.id))
    }
}
