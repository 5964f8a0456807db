use serde::Serialize;

use crate::ledger::Ledger;
use crate::log_entry::{LogEntry, Reading};

/// Number of most recent log entries (global insertion order) averaged.
pub const RECENT_AVERAGE_WINDOW: usize = 30;

/// Aggregate figures shown on the summary cards and in the report.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total_capacity: f64,
    /// Sum of every source's current storage
    pub current_storage: f64,
    /// `current_storage / total_capacity * 100`, or 0 without capacity
    pub utilization_rate: f64,
    pub avg_inflow: f64,
    pub avg_outflow: f64,
    pub avg_rainfall: f64,
    pub total_sources: usize,
    pub total_logs: usize,
}

fn average(entries: &[LogEntry], field: impl Fn(&Reading) -> f64) -> f64 {
    if entries.is_empty() {
        return 0.0;
    }
    entries.iter().map(|log| field(&log.reading)).sum::<f64>() / entries.len() as f64
}

impl Ledger {
    pub fn statistics(&self) -> Statistics {
        let total_capacity: f64 = self.sources.iter().map(|s| s.capacity).sum();
        let current_storage: f64 = self
            .sources
            .iter()
            .map(|source| self.storage_of(source))
            .sum();
        let utilization_rate = if total_capacity > 0.0 {
            current_storage / total_capacity * 100.0
        } else {
            0.0
        };

        let recent = &self.logs[self.logs.len().saturating_sub(RECENT_AVERAGE_WINDOW)..];
        Statistics {
            total_capacity,
            current_storage,
            utilization_rate,
            avg_inflow: average(recent, |r| r.inflow),
            avg_outflow: average(recent, |r| r.outflow),
            avg_rainfall: average(recent, |r| r.rainfall),
            total_sources: self.sources.len(),
            total_logs: self.logs.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log_entry::NewLog;
    use crate::source::NewSource;
    use chrono::NaiveDate;

    #[test]
    fn test_empty_ledger() {
        let stats = Ledger::new().statistics();
        assert_eq!(stats.total_capacity, 0.0);
        assert_eq!(stats.utilization_rate, 0.0);
        assert_eq!(stats.avg_inflow, 0.0);
        assert_eq!(stats.avg_rainfall, 0.0);
        assert_eq!(stats.total_sources, 0);
        assert_eq!(stats.total_logs, 0);
    }

    #[test]
    fn test_utilization_and_sums() {
        let mut ledger = Ledger::new();
        ledger.add_source(NewSource::new("A", 100.0, 50.0)).unwrap();
        let b = ledger.add_source(NewSource::new("B", 300.0, 0.0)).unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        ledger
            .add_log(NewLog::new(b.id, date, Reading::new(150.0, 0.0, 0.0, 0.0)))
            .unwrap();
        let stats = ledger.statistics();
        assert_eq!(stats.total_capacity, 400.0);
        assert_eq!(stats.current_storage, 200.0);
        assert_eq!(stats.utilization_rate, 50.0);
        assert_eq!(stats.avg_inflow, 150.0);
        assert_eq!(stats.total_logs, 1);
    }

    #[test]
    fn test_averages_use_last_thirty_entries() {
        let mut ledger = Ledger::new();
        let s = ledger
            .add_source(NewSource::new("A", 1_000_000.0, 0.0))
            .unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        // 10 old entries with inflow 1000 fall outside the window
        for _ in 0..10 {
            ledger
                .add_log(NewLog::new(s.id, date, Reading::new(1000.0, 0.0, 0.0, 0.0)))
                .unwrap();
        }
        for i in 0..30 {
            let reading = Reading::new(2.0, i as f64, 4.0, 0.0);
            ledger.add_log(NewLog::new(s.id, date, reading)).unwrap();
        }
        let stats = ledger.statistics();
        assert_eq!(stats.total_logs, 40);
        assert_eq!(stats.avg_inflow, 2.0);
        assert_eq!(stats.avg_outflow, 4.0);
        assert_eq!(stats.avg_rainfall, 14.5);
    }
}
