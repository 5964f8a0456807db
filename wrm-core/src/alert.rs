use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ledger::Ledger;

/// Number of most recent log entries (global insertion order) checked for rainfall.
pub const RECENT_ALERT_WINDOW: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Info,
    Warning,
    Danger,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Success => "success",
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Danger => "danger",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub severity: Severity,
    pub message: String,
}

impl Ledger {
    /// Threshold alerts: low storage per source (source order), then excessive
    /// rainfall for each of the last [`RECENT_ALERT_WINDOW`] entries (log order).
    ///
    /// Nothing is deduplicated; an entry that stays in the window raises its
    /// alert again on every call.
    pub fn check_alerts(&self) -> Vec<Alert> {
        let thresholds = &self.settings.alert_thresholds;
        let mut alerts = Vec::new();

        for source in &self.sources {
            let percentage = source.fill_percentage(self.storage_of(source));
            if percentage < thresholds.low_storage {
                alerts.push(Alert {
                    severity: Severity::Warning,
                    message: format!(
                        "Low storage alert: {} is at {:.1}%",
                        source.name, percentage
                    ),
                });
            }
        }

        let recent = &self.logs[self.logs.len().saturating_sub(RECENT_ALERT_WINDOW)..];
        for log in recent {
            if log.reading.rainfall > thresholds.excessive_rainfall {
                alerts.push(Alert {
                    severity: Severity::Info,
                    message: format!(
                        "High rainfall recorded: {}{} on {}",
                        log.reading.rainfall, self.settings.units.rainfall, log.date
                    ),
                });
            }
        }

        alerts
    }
}
