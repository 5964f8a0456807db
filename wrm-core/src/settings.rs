//! Process-wide settings: alert thresholds, display units and chart colours.
//!
//! Units are labels only; no conversion is ever performed. Every field has a
//! default so partially written settings objects still load.

use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AlertThresholds {
    /// Fill percentage (0-100) below which a source raises a low-storage alert
    pub low_storage: f64,
    /// Percentage of capacity; kept in the stored format, not used for alerting
    pub high_demand: f64,
    /// Rainfall depth above which a log entry raises a rainfall alert
    pub excessive_rainfall: f64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            low_storage: 20.0,
            high_demand: 80.0,
            excessive_rainfall: 50.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Units {
    pub volume: String,
    pub rainfall: String,
}

impl Default for Units {
    fn default() -> Self {
        Self {
            volume: "m³".to_string(),
            rainfall: "mm".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartColors {
    pub primary: String,
    pub secondary: String,
    pub warning: String,
    pub danger: String,
}

impl Default for ChartColors {
    fn default() -> Self {
        Self {
            primary: "#0077cc".to_string(),
            secondary: "#28a745".to_string(),
            warning: "#ffc107".to_string(),
            danger: "#dc3545".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub alert_thresholds: AlertThresholds,
    pub units: Units,
    pub chart_colors: ChartColors,
}

impl Settings {
    pub(crate) fn validate(&self) -> Result<()> {
        let low = self.alert_thresholds.low_storage;
        if !(0.0..=100.0).contains(&low) {
            return Err(LedgerError::validation(
                "Low storage threshold must be between 0 and 100!",
            ));
        }
        let rain = self.alert_thresholds.excessive_rainfall;
        if !rain.is_finite() || rain < 0.0 {
            return Err(LedgerError::validation(
                "Rainfall threshold cannot be negative!",
            ));
        }
        if self.units.volume.trim().is_empty() || self.units.rainfall.trim().is_empty() {
            return Err(LedgerError::validation("Unit labels cannot be empty!"));
        }
        Ok(())
    }
}
