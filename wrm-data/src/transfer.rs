//! JSON export and import of the whole ledger.
//!
//! The export document is `{ sources, logs, settings, exportDate, version }`.
//! Import accepts any JSON object that has both `sources` and `logs`;
//! `settings` is optional and falls back to the settings already in use.
//! An import either replaces the ledger completely or leaves it untouched.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use wrm_core::{Ledger, LedgerError, LedgerState, Settings, Source, StoredLog};
use wrm_utils::dates::file_stamp;

/// Format version written into every export.
pub const EXPORT_VERSION: &str = "2.0.0";

const INVALID_FORMAT: &str = "Invalid file format";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub sources: Vec<Source>,
    pub logs: Vec<StoredLog>,
    pub settings: Settings,
    pub export_date: DateTime<Utc>,
    pub version: String,
}

impl ExportDocument {
    pub fn from_ledger(ledger: &Ledger, export_date: DateTime<Utc>) -> Self {
        let state = ledger.to_state();
        Self {
            sources: state.sources,
            logs: state.logs,
            settings: state.settings,
            export_date,
            version: EXPORT_VERSION.to_string(),
        }
    }
}

/// Default export file name for a given export time.
pub fn export_file_name(now: &DateTime<Utc>) -> String {
    format!("water-resource-data-{}.json", file_stamp(now))
}

/// Pretty-printed export document.
pub fn export_json(ledger: &Ledger, export_date: DateTime<Utc>) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&ExportDocument::from_ledger(ledger, export_date))
}

fn format_error(detail: impl std::fmt::Display) -> LedgerError {
    LedgerError::ImportFormat(format!("{INVALID_FORMAT}: {detail}"))
}

/// Parse an import document into ledger state without touching any ledger.
pub fn parse_import(text: &str, current_settings: &Settings) -> wrm_core::Result<LedgerState> {
    let value: Value = serde_json::from_str(text).map_err(format_error)?;
    let mut object = match value {
        Value::Object(object) => object,
        _ => return Err(LedgerError::ImportFormat(INVALID_FORMAT.to_string())),
    };

    let present = |v: &Option<Value>| matches!(v, Some(v) if !v.is_null());
    let sources = object.remove("sources");
    let logs = object.remove("logs");
    if !present(&sources) || !present(&logs) {
        return Err(LedgerError::ImportFormat(INVALID_FORMAT.to_string()));
    }

    let sources: Vec<Source> =
        serde_json::from_value(sources.unwrap_or_default()).map_err(format_error)?;
    let logs: Vec<StoredLog> =
        serde_json::from_value(logs.unwrap_or_default()).map_err(format_error)?;
    let settings = match object.remove("settings") {
        Some(value) if !value.is_null() => {
            serde_json::from_value(value).map_err(format_error)?
        }
        _ => current_settings.clone(),
    };

    Ok(LedgerState {
        sources,
        logs,
        settings,
    })
}

/// Replace the ledger with the contents of an import document.
pub fn import_json(ledger: &mut Ledger, text: &str) -> wrm_core::Result<()> {
    let state = parse_import(text, ledger.settings())?;
    ledger.replace_state(state)
}
