//! Commands that change sources, log entries and settings.

use anyhow::bail;
use log::info;
use std::io::Write;

use wrm_core::{NewLog, NewSource, Reading, Settings, Severity, SourceId};
use wrm_utils::dates::parse_log_date;

use crate::session::Session;
use crate::view::notice;

pub fn add_source(
    session: &mut Session,
    name: String,
    capacity: f64,
    initial_storage: f64,
    location: String,
    source_type: String,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let new_source = NewSource::new(name, capacity, initial_storage)
        .location(location)
        .source_type(source_type);
    let source = session.ledger_mut().add_source(new_source)?;
    let message = format!("Source \"{}\" added successfully!", source.name);
    writeln!(out, "{}", notice(Severity::Success, &message))?;
    Ok(())
}

/// Unspecified fields keep their current value.
pub fn edit_source(
    session: &mut Session,
    id: SourceId,
    name: Option<String>,
    capacity: Option<f64>,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let current = session.ledger().source(id)?;
    let name = name.unwrap_or_else(|| current.name.clone());
    let capacity = capacity.unwrap_or(current.capacity);
    session.ledger_mut().edit_source(id, name, capacity)?;
    writeln!(out, "{}", notice(Severity::Success, "Source updated successfully!"))?;
    Ok(())
}

pub fn delete_source(session: &mut Session, id: SourceId, out: &mut impl Write) -> anyhow::Result<()> {
    let deleted = session.ledger_mut().delete_source(id)?;
    info!(
        "[WRM] manage: deleted \"{}\" with {} log entries",
        deleted.source.name, deleted.removed_logs
    );
    writeln!(out, "{}", notice(Severity::Info, "Source deleted successfully!"))?;
    Ok(())
}

pub fn log_reading(
    session: &mut Session,
    source: SourceId,
    date: &str,
    reading: Reading,
    notes: String,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let date = parse_log_date(date)?;
    session
        .ledger_mut()
        .add_log(NewLog::new(source, date, reading).notes(notes))?;
    writeln!(out, "{}", notice(Severity::Success, "Daily data logged successfully!"))?;
    Ok(())
}

/// Settings fields given on the command line.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SettingsChange {
    pub low_storage: Option<f64>,
    pub high_demand: Option<f64>,
    pub excessive_rainfall: Option<f64>,
    pub volume_unit: Option<String>,
    pub rainfall_unit: Option<String>,
}

impl SettingsChange {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply_to(self, settings: &Settings) -> Settings {
        let mut next = settings.clone();
        let thresholds = &mut next.alert_thresholds;
        if let Some(value) = self.low_storage {
            thresholds.low_storage = value;
        }
        if let Some(value) = self.high_demand {
            thresholds.high_demand = value;
        }
        if let Some(value) = self.excessive_rainfall {
            thresholds.excessive_rainfall = value;
        }
        if let Some(unit) = self.volume_unit {
            next.units.volume = unit;
        }
        if let Some(unit) = self.rainfall_unit {
            next.units.rainfall = unit;
        }
        next
    }
}

pub fn render_settings(settings: &Settings) -> String {
    let t = &settings.alert_thresholds;
    format!(
        "Low storage threshold: {}%\nHigh demand threshold: {}%\nExcessive rainfall threshold: {} {}\nVolume unit: {}\nRainfall unit: {}\n",
        t.low_storage,
        t.high_demand,
        t.excessive_rainfall,
        settings.units.rainfall,
        settings.units.volume,
        settings.units.rainfall
    )
}

/// Print settings when nothing is given, otherwise validate and save the change.
pub fn settings(session: &mut Session, change: SettingsChange, out: &mut impl Write) -> anyhow::Result<()> {
    if change.is_empty() {
        write!(out, "{}", render_settings(session.ledger().settings()))?;
        return Ok(());
    }
    let next = change.apply_to(session.ledger().settings());
    session.ledger_mut().update_settings(next)?;
    writeln!(out, "{}", notice(Severity::Success, "Settings saved successfully!"))?;
    Ok(())
}

pub fn clear(session: &mut Session, confirmed: bool, out: &mut impl Write) -> anyhow::Result<()> {
    if !confirmed {
        bail!("Refusing to delete all data without --yes");
    }
    session.ledger_mut().clear();
    writeln!(out, "{}", notice(Severity::Info, "All data cleared!"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wrm_core::LedgerError;
    use wrm_db::Database;

    fn session_with_source() -> (Session, SourceId) {
        let mut session = Session::with_database(Database::new().unwrap()).unwrap();
        let id = session
            .ledger_mut()
            .add_source(NewSource::new("Main", 100.0, 40.0))
            .unwrap()
            .id;
        session.commit().unwrap();
        (session, id)
    }

    #[test]
    fn test_edit_keeps_unspecified_fields() {
        let (mut session, id) = session_with_source();
        let mut out = Vec::new();
        edit_source(&mut session, id, None, Some(250.0), &mut out).unwrap();
        let source = session.ledger().source(id).unwrap();
        assert_eq!(source.name, "Main");
        assert_eq!(source.capacity, 250.0);
    }

    #[test]
    fn test_unknown_source_is_dangling() {
        let (mut session, _) = session_with_source();
        let mut out = Vec::new();
        let err = delete_source(&mut session, SourceId(7), &mut out).unwrap_err();
        assert_eq!(
            err.downcast_ref::<LedgerError>(),
            Some(&LedgerError::DanglingReference(SourceId(7)))
        );
        assert!(out.is_empty());
    }

    #[test]
    fn test_bad_log_date() {
        let (mut session, id) = session_with_source();
        let mut out = Vec::new();
        let err = log_reading(&mut session, id, "03/01/2024", Reading::default(), String::new(), &mut out)
            .unwrap_err();
        assert!(err.to_string().contains("YYYY-MM-DD"));
        assert!(session.ledger().logs().is_empty());
    }

    #[test]
    fn test_settings_without_flags_prints_current() {
        let (mut session, _) = session_with_source();
        let mut out = Vec::new();
        settings(&mut session, SettingsChange::default(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Low storage threshold: 20%\n"));
        assert!(session.commit().unwrap().is_empty());
    }

    #[test]
    fn test_settings_change_applies_only_given_fields() {
        let (mut session, _) = session_with_source();
        let mut out = Vec::new();
        let change = SettingsChange {
            low_storage: Some(45.0),
            volume_unit: Some("ML".to_string()),
            ..Default::default()
        };
        settings(&mut session, change, &mut out).unwrap();
        let settings = session.ledger().settings();
        assert_eq!(settings.alert_thresholds.low_storage, 45.0);
        assert_eq!(settings.alert_thresholds.excessive_rainfall, 50.0);
        assert_eq!(settings.units.volume, "ML");
        assert_eq!(settings.units.rainfall, "mm");
    }

    #[test]
    fn test_out_of_range_threshold_rejected() {
        let (mut session, _) = session_with_source();
        let mut out = Vec::new();
        let change = SettingsChange {
            low_storage: Some(150.0),
            ..Default::default()
        };
        assert!(settings(&mut session, change, &mut out).is_err());
        assert_eq!(session.ledger().settings(), &Settings::default());
    }

    #[test]
    fn test_clear_requires_confirmation() {
        let (mut session, _) = session_with_source();
        let mut out = Vec::new();
        assert!(clear(&mut session, false, &mut out).is_err());
        assert_eq!(session.ledger().sources().len(), 1);
        clear(&mut session, true, &mut out).unwrap();
        assert!(session.ledger().sources().is_empty());
    }
}
