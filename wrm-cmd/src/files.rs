//! Chart output, JSON export/import and the Markdown report.

use anyhow::{anyhow, Context};
use chrono::Utc;
use log::info;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use wrm_core::{Ledger, Severity};
use wrm_data::chart::build_chart;
use wrm_data::report::{render_report, report_file_name};
use wrm_data::transfer::{export_file_name, export_json, import_json};
use wrm_utils::dates::today;

use crate::session::Session;
use crate::view::{notice, render_chart};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartFormat {
    Text,
    Json,
    Csv,
}

impl ChartFormat {
    pub fn from_flags(json: bool, csv: bool) -> Self {
        match (json, csv) {
            (true, _) => ChartFormat::Json,
            (_, true) => ChartFormat::Csv,
            _ => ChartFormat::Text,
        }
    }
}

pub fn chart(
    ledger: &Ledger,
    format: ChartFormat,
    output: Option<PathBuf>,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let chart = build_chart(ledger);
    let mut buffer = Vec::new();
    match format {
        ChartFormat::Text => buffer.extend_from_slice(render_chart(&chart).as_bytes()),
        ChartFormat::Json => {
            buffer.extend_from_slice(chart.to_json()?.as_bytes());
            buffer.push(b'\n');
        }
        ChartFormat::Csv => chart.write_csv(&mut buffer)?,
    }
    match output {
        Some(path) => {
            write_file(&path, &buffer)?;
            let message = format!("Chart written to {}", path.display());
            writeln!(out, "{}", notice(Severity::Success, &message))?;
        }
        None => out.write_all(&buffer)?,
    }
    Ok(())
}

pub fn export(ledger: &Ledger, output: Option<PathBuf>, out: &mut impl Write) -> anyhow::Result<()> {
    let now = Utc::now();
    let path = output.unwrap_or_else(|| PathBuf::from(export_file_name(&now)));
    let json = export_json(ledger, now)?;
    write_file(&path, json.as_bytes())?;
    info!("[WRM] files: exported {} sources to {}", ledger.sources().len(), path.display());
    let message = format!("Data exported successfully! ({})", path.display());
    writeln!(out, "{}", notice(Severity::Success, &message))?;
    Ok(())
}

/// Replace the ledger with an export file. On any failure nothing changes.
pub fn import(session: &mut Session, file: &Path, out: &mut impl Write) -> anyhow::Result<()> {
    let text = fs::read_to_string(file)
        .with_context(|| format!("Error importing data: cannot read {}", file.display()))?;
    import_json(session.ledger_mut(), &text).map_err(|e| anyhow!("Error importing data: {e}"))?;
    writeln!(out, "{}", notice(Severity::Success, "Data imported successfully!"))?;
    Ok(())
}

pub fn report(ledger: &Ledger, output: Option<PathBuf>, out: &mut impl Write) -> anyhow::Result<()> {
    let path = output.unwrap_or_else(|| PathBuf::from(report_file_name(&Utc::now())));
    let markdown = render_report(ledger, today());
    write_file(&path, markdown.as_bytes())?;
    let message = format!("Report generated successfully! ({})", path.display());
    writeln!(out, "{}", notice(Severity::Success, &message))?;
    Ok(())
}

fn write_file(path: &Path, contents: &[u8]) -> anyhow::Result<()> {
    fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use wrm_core::{NewLog, NewSource, Reading};
    use wrm_db::Database;

    fn session() -> Session {
        let mut session = Session::with_database(Database::new().unwrap()).unwrap();
        let ledger = session.ledger_mut();
        let s = ledger.add_source(NewSource::new("Main", 100.0, 50.0)).unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 4, 2).unwrap();
        ledger
            .add_log(NewLog::new(s.id, date, Reading::new(10.0, 0.0, 5.0, 0.0)))
            .unwrap();
        session.commit().unwrap();
        session
    }

    #[test]
    fn test_chart_formats() {
        let session = session();
        let mut out = Vec::new();
        chart(session.ledger(), ChartFormat::Csv, None, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("source,source_id,date,storage\n"));
        assert!(text.contains(",2024-04-02,55"));

        let mut out = Vec::new();
        chart(session.ledger(), ChartFormat::Json, None, &mut out).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["datasets"][0]["label"], "Main");
        assert_eq!(ChartFormat::from_flags(false, false), ChartFormat::Text);
    }

    #[test]
    fn test_export_then_import_restores_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("backup.json");
        let mut original = session();
        let mut out = Vec::new();
        export(original.ledger(), Some(path.clone()), &mut out).unwrap();
        assert!(String::from_utf8(out).unwrap().starts_with("[success] Data exported successfully!"));

        original.ledger_mut().clear();
        original.commit().unwrap();
        let mut out = Vec::new();
        import(&mut original, &path, &mut out).unwrap();
        assert_eq!(original.ledger().sources().len(), 1);
        assert_eq!(original.ledger().logs().len(), 1);
        assert!(!original.commit().unwrap().is_empty());
    }

    #[test]
    fn test_bad_import_reports_and_keeps_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, r#"{"sources": []}"#).unwrap();
        let mut session = session();
        let mut out = Vec::new();
        let err = import(&mut session, &path, &mut out).unwrap_err();
        assert_eq!(err.to_string(), "Error importing data: Invalid file format");
        assert_eq!(session.ledger().sources().len(), 1);
        assert!(session.commit().unwrap().is_empty());
    }

    #[test]
    fn test_report_written_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.md");
        let mut out = Vec::new();
        report(session().ledger(), Some(path.clone()), &mut out).unwrap();
        let markdown = fs::read_to_string(&path).unwrap();
        assert!(markdown.starts_with("# Water Resource Management Report\n"));
        assert!(markdown.contains("### Main"));
    }
}
