//! Plain-text renderings of ledger views for the terminal.
//!
//! Every function recomputes from the ledger it is given and returns a
//! `String`, so the session can re-render the whole dashboard after any change.

use wrm_core::{Alert, Ledger, Severity, SourceId};
use wrm_data::chart::ChartData;
use wrm_utils::dates::format_date;

pub const NO_SOURCES: &str = "No water sources added yet. Add your first source with `add-source`.";
pub const NO_ALERTS: &str = "System ready - no alerts at this time.";
pub const NO_LOGS: &str = "No daily data logged yet.";
pub const NO_CHART: &str = "No storage data to chart yet.";

/// One-line transient message shown after a command.
pub fn notice(severity: Severity, message: &str) -> String {
    format!("[{severity}] {message}")
}

pub fn render_sources(ledger: &Ledger) -> String {
    if ledger.sources().is_empty() {
        return format!("{NO_SOURCES}\n");
    }
    let volume = &ledger.settings().units.volume;
    let mut out = String::new();
    for (source, (_, storage)) in ledger.sources().iter().zip(ledger.current_storages()) {
        out.push_str(&format!(
            "[{}] {} ({})\n    Capacity: {} {volume} | Current: {:.1} {volume} ({:.1}%)",
            source.id,
            source.name,
            source.source_type,
            source.capacity,
            storage,
            source.fill_percentage(storage)
        ));
        if !source.location.is_empty() {
            out.push_str(&format!(" | Location: {}", source.location));
        }
        out.push('\n');
    }
    out
}

/// Log entries in insertion order, optionally for one source only.
pub fn render_logs(ledger: &Ledger, source: Option<SourceId>) -> String {
    let logs: Vec<_> = ledger
        .logs()
        .iter()
        .filter(|log| source.map_or(true, |id| log.source_id == id))
        .collect();
    if logs.is_empty() {
        return format!("{NO_LOGS}\n");
    }
    let mut out = format!(
        "{:<10}  {:<20}  {:>9}  {:>9}  {:>9}  {:>9}  {:>9}  notes\n",
        "date", "source", "inflow", "rainfall", "outflow", "demand", "balance"
    );
    for log in logs {
        let name = ledger
            .source(log.source_id)
            .map(|s| s.name.as_str())
            .unwrap_or("?");
        let r = &log.reading;
        out.push_str(&format!(
            "{:<10}  {:<20}  {:>9.1}  {:>9.1}  {:>9.1}  {:>9.1}  {:>9.1}  {}\n",
            format_date(&log.date),
            name,
            r.inflow,
            r.rainfall,
            r.outflow,
            r.demand,
            log.balance,
            log.notes
        ));
    }
    out
}

/// Summary cards.
pub fn render_statistics(ledger: &Ledger) -> String {
    let stats = ledger.statistics();
    let volume = &ledger.settings().units.volume;
    format!(
        "Water Sources: {}\nCurrent Storage ({volume}): {:.1}\nUtilization Rate: {:.1}%\nAvg Inflow ({volume}): {:.1}\n",
        stats.total_sources, stats.current_storage, stats.utilization_rate, stats.avg_inflow
    )
}

/// Alert banners, or the all-clear line when there are none.
pub fn render_alerts(alerts: &[Alert]) -> String {
    if alerts.is_empty() {
        return format!("{}\n", notice(Severity::Info, NO_ALERTS));
    }
    alerts
        .iter()
        .map(|alert| format!("{}\n", notice(alert.severity, &alert.message)))
        .collect()
}

/// Chart points as a text table, one block per source.
pub fn render_chart(chart: &ChartData) -> String {
    if chart.is_empty() {
        return format!("{NO_CHART}\n");
    }
    let mut out = format!("{}\n{}\n", chart.title, chart.y_axis_title);
    for dataset in chart.datasets.iter().filter(|d| !d.data.is_empty()) {
        out.push_str(&format!("\n{} ({})\n", dataset.label, dataset.border_color));
        for point in &dataset.data {
            out.push_str(&format!(
                "  {}  {:>12.1}\n",
                format_date(&point.date),
                point.storage
            ));
        }
    }
    out
}

/// Source list, summary cards and alerts: everything re-rendered after a change.
pub fn render_dashboard(ledger: &Ledger) -> String {
    format!(
        "== Water Sources ==\n{}\n== Statistics ==\n{}\n== Alerts ==\n{}",
        render_sources(ledger),
        render_statistics(ledger),
        render_alerts(&ledger.check_alerts())
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use wrm_core::{NewLog, NewSource, Reading};

    fn sample() -> (Ledger, SourceId) {
        let mut ledger = Ledger::new();
        let s = ledger
            .add_source(NewSource::new("Main", 200.0, 20.0).location("Hill"))
            .unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        ledger
            .add_log(NewLog::new(s.id, date, Reading::new(10.0, 0.0, 0.0, 0.0)).notes("gate open"))
            .unwrap();
        (ledger, s.id)
    }

    #[test]
    fn test_notice() {
        assert_eq!(notice(Severity::Success, "Saved"), "[success] Saved");
    }

    #[test]
    fn test_empty_views() {
        let ledger = Ledger::new();
        assert_eq!(render_sources(&ledger), format!("{NO_SOURCES}\n"));
        assert_eq!(render_logs(&ledger, None), format!("{NO_LOGS}\n"));
        assert_eq!(render_alerts(&[]), format!("[info] {NO_ALERTS}\n"));
        assert!(render_statistics(&ledger).contains("Utilization Rate: 0.0%"));
    }

    #[test]
    fn test_render_sources() {
        let (ledger, id) = sample();
        let text = render_sources(&ledger);
        assert!(text.starts_with(&format!("[{id}] Main (reservoir)\n")));
        assert!(text.contains("Capacity: 200 m³ | Current: 30.0 m³ (15.0%) | Location: Hill"));
    }

    #[test]
    fn test_render_logs_filters_by_source() {
        let (ledger, id) = sample();
        let text = render_logs(&ledger, Some(id));
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains("2024-06-01"));
        assert!(text.contains("gate open"));
        assert_eq!(render_logs(&ledger, Some(SourceId(1))), format!("{NO_LOGS}\n"));
    }

    #[test]
    fn test_dashboard_includes_alerts() {
        let (ledger, _) = sample();
        let text = render_dashboard(&ledger);
        assert!(text.contains("== Statistics ==\nWater Sources: 1\n"));
        assert!(text.contains("[warning] Low storage alert: Main is at 15.0%"));
    }

    #[test]
    fn test_render_chart() {
        let (ledger, _) = sample();
        let text = render_chart(&wrm_data::chart::build_chart(&ledger));
        assert!(text.starts_with("Water Storage Levels Over Time\nStorage (m³)\n"));
        assert!(text.contains("Main (#0077cc)"));
        assert!(text.contains("  2024-06-01          30.0"));
    }
}
