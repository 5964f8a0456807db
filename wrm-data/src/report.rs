//! Markdown management report.

use chrono::{DateTime, NaiveDate, Utc};
use wrm_core::statistics::RECENT_AVERAGE_WINDOW;
use wrm_core::Ledger;
use wrm_utils::dates::{file_stamp, format_date};

/// Default report file name for a given generation time.
pub fn report_file_name(now: &DateTime<Utc>) -> String {
    format!("water-resource-report-{}.md", file_stamp(now))
}

/// Render the report as Markdown text.
pub fn render_report(ledger: &Ledger, generated_on: NaiveDate) -> String {
    let stats = ledger.statistics();
    let units = &ledger.settings().units;
    let volume = units.volume.as_str();

    let mut out = format!(
        "# Water Resource Management Report
Generated on: {generated}

## Summary Statistics
- Total Water Sources: {sources}
- Total Storage Capacity: {capacity} {volume}
- Current Storage: {storage:.1} {volume}
- Utilization Rate: {rate:.1}%

## Average Daily Metrics (Last {window} entries)
- Average Inflow: {inflow:.1} {volume}
- Average Outflow: {outflow:.1} {volume}
- Average Rainfall: {rainfall:.1} {rain_unit}

## Water Sources Details
",
        generated = format_date(&generated_on),
        sources = stats.total_sources,
        capacity = stats.total_capacity,
        storage = stats.current_storage,
        rate = stats.utilization_rate,
        window = RECENT_AVERAGE_WINDOW,
        inflow = stats.avg_inflow,
        outflow = stats.avg_outflow,
        rainfall = stats.avg_rainfall,
        rain_unit = units.rainfall,
    );

    for (source, (_, storage)) in ledger.sources().iter().zip(ledger.current_storages()) {
        let location = if source.location.is_empty() {
            "Not specified"
        } else {
            source.location.as_str()
        };
        out.push_str(&format!(
            "\n### {}\n- Type: {}\n- Capacity: {} {volume}\n- Current Storage: {:.1} {volume}\n- Location: {}\n",
            source.name, source.source_type, source.capacity, storage, location
        ));
    }

    out.push_str(&format!(
        "\n## Recent Activity\nTotal Logs: {}\n",
        stats.total_logs
    ));
    out
}
