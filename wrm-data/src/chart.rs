//! Storage chart datasets.
//!
//! One line per source, built from [`wrm_core::Ledger::time_series`]. The
//! structs derive `Serialize` so a chart front end can consume them as JSON;
//! [`ChartData::write_csv`] flattens the same points for spreadsheets.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeSet;
use std::io::Write;

use wrm_core::{Ledger, SeriesPoint, SourceId};
use wrm_utils::dates::format_date;

pub const CHART_TITLE: &str = "Water Storage Levels Over Time";

/// Line colours, assigned by source position and reused cyclically.
pub const PALETTE: [&str; 8] = [
    "#0077cc", "#28a745", "#ffc107", "#dc3545", "#6f42c1", "#20c997", "#fd7e14", "#e83e8c",
];

/// Fill opacity used for a dataset's background colour.
pub const BACKGROUND_ALPHA: f64 = 0.1;

/// Line smoothing passed through to the chart.
pub const LINE_TENSION: f64 = 0.1;

/// One source's storage line.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub label: String,
    pub source_id: SourceId,
    pub data: Vec<SeriesPoint>,
    pub border_color: String,
    pub background_color: String,
    pub fill: bool,
    pub tension: f64,
}

/// Everything needed to draw the storage chart.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChartData {
    pub title: String,
    pub y_axis_title: String,
    /// Every distinct log date, ascending
    pub labels: Vec<NaiveDate>,
    pub datasets: Vec<Dataset>,
}

/// Colour for the source at `index` in display order.
pub fn color_for_index(index: usize) -> &'static str {
    PALETTE[index % PALETTE.len()]
}

/// Convert `#rrggbb` to an `rgba(...)` string. Anything else is returned unchanged.
pub fn translucent(hex: &str, alpha: f64) -> String {
    let digits = hex.trim_start_matches('#');
    let channel = |range: std::ops::Range<usize>| {
        digits
            .get(range)
            .and_then(|c| u8::from_str_radix(c, 16).ok())
    };
    match (digits.len(), channel(0..2), channel(2..4), channel(4..6)) {
        (6, Some(r), Some(g), Some(b)) => format!("rgba({r}, {g}, {b}, {alpha})"),
        _ => hex.to_string(),
    }
}

/// Build chart datasets for every source. Empty when there are no sources or no logs.
pub fn build_chart(ledger: &Ledger) -> ChartData {
    let y_axis_title = format!("Storage ({})", ledger.settings().units.volume);
    if ledger.sources().is_empty() || ledger.logs().is_empty() {
        return ChartData {
            title: CHART_TITLE.to_string(),
            y_axis_title,
            labels: Vec::new(),
            datasets: Vec::new(),
        };
    }

    let datasets = ledger
        .sources()
        .iter()
        .enumerate()
        .map(|(idx, source)| {
            let color = color_for_index(idx);
            Dataset {
                label: source.name.clone(),
                source_id: source.id,
                data: ledger.time_series(source.id).into_iter().flatten().collect(),
                border_color: color.to_string(),
                background_color: translucent(color, BACKGROUND_ALPHA),
                fill: false,
                tension: LINE_TENSION,
            }
        })
        .collect();

    let labels: BTreeSet<NaiveDate> = ledger.logs().iter().map(|log| log.date).collect();
    log::debug!(
        "[WRM] chart: built {} datasets over {} dates",
        ledger.sources().len(),
        labels.len()
    );

    ChartData {
        title: CHART_TITLE.to_string(),
        y_axis_title,
        labels: labels.into_iter().collect(),
        datasets,
    }
}

impl ChartData {
    pub fn is_empty(&self) -> bool {
        self.datasets.iter().all(|d| d.data.is_empty())
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Write one row per point: `source,source_id,date,storage`.
    pub fn write_csv<W: Write>(&self, writer: W) -> anyhow::Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(["source", "source_id", "date", "storage"])?;
        for dataset in &self.datasets {
            for point in &dataset.data {
                wtr.write_record([
                    dataset.label.clone(),
                    dataset.source_id.to_string(),
                    format_date(&point.date),
                    point.storage.to_string(),
                ])?;
            }
        }
        wtr.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wrm_core::{NewLog, NewSource, Reading};

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 8, d).unwrap()
    }

    fn sample() -> Ledger {
        let mut ledger = Ledger::new();
        let a = ledger.add_source(NewSource::new("North", 100.0, 50.0)).unwrap();
        let b = ledger.add_source(NewSource::new("South", 100.0, 10.0)).unwrap();
        ledger
            .add_log(NewLog::new(a.id, date(3), Reading::new(5.0, 0.0, 0.0, 0.0)))
            .unwrap();
        ledger
            .add_log(NewLog::new(b.id, date(1), Reading::new(0.0, 1.0, 0.0, 0.0)))
            .unwrap();
        ledger
            .add_log(NewLog::new(a.id, date(1), Reading::new(0.0, 0.0, 20.0, 0.0)))
            .unwrap();
        ledger
    }

    #[test]
    fn test_translucent() {
        assert_eq!(translucent("#0077cc", 0.1), "rgba(0, 119, 204, 0.1)");
        assert_eq!(translucent("red", 0.5), "red");
        assert_eq!(translucent("#zzzzzz", 0.5), "#zzzzzz");
    }

    #[test]
    fn test_palette_cycles() {
        assert_eq!(color_for_index(0), "#0077cc");
        assert_eq!(color_for_index(8), "#0077cc");
        assert_eq!(color_for_index(11), "#dc3545");
    }

    #[test]
    fn test_empty_without_logs() {
        let mut ledger = Ledger::new();
        ledger.add_source(NewSource::new("Only", 10.0, 5.0)).unwrap();
        let chart = build_chart(&ledger);
        assert!(chart.datasets.is_empty());
        assert!(chart.labels.is_empty());
        assert!(chart.is_empty());
        assert_eq!(chart.y_axis_title, "Storage (m³)");
    }

    #[test]
    fn test_datasets_follow_time_series() {
        let chart = build_chart(&sample());
        assert_eq!(chart.labels, vec![date(1), date(3)]);
        assert_eq!(chart.datasets.len(), 2);

        let north = &chart.datasets[0];
        assert_eq!(north.label, "North");
        assert_eq!(north.border_color, "#0077cc");
        let storages: Vec<f64> = north.data.iter().map(|p| p.storage).collect();
        assert_eq!(storages, vec![50.0, 30.0, 35.0]);

        let south = &chart.datasets[1];
        assert_eq!(south.border_color, "#28a745");
        assert_eq!(south.data.last().unwrap().storage, 20.0);
    }

    #[test]
    fn test_json_field_names() {
        let value: serde_json::Value =
            serde_json::from_str(&build_chart(&sample()).to_json().unwrap()).unwrap();
        assert_eq!(value["title"], CHART_TITLE);
        assert_eq!(value["labels"][0], "2024-08-01");
        assert_eq!(value["datasets"][0]["borderColor"], "#0077cc");
        assert_eq!(value["datasets"][0]["fill"], false);
        assert_eq!(value["datasets"][0]["data"][0]["date"], "2024-08-01");
    }

    #[test]
    fn test_write_csv() {
        let mut out = Vec::new();
        build_chart(&sample()).write_csv(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "source,source_id,date,storage");
        assert_eq!(lines.len(), 1 + 3 + 2);
        assert!(lines[1].starts_with("North,"));
        assert!(lines[1].ends_with(",2024-08-01,50"));
    }
}
