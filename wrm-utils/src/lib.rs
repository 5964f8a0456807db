//! Shared utility functions for WRM crates.

/// Date utility functions
pub mod dates {
    use anyhow::Context;
    use chrono::{DateTime, Local, NaiveDate, Utc};

    /// Format a NaiveDate as "YYYY-MM-DD"
    pub fn format_date(date: &NaiveDate) -> String {
        date.format("%Y-%m-%d").to_string()
    }

    /// Parse a date string in "YYYY-MM-DD" format
    pub fn parse_date(s: &str) -> anyhow::Result<NaiveDate> {
        Ok(NaiveDate::parse_from_str(s, "%Y-%m-%d")?)
    }

    /// Parse a date string in "YYYYMMDD" format
    pub fn parse_date_compact(s: &str) -> anyhow::Result<NaiveDate> {
        Ok(NaiveDate::parse_from_str(s, "%Y%m%d")?)
    }

    /// Parse either "YYYY-MM-DD" or "YYYYMMDD", or the word "today".
    pub fn parse_log_date(s: &str) -> anyhow::Result<NaiveDate> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("today") {
            return Ok(today());
        }
        parse_date(s)
            .or_else(|_| parse_date_compact(s))
            .with_context(|| format!("Date must be of YYYY-MM-DD format, got \"{s}\""))
    }

    /// Today's date in the local time zone.
    pub fn today() -> NaiveDate {
        Local::now().date_naive()
    }

    /// UTC date part of a timestamp, used to stamp exported file names.
    pub fn file_stamp(timestamp: &DateTime<Utc>) -> String {
        format_date(&timestamp.date_naive())
    }

}
