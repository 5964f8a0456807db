use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{LedgerError, Result};

/// Source type recorded when none is given.
pub const DEFAULT_SOURCE_TYPE: &str = "reservoir";

/// Stable identifier of a water source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceId(pub u64);

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A modeled reservoir or supply with a fixed capacity and a starting storage level.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    pub id: SourceId,
    pub name: String,
    /// Maximum storable volume, in the configured volume unit
    pub capacity: f64,
    /// Storage at creation time, within `[0, capacity]`
    pub initial_storage: f64,
    #[serde(default)]
    pub location: String,
    #[serde(rename = "type", default = "default_source_type")]
    pub source_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

fn default_source_type() -> String {
    DEFAULT_SOURCE_TYPE.to_string()
}

impl Source {
    /// Same rules as [`NewSource`], applied to stored or imported records.
    pub(crate) fn validate(&self) -> Result<()> {
        validate_name(&self.name)?;
        validate_capacity(self.capacity)?;
        validate_initial_storage(self.initial_storage, self.capacity)
    }

    /// Bound a storage level to `[0, capacity]`.
    pub fn clamp(&self, storage: f64) -> f64 {
        storage.min(self.capacity).max(0.0)
    }

    /// Storage as a percentage of this source's capacity.
    pub fn fill_percentage(&self, storage: f64) -> f64 {
        storage / self.capacity * 100.0
    }
}

/// Input for [`crate::Ledger::add_source`].
#[derive(Debug, Clone, PartialEq)]
pub struct NewSource {
    pub name: String,
    pub capacity: f64,
    pub initial_storage: f64,
    pub location: Option<String>,
    pub source_type: Option<String>,
}

impl NewSource {
    pub fn new(name: impl Into<String>, capacity: f64, initial_storage: f64) -> Self {
        Self {
            name: name.into(),
            capacity,
            initial_storage,
            location: None,
            source_type: None,
        }
    }

    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn source_type(mut self, source_type: impl Into<String>) -> Self {
        self.source_type = Some(source_type.into());
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        validate_name(&self.name)?;
        validate_capacity(self.capacity)?;
        validate_initial_storage(self.initial_storage, self.capacity)
    }

    pub(crate) fn into_source(self, id: SourceId, created_at: DateTime<Utc>) -> Source {
        Source {
            id,
            name: self.name,
            capacity: self.capacity,
            initial_storage: self.initial_storage,
            location: self.location.unwrap_or_default(),
            source_type: self
                .source_type
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(default_source_type),
            created_at: Some(created_at),
        }
    }
}

pub(crate) fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(LedgerError::validation("Source name cannot be empty!"));
    }
    Ok(())
}

pub(crate) fn validate_capacity(capacity: f64) -> Result<()> {
    if !capacity.is_finite() || capacity <= 0.0 {
        return Err(LedgerError::validation("Capacity must be greater than zero!"));
    }
    Ok(())
}

fn validate_initial_storage(initial_storage: f64, capacity: f64) -> Result<()> {
    if !initial_storage.is_finite() || initial_storage < 0.0 {
        return Err(LedgerError::validation("Initial storage cannot be negative!"));
    }
    if initial_storage > capacity {
        return Err(LedgerError::validation(
            "Initial storage cannot exceed capacity!",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(capacity: f64, initial_storage: f64) -> Source {
        NewSource::new("Lake", capacity, initial_storage).into_source(SourceId(1), Utc::now())
    }

    #[test]
    fn test_clamp_bounds() {
        let s = source(100.0, 50.0);
        assert_eq!(s.clamp(150.0), 100.0);
        assert_eq!(s.clamp(-3.0), 0.0);
        assert_eq!(s.clamp(42.5), 42.5);
    }

    #[test]
    fn test_validate_rejects_overfull() {
        let err = NewSource::new("Tank", 50.0, 80.0).validate().unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
        assert_eq!(err.to_string(), "Initial storage cannot exceed capacity!");
    }

    #[test]
    fn test_validate_rejects_non_positive_capacity() {
        assert!(NewSource::new("Tank", 0.0, 0.0).validate().is_err());
        assert!(NewSource::new("Tank", -5.0, 0.0).validate().is_err());
        assert!(NewSource::new("Tank", 10.0, -1.0).validate().is_err());
        assert!(NewSource::new("Tank", 10.0, 10.0).validate().is_ok());
    }

    #[test]
    fn test_default_type_and_location() {
        let s = source(10.0, 1.0);
        assert_eq!(s.source_type, "reservoir");
        assert_eq!(s.location, "");
    }

    #[test]
    fn test_deserialize_minimal_record() {
        let s: Source =
            serde_json::from_str(r#"{"id":7,"name":"Well","capacity":40,"initialStorage":10}"#)
                .unwrap();
        assert_eq!(s.id, SourceId(7));
        assert_eq!(s.source_type, DEFAULT_SOURCE_TYPE);
        assert!(s.created_at.is_none());
    }
}
