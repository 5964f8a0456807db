//! Derived views of the water ledger.
//!
//! This crate turns ledger state into forms suitable for charting, reporting
//! and file exchange. Every function recomputes from the ledger it is given;
//! nothing is cached between calls.

pub mod chart;
pub mod report;
pub mod transfer;
