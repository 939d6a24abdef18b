//! Dashboard indicators for the maintenance work-order sheets.
//!
//! Everything in here is a pure function of the two record snapshots, the
//! selected [`period::ReportingPeriod`] and the reference date. Nothing is
//! cached between calls.

pub mod aggregator;
pub mod config;
pub mod deviation;
pub mod period;
