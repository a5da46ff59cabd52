//! Incentive award engine for insurance sales performance dashboards.
//!
//! The library computes performance-based cash awards from periodic agent
//! metrics and a configured rule catalog, resolves competing awards so only
//! the highest-paying rule in a competition group pays out, and reports the
//! per-agent breakdowns alongside any evaluation failures.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
