//! OEX: Operational Excellence framework toolkit
//!
//! Elements, processes, steps, KPIs and strategic goals kept as plain-text
//! YAML records, aggregated into element and goal trees, mind maps,
//! balanced scorecards and paginated exports.

pub mod aggregate;
pub mod cli;
pub mod core;
pub mod entities;
pub mod export;
