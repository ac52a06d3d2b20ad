//! CLI command implementations

pub mod completions;
pub mod doc;
pub mod element;
pub mod export;
pub mod goal;
pub mod import;
pub mod init;
pub mod kpi;
pub mod log;
pub mod map;
pub mod proc;
pub mod report;
pub mod scorecard;
pub mod status;
pub mod step;
pub mod validate;
