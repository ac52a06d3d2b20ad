//! Import performance measures from CSV

use miette::{IntoDiagnostic, Result};
use std::path::Path;

use crate::cli::helpers::truncate_str;
use crate::core::{ScorecardCategory, Store};
use crate::entities::PerformanceMeasure;

use super::common::{build_header_map, get_field, open_reader, ImportOptions, ImportStats};

pub const HEADERS: &[&str] = &[
    "process",
    "name",
    "category",
    "goal",
    "formula",
    "source",
    "frequency",
    "target",
];
pub const EXAMPLE: &[&str] = &[
    "OE-1.2",
    "Review actions closed on time",
    "Internal Process",
    "",
    "closed on time / total closed",
    "Action tracker",
    "Monthly",
    ">= 90%",
];

/// Category cell: recognized names and aliases map onto the fixed
/// categories, anything else is kept verbatim
pub fn parse_category(value: &str) -> ScorecardCategory {
    value
        .parse()
        .unwrap_or_else(|_| ScorecardCategory::from_stored(value))
}

pub fn import(store: &Store, file_path: &Path, opts: &ImportOptions) -> Result<ImportStats> {
    let mut stats = ImportStats::default();
    let mut rdr = open_reader(file_path)?;
    let headers = rdr.headers().into_diagnostic()?.clone();
    let header_map = build_header_map(&headers);

    let mut known = store.measures();

    for (row_idx, result) in rdr.records().enumerate() {
        let row_num = row_idx + 2;
        stats.rows_processed += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                stats.row_failed(opts, row_num, &format!("CSV parse error: {}", e))?;
                continue;
            }
        };

        let Some(process_key) = get_field(&record, &header_map, "process") else {
            stats.row_failed(opts, row_num, "Missing required field 'process'")?;
            continue;
        };
        let Some(name) = get_field(&record, &header_map, "name") else {
            stats.row_failed(opts, row_num, "Missing required field 'name'")?;
            continue;
        };
        let process = match store.find_process(&process_key) {
            Ok(p) => p,
            Err(e) => {
                stats.row_failed(opts, row_num, &e.to_string())?;
                continue;
            }
        };

        let goal_id = match get_field(&record, &header_map, "goal") {
            Some(key) => match store.find_goal(&key) {
                Ok(goal) => Some(goal.id),
                Err(e) => {
                    stats.row_failed(opts, row_num, &e.to_string())?;
                    continue;
                }
            },
            None => None,
        };

        let existing = known
            .iter()
            .position(|m| m.process_id == process.id && m.name == name);
        let mut measure = match existing {
            Some(idx) => known[idx].clone(),
            None => PerformanceMeasure::new(
                process.id.clone(),
                name.clone(),
                store.author().to_string(),
            ),
        };

        if let Some(category) = get_field(&record, &header_map, "category") {
            measure.scorecard_category = Some(parse_category(&category));
        }
        if goal_id.is_some() {
            measure.strategic_goal_id = goal_id;
        }
        for (column, slot) in [
            ("formula", &mut measure.formula),
            ("source", &mut measure.source),
            ("frequency", &mut measure.frequency),
            ("target", &mut measure.target),
        ] {
            if let Some(value) = get_field(&record, &header_map, column) {
                *slot = Some(value);
            }
        }

        if !opts.dry_run {
            if let Err(e) = store.save_measure(&measure) {
                stats.row_failed(opts, row_num, &e.to_string())?;
                continue;
            }
        }

        let what = format!("{} / {}", process.process_number, measure.name);
        stats.row_done(opts, row_num, existing.is_some(), &truncate_str(&what, 50));
        match existing {
            Some(idx) => known[idx] = measure,
            None => known.push(measure),
        }
    }

    tracing::debug!(measures = known.len(), "measure table after import");

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_category_accepts_aliases() {
        assert_eq!(parse_category("financial"), ScorecardCategory::Financial);
        assert_eq!(
            parse_category("Learning & Growth"),
            ScorecardCategory::LearningGrowth
        );
    }

    #[test]
    fn test_parse_category_keeps_unknown_text() {
        assert_eq!(
            parse_category("Safety"),
            ScorecardCategory::Other("Safety".to_string())
        );
    }
}
