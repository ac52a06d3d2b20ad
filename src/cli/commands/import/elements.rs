//! Import elements from CSV

use miette::{IntoDiagnostic, Result};
use std::path::Path;

use crate::cli::helpers::truncate_str;
use crate::core::Store;
use crate::entities::Element;

use super::common::{build_header_map, get_field, open_reader, parse_flag, ImportOptions, ImportStats};

pub const HEADERS: &[&str] = &["number", "title", "description", "active", "enables"];
pub const EXAMPLE: &[&str] = &[
    "1",
    "Leadership",
    "Management commitment and accountability",
    "true",
    "Operations;Risk Management",
];

pub fn import(store: &Store, file_path: &Path, opts: &ImportOptions) -> Result<ImportStats> {
    let mut stats = ImportStats::default();
    let mut rdr = open_reader(file_path)?;
    let headers = rdr.headers().into_diagnostic()?.clone();
    let header_map = build_header_map(&headers);

    let mut known = store.elements();

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

        let Some(number) = get_field(&record, &header_map, "number") else {
            stats.row_failed(opts, row_num, "Missing required field 'number'")?;
            continue;
        };
        let Ok(number) = number.parse::<u32>() else {
            stats.row_failed(opts, row_num, &format!("Invalid element number '{}'", number))?;
            continue;
        };
        let Some(title) = get_field(&record, &header_map, "title") else {
            stats.row_failed(opts, row_num, "Missing required field 'title'")?;
            continue;
        };

        let existing = known.iter().position(|e| e.element_number == number);
        let mut element = match existing {
            Some(idx) => known[idx].clone(),
            None => Element::new(number, title.clone(), store.author().to_string()),
        };
        element.title = title;
        if let Some(desc) = get_field(&record, &header_map, "description") {
            element.description = Some(desc);
        }
        if let Some(active) = get_field(&record, &header_map, "active") {
            match parse_flag(&active) {
                Some(flag) => element.active = flag,
                None => {
                    stats.row_failed(opts, row_num, &format!("Invalid active flag '{}'", active))?;
                    continue;
                }
            }
        }
        if let Some(enables) = get_field(&record, &header_map, "enables") {
            element.set_enabling_elements(enables.split(';'));
        }

        if !opts.dry_run {
            if let Err(e) = store.save_element(&element) {
                stats.row_failed(opts, row_num, &e.to_string())?;
                continue;
            }
        }

        stats.row_done(
            opts,
            row_num,
            existing.is_some(),
            &truncate_str(&element.label(), 50),
        );
        match existing {
            Some(idx) => known[idx] = element,
            None => known.push(element),
        }
    }

    Ok(stats)
}
