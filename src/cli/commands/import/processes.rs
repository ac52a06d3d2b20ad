//! Import processes from CSV

use miette::{IntoDiagnostic, Result};
use std::path::Path;

use crate::cli::helpers::truncate_str;
use crate::core::{ProcessStatus, RiskRating, Store};
use crate::entities::process::element_segment;
use crate::entities::{Element, Process};

use super::common::{build_header_map, get_field, open_reader, parse_flag, ImportOptions, ImportStats};

pub const HEADERS: &[&str] = &[
    "number",
    "name",
    "element",
    "status",
    "mandatory",
    "description",
    "expectations",
    "inputs",
    "deliverables",
    "ctq",
    "risk_frequency",
    "risk_impact",
    "risk_description",
    "mitigation",
];
pub const EXAMPLE: &[&str] = &[
    "OE-1.2",
    "Management Review",
    "1",
    "active",
    "yes",
    "Quarterly review of framework performance",
    "",
    "Scorecard results",
    "Action list",
    "",
    "medium",
    "high",
    "Review skipped",
    "Calendar invites owned by the plant manager",
];

pub fn import(store: &Store, file_path: &Path, opts: &ImportOptions) -> Result<ImportStats> {
    let mut stats = ImportStats::default();
    let mut rdr = open_reader(file_path)?;
    let headers = rdr.headers().into_diagnostic()?.clone();
    let header_map = build_header_map(&headers);

    let elements = store.elements();
    let mut known = store.processes();

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
        let Some(name) = get_field(&record, &header_map, "name") else {
            stats.row_failed(opts, row_num, "Missing required field 'name'")?;
            continue;
        };

        let element_key = get_field(&record, &header_map, "element");
        let Some(element) = resolve_element(&elements, element_key.as_deref(), &number) else {
            let message = match element_key {
                Some(key) => format!("Unknown element '{}'", key),
                None => format!("Cannot infer element from process number '{}'", number),
            };
            stats.row_failed(opts, row_num, &message)?;
            continue;
        };

        let existing = known.iter().position(|p| p.process_number == number);
        let mut process = match existing {
            Some(idx) => known[idx].clone(),
            None => Process::new(
                number.clone(),
                name.clone(),
                element.id.clone(),
                store.author().to_string(),
            ),
        };
        process.name = name;
        process.element_id = element.id.clone();

        if let Some(status) = get_field(&record, &header_map, "status") {
            match status.parse::<ProcessStatus>() {
                Ok(s) => process.status = s,
                Err(e) => {
                    stats.row_failed(opts, row_num, &e)?;
                    continue;
                }
            }
        }
        if let Some(mandatory) = get_field(&record, &header_map, "mandatory") {
            match parse_flag(&mandatory) {
                Some(flag) => process.mandatory = flag,
                None => {
                    let message = format!("Invalid mandatory flag '{}'", mandatory);
                    stats.row_failed(opts, row_num, &message)?;
                    continue;
                }
            }
        }

        let text_fields = [
            ("description", &mut process.description),
            ("expectations", &mut process.expectations),
            ("inputs", &mut process.inputs),
            ("deliverables", &mut process.deliverables),
            ("ctq", &mut process.critical_to_quality),
            ("risk_description", &mut process.risk.description),
            ("mitigation", &mut process.risk.mitigation),
        ];
        for (column, slot) in text_fields {
            if let Some(value) = get_field(&record, &header_map, column) {
                *slot = Some(value);
            }
        }

        let mut bad_rating = None;
        for (column, slot) in [
            ("risk_frequency", &mut process.risk.frequency),
            ("risk_impact", &mut process.risk.impact),
        ] {
            if let Some(value) = get_field(&record, &header_map, column) {
                match value.parse::<RiskRating>() {
                    Ok(rating) => *slot = Some(rating),
                    Err(e) => bad_rating = Some(e),
                }
            }
        }
        if let Some(message) = bad_rating {
            stats.row_failed(opts, row_num, &message)?;
            continue;
        }

        if !opts.dry_run {
            if let Err(e) = store.save_process(&process) {
                stats.row_failed(opts, row_num, &e.to_string())?;
                continue;
            }
        }

        stats.row_done(
            opts,
            row_num,
            existing.is_some(),
            &truncate_str(&process.label(), 50),
        );
        match existing {
            Some(idx) => known[idx] = process,
            None => known.push(process),
        }
    }

    Ok(stats)
}

/// Element from an explicit number or ID cell, else from the process number
fn resolve_element<'a>(
    elements: &'a [Element],
    key: Option<&str>,
    process_number: &str,
) -> Option<&'a Element> {
    match key {
        Some(key) => elements.iter().find(|e| {
            e.id.to_string() == key || key.parse::<u32>().is_ok_and(|n| n == e.element_number)
        }),
        None => {
            let number = element_segment(process_number)?;
            elements.iter().find(|e| e.element_number == number)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn elements() -> Vec<Element> {
        vec![
            Element::new(1, "Leadership".into(), "test".into()),
            Element::new(12, "Operations".into(), "test".into()),
        ]
    }

    #[test]
    fn test_resolve_element_by_number_cell() {
        let elements = elements();
        let found = resolve_element(&elements, Some("12"), "OE-1.1");
        assert_eq!(found.map(|e| e.element_number), Some(12));
    }

    #[test]
    fn test_resolve_element_by_id_cell() {
        let elements = elements();
        let id = elements[0].id.to_string();
        let found = resolve_element(&elements, Some(&id), "OE-12.1");
        assert_eq!(found.map(|e| e.element_number), Some(1));
    }

    #[test]
    fn test_resolve_element_from_process_number() {
        let elements = elements();
        let found = resolve_element(&elements, None, "OE-12.3");
        assert_eq!(found.map(|e| e.element_number), Some(12));
        assert!(resolve_element(&elements, None, "OE-7.1").is_none());
    }
}
