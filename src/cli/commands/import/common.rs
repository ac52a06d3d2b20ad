//! Common utilities for CSV import

use console::style;
use csv::{ReaderBuilder, StringRecord};
use miette::{IntoDiagnostic, Result};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Import options passed to the per-table import functions
#[derive(Debug, Clone, Copy)]
pub struct ImportOptions {
    pub dry_run: bool,
    pub skip_errors: bool,
}

/// Import statistics
#[derive(Debug, Default)]
pub struct ImportStats {
    pub rows_processed: usize,
    pub entities_created: usize,
    pub entities_updated: usize,
    pub errors: usize,
    pub skipped: usize,
}

impl ImportStats {
    /// Record a failed row; stops the import unless errors are skipped,
    /// in which case the row counts as skipped
    pub fn row_failed(&mut self, opts: &ImportOptions, row_num: usize, message: &str) -> Result<()> {
        eprintln!("{} Row {}: {}", style("✗").red(), row_num, message);
        self.errors += 1;
        if opts.skip_errors {
            self.skipped += 1;
            Ok(())
        } else {
            Err(miette::miette!("{} at row {}", message, row_num))
        }
    }

    /// Record a row that was written (or would be, in a dry run)
    pub fn row_done(&mut self, opts: &ImportOptions, row_num: usize, updated: bool, what: &str) {
        let verb = match (opts.dry_run, updated) {
            (true, false) => "Would create",
            (true, true) => "Would update",
            (false, false) => "Created",
            (false, true) => "Updated",
        };
        let marker = if opts.dry_run {
            style("○").dim()
        } else {
            style("✓").green()
        };
        println!("{} Row {}: {} {}", marker, row_num, verb, what);
        if !opts.dry_run {
            if updated {
                self.entities_updated += 1;
            } else {
                self.entities_created += 1;
            }
        }
    }
}

/// Open a CSV file with the reader settings every import uses
pub fn open_reader(path: &Path) -> Result<csv::Reader<BufReader<File>>> {
    let file = File::open(path).into_diagnostic()?;
    Ok(ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(BufReader::new(file)))
}

/// Build a map from header name to column index
pub fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(i, h)| (h.to_lowercase().trim().to_string(), i))
        .collect()
}

/// Get a non-empty field value from a CSV record
pub fn get_field(
    record: &StringRecord,
    header_map: &HashMap<String, usize>,
    field: &str,
) -> Option<String> {
    header_map
        .get(field)
        .and_then(|&idx| record.get(idx))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Parse a yes/no style cell
pub fn parse_flag(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "true" | "yes" | "y" | "1" => Some(true),
        "false" | "no" | "n" | "0" => Some(false),
        _ => None,
    }
}

/// Print the CSV header and one example row for a table
pub fn generate_template(headers: &[&str], example: &[&str], command: &str) -> Result<()> {
    println!("{}", headers.join(","));
    if !example.is_empty() {
        println!("{}", example.join(","));
    }

    // Hint goes to stderr so redirected output stays a clean CSV
    eprintln!();
    eprintln!(
        "{} Template generated. Redirect to file: oex import {} --template > {}.csv",
        style("→").blue(),
        command,
        command
    );

    Ok(())
}
