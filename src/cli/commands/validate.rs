//! `oex validate` command - Check every record against the store rules

use console::style;
use miette::Result;
use std::collections::HashMap;
use std::path::Path;

use crate::aggregate::{measure_rows, DecisionFlow};
use crate::cli::helpers::open_store;
use crate::cli::GlobalOpts;
use crate::core::loader::record_files;
use crate::core::project::RECORD_SUFFIX;
use crate::core::{natural_cmp, EntityId, EntityPrefix, FrameworkRows, Store, StoreError};
use crate::entities::process::element_segment;

#[derive(clap::Args, Debug)]
pub struct ValidateArgs {
    /// Only validate records of this type (elem, proc, step, out, kpi, goal, ver, doc)
    #[arg(long, short = 't')]
    pub entity_type: Option<EntityPrefix>,

    /// Strict mode - warnings become errors
    #[arg(long)]
    pub strict: bool,

    /// Show summary only, don't show individual problems
    #[arg(long)]
    pub summary: bool,
}

/// Validation statistics
#[derive(Default)]
struct ValidationStats {
    files_checked: usize,
    files_passed: usize,
    files_failed: usize,
    total_errors: usize,
    total_warnings: usize,
}

pub fn run(args: ValidateArgs, global: &GlobalOpts) -> Result<()> {
    let (store, _) = open_store(global)?;
    let mut stats = ValidationStats::default();

    let prefixes: Vec<EntityPrefix> = EntityPrefix::all()
        .iter()
        .copied()
        .filter(|p| *p != EntityPrefix::Log)
        .filter(|p| args.entity_type.map_or(true, |t| t == *p))
        .collect();

    let files: Vec<_> = prefixes
        .iter()
        .flat_map(|p| record_files(&store.project().entity_dir(*p)))
        .collect();

    println!(
        "{} Validating {} record(s)...\n",
        style("→").blue(),
        files.len()
    );

    for path in &files {
        stats.files_checked += 1;
        match check_path(&store, path) {
            Ok(()) => stats.files_passed += 1,
            Err(problems) => {
                stats.files_failed += 1;
                stats.total_errors += problems.len();
                if !args.summary {
                    println!("{} {}", style("✗").red(), display_path(&store, path));
                    for problem in problems {
                        println!("    {}", problem);
                    }
                }
            }
        }
    }

    let warnings = collect_warnings(&store.rows());
    stats.total_warnings = warnings.len();
    if !args.summary && !warnings.is_empty() {
        println!();
        for warning in &warnings {
            println!("{} {}", style("!").yellow(), warning);
        }
    }

    println!();
    println!("{}", style("─".repeat(50)).dim());
    println!("{}", style("Validation Summary").bold());
    println!("{}", style("─".repeat(50)).dim());
    println!("  Records checked:  {}", style(stats.files_checked).cyan());
    println!("  Records passed:   {}", style(stats.files_passed).green());
    if stats.files_failed > 0 {
        println!("  Records failed:   {}", style(stats.files_failed).red());
    }
    if stats.total_errors > 0 {
        println!("  Errors:           {}", style(stats.total_errors).red());
    }
    if stats.total_warnings > 0 {
        println!("  Warnings:         {}", style(stats.total_warnings).yellow());
    }

    if stats.total_errors > 0 {
        return Err(miette::miette!(
            "Validation failed with {} error(s)",
            stats.total_errors
        ));
    }
    if args.strict && stats.total_warnings > 0 {
        return Err(miette::miette!(
            "Validation failed with {} warning(s) in strict mode",
            stats.total_warnings
        ));
    }

    println!();
    println!("{} All records valid", style("✓").green());
    Ok(())
}

/// Problems found in one record file
fn check_path(store: &Store, path: &Path) -> Result<(), Vec<String>> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let stem = name.strip_suffix(RECORD_SUFFIX).unwrap_or(&name);
    let id = EntityId::parse(stem).map_err(|e| vec![format!("bad file name: {}", e)])?;

    match store.check_file(&id) {
        Ok(()) => Ok(()),
        Err(StoreError::Validation(e)) => Err(e
            .violations()
            .iter()
            .map(|v| v.to_string())
            .collect()),
        Err(e) => Err(vec![e.to_string()]),
    }
}

fn display_path(store: &Store, path: &Path) -> String {
    path.strip_prefix(store.project().root())
        .unwrap_or(path)
        .display()
        .to_string()
}

/// Cross-record findings that do not make any single record invalid
fn collect_warnings(rows: &FrameworkRows) -> Vec<String> {
    let mut warnings = Vec::new();

    let element_numbers: HashMap<_, _> = rows
        .elements
        .iter()
        .map(|e| (&e.id, e.element_number))
        .collect();

    let mut processes: Vec<_> = rows.processes.iter().collect();
    processes.sort_by(|a, b| natural_cmp(&a.process_number, &b.process_number));

    for p in &processes {
        if let (Some(segment), Some(owner)) = (
            element_segment(&p.process_number),
            element_numbers.get(&p.element_id),
        ) {
            if segment != *owner {
                warnings.push(format!(
                    "{}: number points at element {} but the process belongs to element {}",
                    p.process_number, segment, owner
                ));
            }
        }

        let steps: Vec<_> = rows
            .steps
            .iter()
            .filter(|s| s.process_id == p.id)
            .cloned()
            .collect();
        let outcomes: Vec<_> = rows
            .outcomes
            .iter()
            .filter(|o| o.process_id == p.id)
            .cloned()
            .collect();
        if outcomes.is_empty() {
            continue;
        }
        let flow = DecisionFlow::build(&steps, &outcomes);
        for edge in flow.unresolved() {
            warnings.push(format!(
                "{}: outcome '{}' leads to step {} which does not exist",
                p.process_number, edge.label, edge.to_step_number
            ));
        }
        for edge in flow.cycles() {
            let from = flow.step_number(&edge.from).unwrap_or_default();
            let to = flow.step_number(&edge.to).unwrap_or_default();
            warnings.push(format!(
                "{}: outcome '{}' loops back from step {} to step {}",
                p.process_number, edge.label, from, to
            ));
        }
    }

    for row in measure_rows(rows) {
        if let Some(category) = row.category() {
            if !category.is_fixed() {
                warnings.push(format!(
                    "{}: measure '{}' has unrecognized category '{}'",
                    row.process_number, row.measure.name, category
                ));
            }
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::StepType;
    use crate::entities::{Element, Outcome, PerformanceMeasure, Process, Step};
    use crate::core::ScorecardCategory;

    fn rows() -> FrameworkRows {
        let element = Element::new(1, "Leadership".into(), "test".into());
        let process = Process::new(
            "OE-1.1".into(),
            "Review".into(),
            element.id.clone(),
            "test".into(),
        );
        FrameworkRows {
            elements: vec![element],
            processes: vec![process],
            ..Default::default()
        }
    }

    #[test]
    fn test_clean_rows_have_no_warnings() {
        assert!(collect_warnings(&rows()).is_empty());
    }

    #[test]
    fn test_mismatched_element_segment_warns() {
        let mut rows = rows();
        rows.processes[0].process_number = "OE-2.1".into();
        let warnings = collect_warnings(&rows);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("element 2"));
    }

    #[test]
    fn test_dangling_outcome_warns() {
        let mut rows = rows();
        let decision = Step::new(
            rows.processes[0].id.clone(),
            1,
            StepType::Decision,
            "Approve?".into(),
            "test".into(),
        );
        let outcome = Outcome::new(&decision, 9, "Yes".into(), 0, "test".into());
        rows.steps.push(decision);
        rows.outcomes.push(outcome);

        let warnings = collect_warnings(&rows);
        assert!(warnings.iter().any(|w| w.contains("step 9")));
    }

    #[test]
    fn test_unrecognized_category_warns() {
        let mut rows = rows();
        let measure = PerformanceMeasure::new(rows.processes[0].id.clone(), "Incidents".into(), "test".into())
            .with_category(ScorecardCategory::Other("Safety".into()));
        rows.measures.push(measure);

        let warnings = collect_warnings(&rows);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("Safety"));
    }
}
