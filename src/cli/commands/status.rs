//! `oex status` command - Framework status dashboard

use console::style;
use miette::{IntoDiagnostic, Result};
use std::collections::{BTreeMap, HashSet};

use crate::aggregate::{measure_rows, Scorecard};
use crate::cli::helpers::{open_store, resolve_format};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{FrameworkRows, ProcessStatus};
use crate::entities::RiskLevel;

#[derive(clap::Args, Debug)]
pub struct StatusArgs {
    /// Show only one section (framework, risk, measures, documentation)
    #[arg(long)]
    pub section: Option<String>,
}

#[derive(serde::Serialize, Default, Debug)]
struct FrameworkMetrics {
    elements: usize,
    inactive_elements: usize,
    processes: usize,
    mandatory: usize,
    by_status: BTreeMap<String, usize>,
}

#[derive(serde::Serialize, Default, Debug)]
struct RiskMetrics {
    scored: usize,
    high: usize,
    medium: usize,
    low: usize,
    unmitigated_high: usize,
    not_assessed: usize,
}

#[derive(serde::Serialize, Default, Debug)]
struct MeasureMetrics {
    measures: usize,
    categorized: usize,
    other: usize,
    uncategorized: usize,
    goals: usize,
    goals_on_target: usize,
    goals_unsupported: usize,
}

#[derive(serde::Serialize, Default, Debug)]
struct DocumentationMetrics {
    with_steps: usize,
    without_steps: usize,
    versioned: usize,
    attachments: usize,
    unresolved_edges: usize,
}

pub fn run(args: StatusArgs, global: &GlobalOpts) -> Result<()> {
    let (store, config) = open_store(global)?;
    let rows = store.rows();

    let framework = collect_framework_metrics(&rows);
    let risk = collect_risk_metrics(&rows);
    let measures = collect_measure_metrics(&rows);

    let versioned: HashSet<_> = store.versions().into_iter().map(|v| v.process_id).collect();
    let documentation = collect_documentation_metrics(&rows, versioned.len(), store.attachments().len());

    match resolve_format(global, &config, OutputFormat::Auto) {
        OutputFormat::Json => {
            let status = serde_json::json!({
                "framework": framework,
                "risk": risk,
                "measures": measures,
                "documentation": documentation,
            });
            println!("{}", serde_json::to_string_pretty(&status).into_diagnostic()?);
        }
        _ => {
            if let Some(section) = args.section.as_deref() {
                let (title, lines) = match section.to_lowercase().as_str() {
                    "framework" => ("FRAMEWORK", format_framework_metrics(&framework)),
                    "risk" => ("RISK", format_risk_metrics(&risk)),
                    "measures" => ("MEASURES & GOALS", format_measure_metrics(&measures)),
                    "documentation" | "docs" => {
                        ("DOCUMENTATION", format_documentation_metrics(&documentation))
                    }
                    other => {
                        return Err(miette::miette!(
                            "Unknown section '{}'. Use framework, risk, measures, or documentation",
                            other
                        ))
                    }
                };
                print_section(title, &lines);
                return Ok(());
            }

            let width = 68;
            println!("{}", style("OEX Framework Status").bold().underlined());
            println!("{}", "═".repeat(width));
            println!();

            print_two_columns(
                "FRAMEWORK",
                &format_framework_metrics(&framework),
                "RISK",
                &format_risk_metrics(&risk),
            );
            println!();
            print_two_columns(
                "MEASURES & GOALS",
                &format_measure_metrics(&measures),
                "DOCUMENTATION",
                &format_documentation_metrics(&documentation),
            );

            println!();
            println!("{}", "═".repeat(width));

            let health = calculate_health(&framework, &risk, &measures, &documentation);
            let health_style = match health {
                "Healthy" => style(health).green().bold(),
                "Warning" => style(health).yellow().bold(),
                _ => style(health).red().bold(),
            };
            println!("Framework Health: {}", health_style);
        }
    }

    Ok(())
}

fn collect_framework_metrics(rows: &FrameworkRows) -> FrameworkMetrics {
    let mut by_status: BTreeMap<String, usize> = ProcessStatus::all()
        .iter()
        .map(|s| (s.to_string(), 0))
        .collect();
    for p in &rows.processes {
        *by_status.entry(p.status.to_string()).or_insert(0) += 1;
    }

    FrameworkMetrics {
        elements: rows.elements.len(),
        inactive_elements: rows.elements.iter().filter(|e| !e.active).count(),
        processes: rows.processes.len(),
        mandatory: rows.processes.iter().filter(|p| p.mandatory).count(),
        by_status,
    }
}

fn collect_risk_metrics(rows: &FrameworkRows) -> RiskMetrics {
    let mut metrics = RiskMetrics::default();
    for p in &rows.processes {
        match p.risk.level() {
            Some(level) => {
                metrics.scored += 1;
                match level {
                    RiskLevel::High => {
                        metrics.high += 1;
                        if p.risk.mitigation.is_none() {
                            metrics.unmitigated_high += 1;
                        }
                    }
                    RiskLevel::Medium => metrics.medium += 1,
                    RiskLevel::Low => metrics.low += 1,
                }
            }
            None if !p.risk.is_assessed() => metrics.not_assessed += 1,
            None => {}
        }
    }
    metrics
}

fn collect_measure_metrics(rows: &FrameworkRows) -> MeasureMetrics {
    let card = Scorecard::from_rows(&measure_rows(rows));
    let goal_ids: HashSet<_> = rows
        .measures
        .iter()
        .filter_map(|m| m.strategic_goal_id.as_ref())
        .collect();

    MeasureMetrics {
        measures: rows.measures.len(),
        categorized: card.categories.iter().map(|g| g.measures.len()).sum(),
        other: card.other.len(),
        uncategorized: card.uncategorized.len(),
        goals: rows.goals.len(),
        goals_on_target: rows
            .goals
            .iter()
            .filter(|g| g.progress().is_some_and(|p| p >= 100.0))
            .count(),
        goals_unsupported: rows.goals.iter().filter(|g| !goal_ids.contains(&g.id)).count(),
    }
}

fn collect_documentation_metrics(
    rows: &FrameworkRows,
    versioned: usize,
    attachments: usize,
) -> DocumentationMetrics {
    let with_steps: HashSet<_> = rows.steps.iter().map(|s| &s.process_id).collect();
    let unresolved_edges = rows
        .outcomes
        .iter()
        .filter(|o| {
            !rows
                .steps
                .iter()
                .any(|s| s.process_id == o.process_id && s.step_number == o.to_step_number)
        })
        .count();

    DocumentationMetrics {
        with_steps: rows
            .processes
            .iter()
            .filter(|p| with_steps.contains(&p.id))
            .count(),
        without_steps: rows
            .processes
            .iter()
            .filter(|p| !with_steps.contains(&p.id))
            .count(),
        versioned,
        attachments,
        unresolved_edges,
    }
}

fn format_framework_metrics(m: &FrameworkMetrics) -> Vec<String> {
    let mut lines = vec![format!("Elements:   {}", m.elements)];
    if m.inactive_elements > 0 {
        lines.push(format!("  Inactive: {}", m.inactive_elements));
    }
    lines.push(format!("Processes:  {}", m.processes));
    lines.push(format!("Mandatory:  {}", m.mandatory));
    for (status, count) in &m.by_status {
        if *count > 0 {
            lines.push(format!("  {:<9} {}", format!("{}:", status), count));
        }
    }
    lines
}

fn format_risk_metrics(m: &RiskMetrics) -> Vec<String> {
    let mut lines = vec![format!("Scored:     {}", m.scored)];
    if m.high > 0 {
        lines.push(format!("High:       {} {}", m.high, style("⚠").red()));
    }
    lines.push(format!("Medium:     {}", m.medium));
    lines.push(format!("Low:        {}", m.low));
    if m.unmitigated_high > 0 {
        lines.push(format!(
            "Unmitigated: {} {}",
            m.unmitigated_high,
            style("⚠").red()
        ));
    }
    lines.push(format!("Unassessed: {}", m.not_assessed));
    lines
}

fn format_measure_metrics(m: &MeasureMetrics) -> Vec<String> {
    let mut lines = vec![
        format!("Measures:   {}", m.measures),
        format!("  Scorecard: {}", m.categorized),
    ];
    if m.other + m.uncategorized > 0 {
        lines.push(format!(
            "  Outside:  {} {}",
            m.other + m.uncategorized,
            style("⚠").yellow()
        ));
    }
    lines.push(format!("Goals:      {}", m.goals));
    lines.push(format!("  On target: {}", m.goals_on_target));
    if m.goals_unsupported > 0 {
        lines.push(format!("  No KPIs:  {}", m.goals_unsupported));
    }
    lines
}

fn format_documentation_metrics(m: &DocumentationMetrics) -> Vec<String> {
    let mut lines = vec![
        format!("With steps: {}", m.with_steps),
        format!("No steps:   {}", m.without_steps),
        format!("Versioned:  {}", m.versioned),
        format!("Attached:   {}", m.attachments),
    ];
    if m.unresolved_edges > 0 {
        lines.push(format!(
            "Broken links: {} {}",
            m.unresolved_edges,
            style("⚠").yellow()
        ));
    }
    lines
}

fn print_two_columns(title1: &str, lines1: &[String], title2: &str, lines2: &[String]) {
    let col_width = 32;

    println!("{:<col_width$} {}", style(title1).bold(), style(title2).bold());
    println!("{:-<col_width$} {:-<col_width$}", "", "");

    let max_lines = lines1.len().max(lines2.len());
    for i in 0..max_lines {
        let l1 = lines1.get(i).map(|s| s.as_str()).unwrap_or("");
        let l2 = lines2.get(i).map(|s| s.as_str()).unwrap_or("");
        println!("  {:<30} {}", l1, l2);
    }
}

fn print_section(title: &str, lines: &[String]) {
    println!("{}", style(title).bold());
    println!("{:-<64}", "");
    for line in lines {
        println!("  {}", line);
    }
}

fn calculate_health(
    framework: &FrameworkMetrics,
    risk: &RiskMetrics,
    measures: &MeasureMetrics,
    docs: &DocumentationMetrics,
) -> &'static str {
    let mut score = 100i32;

    // Undocumented processes
    if framework.processes > 0 {
        let documented = docs.with_steps as f64 / framework.processes as f64;
        if documented < 0.5 {
            score -= 20;
        } else if documented < 0.8 {
            score -= 10;
        }
    }

    score -= 15 * risk.unmitigated_high as i32;
    if risk.not_assessed > 5 {
        score -= 10;
    }

    if measures.goals_unsupported > 0 {
        score -= 5 * measures.goals_unsupported as i32;
    }
    if measures.uncategorized > 0 {
        score -= 5;
    }

    score -= 5 * docs.unresolved_edges as i32;

    match score {
        80..=100 => "Healthy",
        50..=79 => "Warning",
        _ => "Critical",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{RiskRating, ScorecardCategory};
    use crate::entities::{Element, Process, StrategicGoal};

    fn process(number: &str, element: &Element) -> Process {
        Process::new(
            number.to_string(),
            "Process".to_string(),
            element.id.clone(),
            "test".to_string(),
        )
    }

    #[test]
    fn test_risk_metrics_buckets_levels() {
        let element = Element::new(1, "Leadership".into(), "test".into());
        let mut high = process("OE-1.1", &element);
        high.risk.frequency = Some(RiskRating::High);
        high.risk.impact = Some(RiskRating::High);
        let mut low = process("OE-1.2", &element);
        low.risk.frequency = Some(RiskRating::Low);
        low.risk.impact = Some(RiskRating::Low);
        let untouched = process("OE-1.3", &element);

        let rows = FrameworkRows {
            elements: vec![element],
            processes: vec![high, low, untouched],
            ..Default::default()
        };
        let m = collect_risk_metrics(&rows);
        assert_eq!(m.scored, 2);
        assert_eq!(m.high, 1);
        assert_eq!(m.unmitigated_high, 1);
        assert_eq!(m.low, 1);
        assert_eq!(m.not_assessed, 1);
    }

    #[test]
    fn test_framework_metrics_counts_statuses() {
        let element = Element::new(1, "Leadership".into(), "test".into());
        let mut active = process("OE-1.1", &element);
        active.status = ProcessStatus::Active;
        active.mandatory = true;
        let draft = process("OE-1.2", &element);

        let rows = FrameworkRows {
            elements: vec![element],
            processes: vec![active, draft],
            ..Default::default()
        };
        let m = collect_framework_metrics(&rows);
        assert_eq!(m.processes, 2);
        assert_eq!(m.mandatory, 1);
        assert_eq!(m.by_status.get("active"), Some(&1));
        assert_eq!(m.by_status.get("draft"), Some(&1));
        assert_eq!(m.by_status.get("review"), Some(&0));
    }

    #[test]
    fn test_healthy_when_empty() {
        let health = calculate_health(
            &FrameworkMetrics::default(),
            &RiskMetrics::default(),
            &MeasureMetrics::default(),
            &DocumentationMetrics::default(),
        );
        assert_eq!(health, "Healthy");
    }

    #[test]
    fn test_measure_metrics_tracks_goal_support() {
        let element = Element::new(1, "Leadership".into(), "test".into());
        let goal = StrategicGoal::new(
            element.id.clone(),
            "Grow".into(),
            ScorecardCategory::Financial,
            "test".into(),
        );
        let rows = FrameworkRows {
            elements: vec![element],
            goals: vec![goal],
            ..Default::default()
        };
        let m = collect_measure_metrics(&rows);
        assert_eq!(m.goals, 1);
        assert_eq!(m.goals_unsupported, 1);
    }
}
