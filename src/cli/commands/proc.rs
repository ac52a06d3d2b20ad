//! `oex proc` command - Process management

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use std::collections::HashMap;

use crate::aggregate::DecisionFlow;
use crate::cli::helpers::{
    confirm, escape_csv, format_short_id, open_store, print_header, resolve_format, truncate_str,
};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::entity::{ProcessStatus, RiskRating};
use crate::core::identity::EntityId;
use crate::core::{sort_naturally_by_key, Store};
use crate::entities::process::element_segment;
use crate::entities::{Element, Process};

#[derive(Subcommand, Debug)]
pub enum ProcCommands {
    /// List processes in natural number order
    List(ListArgs),

    /// Create a new process
    New(NewArgs),

    /// Show a process with its steps, measures and documents
    Show(ShowArgs),

    /// Change fields of a process, including its risk assessment
    Update(UpdateArgs),

    /// Open a process in your editor
    Edit(ShowArgs),

    /// Delete a process and everything it owns
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Only processes of this element (number or ID)
    #[arg(long, short = 'e')]
    pub element: Option<String>,

    /// Filter by status
    #[arg(long, short = 's')]
    pub status: Option<ProcessStatus>,

    /// Search in process number and name (case-insensitive)
    #[arg(long)]
    pub search: Option<String>,

    /// Only mandatory processes
    #[arg(long)]
    pub mandatory: bool,

    /// Show count only
    #[arg(long)]
    pub count: bool,

    /// Limit number of results
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,

    /// Reverse sort order
    #[arg(long)]
    pub reverse: bool,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Process number, e.g. OE-1.2
    pub number: String,

    /// Process name
    pub name: String,

    /// Owning element (number or ID; default: taken from the process number)
    #[arg(long, short = 'e')]
    pub element: Option<String>,

    #[arg(long, short = 'd')]
    pub description: Option<String>,

    #[arg(long)]
    pub expectations: Option<String>,

    #[arg(long)]
    pub inputs: Option<String>,

    #[arg(long)]
    pub deliverables: Option<String>,

    /// Critical-to-quality notes
    #[arg(long)]
    pub ctq: Option<String>,

    #[arg(long, short = 's', default_value = "draft")]
    pub status: ProcessStatus,

    #[arg(long)]
    pub mandatory: bool,

    /// Open in editor after creation
    #[arg(long)]
    pub edit: bool,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Process number or ID
    pub process: String,
}

#[derive(clap::Args, Debug)]
pub struct UpdateArgs {
    /// Process number or ID
    pub process: String,

    /// New process number
    #[arg(long)]
    pub number: Option<String>,

    #[arg(long)]
    pub name: Option<String>,

    /// Move to another element (number or ID)
    #[arg(long, short = 'e')]
    pub element: Option<String>,

    #[arg(long, short = 'd')]
    pub description: Option<String>,

    #[arg(long)]
    pub expectations: Option<String>,

    #[arg(long)]
    pub inputs: Option<String>,

    #[arg(long)]
    pub deliverables: Option<String>,

    #[arg(long)]
    pub ctq: Option<String>,

    #[arg(long, short = 's')]
    pub status: Option<ProcessStatus>,

    #[arg(long)]
    pub mandatory: Option<bool>,

    /// Risk frequency rating (low, medium, high)
    #[arg(long)]
    pub risk_frequency: Option<RiskRating>,

    /// Risk impact rating (low, medium, high)
    #[arg(long)]
    pub risk_impact: Option<RiskRating>,

    #[arg(long)]
    pub risk_description: Option<String>,

    /// Risk mitigation notes
    #[arg(long)]
    pub mitigation: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Process number or ID
    pub process: String,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

pub fn run(cmd: ProcCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ProcCommands::List(args) => run_list(args, global),
        ProcCommands::New(args) => run_new(args, global),
        ProcCommands::Show(args) => run_show(args, global),
        ProcCommands::Update(args) => run_update(args, global),
        ProcCommands::Edit(args) => run_edit(args, global),
        ProcCommands::Delete(args) => run_delete(args, global),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let (store, config) = open_store(global)?;
    let mut processes = store.processes();

    if let Some(ref key) = args.element {
        let element = store.find_element(key)?;
        processes.retain(|p| p.element_id == element.id);
    }
    if let Some(status) = args.status {
        processes.retain(|p| p.status == status);
    }
    if let Some(ref search) = args.search {
        let needle = search.to_lowercase();
        processes.retain(|p| {
            p.process_number.to_lowercase().contains(&needle)
                || p.name.to_lowercase().contains(&needle)
        });
    }
    if args.mandatory {
        processes.retain(|p| p.mandatory);
    }

    sort_naturally_by_key(&mut processes, |p| p.process_number.as_str());
    if args.reverse {
        processes.reverse();
    }
    if let Some(limit) = args.limit {
        processes.truncate(limit);
    }

    if args.count {
        println!("{}", processes.len());
        return Ok(());
    }
    if processes.is_empty() {
        println!("No processes found.");
        return Ok(());
    }

    let elements: HashMap<EntityId, Element> =
        store.elements().into_iter().map(|e| (e.id.clone(), e)).collect();
    let element_number = |p: &Process| {
        elements
            .get(&p.element_id)
            .map(|e| e.element_number.to_string())
            .unwrap_or_else(|| "?".to_string())
    };
    let risk_of = |p: &Process| {
        p.risk
            .level()
            .map(|l| l.to_string())
            .unwrap_or_else(|| "-".to_string())
    };

    match resolve_format(global, &config, OutputFormat::Tsv) {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&processes).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&processes).into_diagnostic()?);
        }
        OutputFormat::Csv => {
            println!("number,name,element,status,mandatory,risk,id");
            for p in &processes {
                println!(
                    "{},{},{},{},{},{},{}",
                    escape_csv(&p.process_number),
                    escape_csv(&p.name),
                    element_number(p),
                    p.status,
                    p.mandatory,
                    risk_of(p),
                    p.id
                );
            }
        }
        OutputFormat::Md => {
            println!("| Number | Name | Element | Status | Risk |");
            println!("|---|---|---|---|---|");
            for p in &processes {
                println!(
                    "| {} | {} | {} | {} | {} |",
                    p.process_number,
                    p.name,
                    element_number(p),
                    p.status,
                    risk_of(p)
                );
            }
        }
        OutputFormat::Id => {
            for p in &processes {
                println!("{}", p.id);
            }
        }
        OutputFormat::Tsv | OutputFormat::Auto => {
            print_header(&[
                ("NUMBER", 10),
                ("NAME", 36),
                ("ELEM", 5),
                ("STATUS", 9),
                ("RISK", 7),
                ("ID", 17),
            ]);
            for p in &processes {
                let name = if p.mandatory {
                    format!("{} *", truncate_str(&p.name, 32))
                } else {
                    truncate_str(&p.name, 34)
                };
                println!(
                    "{:<10} {:<36} {:<5} {:<9} {:<7} {:<17}",
                    style(&p.process_number).cyan(),
                    name,
                    element_number(p),
                    p.status.to_string(),
                    risk_of(p),
                    format_short_id(&p.id)
                );
            }
            println!();
            println!(
                "{} process(es) found. {} marks mandatory processes.",
                style(processes.len()).cyan(),
                style("*").yellow()
            );
        }
    }

    Ok(())
}

/// Resolve the owning element from `--element`, or from the process number
fn owning_element(store: &Store, key: Option<&str>, number: &str) -> Result<Element> {
    match key {
        Some(key) => Ok(store.find_element(key)?),
        None => {
            let segment = element_segment(number).ok_or_else(|| {
                miette::miette!(
                    "Cannot infer element from '{}'. Use --element to choose one.",
                    number
                )
            })?;
            Ok(store.find_element(&segment.to_string())?)
        }
    }
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let (store, config) = open_store(global)?;
    let element = owning_element(&store, args.element.as_deref(), &args.number)?;

    let mut process = Process::new(args.number, args.name, element.id.clone(), store.author().to_string());
    process.description = args.description;
    process.expectations = args.expectations;
    process.inputs = args.inputs;
    process.deliverables = args.deliverables;
    process.critical_to_quality = args.ctq;
    process.status = args.status;
    process.mandatory = args.mandatory;
    store.save_process(&process)?;

    let path = store.project().entity_path(&process.id);
    if global.quiet {
        println!("{}", process.id);
    } else {
        println!(
            "{} Created process {}",
            style("✓").green(),
            style(process.label()).cyan()
        );
        println!("   {}", style(path.display()).dim());
        println!(
            "   Element: {} | Status: {}",
            style(element.label()).yellow(),
            process.status
        );
    }

    if args.edit {
        println!("Opening in {}...", style(config.editor()).yellow());
        config.run_editor(&path).into_diagnostic()?;
        store.check_file(&process.id)?;
    }

    Ok(())
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let (store, config) = open_store(global)?;
    let process = store.find_process(&args.process)?;

    match resolve_format(global, &config, OutputFormat::Auto) {
        OutputFormat::Yaml => print!("{}", serde_yml::to_string(&process).into_diagnostic()?),
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&process).into_diagnostic()?)
        }
        OutputFormat::Id => println!("{}", process.id),
        _ => print_process(&store, &process)?,
    }

    Ok(())
}

fn print_process(store: &Store, process: &Process) -> Result<()> {
    let element = store.get::<Element>(&process.element_id).ok();

    println!("{}", style("─".repeat(60)).dim());
    println!("{}: {}", style("ID").bold(), style(&process.id).cyan());
    println!("{}: {}", style("Number").bold(), process.process_number);
    println!("{}: {}", style("Name").bold(), style(&process.name).yellow());
    println!(
        "{}: {}",
        style("Element").bold(),
        element.map_or_else(|| process.element_id.to_string(), |e| e.label())
    );
    println!("{}: {}", style("Status").bold(), process.status);
    println!(
        "{}: {}",
        style("Mandatory").bold(),
        if process.mandatory { "yes" } else { "no" }
    );
    println!("{}", style("─".repeat(60)).dim());

    let sections = [
        ("Description", &process.description),
        ("Expectations", &process.expectations),
        ("Inputs", &process.inputs),
        ("Deliverables", &process.deliverables),
        ("Critical to Quality", &process.critical_to_quality),
    ];
    for (heading, text) in sections {
        if let Some(text) = text {
            println!();
            println!("{}", style(format!("{}:", heading)).bold());
            println!("{}", text);
        }
    }

    if process.risk.is_assessed() {
        println!();
        println!("{}", style("Risk:").bold());
        let rating = |r: Option<RiskRating>| r.map_or("-".to_string(), |r| r.to_string());
        println!(
            "  Frequency: {} | Impact: {} | Score: {} | Level: {}",
            rating(process.risk.frequency),
            rating(process.risk.impact),
            process.risk.score().map_or("-".to_string(), |s| s.to_string()),
            process.risk.level().map_or("-".to_string(), |l| l.to_string())
        );
        if let Some(ref desc) = process.risk.description {
            println!("  {}", desc);
        }
        if let Some(ref mitigation) = process.risk.mitigation {
            println!("  Mitigation: {}", mitigation);
        }
    }

    let mut steps: Vec<_> = store
        .steps()
        .into_iter()
        .filter(|s| s.process_id == process.id)
        .collect();
    steps.sort_by_key(|s| s.step_number);
    let outcomes: Vec<_> = store
        .outcomes()
        .into_iter()
        .filter(|o| o.process_id == process.id)
        .collect();
    let flow = DecisionFlow::build(&steps, &outcomes);
    let loops: Vec<EntityId> = flow.cycles().into_iter().map(|e| e.outcome_id).collect();

    println!();
    println!("{} ({}):", style("Steps").bold(), steps.len());
    for step in &steps {
        println!(
            "  {:>3}. {} {}",
            step.step_number,
            step.title,
            style(format!("[{}]", step.step_type)).dim()
        );
        for edge in flow.edges_from(&step.id) {
            let target = flow.step_number(&edge.to).unwrap_or_default();
            let marker = if loops.contains(&edge.outcome_id) { " (loop)" } else { "" };
            println!("         {} {} → step {}{}", style("↳").dim(), edge.label, target, marker);
        }
        for missing in flow.unresolved().iter().filter(|u| u.from == step.id) {
            println!(
                "         {} {} → step {} {}",
                style("↳").dim(),
                missing.label,
                missing.to_step_number,
                style("(missing)").red()
            );
        }
    }

    let measures: Vec<_> = store
        .measures()
        .into_iter()
        .filter(|m| m.process_id == process.id)
        .collect();
    if !measures.is_empty() {
        println!();
        println!("{} ({}):", style("Performance Measures").bold(), measures.len());
        for m in &measures {
            let category = m
                .scorecard_category
                .as_ref()
                .map_or("uncategorized".to_string(), |c| c.to_string());
            println!("  • {} [{}]", m.name, category);
        }
    }

    let mut versions: Vec<_> = store
        .versions()
        .into_iter()
        .filter(|v| v.process_id == process.id)
        .collect();
    versions.sort_by(|a, b| b.created.cmp(&a.created));
    if let Some(latest) = versions.first() {
        println!();
        println!(
            "{}: {} ({} version(s))",
            style("Document Version").bold(),
            latest.version,
            versions.len()
        );
    }

    println!("{}", style("─".repeat(60)).dim());
    println!(
        "{}: {} | {}: {}",
        style("Author").dim(),
        process.author,
        style("Created").dim(),
        process.created.format("%Y-%m-%d %H:%M")
    );

    Ok(())
}

fn run_update(args: UpdateArgs, global: &GlobalOpts) -> Result<()> {
    let (store, _) = open_store(global)?;
    let mut process = store.find_process(&args.process)?;

    if let Some(number) = args.number {
        process.process_number = number;
    }
    if let Some(name) = args.name {
        process.name = name;
    }
    if let Some(ref key) = args.element {
        process.element_id = store.find_element(key)?.id;
    }
    if args.description.is_some() {
        process.description = args.description;
    }
    if args.expectations.is_some() {
        process.expectations = args.expectations;
    }
    if args.inputs.is_some() {
        process.inputs = args.inputs;
    }
    if args.deliverables.is_some() {
        process.deliverables = args.deliverables;
    }
    if args.ctq.is_some() {
        process.critical_to_quality = args.ctq;
    }
    if let Some(status) = args.status {
        process.status = status;
    }
    if let Some(mandatory) = args.mandatory {
        process.mandatory = mandatory;
    }
    if args.risk_frequency.is_some() {
        process.risk.frequency = args.risk_frequency;
    }
    if args.risk_impact.is_some() {
        process.risk.impact = args.risk_impact;
    }
    if args.risk_description.is_some() {
        process.risk.description = args.risk_description;
    }
    if args.mitigation.is_some() {
        process.risk.mitigation = args.mitigation;
    }
    store.save_process(&process)?;

    if !global.quiet {
        println!(
            "{} Updated process {}",
            style("✓").green(),
            style(process.label()).cyan()
        );
        if let Some(level) = process.risk.level() {
            println!("   Risk level: {}", style(level).yellow());
        }
    }
    Ok(())
}

fn run_edit(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let (store, config) = open_store(global)?;
    let process = store.find_process(&args.process)?;
    let path = store.project().entity_path(&process.id);

    println!(
        "Opening {} in {}...",
        style(path.display()).cyan(),
        style(config.editor()).yellow()
    );
    config.run_editor(&path).into_diagnostic()?;
    store.check_file(&process.id)?;
    Ok(())
}

fn run_delete(args: DeleteArgs, global: &GlobalOpts) -> Result<()> {
    let (store, _) = open_store(global)?;
    let process = store.find_process(&args.process)?;

    let prompt = format!(
        "Delete process {} with its steps, measures and documents?",
        process.label()
    );
    if !confirm(&prompt, args.yes)? {
        println!("Cancelled.");
        return Ok(());
    }

    let summary = store.delete_process(&process.id)?;
    if !global.quiet {
        println!(
            "{} Deleted {}",
            style("✓").green(),
            style(summary.describe()).cyan()
        );
    }
    Ok(())
}
