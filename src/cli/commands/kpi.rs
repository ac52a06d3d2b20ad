//! `oex kpi` command - Performance measure management

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use std::collections::HashMap;

use crate::cli::helpers::{
    confirm, escape_csv, format_short_id, open_store, print_header, resolve_format, truncate_str,
};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::entity::ScorecardCategory;
use crate::core::identity::EntityId;
use crate::core::natural_cmp;
use crate::entities::{PerformanceMeasure, Process, StrategicGoal};

#[derive(Subcommand, Debug)]
pub enum KpiCommands {
    /// List performance measures
    List(ListArgs),

    /// Create a measure on a process
    New(NewArgs),

    /// Show a measure's details
    Show(ShowArgs),

    /// Change fields of a measure, or its goal link
    Update(UpdateArgs),

    /// Delete a measure
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Only measures of this process (number or ID)
    #[arg(long, short = 'p')]
    pub process: Option<String>,

    /// Only measures in this scorecard category
    #[arg(long, short = 'c')]
    pub category: Option<ScorecardCategory>,

    /// Only measures linked to this goal
    #[arg(long, short = 'g')]
    pub goal: Option<String>,

    /// Only measures without a scorecard category
    #[arg(long, conflicts_with = "category")]
    pub uncategorized: bool,

    /// Show count only
    #[arg(long)]
    pub count: bool,

    /// Limit number of results
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Process number or ID
    pub process: String,

    /// Measure name
    pub name: String,

    /// Scorecard category (financial, customer, internal_process, learning_growth)
    #[arg(long, short = 'c')]
    pub category: Option<ScorecardCategory>,

    /// Strategic goal this measure supports
    #[arg(long, short = 'g')]
    pub goal: Option<String>,

    #[arg(long)]
    pub formula: Option<String>,

    /// Where the data comes from
    #[arg(long)]
    pub source: Option<String>,

    /// Reporting frequency, e.g. Monthly
    #[arg(long)]
    pub frequency: Option<String>,

    #[arg(long, short = 't')]
    pub target: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Measure ID (or unique prefix)
    pub measure: String,
}

#[derive(clap::Args, Debug)]
pub struct UpdateArgs {
    /// Measure ID (or unique prefix)
    pub measure: String,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long, short = 'c')]
    pub category: Option<ScorecardCategory>,

    /// Link to a strategic goal
    #[arg(long, short = 'g', conflicts_with = "clear_goal")]
    pub goal: Option<String>,

    /// Remove the goal link
    #[arg(long)]
    pub clear_goal: bool,

    #[arg(long)]
    pub formula: Option<String>,

    #[arg(long)]
    pub source: Option<String>,

    #[arg(long)]
    pub frequency: Option<String>,

    #[arg(long, short = 't')]
    pub target: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Measure ID (or unique prefix)
    pub measure: String,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

pub fn run(cmd: KpiCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        KpiCommands::List(args) => run_list(args, global),
        KpiCommands::New(args) => run_new(args, global),
        KpiCommands::Show(args) => run_show(args, global),
        KpiCommands::Update(args) => run_update(args, global),
        KpiCommands::Delete(args) => run_delete(args, global),
    }
}

fn category_label(m: &PerformanceMeasure) -> String {
    m.scorecard_category
        .as_ref()
        .map_or_else(|| "-".to_string(), |c| c.to_string())
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let (store, config) = open_store(global)?;
    let mut measures = store.measures();

    if let Some(ref key) = args.process {
        let process = store.find_process(key)?;
        measures.retain(|m| m.process_id == process.id);
    }
    if let Some(ref category) = args.category {
        measures.retain(|m| m.scorecard_category.as_ref() == Some(category));
    }
    if args.uncategorized {
        measures.retain(|m| m.scorecard_category.is_none());
    }
    if let Some(ref key) = args.goal {
        let goal = store.find_goal(key)?;
        measures.retain(|m| m.strategic_goal_id.as_ref() == Some(&goal.id));
    }

    let processes: HashMap<EntityId, Process> =
        store.processes().into_iter().map(|p| (p.id.clone(), p)).collect();
    let number_of = |m: &PerformanceMeasure| {
        processes
            .get(&m.process_id)
            .map_or("?", |p| p.process_number.as_str())
            .to_string()
    };

    measures.sort_by(|a, b| {
        natural_cmp(&number_of(a), &number_of(b)).then_with(|| a.name.cmp(&b.name))
    });
    if let Some(limit) = args.limit {
        measures.truncate(limit);
    }

    if args.count {
        println!("{}", measures.len());
        return Ok(());
    }
    if measures.is_empty() {
        println!("No measures found.");
        return Ok(());
    }

    match resolve_format(global, &config, OutputFormat::Tsv) {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&measures).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&measures).into_diagnostic()?);
        }
        OutputFormat::Csv => {
            println!("process,name,category,target,frequency,goal,id");
            for m in &measures {
                println!(
                    "{},{},{},{},{},{},{}",
                    escape_csv(&number_of(m)),
                    escape_csv(&m.name),
                    escape_csv(&category_label(m)),
                    escape_csv(m.target.as_deref().unwrap_or("")),
                    escape_csv(m.frequency.as_deref().unwrap_or("")),
                    m.strategic_goal_id.as_ref().map(|g| g.to_string()).unwrap_or_default(),
                    m.id
                );
            }
        }
        OutputFormat::Md => {
            println!("| Process | Measure | Category | Target |");
            println!("|---|---|---|---|");
            for m in &measures {
                println!(
                    "| {} | {} | {} | {} |",
                    number_of(m),
                    m.name,
                    category_label(m),
                    m.target.as_deref().unwrap_or("-")
                );
            }
        }
        OutputFormat::Id => {
            for m in &measures {
                println!("{}", m.id);
            }
        }
        OutputFormat::Tsv | OutputFormat::Auto => {
            print_header(&[
                ("PROCESS", 10),
                ("NAME", 30),
                ("CATEGORY", 18),
                ("TARGET", 12),
                ("ID", 17),
            ]);
            for m in &measures {
                println!(
                    "{:<10} {:<30} {:<18} {:<12} {:<17}",
                    style(number_of(m)).cyan(),
                    truncate_str(&m.name, 28),
                    category_label(m),
                    truncate_str(m.target.as_deref().unwrap_or("-"), 12),
                    format_short_id(&m.id)
                );
            }
            println!();
            println!("{} measure(s) found.", style(measures.len()).cyan());
        }
    }

    Ok(())
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let (store, _) = open_store(global)?;
    let process = store.find_process(&args.process)?;

    let mut measure = PerformanceMeasure::new(process.id.clone(), args.name, store.author().to_string());
    if let Some(category) = args.category {
        measure = measure.with_category(category);
    }
    if let Some(ref key) = args.goal {
        measure = measure.with_goal(store.find_goal(key)?.id);
    }
    measure.formula = args.formula;
    measure.source = args.source;
    measure.frequency = args.frequency;
    measure.target = args.target;
    store.save_measure(&measure)?;

    if global.quiet {
        println!("{}", measure.id);
    } else {
        println!(
            "{} Created measure {} on {}",
            style("✓").green(),
            style(&measure.name).cyan(),
            style(&process.process_number).yellow()
        );
        println!("   {}", style(store.project().entity_path(&measure.id).display()).dim());
    }
    Ok(())
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let (store, config) = open_store(global)?;
    let measure = store.find_measure(&args.measure)?;

    match resolve_format(global, &config, OutputFormat::Auto) {
        OutputFormat::Yaml => print!("{}", serde_yml::to_string(&measure).into_diagnostic()?),
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&measure).into_diagnostic()?)
        }
        OutputFormat::Id => println!("{}", measure.id),
        _ => {
            let process = store.get::<Process>(&measure.process_id).ok();
            let goal = measure
                .strategic_goal_id
                .as_ref()
                .and_then(|id| store.get::<StrategicGoal>(id).ok());

            println!("{}", style("─".repeat(60)).dim());
            println!("{}: {}", style("ID").bold(), style(&measure.id).cyan());
            println!("{}: {}", style("Name").bold(), style(&measure.name).yellow());
            println!(
                "{}: {}",
                style("Process").bold(),
                process.map_or_else(|| measure.process_id.to_string(), |p| p.label())
            );
            println!("{}: {}", style("Category").bold(), category_label(&measure));
            if let Some(goal) = goal {
                println!("{}: {}", style("Goal").bold(), goal.title);
            }
            println!("{}", style("─".repeat(60)).dim());

            let fields = [
                ("Formula", &measure.formula),
                ("Source", &measure.source),
                ("Frequency", &measure.frequency),
                ("Target", &measure.target),
            ];
            for (label, value) in fields {
                if let Some(value) = value {
                    println!("{}: {}", style(label).bold(), value);
                }
            }

            println!("{}", style("─".repeat(60)).dim());
            println!(
                "{}: {} | {}: {}",
                style("Author").dim(),
                measure.author,
                style("Created").dim(),
                measure.created.format("%Y-%m-%d %H:%M")
            );
        }
    }

    Ok(())
}

fn run_update(args: UpdateArgs, global: &GlobalOpts) -> Result<()> {
    let (store, _) = open_store(global)?;
    let mut measure = store.find_measure(&args.measure)?;

    if let Some(name) = args.name {
        measure.name = name;
    }
    if args.category.is_some() {
        measure.scorecard_category = args.category;
    }
    if let Some(ref key) = args.goal {
        measure.strategic_goal_id = Some(store.find_goal(key)?.id);
    }
    if args.clear_goal {
        measure.strategic_goal_id = None;
    }
    if args.formula.is_some() {
        measure.formula = args.formula;
    }
    if args.source.is_some() {
        measure.source = args.source;
    }
    if args.frequency.is_some() {
        measure.frequency = args.frequency;
    }
    if args.target.is_some() {
        measure.target = args.target;
    }
    store.save_measure(&measure)?;

    if !global.quiet {
        println!(
            "{} Updated measure {}",
            style("✓").green(),
            style(&measure.name).cyan()
        );
    }
    Ok(())
}

fn run_delete(args: DeleteArgs, global: &GlobalOpts) -> Result<()> {
    let (store, _) = open_store(global)?;
    let measure = store.find_measure(&args.measure)?;

    if !confirm(&format!("Delete measure {}?", measure.name), args.yes)? {
        println!("Cancelled.");
        return Ok(());
    }

    let summary = store.delete_measure(&measure.id)?;
    if !global.quiet {
        println!(
            "{} Deleted {}",
            style("✓").green(),
            style(summary.describe()).cyan()
        );
    }
    Ok(())
}
