//! `oex goal` command - Strategic goal management

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use std::collections::HashMap;

use crate::cli::helpers::{
    confirm, escape_csv, format_short_id, open_store, print_header, resolve_format, truncate_str,
};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::entity::{Priority, ScorecardCategory};
use crate::core::identity::EntityId;
use crate::entities::{Element, Process, StrategicGoal};

#[derive(Subcommand, Debug)]
pub enum GoalCommands {
    /// List strategic goals
    List(ListArgs),

    /// Create a goal on an element
    New(NewArgs),

    /// Show a goal with the measures that support it
    Show(ShowArgs),

    /// Change fields of a goal (e.g. record a new current value)
    Update(UpdateArgs),

    /// Delete a goal; linked measures are kept and unlinked
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Only goals of this element (number or ID)
    #[arg(long, short = 'e')]
    pub element: Option<String>,

    /// Only goals in this scorecard category
    #[arg(long, short = 'c')]
    pub category: Option<ScorecardCategory>,

    /// Show count only
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Owning element (number or ID)
    pub element: String,

    /// Goal title
    pub title: String,

    /// Scorecard category (financial, customer, internal_process, learning_growth)
    #[arg(long, short = 'c')]
    pub category: ScorecardCategory,

    #[arg(long, short = 'd')]
    pub description: Option<String>,

    #[arg(long, short = 't')]
    pub target: Option<f64>,

    #[arg(long)]
    pub current: Option<f64>,

    /// Unit of the target and current values, e.g. %
    #[arg(long, short = 'u')]
    pub unit: Option<String>,

    #[arg(long, short = 'p', default_value = "medium")]
    pub priority: Priority,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Goal ID (or unique prefix)
    pub goal: String,
}

#[derive(clap::Args, Debug)]
pub struct UpdateArgs {
    /// Goal ID (or unique prefix)
    pub goal: String,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long, short = 'c')]
    pub category: Option<ScorecardCategory>,

    #[arg(long, short = 'd')]
    pub description: Option<String>,

    #[arg(long, short = 't')]
    pub target: Option<f64>,

    #[arg(long)]
    pub current: Option<f64>,

    #[arg(long, short = 'u')]
    pub unit: Option<String>,

    #[arg(long, short = 'p')]
    pub priority: Option<Priority>,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Goal ID (or unique prefix)
    pub goal: String,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

pub fn run(cmd: GoalCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        GoalCommands::List(args) => run_list(args, global),
        GoalCommands::New(args) => run_new(args, global),
        GoalCommands::Show(args) => run_show(args, global),
        GoalCommands::Update(args) => run_update(args, global),
        GoalCommands::Delete(args) => run_delete(args, global),
    }
}

fn format_value(value: Option<f64>, unit: Option<&str>) -> String {
    match value {
        Some(v) => format!("{}{}", v, unit.unwrap_or("")),
        None => "-".to_string(),
    }
}

fn progress_label(goal: &StrategicGoal) -> String {
    goal.progress()
        .map_or_else(|| "-".to_string(), |p| format!("{:.0}%", p))
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let (store, config) = open_store(global)?;
    let mut goals = store.goals();

    if let Some(ref key) = args.element {
        let element = store.find_element(key)?;
        goals.retain(|g| g.element_id == element.id);
    }
    if let Some(ref category) = args.category {
        goals.retain(|g| &g.category == category);
    }

    let elements: HashMap<EntityId, Element> =
        store.elements().into_iter().map(|e| (e.id.clone(), e)).collect();
    let element_number = |g: &StrategicGoal| elements.get(&g.element_id).map(|e| e.element_number);
    goals.sort_by(|a, b| {
        element_number(a)
            .cmp(&element_number(b))
            .then_with(|| a.title.cmp(&b.title))
    });

    if args.count {
        println!("{}", goals.len());
        return Ok(());
    }
    if goals.is_empty() {
        println!("No goals found.");
        return Ok(());
    }

    match resolve_format(global, &config, OutputFormat::Tsv) {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&goals).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&goals).into_diagnostic()?);
        }
        OutputFormat::Csv => {
            println!("element,title,category,target,current,unit,priority,id");
            for g in &goals {
                println!(
                    "{},{},{},{},{},{},{},{}",
                    element_number(g).map(|n| n.to_string()).unwrap_or_default(),
                    escape_csv(&g.title),
                    escape_csv(g.category.as_str()),
                    g.target_value.map(|v| v.to_string()).unwrap_or_default(),
                    g.current_value.map(|v| v.to_string()).unwrap_or_default(),
                    escape_csv(g.unit.as_deref().unwrap_or("")),
                    g.priority,
                    g.id
                );
            }
        }
        OutputFormat::Md => {
            println!("| Element | Goal | Category | Target | Current | Progress |");
            println!("|---|---|---|---|---|---|");
            for g in &goals {
                println!(
                    "| {} | {} | {} | {} | {} | {} |",
                    element_number(g).map_or("?".to_string(), |n| n.to_string()),
                    g.title,
                    g.category,
                    format_value(g.target_value, g.unit.as_deref()),
                    format_value(g.current_value, g.unit.as_deref()),
                    progress_label(g)
                );
            }
        }
        OutputFormat::Id => {
            for g in &goals {
                println!("{}", g.id);
            }
        }
        OutputFormat::Tsv | OutputFormat::Auto => {
            print_header(&[
                ("ELEM", 5),
                ("TITLE", 30),
                ("CATEGORY", 18),
                ("PROGRESS", 9),
                ("ID", 17),
            ]);
            for g in &goals {
                println!(
                    "{:<5} {:<30} {:<18} {:<9} {:<17}",
                    style(element_number(g).map_or("?".to_string(), |n| n.to_string())).cyan(),
                    truncate_str(&g.title, 28),
                    g.category.to_string(),
                    progress_label(g),
                    format_short_id(&g.id)
                );
            }
            println!();
            println!("{} goal(s) found.", style(goals.len()).cyan());
        }
    }

    Ok(())
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let (store, _) = open_store(global)?;
    let element = store.find_element(&args.element)?;

    let mut goal = StrategicGoal::new(
        element.id.clone(),
        args.title,
        args.category,
        store.author().to_string(),
    );
    goal.description = args.description;
    goal.target_value = args.target;
    goal.current_value = args.current;
    goal.unit = args.unit;
    goal.priority = args.priority;
    store.save_goal(&goal)?;

    if global.quiet {
        println!("{}", goal.id);
    } else {
        println!(
            "{} Created goal {} [{}] on {}",
            style("✓").green(),
            style(&goal.title).cyan(),
            goal.category,
            style(element.label()).yellow()
        );
        println!("   {}", style(store.project().entity_path(&goal.id).display()).dim());
    }
    Ok(())
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let (store, config) = open_store(global)?;
    let goal = store.find_goal(&args.goal)?;

    match resolve_format(global, &config, OutputFormat::Auto) {
        OutputFormat::Yaml => print!("{}", serde_yml::to_string(&goal).into_diagnostic()?),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&goal).into_diagnostic()?),
        OutputFormat::Id => println!("{}", goal.id),
        _ => {
            let element = store.get::<Element>(&goal.element_id).ok();
            let processes: HashMap<EntityId, Process> =
                store.processes().into_iter().map(|p| (p.id.clone(), p)).collect();
            let measures: Vec<_> = store
                .measures()
                .into_iter()
                .filter(|m| m.strategic_goal_id.as_ref() == Some(&goal.id))
                .collect();

            println!("{}", style("─".repeat(60)).dim());
            println!("{}: {}", style("ID").bold(), style(&goal.id).cyan());
            println!("{}: {}", style("Title").bold(), style(&goal.title).yellow());
            println!(
                "{}: {}",
                style("Element").bold(),
                element.map_or_else(|| goal.element_id.to_string(), |e| e.label())
            );
            println!("{}: {}", style("Category").bold(), goal.category);
            println!("{}: {}", style("Priority").bold(), goal.priority);
            println!(
                "{}: {} of {} ({})",
                style("Progress").bold(),
                format_value(goal.current_value, goal.unit.as_deref()),
                format_value(goal.target_value, goal.unit.as_deref()),
                progress_label(&goal)
            );
            println!("{}", style("─".repeat(60)).dim());

            if let Some(ref desc) = goal.description {
                println!();
                println!("{}", style("Description:").bold());
                println!("{}", desc);
            }

            println!();
            println!("{} ({}):", style("Supporting Measures").bold(), measures.len());
            for m in &measures {
                let process = processes
                    .get(&m.process_id)
                    .map_or("?", |p| p.process_number.as_str());
                println!("  • {} ({})", m.name, process);
            }
        }
    }

    Ok(())
}

fn run_update(args: UpdateArgs, global: &GlobalOpts) -> Result<()> {
    let (store, _) = open_store(global)?;
    let mut goal = store.find_goal(&args.goal)?;

    if let Some(title) = args.title {
        goal.title = title;
    }
    if let Some(category) = args.category {
        goal.category = category;
    }
    if args.description.is_some() {
        goal.description = args.description;
    }
    if args.target.is_some() {
        goal.target_value = args.target;
    }
    if args.current.is_some() {
        goal.current_value = args.current;
    }
    if args.unit.is_some() {
        goal.unit = args.unit;
    }
    if let Some(priority) = args.priority {
        goal.priority = priority;
    }
    store.save_goal(&goal)?;

    if !global.quiet {
        println!(
            "{} Updated goal {} ({})",
            style("✓").green(),
            style(&goal.title).cyan(),
            progress_label(&goal)
        );
    }
    Ok(())
}

fn run_delete(args: DeleteArgs, global: &GlobalOpts) -> Result<()> {
    let (store, _) = open_store(global)?;
    let goal = store.find_goal(&args.goal)?;

    if !confirm(&format!("Delete goal {}?", goal.title), args.yes)? {
        println!("Cancelled.");
        return Ok(());
    }

    let summary = store.delete_goal(&goal.id)?;
    if !global.quiet {
        println!(
            "{} Deleted {}",
            style("✓").green(),
            style(summary.describe()).cyan()
        );
    }
    Ok(())
}
