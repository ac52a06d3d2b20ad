//! `oex step` command - Process steps and decision outcomes

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::aggregate::DecisionFlow;
use crate::cli::helpers::{
    confirm, escape_csv, format_short_id, open_store, print_header, resolve_format, truncate_str,
};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::entity::StepType;
use crate::core::identity::EntityId;
use crate::entities::{Outcome, Step};

#[derive(Subcommand, Debug)]
pub enum StepCommands {
    /// List the steps of a process with their decision edges
    List(ListArgs),

    /// Add a step to a process
    Add(AddArgs),

    /// Delete a step and the outcomes attached to it
    Delete(DeleteArgs),

    /// Add a decision outcome from a decision step to another step
    Link(LinkArgs),

    /// Remove a decision outcome
    Unlink(UnlinkArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Process number or ID
    pub process: String,

    /// Show count only
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct AddArgs {
    /// Process number or ID
    pub process: String,

    /// Step number (render order)
    pub number: u32,

    /// Step title
    pub title: String,

    /// Step type (task, decision, start, end)
    #[arg(long, short = 't', default_value = "task")]
    pub r#type: StepType,

    #[arg(long, short = 'd')]
    pub description: Option<String>,

    /// Role or person accountable for the step
    #[arg(long, short = 'r')]
    pub responsibility: Option<String>,

    /// Document or system referenced by the step
    #[arg(long)]
    pub reference: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Step ID or PROCESS#NUMBER (e.g. OE-1.2#3)
    pub step: String,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

#[derive(clap::Args, Debug)]
pub struct LinkArgs {
    /// Decision step ID or PROCESS#NUMBER
    pub from: String,

    /// Step number the outcome leads to
    pub to: u32,

    /// Outcome label, e.g. "Yes"
    pub label: String,

    /// Lower priorities are listed first
    #[arg(long, short = 'p', default_value = "0")]
    pub priority: u32,
}

#[derive(clap::Args, Debug)]
pub struct UnlinkArgs {
    /// Outcome ID
    pub outcome: String,
}

pub fn run(cmd: StepCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        StepCommands::List(args) => run_list(args, global),
        StepCommands::Add(args) => run_add(args, global),
        StepCommands::Delete(args) => run_delete(args, global),
        StepCommands::Link(args) => run_link(args, global),
        StepCommands::Unlink(args) => run_unlink(args, global),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let (store, config) = open_store(global)?;
    let process = store.find_process(&args.process)?;

    let mut steps: Vec<Step> = store
        .steps()
        .into_iter()
        .filter(|s| s.process_id == process.id)
        .collect();
    steps.sort_by_key(|s| s.step_number);
    let outcomes: Vec<Outcome> = store
        .outcomes()
        .into_iter()
        .filter(|o| o.process_id == process.id)
        .collect();

    if args.count {
        println!("{}", steps.len());
        return Ok(());
    }
    if steps.is_empty() {
        println!("No steps found for {}.", process.process_number);
        return Ok(());
    }

    let flow = DecisionFlow::build(&steps, &outcomes);
    let next_of = |step: &Step| -> String {
        flow.edges_from(&step.id)
            .iter()
            .map(|e| format!("{}→{}", e.label, flow.step_number(&e.to).unwrap_or_default()))
            .collect::<Vec<_>>()
            .join(", ")
    };

    match resolve_format(global, &config, OutputFormat::Tsv) {
        OutputFormat::Json => {
            let value = serde_json::json!({
                "steps": steps,
                "edges": flow.edges().collect::<Vec<_>>(),
                "unresolved": flow.unresolved(),
            });
            println!("{}", serde_json::to_string_pretty(&value).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&steps).into_diagnostic()?);
        }
        OutputFormat::Csv => {
            println!("number,type,title,responsibility,next,id");
            for s in &steps {
                println!(
                    "{},{},{},{},{},{}",
                    s.step_number,
                    s.step_type,
                    escape_csv(&s.title),
                    escape_csv(s.responsibility.as_deref().unwrap_or("")),
                    escape_csv(&next_of(s)),
                    s.id
                );
            }
        }
        OutputFormat::Md => {
            println!("| # | Type | Title | Next |");
            println!("|---|---|---|---|");
            for s in &steps {
                println!("| {} | {} | {} | {} |", s.step_number, s.step_type, s.title, next_of(s));
            }
        }
        OutputFormat::Id => {
            for s in &steps {
                println!("{}", s.id);
            }
        }
        OutputFormat::Tsv | OutputFormat::Auto => {
            print_header(&[("#", 4), ("TYPE", 9), ("TITLE", 34), ("NEXT", 20), ("ID", 17)]);
            for s in &steps {
                println!(
                    "{:<4} {:<9} {:<34} {:<20} {:<17}",
                    style(s.step_number).cyan(),
                    s.step_type.to_string(),
                    truncate_str(&s.title, 32),
                    truncate_str(&next_of(s), 20),
                    format_short_id(&s.id)
                );
            }
            println!();
            println!(
                "{} step(s) in {}.",
                style(steps.len()).cyan(),
                style(process.label()).yellow()
            );
        }
    }

    Ok(())
}

fn run_add(args: AddArgs, global: &GlobalOpts) -> Result<()> {
    let (store, _) = open_store(global)?;
    let process = store.find_process(&args.process)?;

    let mut step = Step::new(
        process.id.clone(),
        args.number,
        args.r#type,
        args.title,
        store.author().to_string(),
    );
    step.description = args.description;
    step.responsibility = args.responsibility;
    step.reference = args.reference;
    store.save_step(&step)?;

    if global.quiet {
        println!("{}", step.id);
    } else {
        println!(
            "{} Added step {}. {} to {}",
            style("✓").green(),
            step.step_number,
            style(&step.title).cyan(),
            style(&process.process_number).yellow()
        );
    }
    Ok(())
}

fn run_delete(args: DeleteArgs, global: &GlobalOpts) -> Result<()> {
    let (store, _) = open_store(global)?;
    let step = store.find_step(&args.step)?;

    let prompt = format!("Delete step {}. {}?", step.step_number, step.title);
    if !confirm(&prompt, args.yes)? {
        println!("Cancelled.");
        return Ok(());
    }

    let summary = store.delete_step(&step.id)?;
    if !global.quiet {
        println!(
            "{} Deleted {}",
            style("✓").green(),
            style(summary.describe()).cyan()
        );
    }
    Ok(())
}

fn run_link(args: LinkArgs, global: &GlobalOpts) -> Result<()> {
    let (store, _) = open_store(global)?;
    let from = store.find_step(&args.from)?;

    let outcome = Outcome::new(&from, args.to, args.label, args.priority, store.author().to_string());
    store.save_outcome(&outcome)?;

    let target_exists = store
        .steps()
        .iter()
        .any(|s| s.process_id == from.process_id && s.step_number == args.to);

    if global.quiet {
        println!("{}", outcome.id);
    } else {
        println!(
            "{} Linked step {} --{}--> step {}",
            style("✓").green(),
            from.step_number,
            style(&outcome.label).cyan(),
            args.to
        );
        if !target_exists {
            println!(
                "   {} step {} does not exist yet",
                style("!").yellow(),
                args.to
            );
        }
    }
    Ok(())
}

fn run_unlink(args: UnlinkArgs, global: &GlobalOpts) -> Result<()> {
    let (store, _) = open_store(global)?;
    let id = EntityId::parse(&args.outcome).map_err(|e| miette::miette!("{}", e))?;
    let summary = store.delete_outcome(&id)?;
    if !global.quiet {
        println!(
            "{} Removed {}",
            style("✓").green(),
            style(summary.describe()).cyan()
        );
    }
    Ok(())
}
