//! `oex element` command - Framework element management

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use std::collections::HashMap;

use crate::cli::helpers::{
    confirm, escape_csv, format_short_id, open_store, print_header, resolve_format, truncate_str,
};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::identity::EntityId;
use crate::core::sort_naturally_by_key;
use crate::entities::Element;

#[derive(Subcommand, Debug)]
pub enum ElementCommands {
    /// List elements in number order
    List(ListArgs),

    /// Create a new element
    New(NewArgs),

    /// Show an element's details
    Show(ShowArgs),

    /// Change fields of an element
    Update(UpdateArgs),

    /// Open an element in your editor
    Edit(ShowArgs),

    /// Delete an element with its processes and goals
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Include inactive elements
    #[arg(long)]
    pub all: bool,

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
    /// Element number (unique)
    pub number: u32,

    /// Element title
    pub title: String,

    /// Description
    #[arg(long, short = 'd')]
    pub description: Option<String>,

    /// Elements this one enables (repeatable)
    #[arg(long = "enables")]
    pub enables: Vec<String>,

    /// Open in editor after creation
    #[arg(long, short = 'e')]
    pub edit: bool,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Element number or ID
    pub element: String,
}

#[derive(clap::Args, Debug)]
pub struct UpdateArgs {
    /// Element number or ID
    pub element: String,

    /// New element number
    #[arg(long)]
    pub number: Option<u32>,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long, short = 'd')]
    pub description: Option<String>,

    /// Mark the element active or inactive
    #[arg(long)]
    pub active: Option<bool>,

    /// Replace the enabled-element list (repeatable)
    #[arg(long = "enables")]
    pub enables: Vec<String>,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Element number or ID
    pub element: String,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

pub fn run(cmd: ElementCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ElementCommands::List(args) => run_list(args, global),
        ElementCommands::New(args) => run_new(args, global),
        ElementCommands::Show(args) => run_show(args, global),
        ElementCommands::Update(args) => run_update(args, global),
        ElementCommands::Edit(args) => run_edit(args, global),
        ElementCommands::Delete(args) => run_delete(args, global),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let (store, config) = open_store(global)?;
    let mut elements = store.elements();
    if !args.all {
        elements.retain(|e| e.active);
    }
    elements.sort_by_key(|e| e.element_number);
    if args.reverse {
        elements.reverse();
    }
    if let Some(limit) = args.limit {
        elements.truncate(limit);
    }

    if args.count {
        println!("{}", elements.len());
        return Ok(());
    }
    if elements.is_empty() {
        println!("No elements found.");
        return Ok(());
    }

    let mut process_counts: HashMap<EntityId, usize> = HashMap::new();
    for p in store.processes() {
        *process_counts.entry(p.element_id).or_default() += 1;
    }
    let processes_of = |e: &Element| process_counts.get(&e.id).copied().unwrap_or(0);

    match resolve_format(global, &config, OutputFormat::Tsv) {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&elements).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&elements).into_diagnostic()?);
        }
        OutputFormat::Csv => {
            println!("number,title,processes,active,id");
            for e in &elements {
                println!(
                    "{},{},{},{},{}",
                    e.element_number,
                    escape_csv(&e.title),
                    processes_of(e),
                    e.active,
                    e.id
                );
            }
        }
        OutputFormat::Md => {
            println!("| # | Title | Processes | Active |");
            println!("|---|---|---|---|");
            for e in &elements {
                println!(
                    "| {} | {} | {} | {} |",
                    e.element_number,
                    e.title,
                    processes_of(e),
                    if e.active { "yes" } else { "no" }
                );
            }
        }
        OutputFormat::Id => {
            for e in &elements {
                println!("{}", e.id);
            }
        }
        OutputFormat::Tsv | OutputFormat::Auto => {
            print_header(&[("#", 4), ("TITLE", 40), ("PROCESSES", 10), ("ID", 17)]);
            for e in &elements {
                let title = if e.active {
                    truncate_str(&e.title, 38)
                } else {
                    format!("{} (inactive)", truncate_str(&e.title, 27))
                };
                println!(
                    "{:<4} {:<40} {:<10} {:<17}",
                    style(e.element_number).cyan(),
                    title,
                    processes_of(e),
                    format_short_id(&e.id)
                );
            }
            println!();
            println!("{} element(s) found.", style(elements.len()).cyan());
        }
    }

    Ok(())
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let (store, config) = open_store(global)?;

    let mut element = Element::new(args.number, args.title, store.author().to_string());
    element.description = args.description;
    element.set_enabling_elements(args.enables);
    store.save_element(&element)?;

    let path = store.project().entity_path(&element.id);
    if global.quiet {
        println!("{}", element.id);
    } else {
        println!(
            "{} Created element {}",
            style("✓").green(),
            style(element.label()).cyan()
        );
        println!("   {}", style(path.display()).dim());
    }

    if args.edit {
        println!("Opening in {}...", style(config.editor()).yellow());
        config.run_editor(&path).into_diagnostic()?;
        store.check_file(&element.id)?;
    }

    Ok(())
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let (store, config) = open_store(global)?;
    let element = store.find_element(&args.element)?;

    match resolve_format(global, &config, OutputFormat::Auto) {
        OutputFormat::Yaml => print!("{}", serde_yml::to_string(&element).into_diagnostic()?),
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&element).into_diagnostic()?)
        }
        OutputFormat::Id => println!("{}", element.id),
        _ => {
            let mut processes: Vec<_> = store
                .processes()
                .into_iter()
                .filter(|p| p.element_id == element.id)
                .collect();
            sort_naturally_by_key(&mut processes, |p| p.process_number.as_str());
            let goals: Vec<_> = store
                .goals()
                .into_iter()
                .filter(|g| g.element_id == element.id)
                .collect();

            println!("{}", style("─".repeat(60)).dim());
            println!("{}: {}", style("ID").bold(), style(&element.id).cyan());
            println!("{}: {}", style("Number").bold(), element.element_number);
            println!("{}: {}", style("Title").bold(), style(&element.title).yellow());
            println!("{}: {}", style("Active").bold(), if element.active { "yes" } else { "no" });
            println!("{}", style("─".repeat(60)).dim());

            if let Some(ref desc) = element.description {
                println!();
                println!("{}", style("Description:").bold());
                println!("{}", desc);
            }

            if !element.enabling_elements().is_empty() {
                println!();
                println!(
                    "{}: {}",
                    style("Enables").bold(),
                    element.enabling_elements().join(", ")
                );
            }

            println!();
            println!("{} ({}):", style("Processes").bold(), processes.len());
            for p in &processes {
                println!("  • {} [{}]", p.label(), p.status);
            }

            if !goals.is_empty() {
                println!();
                println!("{} ({}):", style("Strategic Goals").bold(), goals.len());
                for g in &goals {
                    println!("  • {} [{}]", g.title, g.category);
                }
            }

            println!("{}", style("─".repeat(60)).dim());
            println!(
                "{}: {} | {}: {}",
                style("Author").dim(),
                element.author,
                style("Created").dim(),
                element.created.format("%Y-%m-%d %H:%M")
            );
        }
    }

    Ok(())
}

fn run_update(args: UpdateArgs, global: &GlobalOpts) -> Result<()> {
    let (store, _) = open_store(global)?;
    let mut element = store.find_element(&args.element)?;

    if let Some(number) = args.number {
        element.element_number = number;
    }
    if let Some(title) = args.title {
        element.title = title;
    }
    if let Some(desc) = args.description {
        element.description = Some(desc);
    }
    if let Some(active) = args.active {
        element.active = active;
    }
    if !args.enables.is_empty() {
        element.set_enabling_elements(args.enables);
    }
    store.save_element(&element)?;

    if !global.quiet {
        println!(
            "{} Updated element {}",
            style("✓").green(),
            style(element.label()).cyan()
        );
    }
    Ok(())
}

fn run_edit(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let (store, config) = open_store(global)?;
    let element = store.find_element(&args.element)?;
    let path = store.project().entity_path(&element.id);

    println!(
        "Opening {} in {}...",
        style(path.display()).cyan(),
        style(config.editor()).yellow()
    );
    config.run_editor(&path).into_diagnostic()?;
    store.check_file(&element.id)?;
    Ok(())
}

fn run_delete(args: DeleteArgs, global: &GlobalOpts) -> Result<()> {
    let (store, _) = open_store(global)?;
    let element = store.find_element(&args.element)?;

    let prompt = format!(
        "Delete element {} and all of its processes and goals?",
        element.label()
    );
    if !confirm(&prompt, args.yes)? {
        println!("Cancelled.");
        return Ok(());
    }

    let summary = store.delete_element(&element.id)?;
    if !global.quiet {
        println!(
            "{} Deleted {}",
            style("✓").green(),
            style(summary.describe()).cyan()
        );
    }
    Ok(())
}
