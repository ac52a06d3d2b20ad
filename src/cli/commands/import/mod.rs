//! `oex import` command - Import records from CSV files

mod common;
mod elements;
mod measures;
mod processes;

use clap::Subcommand;
use console::style;
use miette::Result;
use std::path::PathBuf;

use crate::cli::helpers::open_store;
use crate::cli::GlobalOpts;

pub use common::{ImportOptions, ImportStats};

#[derive(Subcommand, Debug)]
pub enum ImportCommands {
    /// Import elements (matched on number)
    Elements(ImportArgs),

    /// Import processes (matched on process number)
    Processes(ImportArgs),

    /// Import performance measures (matched on process and name)
    Measures(ImportArgs),
}

#[derive(clap::Args, Debug)]
pub struct ImportArgs {
    /// CSV file to import
    #[arg(required_unless_present = "template")]
    pub file: Option<PathBuf>,

    /// Print a CSV template for this table
    #[arg(long)]
    pub template: bool,

    /// Validate CSV without writing records
    #[arg(long)]
    pub dry_run: bool,

    /// Continue importing after errors (default: stop on first error)
    #[arg(long)]
    pub skip_errors: bool,
}

pub fn run(cmd: ImportCommands, global: &GlobalOpts) -> Result<()> {
    let (table, args) = match cmd {
        ImportCommands::Elements(args) => ("elements", args),
        ImportCommands::Processes(args) => ("processes", args),
        ImportCommands::Measures(args) => ("measures", args),
    };

    if args.template {
        return match table {
            "elements" => common::generate_template(elements::HEADERS, elements::EXAMPLE, table),
            "processes" => {
                common::generate_template(processes::HEADERS, processes::EXAMPLE, table)
            }
            _ => common::generate_template(measures::HEADERS, measures::EXAMPLE, table),
        };
    }

    let file_path = args
        .file
        .clone()
        .ok_or_else(|| miette::miette!("CSV file required. Usage: oex import {} data.csv", table))?;
    if !file_path.exists() {
        return Err(miette::miette!("File not found: {}", file_path.display()));
    }

    let (store, _) = open_store(global)?;
    let opts = ImportOptions {
        dry_run: args.dry_run,
        skip_errors: args.skip_errors,
    };

    println!(
        "{} Importing {} from {}{}",
        style("→").blue(),
        style(table).cyan(),
        style(file_path.display()).yellow(),
        if args.dry_run {
            style(" (dry run)").dim().to_string()
        } else {
            String::new()
        }
    );
    println!();

    let stats = match table {
        "elements" => elements::import(&store, &file_path, &opts)?,
        "processes" => processes::import(&store, &file_path, &opts)?,
        _ => measures::import(&store, &file_path, &opts)?,
    };

    print_summary(&stats);

    if args.dry_run {
        println!();
        println!("{}", style("Dry run complete. No records were written.").yellow());
    }

    if stats.errors > 0 && !args.skip_errors {
        return Err(miette::miette!("Import completed with {} error(s)", stats.errors));
    }

    Ok(())
}

fn print_summary(stats: &ImportStats) {
    println!();
    println!("{}", style("─".repeat(50)).dim());
    println!("{}", style("Import Summary").bold());
    println!("{}", style("─".repeat(50)).dim());
    println!("  Rows processed:   {}", style(stats.rows_processed).cyan());
    println!("  Records created:  {}", style(stats.entities_created).green());
    if stats.entities_updated > 0 {
        println!("  Records updated:  {}", style(stats.entities_updated).yellow());
    }
    if stats.errors > 0 {
        println!("  Errors:           {}", style(stats.errors).red());
    }
    if stats.skipped > 0 {
        println!("  Skipped:          {}", style(stats.skipped).dim());
    }
}
