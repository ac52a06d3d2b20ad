//! `oex doc` command - Process document versions and attachments

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

use crate::cli::helpers::{escape_csv, open_store, print_header, resolve_format, truncate_str};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::entities::{DocumentVersion, ProcessDocument};

#[derive(Subcommand, Debug)]
pub enum DocCommands {
    /// List the versions and attachments of a process
    List(ListArgs),

    /// Record a new document version for a process
    Version(VersionArgs),

    /// Attach a file to a process
    Attach(AttachArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Process number or ID
    pub process: String,
}

#[derive(clap::Args, Debug)]
pub struct VersionArgs {
    /// Process number or ID
    pub process: String,

    /// Version label, e.g. 1.2
    #[arg(id = "version_label", value_name = "VERSION")]
    pub version: String,

    /// What changed in this version
    #[arg(long, short = 's')]
    pub summary: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct AttachArgs {
    /// Process number or ID
    pub process: String,

    /// Path of the file to attach
    pub path: String,

    #[arg(long, short = 'd')]
    pub description: Option<String>,
}

#[derive(Serialize)]
struct DocumentListing {
    versions: Vec<DocumentVersion>,
    attachments: Vec<ProcessDocument>,
}

pub fn run(cmd: DocCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        DocCommands::List(args) => run_list(args, global),
        DocCommands::Version(args) => run_version(args, global),
        DocCommands::Attach(args) => run_attach(args, global),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let (store, config) = open_store(global)?;
    let process = store.find_process(&args.process)?;

    let mut versions: Vec<DocumentVersion> = store
        .versions()
        .into_iter()
        .filter(|v| v.process_id == process.id)
        .collect();
    versions.sort_by(|a, b| b.created.cmp(&a.created));
    let attachments: Vec<ProcessDocument> = store
        .attachments()
        .into_iter()
        .filter(|d| d.process_id == process.id)
        .collect();
    let listing = DocumentListing {
        versions,
        attachments,
    };

    match resolve_format(global, &config, OutputFormat::Tsv) {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&listing).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&listing).into_diagnostic()?);
        }
        OutputFormat::Id => {
            for v in &listing.versions {
                println!("{}", v.id);
            }
            for d in &listing.attachments {
                println!("{}", d.id);
            }
        }
        OutputFormat::Csv => {
            println!("kind,name,detail,author,created,id");
            for v in &listing.versions {
                println!(
                    "version,{},{},{},{},{}",
                    escape_csv(&v.version),
                    escape_csv(v.change_summary.as_deref().unwrap_or("")),
                    escape_csv(&v.author),
                    v.created.format("%Y-%m-%d"),
                    v.id
                );
            }
            for d in &listing.attachments {
                println!(
                    "attachment,{},{},{},{},{}",
                    escape_csv(&d.file_name),
                    escape_csv(&d.path),
                    escape_csv(&d.author),
                    d.created.format("%Y-%m-%d"),
                    d.id
                );
            }
        }
        _ => {
            if listing.versions.is_empty() && listing.attachments.is_empty() {
                println!("No documents recorded for {}.", process.process_number);
                return Ok(());
            }
            println!("{}", style(process.label()).bold());
            println!();
            if !listing.versions.is_empty() {
                print_header(&[("VERSION", 10), ("SUMMARY", 40), ("AUTHOR", 16), ("DATE", 10)]);
                for v in &listing.versions {
                    println!(
                        "{:<10} {:<40} {:<16} {:<10}",
                        style(&v.version).cyan(),
                        truncate_str(v.change_summary.as_deref().unwrap_or("-"), 38),
                        truncate_str(&v.author, 16),
                        v.created.format("%Y-%m-%d").to_string()
                    );
                }
                println!();
            }
            if !listing.attachments.is_empty() {
                print_header(&[("FILE", 24), ("PATH", 40), ("DESCRIPTION", 20)]);
                for d in &listing.attachments {
                    println!(
                        "{:<24} {:<40} {:<20}",
                        style(truncate_str(&d.file_name, 24)).cyan(),
                        truncate_str(&d.path, 38),
                        truncate_str(d.description.as_deref().unwrap_or("-"), 20)
                    );
                }
            }
        }
    }

    Ok(())
}

fn run_version(args: VersionArgs, global: &GlobalOpts) -> Result<()> {
    let (store, _) = open_store(global)?;
    let process = store.find_process(&args.process)?;

    let mut version = DocumentVersion::new(process.id.clone(), args.version, store.author().to_string());
    version.change_summary = args.summary;
    store.save_version(&version)?;

    if global.quiet {
        println!("{}", version.id);
    } else {
        println!(
            "{} Recorded version {} of {}",
            style("✓").green(),
            style(&version.version).cyan(),
            style(process.label()).yellow()
        );
    }
    Ok(())
}

fn run_attach(args: AttachArgs, global: &GlobalOpts) -> Result<()> {
    let (store, _) = open_store(global)?;
    let process = store.find_process(&args.process)?;

    let mut doc = ProcessDocument::new(process.id.clone(), args.path, store.author().to_string());
    doc.description = args.description;
    store.save_attachment(&doc)?;

    if global.quiet {
        println!("{}", doc.id);
    } else {
        println!(
            "{} Attached {} to {}",
            style("✓").green(),
            style(&doc.file_name).cyan(),
            style(process.label()).yellow()
        );
    }
    Ok(())
}
