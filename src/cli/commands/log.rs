//! `oex log` command - Recent activity

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{escape_csv, open_store, resolve_format, truncate_str};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::identity::EntityPrefix;
use crate::entities::Action;

#[derive(clap::Args, Debug)]
pub struct LogArgs {
    /// Number of entries to show
    #[arg(long, short = 'n', default_value = "20")]
    pub limit: usize,

    /// Only entries for this record type (ELEM, PROC, STEP, KPI, GOAL, ...)
    #[arg(long, short = 't')]
    pub r#type: Option<EntityPrefix>,
}

pub fn run(args: LogArgs, global: &GlobalOpts) -> Result<()> {
    let (store, config) = open_store(global)?;
    let mut entries = store.activity();
    if let Some(prefix) = args.r#type {
        entries.retain(|e| e.entity_type == prefix);
    }
    entries.truncate(args.limit);

    match resolve_format(global, &config, OutputFormat::Tsv) {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&entries).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&entries).into_diagnostic()?);
        }
        OutputFormat::Csv => {
            println!("timestamp,action,type,entity,author,summary");
            for e in &entries {
                println!(
                    "{},{},{},{},{},{}",
                    e.timestamp.to_rfc3339(),
                    e.action,
                    e.entity_type,
                    e.entity_id,
                    escape_csv(&e.author),
                    escape_csv(&e.summary)
                );
            }
        }
        OutputFormat::Id => {
            for e in &entries {
                println!("{}", e.entity_id);
            }
        }
        _ => {
            if entries.is_empty() {
                println!("No activity recorded.");
                return Ok(());
            }
            for e in &entries {
                let action = match e.action {
                    Action::Created => style(format!("{:<8}", e.action.to_string())).green(),
                    Action::Updated => style(format!("{:<8}", e.action.to_string())).yellow(),
                    Action::Deleted => style(format!("{:<8}", e.action.to_string())).red(),
                };
                println!(
                    "{}  {} {:<16} {}",
                    style(e.timestamp.format("%Y-%m-%d %H:%M:%S")).dim(),
                    action,
                    truncate_str(&e.author, 16),
                    e.summary
                );
            }
        }
    }

    Ok(())
}
