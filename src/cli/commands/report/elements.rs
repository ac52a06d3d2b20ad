//! Framework overview report

use miette::Result;
use std::path::PathBuf;
use tabled::{builder::Builder, settings::Style};

use crate::aggregate::build_element_tree;
use crate::cli::helpers::{open_store, truncate_str, write_output};
use crate::cli::GlobalOpts;

use super::or_dash;

#[derive(clap::Args, Debug)]
pub struct ElementsArgs {
    /// Output to file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Skip elements that have no processes
    #[arg(long)]
    pub non_empty: bool,
}

pub fn run(args: ElementsArgs, global: &GlobalOpts) -> Result<()> {
    let (store, _) = open_store(global)?;
    let mut tree = build_element_tree(&store.rows());
    if args.non_empty {
        tree.retain(|node| !node.processes.is_empty());
    }

    let mut output = String::new();
    output.push_str("# Operational Excellence Framework\n\n");

    for node in &tree {
        output.push_str(&format!("## {}\n\n", node.element.label()));
        if let Some(ref desc) = node.element.description {
            output.push_str(desc);
            output.push_str("\n\n");
        }

        if node.processes.is_empty() {
            output.push_str("_No processes documented._\n\n");
            continue;
        }

        let mut builder = Builder::default();
        builder.push_record(["Number", "Process", "Status", "Mandatory", "Steps", "Measures", "Risk"]);
        for p in &node.processes {
            builder.push_record([
                p.process.process_number.clone(),
                truncate_str(&p.process.name, 40),
                p.process.status.to_string(),
                if p.process.mandatory { "yes" } else { "no" }.to_string(),
                p.steps.len().to_string(),
                p.measures.len().to_string(),
                or_dash(p.process.risk.level().map(|l| l.to_string())),
            ]);
        }
        output.push_str(&builder.build().with(Style::markdown()).to_string());
        output.push_str("\n\n");
    }

    output.push_str("## Summary\n\n");
    output.push_str(&format!("- **Elements:** {}\n", tree.len()));
    output.push_str(&format!(
        "- **Processes:** {}\n",
        tree.iter().map(|n| n.process_count()).sum::<usize>()
    ));
    output.push_str(&format!(
        "- **Steps:** {}\n",
        tree.iter().map(|n| n.step_count()).sum::<usize>()
    ));
    output.push_str(&format!(
        "- **Measures:** {}\n",
        tree.iter().map(|n| n.measure_count()).sum::<usize>()
    ));

    write_output(&output, args.output)
}
