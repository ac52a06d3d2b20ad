//! Strategic goal progress report

use miette::Result;
use std::path::PathBuf;
use tabled::{builder::Builder, settings::Style};

use crate::aggregate::build_goal_tree;
use crate::cli::helpers::{open_store, truncate_str, write_output};
use crate::cli::GlobalOpts;

use super::or_dash;

#[derive(clap::Args, Debug)]
pub struct GoalsArgs {
    /// Output to file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// List the supporting processes under each goal
    #[arg(long)]
    pub detailed: bool,
}

pub fn run(args: GoalsArgs, global: &GlobalOpts) -> Result<()> {
    let (store, _) = open_store(global)?;
    let tree = build_goal_tree(&store.rows());

    let mut output = String::new();
    output.push_str("# Strategic Goals Report\n\n");

    let mut builder = Builder::default();
    builder.push_record([
        "Element", "Goal", "Category", "Target", "Current", "Progress", "Processes", "Measures",
    ]);
    for node in &tree {
        let g = &node.goal;
        let unit = g.unit.as_deref().unwrap_or("");
        builder.push_record([
            node.element.element_number.to_string(),
            truncate_str(&g.title, 36),
            g.category.to_string(),
            or_dash(g.target_value.map(|v| format!("{}{}", v, unit))),
            or_dash(g.current_value.map(|v| format!("{}{}", v, unit))),
            or_dash(g.progress().map(|p| format!("{:.0}%", p))),
            node.processes.len().to_string(),
            node.measure_count().to_string(),
        ]);
    }
    output.push_str(&builder.build().with(Style::markdown()).to_string());
    output.push_str("\n");

    if args.detailed {
        for node in &tree {
            output.push_str(&format!("\n## {}\n\n", node.goal.title));
            if node.processes.is_empty() {
                output.push_str("_No linked processes._\n");
                continue;
            }
            for p in &node.processes {
                let measures: Vec<&str> = p.measures.iter().map(|m| m.name.as_str()).collect();
                output.push_str(&format!(
                    "- **{}**: {}\n",
                    p.process.label(),
                    measures.join(", ")
                ));
            }
        }
    }

    let on_track = tree
        .iter()
        .filter(|n| n.goal.progress().is_some_and(|p| p >= 100.0))
        .count();
    let unsupported = tree.iter().filter(|n| n.processes.is_empty()).count();

    output.push_str("\n## Summary\n\n");
    output.push_str(&format!("- **Goals:** {}\n", tree.len()));
    output.push_str(&format!("- **Target reached:** {}\n", on_track));
    output.push_str(&format!("- **Without supporting measures:** {}\n", unsupported));

    write_output(&output, args.output)
}
