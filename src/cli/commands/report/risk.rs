//! Process risk register report

use miette::Result;
use std::path::PathBuf;
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::{open_store, truncate_str, write_output};
use crate::cli::GlobalOpts;
use crate::core::natural_cmp;
use crate::entities::RiskLevel;

use super::or_dash;

#[derive(clap::Args, Debug)]
pub struct RiskArgs {
    /// Output to file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Only include processes at or above this score (1-9)
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=9))]
    pub min_score: Option<u8>,
}

pub fn run(args: RiskArgs, global: &GlobalOpts) -> Result<()> {
    let (store, _) = open_store(global)?;
    let processes = store.processes();

    let mut scored: Vec<_> = processes
        .iter()
        .filter_map(|p| p.risk.score().map(|s| (s, p)))
        .filter(|(s, _)| args.min_score.map_or(true, |min| *s >= min))
        .collect();
    scored.sort_by(|(a, pa), (b, pb)| {
        b.cmp(a)
            .then_with(|| natural_cmp(&pa.process_number, &pb.process_number))
    });

    let partial = processes
        .iter()
        .filter(|p| p.risk.is_assessed() && p.risk.score().is_none())
        .count();
    let unassessed = processes.iter().filter(|p| !p.risk.is_assessed()).count();

    let mut output = String::new();
    output.push_str("# Process Risk Register\n\n");

    if scored.is_empty() {
        output.push_str("_No scored risks._\n\n");
    } else {
        let mut builder = Builder::default();
        builder.push_record([
            "Process", "Name", "Frequency", "Impact", "Score", "Level", "Risk", "Mitigation",
        ]);
        for (score, p) in &scored {
            builder.push_record([
                p.process_number.clone(),
                truncate_str(&p.name, 30),
                or_dash(p.risk.frequency.map(|f| f.to_string())),
                or_dash(p.risk.impact.map(|i| i.to_string())),
                score.to_string(),
                or_dash(p.risk.level().map(|l| l.to_string())),
                or_dash(p.risk.description.as_deref().map(|d| truncate_str(d, 40))),
                or_dash(p.risk.mitigation.as_deref().map(|m| truncate_str(m, 40))),
            ]);
        }
        output.push_str(&builder.build().with(Style::markdown()).to_string());
        output.push_str("\n\n");
    }

    let count_level = |level: RiskLevel| {
        scored
            .iter()
            .filter(|(_, p)| p.risk.level() == Some(level))
            .count()
    };

    output.push_str("## Summary\n\n");
    output.push_str(&format!("- **Scored:** {}\n", scored.len()));
    output.push_str(&format!("  - High: {}\n", count_level(RiskLevel::High)));
    output.push_str(&format!("  - Medium: {}\n", count_level(RiskLevel::Medium)));
    output.push_str(&format!("  - Low: {}\n", count_level(RiskLevel::Low)));
    output.push_str(&format!("- **Partially rated:** {}\n", partial));
    output.push_str(&format!("- **Not assessed:** {}\n", unassessed));

    write_output(&output, args.output)
}
