//! Scorecard coverage report

use miette::Result;
use std::path::PathBuf;
use tabled::{builder::Builder, settings::Style};

use crate::aggregate::{by_element, measure_rows, Scorecard};
use crate::cli::helpers::{open_store, write_output};
use crate::cli::GlobalOpts;
use crate::core::ScorecardCategory;

#[derive(clap::Args, Debug)]
pub struct ScorecardReportArgs {
    /// Output to file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

pub fn run(args: ScorecardReportArgs, global: &GlobalOpts) -> Result<()> {
    let (store, _) = open_store(global)?;
    let rows = measure_rows(&store.rows());
    let card = Scorecard::from_rows(&rows);

    let mut output = String::new();
    output.push_str("# Balanced Scorecard Report\n\n");

    let mut builder = Builder::default();
    builder.push_record(["Category", "Processes", "Measures"]);
    for group in &card.categories {
        builder.push_record([
            group.category.to_string(),
            group.count.to_string(),
            group.measures.len().to_string(),
        ]);
    }
    output.push_str(&builder.build().with(Style::markdown()).to_string());
    output.push_str("\n\n");

    let cards = by_element(&rows);
    if !cards.is_empty() {
        output.push_str("## Processes per Element\n\n");
        let mut builder = Builder::default();
        let mut header = vec!["Element".to_string()];
        header.extend(ScorecardCategory::FIXED.iter().map(|c| c.to_string()));
        builder.push_record(header);
        for element in &cards {
            let mut record = vec![format!("{}. {}", element.element_number, element.element_title)];
            record.extend(
                ScorecardCategory::FIXED
                    .iter()
                    .map(|c| element.scorecard.count(c).to_string()),
            );
            builder.push_record(record);
        }
        output.push_str(&builder.build().with(Style::markdown()).to_string());
        output.push_str("\n\n");

        let gaps: Vec<_> = cards
            .iter()
            .filter(|e| {
                ScorecardCategory::FIXED
                    .iter()
                    .any(|c| e.scorecard.count(c) == 0)
            })
            .collect();
        if !gaps.is_empty() {
            output.push_str("## Coverage Gaps\n\n");
            for element in gaps {
                let missing: Vec<String> = ScorecardCategory::FIXED
                    .iter()
                    .filter(|c| element.scorecard.count(c) == 0)
                    .map(|c| c.to_string())
                    .collect();
                output.push_str(&format!(
                    "- **{}. {}**: {}\n",
                    element.element_number,
                    element.element_title,
                    missing.join(", ")
                ));
            }
            output.push('\n');
        }
    }

    output.push_str("## Summary\n\n");
    output.push_str(&format!("- **Measures:** {}\n", rows.len()));
    let categorized: usize = card.categories.iter().map(|g| g.measures.len()).sum();
    output.push_str(&format!("- **Categorized:** {}\n", categorized));
    output.push_str(&format!("- **Other categories:** {}\n", card.other.len()));
    output.push_str(&format!("- **Uncategorized:** {}\n", card.uncategorized.len()));

    write_output(&output, args.output)
}
