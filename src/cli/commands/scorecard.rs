//! `oex scorecard` command - Balanced-scorecard roll-up of measures

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::aggregate::{by_element, measure_rows, MeasureContext, Scorecard};
use crate::cli::helpers::{open_store, print_header, resolve_format};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::export::csv::{write_element_scorecards, write_scorecard};

#[derive(clap::Args, Debug)]
pub struct ScorecardArgs {
    /// Only measures of this element (number or ID)
    #[arg(long, short = 'e')]
    pub element: Option<String>,

    /// One scorecard per element instead of a single roll-up
    #[arg(long, conflicts_with = "element")]
    pub by_element: bool,

    /// List measures with unrecognized or missing categories
    #[arg(long)]
    pub show_other: bool,

    /// List the measures in each category
    #[arg(long, short = 'm')]
    pub measures: bool,
}

pub fn run(args: ScorecardArgs, global: &GlobalOpts) -> Result<()> {
    let (store, config) = open_store(global)?;
    let mut rows = measure_rows(&store.rows());

    if let Some(ref key) = args.element {
        let element = store.find_element(key)?;
        rows.retain(|r| r.element_id == element.id);
    }

    let format = resolve_format(global, &config, OutputFormat::Tsv);

    if args.by_element {
        let cards = by_element(&rows);
        match format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&cards).into_diagnostic()?)
            }
            OutputFormat::Yaml => print!("{}", serde_yml::to_string(&cards).into_diagnostic()?),
            OutputFormat::Csv => {
                write_element_scorecards(std::io::stdout(), &cards).into_diagnostic()?
            }
            OutputFormat::Md => {
                for (i, card) in cards.iter().enumerate() {
                    if i > 0 {
                        println!();
                    }
                    println!("## {}. {}", card.element_number, card.element_title);
                    println!();
                    print_markdown(&card.scorecard);
                }
            }
            _ => {
                if cards.is_empty() {
                    println!("No performance measures recorded.");
                }
                for (i, card) in cards.iter().enumerate() {
                    if i > 0 {
                        println!();
                    }
                    println!(
                        "{}",
                        style(format!("{}. {}", card.element_number, card.element_title)).bold()
                    );
                    print_scorecard(&card.scorecard, &args);
                }
            }
        }
        return Ok(());
    }

    let card = Scorecard::from_rows(&rows);
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&card).into_diagnostic()?),
        OutputFormat::Yaml => print!("{}", serde_yml::to_string(&card).into_diagnostic()?),
        OutputFormat::Csv => write_scorecard(std::io::stdout(), &card).into_diagnostic()?,
        OutputFormat::Md => print_markdown(&card),
        _ => print_scorecard(&card, &args),
    }

    Ok(())
}

fn print_markdown(card: &Scorecard) {
    println!("| Category | Processes | Measures |");
    println!("|---|---|---|");
    for group in &card.categories {
        println!("| {} | {} | {} |", group.category, group.count, group.measures.len());
    }
}

fn print_scorecard(card: &Scorecard, args: &ScorecardArgs) {
    print_header(&[("CATEGORY", 20), ("PROCESSES", 10), ("MEASURES", 9)]);
    for group in &card.categories {
        println!(
            "{:<20} {:<10} {:<9}",
            style(group.category.as_str()).cyan(),
            group.count,
            group.measures.len()
        );
        if args.measures {
            print_measures(&group.measures);
        }
    }

    let hidden = card.other.len() + card.uncategorized.len();
    if args.show_other {
        if !card.other.is_empty() {
            println!();
            println!("{} ({}):", style("Other categories").yellow(), card.other.len());
            for row in &card.other {
                let category = row.category().map_or("", |c| c.as_str());
                println!("  • {} {} [{}]", row.process_number, row.measure.name, category);
            }
        }
        if !card.uncategorized.is_empty() {
            println!();
            println!("{} ({}):", style("Uncategorized").yellow(), card.uncategorized.len());
            print_measures(&card.uncategorized);
        }
    } else if hidden > 0 {
        println!();
        println!(
            "{} measure(s) outside the four categories. Use {} to list them.",
            style(hidden).yellow(),
            style("--show-other").cyan()
        );
    }
}

fn print_measures(rows: &[MeasureContext]) {
    for row in rows {
        println!("    {} {}", style(&row.process_number).dim(), row.measure.name);
    }
}
