//! `oex report` command - Generate markdown reports

mod elements;
mod goals;
mod risk;
mod scorecard;

use clap::Subcommand;
use miette::Result;

use crate::cli::GlobalOpts;

pub use elements::ElementsArgs;
pub use goals::GoalsArgs;
pub use risk::RiskArgs;
pub use scorecard::ScorecardReportArgs;

#[derive(Subcommand, Debug)]
pub enum ReportCommands {
    /// Elements with their processes, step and measure counts
    Elements(ElementsArgs),

    /// Strategic goals with progress and supporting processes
    Goals(GoalsArgs),

    /// Process risk register sorted by score
    Risk(RiskArgs),

    /// Scorecard category coverage per element
    Scorecard(ScorecardReportArgs),
}

pub fn run(cmd: ReportCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ReportCommands::Elements(args) => elements::run(args, global),
        ReportCommands::Goals(args) => goals::run(args, global),
        ReportCommands::Risk(args) => risk::run(args, global),
        ReportCommands::Scorecard(args) => scorecard::run(args, global),
    }
}

// Shared helper functions

/// "-" for missing values
pub(crate) fn or_dash(value: Option<String>) -> String {
    value.unwrap_or_else(|| "-".to_string())
}
