//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    completions::CompletionsArgs,
    doc::DocCommands,
    element::ElementCommands,
    export::ExportCommands,
    goal::GoalCommands,
    import::ImportCommands,
    init::InitArgs,
    kpi::KpiCommands,
    log::LogArgs,
    map::MapCommands,
    proc::ProcCommands,
    report::ReportCommands,
    scorecard::ScorecardArgs,
    status::StatusArgs,
    step::StepCommands,
    validate::ValidateArgs,
};

#[derive(Parser)]
#[command(name = "oex")]
#[command(author, version, about = "Operational Excellence framework toolkit")]
#[command(long_about = "Manage framework elements, processes, KPIs and strategic goals as plain text files, with mind maps, scorecards and paginated exports.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(long, short = 'v', global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Project root (default: auto-detect by finding .oex/)
    #[arg(long, global = true)]
    pub project: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new OEX project
    Init(InitArgs),

    /// Framework element management
    #[command(subcommand)]
    Element(ElementCommands),

    /// Process management
    #[command(subcommand)]
    Proc(ProcCommands),

    /// Process steps and decision outcomes
    #[command(subcommand)]
    Step(StepCommands),

    /// Performance measure (KPI) management
    #[command(subcommand)]
    Kpi(KpiCommands),

    /// Strategic goal management
    #[command(subcommand)]
    Goal(GoalCommands),

    /// Process document versions and attachments
    #[command(subcommand)]
    Doc(DocCommands),

    /// Mind map of the framework (tree text or JSON graph)
    #[command(subcommand)]
    Map(MapCommands),

    /// Balanced-scorecard roll-up of performance measures
    Scorecard(ScorecardArgs),

    /// Generate markdown reports
    #[command(subcommand)]
    Report(ReportCommands),

    /// Paginated document export
    #[command(subcommand)]
    Export(ExportCommands),

    /// Import records from CSV files
    #[command(subcommand)]
    Import(ImportCommands),

    /// Show recent activity
    Log(LogArgs),

    /// Show project status dashboard
    Status(StatusArgs),

    /// Check project integrity
    Validate(ValidateArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Automatically detect based on context (yaml for show, tsv for list)
    #[default]
    Auto,
    /// YAML format (full fidelity)
    Yaml,
    /// Tab-separated values (for piping)
    Tsv,
    /// JSON format (for programming)
    Json,
    /// CSV format (for spreadsheets)
    Csv,
    /// Markdown tables
    Md,
    /// Just IDs, one per line
    Id,
}
