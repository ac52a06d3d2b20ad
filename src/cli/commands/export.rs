//! `oex export` command - Paginated document export

use clap::{Subcommand, ValueEnum};
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;

use crate::aggregate::{build_element_tree, build_goal_tree, ElementNode, GoalNode};
use crate::cli::helpers::{open_store, write_output};
use crate::cli::GlobalOpts;
use crate::export::{csv as csv_export, render_document, ExportBlock, ExportFormatter, ExportSource};

#[derive(Subcommand, Debug)]
pub enum ExportCommands {
    /// Elements, their processes, steps and measures
    Elements(ExportArgs),

    /// Strategic goals with the processes and measures serving them
    Goals(ExportArgs),
}

/// What to emit
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum ExportKind {
    /// Plain-text pages separated by form feeds
    #[default]
    Text,
    /// Positioned draw instructions as JSON
    Blocks,
    /// Flat CSV rows, one per process or measure
    Csv,
}

#[derive(clap::Args, Debug)]
pub struct ExportArgs {
    /// Output kind
    #[arg(long = "as", value_enum, default_value_t = ExportKind::Text)]
    pub kind: ExportKind,

    /// Line printed under the document title
    #[arg(long)]
    pub subtitle: Option<String>,

    /// Write to file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

#[derive(serde::Serialize)]
struct BlockDocument<'a> {
    pages: usize,
    blocks: &'a [ExportBlock],
}

enum Tree {
    Elements(Vec<ElementNode>),
    Goals(Vec<GoalNode>),
}

impl Tree {
    fn source(&self) -> ExportSource<'_> {
        match self {
            Tree::Elements(tree) => ExportSource::Elements(tree),
            Tree::Goals(tree) => ExportSource::Goals(tree),
        }
    }
}

pub fn run(cmd: ExportCommands, global: &GlobalOpts) -> Result<()> {
    let (store, config) = open_store(global)?;
    let rows = store.rows();

    let (tree, args) = match cmd {
        ExportCommands::Elements(args) => (Tree::Elements(build_element_tree(&rows)), args),
        ExportCommands::Goals(args) => (Tree::Goals(build_goal_tree(&rows)), args),
    };

    let content = match args.kind {
        ExportKind::Csv => {
            let mut buf = Vec::new();
            match &tree {
                Tree::Elements(tree) => csv_export::write_processes(&mut buf, tree),
                Tree::Goals(tree) => csv_export::write_goal_measures(&mut buf, tree),
            }
            .into_diagnostic()?;
            String::from_utf8(buf).into_diagnostic()?
        }
        kind => {
            let mut formatter = ExportFormatter::new(config.layout())?;
            if let Some(subtitle) = args.subtitle {
                formatter = formatter.with_subtitle(subtitle);
            }
            let blocks = formatter.format(&tree.source())?;
            tracing::debug!(blocks = blocks.len(), "laid out export");

            if kind == ExportKind::Blocks {
                let pages = blocks.iter().map(|b| b.page()).max().unwrap_or(1);
                let doc = BlockDocument {
                    pages,
                    blocks: &blocks,
                };
                let mut json = serde_json::to_string_pretty(&doc).into_diagnostic()?;
                json.push('\n');
                json
            } else {
                render_document(&blocks, formatter.layout())
            }
        }
    };

    write_output(&content, args.output)
}
