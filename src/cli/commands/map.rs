//! `oex map` command - Mind map of the framework

use clap::Subcommand;
use miette::{IntoDiagnostic, Result};

use crate::aggregate::{build_element_tree, build_goal_tree, MindMap};
use crate::cli::helpers::{open_store, resolve_format, write_output};
use crate::cli::{GlobalOpts, OutputFormat};

#[derive(Subcommand, Debug)]
pub enum MapCommands {
    /// Elements and their processes
    Elements(ElementsArgs),

    /// Strategic goals, the processes that serve them, and their measures
    Goals(GoalsArgs),
}

#[derive(clap::Args, Debug)]
pub struct ElementsArgs {
    /// Include steps and measures under each process
    #[arg(long, short = 'c')]
    pub children: bool,

    /// Write to file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<std::path::PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct GoalsArgs {
    /// Write to file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<std::path::PathBuf>,
}

pub fn run(cmd: MapCommands, global: &GlobalOpts) -> Result<()> {
    let (store, config) = open_store(global)?;
    let rows = store.rows();

    let (map, output) = match cmd {
        MapCommands::Elements(args) => (
            MindMap::from_elements(&build_element_tree(&rows), args.children),
            args.output,
        ),
        MapCommands::Goals(args) => (MindMap::from_goals(&build_goal_tree(&rows)), args.output),
    };

    let content = match resolve_format(global, &config, OutputFormat::Auto) {
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(&map).into_diagnostic()?;
            json.push('\n');
            json
        }
        OutputFormat::Yaml => serde_yml::to_string(&map).into_diagnostic()?,
        _ => map.render_tree(),
    };

    write_output(&content, output)
}
