use clap::Parser;
use miette::Result;
use oex::cli::{Cli, Commands};
use oex::cli::commands::{
    completions, doc, element, export, goal, import, init, kpi, log, map, proc, report, scorecard,
    status, step, validate,
};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Reset SIGPIPE so piping into `head` or `grep -q` exits quietly
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }

    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;

    init_tracing(global.verbose);

    match cli.command {
        Commands::Init(args) => init::run(args, &global),
        Commands::Element(cmd) => element::run(cmd, &global),
        Commands::Proc(cmd) => proc::run(cmd, &global),
        Commands::Step(cmd) => step::run(cmd, &global),
        Commands::Kpi(cmd) => kpi::run(cmd, &global),
        Commands::Goal(cmd) => goal::run(cmd, &global),
        Commands::Doc(cmd) => doc::run(cmd, &global),
        Commands::Map(cmd) => map::run(cmd, &global),
        Commands::Scorecard(args) => scorecard::run(args, &global),
        Commands::Report(cmd) => report::run(cmd, &global),
        Commands::Export(cmd) => export::run(cmd, &global),
        Commands::Import(cmd) => import::run(cmd, &global),
        Commands::Log(args) => log::run(args, &global),
        Commands::Status(args) => status::run(args, &global),
        Commands::Validate(args) => validate::run(args, &global),
        Commands::Completions(args) => completions::run(args),
    }
}

/// Log to stderr; `-v` raises the level, RUST_LOG overrides it
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(format!("oex={}", level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}
