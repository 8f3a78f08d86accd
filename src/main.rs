use anyhow::Result;
use clap::Parser;
use retread::cli::{AppContext, Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // RETREAD_LOG=debug turns on engine tracing; silent by default
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("RETREAD_LOG").unwrap_or_else(|_| EnvFilter::new("error")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Build a context once, pass everywhere
    let ctx = AppContext {
        quiet: cli.quiet,
        no_color: cli.no_color,
        dry_run: cli.dry_run,
    };

    match cli.command {
        Commands::Align(args) => retread::core::aligner::run(args, &ctx),
        Commands::Leverage(args) => retread::core::leverage::run(args, &ctx),
        Commands::Init(args) => retread::infra::config::init(args, &ctx),
        Commands::Completions(args) => retread::completion::run(args),
    }
}
