use clap::Parser;
use tracing_subscriber::EnvFilter;

use resolve_hits::cli;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    // Initialize logging based on verbosity flag
    let filter = if cli.verbose {
        EnvFilter::new("resolve_hits=debug,info")
    } else {
        EnvFilter::new("resolve_hits=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    match cli.command {
        cli::Commands::Resolve(args) => {
            cli::resolve::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Summarize(args) => {
            cli::summarize::run(args, cli.format, cli.verbose)?;
        }
    }

    Ok(())
}
