use clap::Parser;
use tracing_subscriber::EnvFilter;

use pkg_matcher::{cli, web};

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    // Initialize logging based on verbosity flag
    let filter = if cli.verbose {
        EnvFilter::new("pkg_matcher=debug,info")
    } else {
        EnvFilter::new("pkg_matcher=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        cli::Commands::Match(args) => {
            cli::exact::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Batch(args) => {
            cli::batch::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::WhereUsed(args) => {
            cli::where_used::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Catalog(args) => {
            cli::catalog::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Serve(args) => {
            web::server::run(args)?;
        }
    }

    Ok(())
}
