mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use staylink_core::Marketplace;

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Local-only commands never touch the backend
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),
        Command::Catalog(args) => commands::catalog::handle(args, &cli.global),
        Command::Schedule(args) => commands::schedule::handle(args, &cli.global),

        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "staylink", &mut std::io::stdout());
            Ok(())
        }

        cmd => {
            let marketplace = Marketplace::new(config::build_marketplace_config(&cli.global)?)?;

            // Ctrl-C abandons in-flight requests; handlers still persist state.
            let interrupt = marketplace.clone();
            let watcher = tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::warn!("interrupted; cancelling in-flight requests");
                    interrupt.shutdown();
                }
            });

            tracing::debug!(command = ?cmd, "dispatching command");
            let result = commands::dispatch(cmd, &marketplace, &cli.global).await;
            watcher.abort();
            marketplace.shutdown();
            result
        }
    }
}
