mod cli;
mod commands;
mod config;
mod error;
mod output;

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use tutora_core::{FileStore, Tutora};

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
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Config commands don't touch the platform
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "tutora", &mut std::io::stdout());
            Ok(())
        }

        cmd => {
            let cfg = tutora_config::load_config_or_default();
            let resolved = config::resolve(&cli.global, &cfg)?;

            let store = FileStore::open(&resolved.state_file)?;
            let app = Tutora::new(&resolved.client, Arc::new(store))?;
            let phase = app.restore_session().await;

            tracing::debug!(
                profile = %resolved.name,
                %phase,
                command = ?cmd,
                "dispatching command"
            );
            commands::dispatch(cmd, &app, &resolved, &cli.global).await
        }
    }
}
