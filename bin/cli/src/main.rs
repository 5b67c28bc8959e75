//! botflow command line entry point.

use botflow_cli::commands;
use botflow_cli::config::CliConfig;
use botflow_cli::error::CliError;
use botflow_cli::{Cli, Command};
use botflow_core::Result;
use clap::Parser;
use std::io::Write as _;

fn main() {
    let cli = Cli::parse();

    let config = match CliConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", CliError::Config { details: e.to_string() });
            std::process::exit(2);
        }
    };

    init_tracing(&config);
    tracing::debug!(?config, "loaded configuration");

    match run(&config, cli.command) {
        Ok(output) => {
            let mut stdout = std::io::stdout().lock();
            if let Err(e) = stdout.write_all(output.as_bytes()) {
                eprintln!("failed to write output: {e}");
                std::process::exit(1);
            }
        }
        Err(report) => {
            eprintln!("{report}");
            std::process::exit(1);
        }
    }
}

fn init_tracing(config: &CliConfig) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(config: &CliConfig, command: Command) -> Result<String, CliError> {
    match command {
        Command::Templates => Ok(commands::list_templates()),
        Command::Palette => Ok(commands::list_palette()),
        Command::New {
            name,
            template,
            out,
        } => commands::new_workflow(config, &name, template.as_deref(), out.as_deref()),
        Command::Validate { path } => commands::validate_file(config, &path),
        Command::Inspect { path } => commands::inspect_file(&path),
    }
}
