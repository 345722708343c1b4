//! setver - CLI entry point

mod commands;

use anyhow::Result;
use clap::Parser;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use setver::cli::{Cli, Commands, ConfigCommands};
use setver::Config;

/// Install the stderr log subscriber. `SETVER_LOG` takes precedence over
/// `RUST_LOG`; without either, only warnings are shown unless `--verbose`.
fn init_logging(verbose: bool) {
    let default = if verbose {
        LevelFilter::INFO
    } else {
        LevelFilter::WARN
    };
    let filter = EnvFilter::builder()
        .with_default_directive(default.into())
        .with_env_var(if std::env::var_os("SETVER_LOG").is_some() {
            "SETVER_LOG"
        } else {
            EnvFilter::DEFAULT_ENV
        })
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(atty::is(atty::Stream::Stderr) && std::env::var_os("NO_COLOR").is_none())
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<Config> {
    match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match &cli.command {
        Commands::Run => commands::run::handle(&load_config(&cli)?),
        Commands::Force => commands::force::handle(&load_config(&cli)?),
        Commands::Status => commands::status::handle(&load_config(&cli)?),
        Commands::Uninstall { yes } => commands::uninstall::handle(&load_config(&cli)?, *yes),
        Commands::Config(cmd) => match cmd {
            ConfigCommands::Show => commands::config::handle_show(&load_config(&cli)?),
            ConfigCommands::Path => {
                let path = match &cli.config {
                    Some(path) => path.clone(),
                    None => Config::config_path()?,
                };
                commands::config::handle_path(&path)
            }
        },
        Commands::Completions { shell } => commands::completions::handle::<Cli>(*shell),
    }
}
