//! CLI definitions for setver
//!
//! The clap structure lives here, separate from main.rs, so tests and
//! documentation tooling can build the command without running it.

use std::path::PathBuf;

use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::{Parser, Subcommand};
use clap_complete::Shell as CompletionShell;

/// Build clap styles matching the CLI theme colors.
pub fn build_cli_styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::Green.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::White.on_default())
        .valid(AnsiColor::White.on_default())
        .invalid(AnsiColor::Red.on_default())
        .error(AnsiColor::Red.on_default() | Effects::BOLD)
}

#[derive(Parser)]
#[command(name = "setver")]
#[command(about = "Run version-gated setup actions exactly once per environment")]
#[command(
    long_about = "setver keeps a persisted version number for a deployed site and runs every
configured action whose version is above it, in ascending order, exactly once.

Actions are declared in ~/.config/setver/config.toml:

    [[actions]]
    version = 1
    name = \"activate plugins\"
    command = \"wp\"
    args = [\"plugin\", \"activate\", \"--all\"]

QUICK START:
    setver run                 Run pending actions (use from deploy/bootstrap)
    setver status              Show current version and pending actions
    setver force               Re-run every action, ignoring the version"
)]
#[command(version)]
#[command(styles = build_cli_styles())]
pub struct Cli {
    /// Config file (defaults to ~/.config/setver/config.toml)
    #[arg(long, short, global = true, env = "SETVER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log progress to stderr
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run actions above the stored version
    #[command(long_about = "Run every action whose version is above the stored version,
in ascending order, then store the highest version that ran.

Actions at or below the stored version are skipped, so running this
repeatedly is safe. After the actions, the site defaults (icon and
home page) are applied. Prints nothing on success.

EXAMPLES:
    setver run
    setver --config /srv/site/setver.toml run")]
    Run,

    /// Re-run every action regardless of the stored version
    #[command(long_about = "Run every registered action in ascending order, ignoring the
stored version. The stored version is neither read nor changed.

EXAMPLE:
    setver force

OUTPUT:
    Running: activate plugins
    Running: create menus
    Success: all actions have been triggered.")]
    Force,

    /// Show the stored version and pending actions
    Status,

    /// Delete the stored version
    #[command(long_about = "Delete the stored version entry from the option store.

The next 'setver run' starts from version 0 and runs every action again.")]
    Uninstall {
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completions (internal use)
    #[command(hide = true)]
    Completions {
        /// Shell to generate completions for
        #[arg(long, value_enum)]
        shell: CompletionShell,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,
    /// Print the config file path
    Path,
}
