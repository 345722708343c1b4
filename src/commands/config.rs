//! Config subcommands handler

use anyhow::Result;
use std::path::Path;

use setver::theme::current_theme;
use setver::Config;

/// Show the effective configuration as TOML.
pub fn handle_show(config: &Config) -> Result<()> {
    let theme = current_theme();
    let toml_str = toml::to_string_pretty(config)?;
    println!("{}", theme.primary_text(toml_str.trim_end()));
    Ok(())
}

/// Print the path of the config file in use.
pub fn handle_path(path: &Path) -> Result<()> {
    println!("{}", path.display());
    Ok(())
}
