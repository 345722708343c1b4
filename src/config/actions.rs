//! Command actions declared in the config file.

use std::path::PathBuf;
use std::process::Command;

use anyhow::{Context, Result};
use tracing::debug;

use super::types::ActionConfig;
use super::expand_home;
use crate::migration::{Action, Contributor, Migration, Registry, RegistryError};

/// Runs an external program. A non-zero exit status is a failure.
#[derive(Debug, Clone)]
pub struct CommandAction {
    program: String,
    args: Vec<String>,
    dir: Option<PathBuf>,
}

impl CommandAction {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            dir: None,
        }
    }

    pub fn args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = Some(dir.into());
        self
    }

    /// The command line as typed, for messages.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl From<&ActionConfig> for CommandAction {
    fn from(config: &ActionConfig) -> Self {
        let mut action = CommandAction::new(&config.command).args(config.args.iter().cloned());
        if let Some(dir) = &config.dir {
            action = action.current_dir(expand_home(dir));
        }
        action
    }
}

impl Action for CommandAction {
    fn execute(&self) -> Result<()> {
        debug!(command = %self.command_line(), "spawning action command");
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(dir) = &self.dir {
            cmd.current_dir(dir);
        }

        let status = cmd
            .status()
            .with_context(|| format!("Failed to start '{}'", self.command_line()))?;
        if !status.success() {
            anyhow::bail!("'{}' exited with {}", self.command_line(), status);
        }
        Ok(())
    }
}

/// Registers every `[[actions]]` entry. Duplicate versions are rejected.
#[derive(Debug, Clone, Default)]
pub struct ConfigActions {
    actions: Vec<ActionConfig>,
}

impl ConfigActions {
    pub fn new(actions: Vec<ActionConfig>) -> Self {
        Self { actions }
    }
}

impl Contributor for ConfigActions {
    fn contribute(&self, registry: &mut Registry) -> Result<(), RegistryError> {
        for config in &self.actions {
            registry.register_unique(Migration::named(
                config.version,
                config.display_name(),
                CommandAction::from(config),
            ))?;
        }
        Ok(())
    }
}
