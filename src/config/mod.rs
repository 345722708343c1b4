//! Configuration management for setver

mod actions;
mod io;
mod types;

pub use actions::{CommandAction, ConfigActions};
pub use types::*;

use anyhow::Result;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::migration::Engine;
use crate::site::{SiteMaintenance, UploadDir};
use crate::store::FileStore;

/// Expand a leading `~/` to the home directory.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

impl Config {
    /// Get the config file path (~/.config/setver/config.toml)
    pub fn config_path() -> Result<PathBuf> {
        io::config_path()
    }

    /// Get the config directory path (~/.config/setver)
    pub fn config_dir() -> Result<PathBuf> {
        io::config_dir()
    }

    /// Load configuration from file, or return defaults if not found
    pub fn load() -> Result<Self> {
        io::load()
    }

    /// Load configuration from an explicit file, which must exist
    pub fn load_from(path: &Path) -> Result<Self> {
        io::load_from(path)
    }

    /// Parse configuration text
    pub fn parse(contents: &str) -> Result<Self> {
        io::parse(contents)
    }

    /// Save configuration to `path`
    pub fn save(&self, path: &Path) -> Result<()> {
        io::save(self, path)
    }

    /// Check values that serde cannot.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.store.key.trim().is_empty() {
            return Err("store.key must not be empty".to_string());
        }
        let mut seen = BTreeSet::new();
        for action in &self.actions {
            if action.command.trim().is_empty() {
                return Err(format!("action {} has an empty command", action.version));
            }
            if !seen.insert(action.version) {
                return Err(format!(
                    "action version {} is declared more than once",
                    action.version
                ));
            }
        }
        Ok(())
    }

    /// Expanded path of the option store
    pub fn store_path(&self) -> PathBuf {
        expand_home(&self.store.path)
    }

    /// Expanded uploads directory
    pub fn uploads_dir(&self) -> PathBuf {
        expand_home(&self.site.uploads)
    }

    /// Expanded default icon path, if configured
    pub fn icon_path(&self) -> Option<PathBuf> {
        self.site.icon.as_deref().map(expand_home)
    }

    /// Open the configured option store
    pub fn open_store(&self) -> FileStore {
        FileStore::new(self.store_path())
    }

    /// Site maintenance step, or `None` when disabled
    pub fn site_maintenance(&self) -> Option<SiteMaintenance> {
        if !self.site.enabled {
            return None;
        }
        let mut site = SiteMaintenance::new(UploadDir::new(self.uploads_dir()));
        if let Some(icon) = self.icon_path() {
            site = site.with_icon(icon);
        }
        if let Some(page) = self.site.home_page_id {
            site = site.with_home_page(page);
        }
        Some(site)
    }

    /// Build an engine wired to the config-defined actions
    pub fn engine(&self) -> Engine {
        let mut engine = Engine::new()
            .with_version_key(self.store.key.clone())
            .with_policy(self.engine.failure_policy)
            .with_lock(self.engine.lock);
        if let Some(site) = self.site_maintenance() {
            engine = engine.with_site(site);
        }
        engine.contribute(ConfigActions::new(self.actions.clone()));
        engine
    }
}
