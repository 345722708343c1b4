//! Configuration type definitions and defaults

use serde::{Deserialize, Serialize};

use crate::migration::{FailurePolicy, Version};
use crate::site::PageId;
use crate::store::DEFAULT_VERSION_KEY;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub site: SiteConfig,
    /// Command actions, one per migration version
    #[serde(default)]
    pub actions: Vec<ActionConfig>,
}

/// Where the watermark and site options are persisted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Path to the TOML option store
    #[serde(default = "default_store_path")]
    pub path: String,
    /// Option key holding the current version
    #[serde(default = "default_version_key")]
    pub key: String,
}

pub fn default_store_path() -> String {
    "~/.local/share/setver/options.toml".to_string()
}

pub fn default_version_key() -> String {
    DEFAULT_VERSION_KEY.to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
            key: default_version_key(),
        }
    }
}

/// Engine behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// "best-effort" or "all-or-nothing"
    #[serde(default)]
    pub failure_policy: FailurePolicy,
    /// Take a lock file around gated runs
    #[serde(default = "default_lock")]
    pub lock: bool,
}

pub fn default_lock() -> bool {
    true
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            failure_policy: FailurePolicy::default(),
            lock: default_lock(),
        }
    }
}

/// Site defaults enforced after each gated run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    #[serde(default = "default_site_enabled")]
    pub enabled: bool,
    /// Default icon uploaded when the site has none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Directory uploaded assets are copied into
    #[serde(default = "default_uploads")]
    pub uploads: String,
    /// Landing page to pin (falls back to the `home__page_id` option)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home_page_id: Option<PageId>,
}

pub fn default_site_enabled() -> bool {
    true
}

pub fn default_uploads() -> String {
    "~/.local/share/setver/uploads".to_string()
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            enabled: default_site_enabled(),
            icon: None,
            uploads: default_uploads(),
            home_page_id: None,
        }
    }
}

/// An external command bound to a migration version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionConfig {
    pub version: Version,
    /// Display name (defaults to the command)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Program to execute
    pub command: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
    /// Working directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
}

impl ActionConfig {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.command)
    }
}
