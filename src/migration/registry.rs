//! Version-keyed action registry.
//!
//! Contributors register `(version, action)` pairs without coordinating on
//! order. The registry keeps entries keyed by version, so snapshots come out
//! ascending regardless of registration order.

use std::collections::BTreeMap;

use tracing::warn;

use super::action::{Action, Migration, Version};

/// Errors raised while building a registry.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Version {version} is already registered by '{existing}' (rejected '{rejected}')")]
    DuplicateVersion {
        version: Version,
        existing: String,
        rejected: String,
    },
}

/// In-memory collection of registered migrations for one invocation.
#[derive(Debug, Default, Clone)]
pub struct Registry {
    entries: BTreeMap<Version, Migration>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `action` to `version`. The last registration for a version wins.
    ///
    /// Returns the displaced migration, if any.
    pub fn register(&mut self, version: Version, action: impl Action + 'static) -> Option<Migration> {
        self.insert(Migration::new(version, action))
    }

    /// Same as [`Registry::register`] with an explicit display name.
    pub fn register_named(
        &mut self,
        version: Version,
        name: impl Into<String>,
        action: impl Action + 'static,
    ) -> Option<Migration> {
        self.insert(Migration::named(version, name, action))
    }

    /// Insert a prepared migration, replacing any entry with the same version.
    pub fn insert(&mut self, migration: Migration) -> Option<Migration> {
        let version = migration.version();
        let name = migration.name().to_string();
        let previous = self.entries.insert(version, migration);
        if let Some(ref old) = previous {
            warn!(
                version,
                replaced = old.name(),
                by = %name,
                "migration version registered twice, keeping the later one"
            );
        }
        previous
    }

    /// Fail-fast variant of [`Registry::insert`]: a second registration for
    /// the same version is rejected and the registry is left unchanged.
    pub fn register_unique(&mut self, migration: Migration) -> Result<(), RegistryError> {
        if let Some(existing) = self.entries.get(&migration.version()) {
            return Err(RegistryError::DuplicateVersion {
                version: migration.version(),
                existing: existing.name().to_string(),
                rejected: migration.name().to_string(),
            });
        }
        self.entries.insert(migration.version(), migration);
        Ok(())
    }

    /// All registered migrations, ascending by version.
    ///
    /// Each call returns an independent sequence reflecting the current state.
    pub fn snapshot(&self) -> Vec<Migration> {
        self.entries.values().cloned().collect()
    }

    /// Registered versions, ascending.
    pub fn versions(&self) -> Vec<Version> {
        self.entries.keys().copied().collect()
    }

    pub fn get(&self, version: Version) -> Option<&Migration> {
        self.entries.get(&version)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A registration site. The engine asks every contributor to fill a fresh
/// registry once per invocation.
pub trait Contributor {
    fn contribute(&self, registry: &mut Registry) -> Result<(), RegistryError>;
}

impl<F> Contributor for F
where
    F: Fn(&mut Registry) -> Result<(), RegistryError>,
{
    fn contribute(&self, registry: &mut Registry) -> Result<(), RegistryError> {
        self(registry)
    }
}
