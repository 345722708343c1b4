//! Version-gated migration driver.
//!
//! A gated run reads the watermark, executes every registered migration with
//! a higher version in ascending order, and persists the highest executed
//! version. A forced run executes everything and leaves the watermark alone.

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use super::action::{Migration, Version};
use super::registry::{Contributor, Registry, RegistryError};
use crate::site::{SiteMaintenance, SiteReport};
use crate::store::{
    clear_watermark, read_watermark, write_watermark, OptionStore, StoreError, StoreLock,
    DEFAULT_VERSION_KEY,
};

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// What happens to the watermark when a migration fails mid-run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Leave the watermark untouched. Migrations that succeeded before the
    /// failure run again on retry.
    AllOrNothing,
    /// Advance the watermark to the last migration that succeeded before the
    /// failure, then stop.
    #[default]
    BestEffort,
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("Migration {version} ({name}) failed, version left at {watermark}")]
    ActionFailed {
        version: Version,
        name: String,
        /// Watermark persisted after the failure.
        watermark: Version,
        #[source]
        source: BoxError,
    },

    #[error("Forced run stopped at migration {version} ({name})")]
    ForcedActionFailed {
        version: Version,
        name: String,
        #[source]
        source: BoxError,
    },
}

/// Outcome of a gated run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Watermark before the run
    pub previous: Version,
    /// Watermark after the run
    pub current: Version,
    /// Versions executed, in order
    pub executed: Vec<Version>,
    /// Versions at or below the previous watermark
    pub skipped: Vec<Version>,
    /// Site maintenance outcome, when configured
    pub site: Option<SiteReport>,
}

impl RunReport {
    /// True if the watermark moved forward.
    pub fn advanced(&self) -> bool {
        self.current > self.previous
    }
}

/// Outcome of a forced run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForceReport {
    pub executed: Vec<Version>,
}

/// Read-only preview of what a gated run would do.
#[derive(Debug, Clone)]
pub struct Plan {
    pub current: Version,
    pub applied: Vec<Migration>,
    pub pending: Vec<Migration>,
}

impl Plan {
    pub fn is_up_to_date(&self) -> bool {
        self.pending.is_empty()
    }

    /// Watermark a fully successful run would leave behind.
    pub fn target(&self) -> Version {
        self.pending
            .last()
            .map(|m| m.version())
            .unwrap_or(self.current)
    }
}

pub struct Engine {
    contributors: Vec<Box<dyn Contributor>>,
    version_key: String,
    policy: FailurePolicy,
    use_lock: bool,
    site: Option<SiteMaintenance>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    pub fn new() -> Self {
        Self {
            contributors: Vec::new(),
            version_key: DEFAULT_VERSION_KEY.to_string(),
            policy: FailurePolicy::default(),
            use_lock: true,
            site: None,
        }
    }

    /// Store key holding the watermark.
    pub fn with_version_key(mut self, key: impl Into<String>) -> Self {
        self.version_key = key.into();
        self
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Whether gated runs take the store lock. On by default.
    pub fn with_lock(mut self, use_lock: bool) -> Self {
        self.use_lock = use_lock;
        self
    }

    /// Maintenance step performed at the end of every successful gated run.
    pub fn with_site(mut self, site: SiteMaintenance) -> Self {
        self.site = Some(site);
        self
    }

    /// Add a registration site.
    pub fn contribute(&mut self, contributor: impl Contributor + 'static) -> &mut Self {
        self.contributors.push(Box::new(contributor));
        self
    }

    pub fn version_key(&self) -> &str {
        &self.version_key
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Build a fresh registry from every contributor.
    pub fn registry(&self) -> Result<Registry, RegistryError> {
        let mut registry = Registry::new();
        for contributor in &self.contributors {
            contributor.contribute(&mut registry)?;
        }
        Ok(registry)
    }

    /// Split registered migrations into applied and pending without running anything.
    pub fn plan<S: OptionStore + ?Sized>(&self, store: &S) -> Result<Plan, EngineError> {
        let current = read_watermark(store, &self.version_key)?;
        let (applied, pending) = self
            .registry()?
            .snapshot()
            .into_iter()
            .partition(|m| m.version() <= current);
        Ok(Plan {
            current,
            applied,
            pending,
        })
    }

    /// Gated run: execute migrations above the watermark, then advance it.
    ///
    /// The store lock is held from the watermark read until the final write.
    /// The watermark is written at most once, and only when it moves forward.
    pub fn run<S: OptionStore + ?Sized>(&self, store: &mut S) -> Result<RunReport, EngineError> {
        let _guard = self.lock(store)?;

        let previous = read_watermark(&*store, &self.version_key)?;
        let registry = self.registry()?;
        debug!(
            version = previous,
            registered = registry.len(),
            "starting gated run"
        );

        let mut report = RunReport {
            previous,
            current: previous,
            ..Default::default()
        };
        let mut reached = previous;

        for migration in registry.snapshot() {
            let version = migration.version();
            if version <= previous {
                debug!(version, name = migration.name(), "already applied, skipping");
                report.skipped.push(version);
                continue;
            }

            debug!(version, name = migration.name(), "running migration");
            if let Err(e) = migration.execute() {
                let watermark = match self.policy {
                    FailurePolicy::AllOrNothing => previous,
                    FailurePolicy::BestEffort => {
                        self.persist(store, previous, reached)?;
                        reached
                    }
                };
                error!(
                    version,
                    name = migration.name(),
                    watermark,
                    error = %format!("{:#}", e),
                    "migration failed, halting run"
                );
                return Err(EngineError::ActionFailed {
                    version,
                    name: migration.name().to_string(),
                    watermark,
                    source: e.into(),
                });
            }

            report.executed.push(version);
            reached = reached.max(version);
        }

        self.persist(store, previous, reached)?;
        report.current = reached;

        if let Some(site) = &self.site {
            report.site = Some(site.apply(store)?);
        }

        Ok(report)
    }

    fn lock<S: OptionStore + ?Sized>(&self, store: &mut S) -> Result<StoreLock, StoreError> {
        if self.use_lock {
            store.lock(&self.version_key)
        } else {
            Ok(StoreLock::noop())
        }
    }

    /// Write `reached` if it is above `previous`. Otherwise the store is not touched.
    fn persist<S: OptionStore + ?Sized>(
        &self,
        store: &mut S,
        previous: Version,
        reached: Version,
    ) -> Result<(), StoreError> {
        if reached > previous {
            write_watermark(store, &self.version_key, reached)?;
            info!(from = previous, to = reached, "version advanced");
        }
        Ok(())
    }

    /// Forced run: execute every registered migration in ascending order,
    /// ignoring and never touching the watermark.
    ///
    /// `on_action` is called before each migration runs.
    pub fn force_all(
        &self,
        mut on_action: impl FnMut(&Migration),
    ) -> Result<ForceReport, EngineError> {
        let registry = self.registry()?;
        let mut report = ForceReport::default();

        for migration in registry.snapshot() {
            on_action(&migration);
            info!(version = migration.version(), name = migration.name(), "forcing migration");
            if let Err(e) = migration.execute() {
                error!(
                    version = migration.version(),
                    name = migration.name(),
                    error = %format!("{:#}", e),
                    "forced migration failed"
                );
                return Err(EngineError::ForcedActionFailed {
                    version: migration.version(),
                    name: migration.name().to_string(),
                    source: e.into(),
                });
            }
            report.executed.push(migration.version());
        }

        Ok(report)
    }

    /// Delete the persisted watermark. Returns whether one existed.
    ///
    /// Takes the same lock as [`Engine::run`], so a run in progress cannot
    /// write the key back after it is gone.
    pub fn uninstall<S: OptionStore + ?Sized>(&self, store: &mut S) -> Result<bool, EngineError> {
        let _guard = self.lock(store)?;
        let removed = clear_watermark(store, &self.version_key)?;
        if removed {
            info!(key = %self.version_key, "version entry removed");
        }
        Ok(removed)
    }
}
