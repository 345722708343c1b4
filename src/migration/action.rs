//! Version-tagged units of one-time setup work.

use std::fmt;
use std::sync::Arc;

/// Migration version. Doubles as registry key and persisted watermark.
pub type Version = u64;

/// A zero-argument, side-effecting unit of work.
///
/// Actions signal failure through `Err`. The engine never re-runs an action
/// whose version is at or below the watermark, so actions need not guard
/// against repeated invocation themselves.
pub trait Action {
    fn execute(&self) -> anyhow::Result<()>;
}

impl<F> Action for F
where
    F: Fn() -> anyhow::Result<()>,
{
    fn execute(&self) -> anyhow::Result<()> {
        self()
    }
}

/// A registered action bound to its version.
#[derive(Clone)]
pub struct Migration {
    version: Version,
    name: String,
    action: Arc<dyn Action>,
}

impl Migration {
    /// Bind `action` to `version`, named `v<version>`.
    pub fn new(version: Version, action: impl Action + 'static) -> Self {
        Self::named(version, format!("v{}", version), action)
    }

    pub fn named(version: Version, name: impl Into<String>, action: impl Action + 'static) -> Self {
        Self {
            version,
            name: name.into(),
            action: Arc::new(action),
        }
    }

    pub fn version(&self) -> Version {
        self.version
    }

    /// Display name, used by the forced run's progress output.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn execute(&self) -> anyhow::Result<()> {
        self.action.execute()
    }
}

impl fmt::Debug for Migration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Migration")
            .field("version", &self.version)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
