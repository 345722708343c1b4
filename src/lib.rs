//! setver
//!
//! Runs version-gated setup actions exactly once per environment. A
//! persisted version number in an option store records how far a site has
//! been migrated; each run executes the registered actions above it in
//! ascending order and advances it.

pub mod cli;
pub mod config;
pub mod files;
pub mod migration;
pub mod site;
pub mod store;
pub mod theme;

pub use config::{CommandAction, Config};
pub use migration::{
    Action, Contributor, Engine, EngineError, FailurePolicy, ForceReport, Migration, Plan,
    Registry, RegistryError, RunReport, Version,
};
pub use site::{AssetUploader, SiteMaintenance, SiteReport, UploadDir};
pub use store::{FileStore, MemoryStore, OptionStore, StoreError};
