//! Versioned, run-once migrations.
//!
//! - [`Registry`] collects `(version, action)` pairs from any number of
//!   [`Contributor`]s
//! - [`Engine`] runs the ones above the persisted watermark and advances it

mod action;
mod engine;
mod registry;

pub use action::{Action, Migration, Version};
pub use engine::{Engine, EngineError, FailurePolicy, ForceReport, Plan, RunReport};
pub use registry::{Contributor, Registry, RegistryError};
