//! Provider resolution for orca
//!
//! Given a [`ResolvedEnvironment`](orca_config::ResolvedEnvironment), resolves
//! each configured provider through its plugin:
//!
//! 1. Discover dependencies (plugin-declared and template-referenced).
//! 2. Resolve templates against the dependencies' outputs.
//! 3. Validate, configure, then re-validate against the plugin's schema and
//!    every base plugin's schema.
//! 4. Check the environment status and prepare it when needed.
//!
//! Each provider is resolved at most once per run; see [`ResolutionMemo`].

pub mod builtin;
pub mod context;
pub mod error;
pub mod memo;
pub mod plugin;
pub mod provider;
pub mod registry;
pub mod resolver;
pub mod task;

pub use builtin::{ContainerPlugin, ExecPlugin, builtin_plugins};
pub use context::ResolutionContext;
pub use error::{Error, ErrorKind, Result};
pub use memo::ResolutionMemo;
pub use plugin::{
    ConfigureProviderParams, ConfigureProviderResult, DashboardPage, EnvironmentStatus,
    EnvironmentStatusParams, Plugin, PrepareEnvironmentParams, PrepareEnvironmentResult,
};
pub use provider::Provider;
pub use registry::PluginRegistry;
pub use resolver::ProviderResolver;
pub use task::ResolveProviderTask;
