//! Project and environment configuration for orca
//!
//! This crate turns a raw project document into one environment's merged
//! configuration:
//!
//! ```text
//!   raw document ──resolve_project_config──▶ ProjectConfig
//!                                                │
//!   selector ─────────pick_environment───────────┤
//!                                                ▼
//!                               ResolvedEnvironment { variables, providers }
//! ```
//!
//! Variables are layered from four sources (lowest precedence first): the
//! project's `variables`, the project varfile, the environment's
//! `variables`, and the environment varfile. Provider fragments sharing a
//! name are combined with JSON Merge Patch.
//!
//! # Example
//!
//! ```
//! use orca_config::{LocalContext, pick_environment, resolve_project_config};
//! use orca_fs::NormalizedPath;
//! use serde_json::json;
//!
//! let raw = json!({
//!     "name": "demo",
//!     "environments": [{"name": "dev"}],
//!     "variables": {"replicas": 1},
//! });
//! let project = resolve_project_config(
//!     &raw,
//!     &NormalizedPath::new("/nonexistent/demo"),
//!     &LocalContext::default(),
//! )
//! .unwrap();
//! let env = pick_environment(&project, "dev").unwrap();
//! assert_eq!(env.variables["replicas"], json!(1));
//! ```

pub mod environment;
pub mod error;
pub mod patch;
pub mod project;
pub mod resolver;
pub mod schema;
pub mod template;
pub mod value;
pub mod varfile;

pub use environment::{
    EnvironmentSelector, ResolvedEnvironment, is_valid_name, parse_environment, pick_environment,
    pick_environment_with_overrides,
};
pub use error::{Error, Result};
pub use patch::{BUILTIN_PROVIDERS, merge_provider_configs};
pub use project::{
    DEFAULT_ENVIRONMENT_NAME, DEFAULT_PROJECT_VARFILE, EnvironmentConfig, Namespacing, OutputSpec,
    ProjectConfig, ProviderConfig, SourceConfig, default_environment_varfile,
};
pub use resolver::resolve_project_config;
pub use schema::{ConfigSchema, Field, FieldType};
pub use template::{LocalContext, TemplateContext, referenced_providers};
pub use value::{ArrayMerge, MergeOptions, Variables, merge, merge_patch, merge_variables};
pub use varfile::load_varfile;
