//! Filesystem helpers for orca
//!
//! Provides normalized path handling and format-agnostic loading of
//! project documents and varfiles.

pub mod config;
pub mod error;
pub mod path;

pub use config::{ConfigStore, Format};
pub use error::{Error, Result};
pub use path::NormalizedPath;
