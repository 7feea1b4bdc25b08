//! Shared types, error model, and configuration for paramexport.
//!
//! This crate is the foundation depended on by all other paramexport crates.
//! It provides:
//! - [`ExportError`] — the unified error type
//! - The canonical output schema ([`Schema`], [`Pipeline`], [`ParameterGroup`],
//!   [`ParameterConfig`])
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod error;
pub mod schema;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, BUILTIN_EXCLUDE_MARKERS, ExportSettings, JenkinsConfig, config_dir,
    config_file_path, init_config, load_config, load_config_from, resolve_token,
};
pub use error::{ExportError, Result};
pub use schema::{ParameterConfig, ParameterGroup, Pipeline, Schema};
