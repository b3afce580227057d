// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # visionlink-config
//!
//! Pipeline slots and time budgets for the vision link, read from `visionlink.toml`.
//!
//! Precedence, lowest first: built-in defaults, the TOML file, `VISIONLINK_*` environment
//! variables, explicit CLI overrides. The merged result is validated before it is returned.
//!
//! ```rust,no_run
//! use visionlink_config::load_config;
//!
//! let config = load_config(None, None)?;
//! println!(
//!     "idle pipeline {}, recognition deadline {} ms",
//!     config.pipelines.idle, config.timing.recognition_timeout_ms
//! );
//! # Ok::<(), visionlink_config::ConfigError>(())
//! ```
//!
//! An empty file is valid: handshake 1000 ms, recognition 1000 ms, settle delay 500 ms.

use std::path::PathBuf;

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod loader;
pub mod types;
pub mod validation;

pub use loader::{apply_cli_overrides, apply_environment_overrides, find_config_file, load_config};
pub use types::*;
pub use validation::{validate_config, ConfigValidationError};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found. Searched: {0}")]
    FileNotFound(String),

    #[error("Failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid TOML in {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    /// One or more fields out of range; the message lists every problem found
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;
