// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # visionlink-observability
//!
//! Logging infrastructure shared by the visionlink crates.
//!
//! Provides consistent `tracing` subscriber setup with per-crate debug flag support.
//! Library crates only emit events; binaries call one of the `init_*` functions once.
//!
//! ## Features
//! - `file-logging`: per-run JSON log files with retention (desktop only)

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod config;
pub mod init;

// Re-export commonly used items
pub use cli::*;
pub use config::*;
pub use init::*;

/// Known visionlink crate names for debug flags
pub const KNOWN_CRATES: &[&str] = &[
    "visionlink",
    "visionlink-hal",
    "visionlink-recognition",
    "visionlink-config",
    "visionlink-observability",
];
