// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # visionlink
//!
//! Polling state machine for a vision co-processor running a sample recognition
//! application: a one-time initialization handshake, bounded recognition sessions, and
//! decoding of the numeric result payload.
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! visionlink = "0.1"
//! ```
//!
//! ```rust,no_run
//! use visionlink::prelude::*;
//!
//! let config = load_config(None, None)?;
//! let link: Option<ScriptedVisionLink> = Some(ScriptedVisionLink::new());
//!
//! let outcome = run_recognition(
//!     link,
//!     StdTimeProvider::new(),
//!     WallClockTimestamps::new(),
//!     RecognitionSettings::from_config(&config),
//!     AllianceSelector::Blue,
//!     &CancellationToken::new(),
//! )?;
//! if outcome.succeeded() {
//!     println!("{:?}", outcome.result());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Crates
//! - **`hal`**: device link and clock traits, std and scripted platforms
//! - **`recognition`**: decoder, handshake, recognition session, coordinator
//! - **`config`**: TOML configuration with environment and CLI overrides
//! - **`observability`**: tracing subscriber setup and per-crate debug flags

pub use visionlink_config as config;
pub use visionlink_hal as hal;
pub use visionlink_observability as observability;
pub use visionlink_recognition as recognition;

pub mod replay;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Convenient re-exports for common use cases
pub mod prelude {
    pub use visionlink_config::{load_config, VisionLinkConfig};
    pub use visionlink_hal::platforms::{ManualTimeProvider, ScriptedVisionLink, StdTimeProvider};
    pub use visionlink_hal::{DeviceStatus, RawResult, TimeProvider, VisionLink};
    pub use visionlink_recognition::prelude::*;

    pub use crate::replay::{replay_script, ReplayOptions};
}
