// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # visionlink-recognition
//!
//! Polling state machine for a vision co-processor running a sample recognition
//! application.
//!
//! ## Architecture
//!
//! ```text
//! SessionCoordinator
//!   ├── InitializationHandshake   (idle pipeline, wait for status 400)
//!   └── RecognitionSession        (recognition pipeline, one bounded attempt)
//!         └── decode()            (raw payload → RecognitionResult)
//! ```
//!
//! All loops are synchronous busy-polls on the caller's thread. Time comes from an injected
//! [`TimeProvider`](visionlink_hal::TimeProvider) and stop requests from a
//! [`CancellationToken`].
//!
//! ## Example
//!
//! ```no_run
//! use visionlink_hal::platforms::{ScriptedVisionLink, StdTimeProvider};
//! use visionlink_recognition::prelude::*;
//!
//! let link = ScriptedVisionLink::new();
//! let _outcome = run_recognition(
//!     Some(link),
//!     StdTimeProvider::new(),
//!     WallClockTimestamps::new(),
//!     RecognitionSettings::default(),
//!     AllianceSelector::Red,
//!     &CancellationToken::new(),
//! );
//! ```

pub mod cancellation;
pub mod coordinator;
pub mod decoder;
pub mod error;
pub mod handshake;
pub mod session;
pub mod settings;
pub mod snapshot;
pub mod types;

pub use cancellation::CancellationToken;
pub use coordinator::{run_recognition, SessionCoordinator};
pub use decoder::decode;
pub use error::{CoordinatorError, DecodeError, HandshakeError};
pub use handshake::{HandshakeCounters, HandshakeReport, HandshakeState, InitializationHandshake};
pub use session::{
    ActivePipelineGuard, PollingOutcome, RecognitionSession, SessionCounters, SessionTermination,
};
pub use settings::RecognitionSettings;
pub use snapshot::{SequentialTimestamps, SnapshotKind, TimestampSource, WallClockTimestamps};
pub use types::{AllianceSelector, RecognitionResult, SampleColor, StatusCode};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod prelude {
    pub use crate::{
        run_recognition, AllianceSelector, CancellationToken, CoordinatorError, PollingOutcome,
        RecognitionResult, RecognitionSettings, SampleColor, SequentialTimestamps,
        SessionCoordinator, SessionTermination, WallClockTimestamps,
    };
}
