// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

#![warn(missing_docs)]

//! # visionlink-hal
//!
//! Platform abstraction for vision co-processors.
//!
//! This crate provides:
//! - **HAL traits** (`hal` module) - the device link contract and the monotonic clock
//! - **Platform implementations** (`platforms` module) - a std clock and a scripted,
//!   fully deterministic in-memory link used for tests and offline replay
//!
//! Real device links (USB-ethernet co-processors and the like) live outside this crate
//! and implement [`hal::VisionLink`].

/// Hardware abstraction traits shared by all platforms.
pub mod hal;

/// Concrete platform implementations.
pub mod platforms;

pub use hal::{DeviceStatus, RawResult, TimeProvider, VisionLink};

/// Convenient imports for link implementors and consumers
pub mod prelude {
    pub use crate::hal::{DeviceStatus, RawResult, TimeProvider, VisionLink};
    pub use crate::platforms::{
        LinkCall, ManualTimeProvider, ScriptedFrame, ScriptedVisionLink, StdTimeProvider,
    };
}
