// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/// Hardware Abstraction Layer (HAL) trait definitions for vision co-processors
///
/// This module defines platform-agnostic traits that must be implemented
/// by each platform to provide:
/// - Device control and result polling (VisionLink)
/// - Time management (TimeProvider)

/// Timekeeping abstractions (monotonic timers, delays).
pub mod time;
/// Vision co-processor link traits.
pub mod vision_link;

// Re-export trait types
pub use time::TimeProvider;
pub use vision_link::{DeviceStatus, RawResult, VisionLink};
