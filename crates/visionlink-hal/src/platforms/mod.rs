// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/// Platform implementations of the HAL traits
///
/// Available platforms:
/// - `std_time` - monotonic clock backed by `std::time::Instant`
/// - `scripted` - in-memory vision link replaying scripted frames on a manual clock

pub mod scripted;
pub mod std_time;

pub use scripted::{
    LinkCall, LinkScript, ManualTimeProvider, PipelineScript, ScriptedFrame, ScriptedResult,
    ScriptedVisionLink,
};
pub use std_time::StdTimeProvider;
