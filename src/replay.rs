// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Offline replay of recorded device scripts
//!
//! Feeds a [`LinkScript`] through the full coordinator on a manual clock, so a recorded
//! sequence of frames can be checked without a co-processor attached.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;
use visionlink_hal::platforms::{LinkScript, ManualTimeProvider, ScriptedVisionLink};
use visionlink_recognition::{
    run_recognition, AllianceSelector, CancellationToken, CoordinatorError, PollingOutcome,
    RecognitionSettings, SequentialTimestamps,
};

/// Default simulated latency of each device read
pub const DEFAULT_POLL_LATENCY_US: u64 = 1000;

#[derive(Debug, Clone)]
pub struct ReplayOptions {
    pub alliance: AllianceSelector,
    pub settings: RecognitionSettings,
    /// Manual clock advance per status or result read
    pub poll_latency_us: u64,
}

impl Default for ReplayOptions {
    fn default() -> Self {
        Self {
            alliance: AllianceSelector::Red,
            settings: RecognitionSettings::default(),
            poll_latency_us: DEFAULT_POLL_LATENCY_US,
        }
    }
}

/// Read a JSON script from disk
pub fn load_script(path: &Path) -> Result<LinkScript> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read script {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse script {}", path.display()))
}

/// Run handshake and one recognition session against `script`
///
/// A latency of zero would never reach a deadline on a looping script, so it is raised to 1 µs.
pub fn replay_script(
    script: LinkScript,
    options: &ReplayOptions,
) -> Result<PollingOutcome, CoordinatorError> {
    let clock = ManualTimeProvider::new();
    let link = ScriptedVisionLink::from_script(script)
        .with_clock(clock.clone(), options.poll_latency_us.max(1));

    info!(
        "Replaying script for alliance {} ({} µs per read)",
        options.alliance, options.poll_latency_us
    );
    run_recognition(
        Some(link),
        clock,
        SequentialTimestamps::new(),
        options.settings.clone(),
        options.alliance,
        &CancellationToken::new(),
    )
}
