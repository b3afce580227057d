// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Runtime settings for the handshake and recognition sessions

use serde::{Deserialize, Serialize};
use visionlink_config::VisionLinkConfig;

/// Pipeline slots and time budgets, flattened from [`VisionLinkConfig`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecognitionSettings {
    pub idle_pipeline: u32,
    pub recognition_pipeline: u32,
    pub init_timeout_ms: u64,
    pub recognition_timeout_ms: u64,
    /// Applied once after starting the device, before the handshake deadline begins
    pub settle_delay_ms: u64,
    pub capture_on_crash: bool,
}

impl Default for RecognitionSettings {
    fn default() -> Self {
        Self::from_config(&VisionLinkConfig::default())
    }
}

impl RecognitionSettings {
    pub fn from_config(config: &VisionLinkConfig) -> Self {
        Self {
            idle_pipeline: config.pipelines.idle,
            recognition_pipeline: config.pipelines.recognition,
            init_timeout_ms: config.timing.init_timeout_ms,
            recognition_timeout_ms: config.timing.recognition_timeout_ms,
            settle_delay_ms: config.timing.settle_delay_ms,
            capture_on_crash: config.snapshots.capture_on_crash,
        }
    }
}

impl From<&VisionLinkConfig> for RecognitionSettings {
    fn from(config: &VisionLinkConfig) -> Self {
        Self::from_config(config)
    }
}
