// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions
//!
//! This module defines all configuration structs that map to sections in
//! `visionlink.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct VisionLinkConfig {
    pub pipelines: PipelineConfig,
    pub timing: TimingConfig,
    pub snapshots: SnapshotConfig,
    pub logging: LoggingConfig,
}

/// Pipeline slots on the co-processor
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Heartbeat-only pipeline the device rests in between recognitions
    pub idle: u32,
    /// Sample recognition pipeline
    pub recognition: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            idle: 1,
            recognition: 0,
        }
    }
}

/// Time budgets for the polling loops, in milliseconds
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct TimingConfig {
    pub init_timeout_ms: u64,
    pub recognition_timeout_ms: u64,
    /// One-time pause after starting the link, before the handshake deadline starts
    pub settle_delay_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            init_timeout_ms: 1000,
            recognition_timeout_ms: 1000,
            settle_delay_ms: 500,
        }
    }
}

/// Snapshot side effects
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SnapshotConfig {
    /// Capture an `LRC_` snapshot when the on-device application reports a crash
    pub capture_on_crash: bool,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            capture_on_crash: true,
        }
    }
}

/// Logging settings consumed by `visionlink-observability`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// trace, debug, info, warn or error
    pub level: String,
    pub file_logging: bool,
    pub log_dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_logging: false,
            log_dir: None,
        }
    }
}
