// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Vision co-processor link Hardware Abstraction Layer
//!
//! This module defines the platform-agnostic trait for a vision co-processor that runs
//! numbered processing pipelines on its own camera frames and reports a small numeric
//! payload back to the robot controller.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ Recognition core (handshake / session)       │
//! └─────────────────┬────────────────────────────┘
//!                   │ uses
//! ┌─────────────────▼────────────────────────────┐
//! │ VisionLink trait (THIS FILE)                 │
//! │ - select_pipeline() / push_inputs()          │
//! │ - status() / latest_result()                 │
//! │ - capture_snapshot() / start() / stop()      │
//! └─────────────────┬────────────────────────────┘
//!                   │ implements
//! ┌─────────────────▼────────────────────────────┐
//! │ Platform Implementation                      │
//! │ - ScriptedVisionLink (in-memory replay)      │
//! │ - vendor co-processor drivers (external)     │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! ## Absence is not failure
//!
//! Every read is poll-style. `None` means "nothing ready yet" and callers re-poll;
//! it is never an error.

use serde::{Deserialize, Serialize};

/// Device health snapshot reported by the co-processor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeviceStatus {
    /// Frames processed per second; zero while the camera or pipeline is not running
    pub fps: f64,
    /// Pipeline the device reports as currently loaded, if it reports one
    #[serde(default)]
    pub pipeline_index: Option<u32>,
}

impl DeviceStatus {
    /// Status of a device producing frames at `fps`
    pub fn live(fps: f64) -> Self {
        Self {
            fps,
            pipeline_index: None,
        }
    }

    /// Liveness signal: the device is producing frames
    pub fn is_live(&self) -> bool {
        self.fps > 0.0
    }
}

/// Opaque per-frame result handle returned by [`VisionLink::latest_result`]
pub trait RawResult {
    /// Numeric output of the on-device application for this frame
    ///
    /// Returns `None` if the application produced no output for this frame.
    fn payload(&self) -> Option<&[f64]>;
}

/// Vision co-processor link trait
///
/// ## Thread Safety
///
/// Implementations do NOT need to be `Send` or `Sync` - the link is owned and used
/// serially by whichever component currently holds control.
///
/// ## Non-blocking
///
/// No method may block waiting for the device. Reads return `None` immediately when
/// the device has nothing to report.
pub trait VisionLink {
    /// Per-frame result handle type
    type Result: RawResult;

    /// Switch the device to pipeline `index`
    fn select_pipeline(&mut self, index: u32);

    /// Push the numeric input parameters read by the on-device application
    fn push_inputs(&mut self, inputs: &[f64]);

    /// Start frame processing and result delivery
    fn start(&mut self);

    /// Stop frame processing
    fn stop(&mut self);

    /// Latest device status, or `None` if no status has been received yet
    fn status(&mut self) -> Option<DeviceStatus>;

    /// Latest frame result, or `None` if none is available yet
    fn latest_result(&mut self) -> Option<Self::Result>;

    /// Ask the device to persist its current frame under `label`
    fn capture_snapshot(&mut self, label: &str);

    /// Human-readable device name used in log messages
    fn name(&self) -> &str {
        "vision-link"
    }
}

impl<L: VisionLink + ?Sized> VisionLink for &mut L {
    type Result = L::Result;

    fn select_pipeline(&mut self, index: u32) {
        (**self).select_pipeline(index)
    }

    fn push_inputs(&mut self, inputs: &[f64]) {
        (**self).push_inputs(inputs)
    }

    fn start(&mut self) {
        (**self).start()
    }

    fn stop(&mut self) {
        (**self).stop()
    }

    fn status(&mut self) -> Option<DeviceStatus> {
        (**self).status()
    }

    fn latest_result(&mut self) -> Option<Self::Result> {
        (**self).latest_result()
    }

    fn capture_snapshot(&mut self, label: &str) {
        (**self).capture_snapshot(label)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
