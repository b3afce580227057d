// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Scripted in-memory vision link
//!
//! Replays a fixed sequence of device statuses and per-pipeline frame results, and records
//! every call made against it. Each pipeline has its own frame queue; once a queue is
//! drained the pipeline keeps returning its steady frame. When attached to a
//! [`ManualTimeProvider`], every read advances the clock by the configured poll latency,
//! which makes deadline behaviour fully deterministic.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::hal::{DeviceStatus, RawResult, TimeProvider, VisionLink};

/// Default frame rate reported by a healthy scripted device
const DEFAULT_FPS: f64 = 90.0;

/// Manually driven monotonic clock
///
/// Clones share the same underlying counter. `delay_us` advances the clock instead
/// of sleeping.
#[derive(Debug, Clone, Default)]
pub struct ManualTimeProvider {
    now_us: Arc<AtomicU64>,
}

impl ManualTimeProvider {
    /// Create a clock at t = 0
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the clock forward by `us` microseconds
    pub fn advance_us(&self, us: u64) {
        self.now_us.fetch_add(us, Ordering::SeqCst);
    }

    /// Move the clock forward by `ms` milliseconds
    pub fn advance_ms(&self, ms: u64) {
        self.advance_us(ms.saturating_mul(1000));
    }
}

impl TimeProvider for ManualTimeProvider {
    fn get_time_us(&self) -> u64 {
        self.now_us.load(Ordering::SeqCst)
    }

    fn delay_us(&self, us: u64) {
        self.advance_us(us);
    }
}

/// One scripted answer to [`VisionLink::latest_result`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScriptedFrame {
    /// No result has been received yet
    #[default]
    NoResult,
    /// A result arrived but the on-device application produced no output
    NoOutput,
    /// A result carrying the given numeric payload
    Payload {
        /// Raw payload values
        values: Vec<f64>,
    },
}

impl ScriptedFrame {
    /// Shorthand for a payload frame
    pub fn payload(values: &[f64]) -> Self {
        ScriptedFrame::Payload {
            values: values.to_vec(),
        }
    }
}

/// Frame script for one pipeline
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineScript {
    /// Frames returned in order, one per `latest_result` call
    pub frames: Vec<ScriptedFrame>,
    /// Frame returned once `frames` is drained
    pub steady: ScriptedFrame,
}

/// Complete device script, loadable from JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkScript {
    /// Statuses returned in order, one per `status` call (`null` = no status yet)
    pub statuses: Vec<Option<DeviceStatus>>,
    /// Status returned once `statuses` is drained
    pub steady_status: Option<DeviceStatus>,
    /// Frame scripts keyed by pipeline index
    pub pipelines: HashMap<u32, PipelineScript>,
}

impl Default for LinkScript {
    fn default() -> Self {
        Self {
            statuses: Vec::new(),
            steady_status: Some(DeviceStatus::live(DEFAULT_FPS)),
            pipelines: HashMap::new(),
        }
    }
}

/// Record of a call made against a [`ScriptedVisionLink`]
#[derive(Debug, Clone, PartialEq)]
pub enum LinkCall {
    /// `select_pipeline(index)`
    SelectPipeline(u32),
    /// `push_inputs(values)`
    PushInputs(Vec<f64>),
    /// `start()`
    Start,
    /// `stop()`
    Stop,
    /// `status()`
    Status,
    /// `latest_result()`
    LatestResult,
    /// `capture_snapshot(label)`
    CaptureSnapshot(String),
}

impl LinkCall {
    /// Whether this call reads from the device
    pub fn is_read(&self) -> bool {
        matches!(self, LinkCall::Status | LinkCall::LatestResult)
    }
}

/// Result handle produced by [`ScriptedVisionLink`]
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptedResult {
    payload: Option<Vec<f64>>,
}

impl RawResult for ScriptedResult {
    fn payload(&self) -> Option<&[f64]> {
        self.payload.as_deref()
    }
}

struct PipelineQueue {
    frames: VecDeque<ScriptedFrame>,
    steady: ScriptedFrame,
}

/// Deterministic in-memory [`VisionLink`]
pub struct ScriptedVisionLink {
    statuses: VecDeque<Option<DeviceStatus>>,
    steady_status: Option<DeviceStatus>,
    pipelines: HashMap<u32, PipelineQueue>,
    selected_pipeline: Option<u32>,
    inputs: Vec<f64>,
    running: bool,
    calls: Vec<LinkCall>,
    clock: Option<(ManualTimeProvider, u64)>,
}

impl ScriptedVisionLink {
    /// Healthy device with no frames scripted on any pipeline
    pub fn new() -> Self {
        Self::from_script(LinkScript::default())
    }

    /// Build a link from a complete script
    pub fn from_script(script: LinkScript) -> Self {
        let pipelines = script
            .pipelines
            .into_iter()
            .map(|(index, pipeline)| {
                (
                    index,
                    PipelineQueue {
                        frames: pipeline.frames.into(),
                        steady: pipeline.steady,
                    },
                )
            })
            .collect();
        Self {
            statuses: script.statuses.into(),
            steady_status: script.steady_status,
            pipelines,
            selected_pipeline: None,
            inputs: Vec::new(),
            running: false,
            calls: Vec::new(),
            clock: None,
        }
    }

    /// Append frames to the queue of `pipeline`
    pub fn with_frames(
        mut self,
        pipeline: u32,
        frames: impl IntoIterator<Item = ScriptedFrame>,
    ) -> Self {
        self.queue_mut(pipeline).frames.extend(frames);
        self
    }

    /// Set the frame `pipeline` returns once its queue is drained
    pub fn with_steady_frame(mut self, pipeline: u32, frame: ScriptedFrame) -> Self {
        self.queue_mut(pipeline).steady = frame;
        self
    }

    /// Prepend scripted statuses before the steady status
    pub fn with_statuses(
        mut self,
        statuses: impl IntoIterator<Item = Option<DeviceStatus>>,
    ) -> Self {
        self.statuses.extend(statuses);
        self
    }

    /// Set the status reported once the status queue is drained
    pub fn with_steady_status(mut self, status: Option<DeviceStatus>) -> Self {
        self.steady_status = status;
        self
    }

    /// Advance `clock` by `poll_latency_us` on every device read
    pub fn with_clock(mut self, clock: ManualTimeProvider, poll_latency_us: u64) -> Self {
        self.clock = Some((clock, poll_latency_us));
        self
    }

    /// Every call made so far, in order
    pub fn calls(&self) -> &[LinkCall] {
        &self.calls
    }

    /// Forget recorded calls (scripts and device state are kept)
    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Labels of every snapshot requested so far
    pub fn snapshots(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                LinkCall::CaptureSnapshot(label) => Some(label.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Number of recorded calls matching `predicate`
    pub fn count_calls(&self, predicate: impl Fn(&LinkCall) -> bool) -> usize {
        self.calls.iter().filter(|call| predicate(call)).count()
    }

    /// Pipeline currently selected, if any
    pub fn selected_pipeline(&self) -> Option<u32> {
        self.selected_pipeline
    }

    /// Inputs most recently pushed
    pub fn inputs(&self) -> &[f64] {
        &self.inputs
    }

    /// Whether the device is started
    pub fn is_running(&self) -> bool {
        self.running
    }

    fn queue_mut(&mut self, pipeline: u32) -> &mut PipelineQueue {
        self.pipelines.entry(pipeline).or_insert_with(|| PipelineQueue {
            frames: VecDeque::new(),
            steady: ScriptedFrame::NoResult,
        })
    }

    fn tick(&self) {
        if let Some((clock, latency_us)) = &self.clock {
            clock.advance_us(*latency_us);
        }
    }
}

impl Default for ScriptedVisionLink {
    fn default() -> Self {
        Self::new()
    }
}

impl VisionLink for ScriptedVisionLink {
    type Result = ScriptedResult;

    fn select_pipeline(&mut self, index: u32) {
        self.calls.push(LinkCall::SelectPipeline(index));
        self.selected_pipeline = Some(index);
    }

    fn push_inputs(&mut self, inputs: &[f64]) {
        self.calls.push(LinkCall::PushInputs(inputs.to_vec()));
        self.inputs = inputs.to_vec();
    }

    fn start(&mut self) {
        self.calls.push(LinkCall::Start);
        self.running = true;
    }

    fn stop(&mut self) {
        self.calls.push(LinkCall::Stop);
        self.running = false;
    }

    fn status(&mut self) -> Option<DeviceStatus> {
        self.calls.push(LinkCall::Status);
        self.tick();
        match self.statuses.pop_front() {
            Some(status) => status,
            None => self.steady_status,
        }
    }

    fn latest_result(&mut self) -> Option<ScriptedResult> {
        self.calls.push(LinkCall::LatestResult);
        self.tick();
        let frame = match self.selected_pipeline {
            Some(index) => {
                let queue = self.queue_mut(index);
                queue.frames.pop_front().unwrap_or_else(|| queue.steady.clone())
            }
            None => ScriptedFrame::NoResult,
        };
        match frame {
            ScriptedFrame::NoResult => None,
            ScriptedFrame::NoOutput => Some(ScriptedResult { payload: None }),
            ScriptedFrame::Payload { values } => Some(ScriptedResult {
                payload: Some(values),
            }),
        }
    }

    fn capture_snapshot(&mut self, label: &str) {
        self.calls.push(LinkCall::CaptureSnapshot(label.to_string()));
    }

    fn name(&self) -> &str {
        "scripted-vision-link"
    }
}
