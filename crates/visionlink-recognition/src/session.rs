// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Bounded recognition session
//!
//! One attempt to recognize a sample for a given alliance:
//!
//! ```text
//!   engage recognition pipeline, push [alliance]
//!        │
//!        ▼
//!   ┌─► poll ── none / no output / 400 / 450 ──┐
//!   │                                          │
//!   └──────────────────────────────────────────┘
//!        │
//!        ├── 200 ──► LRS snapshot, succeeded
//!        ├── 500 ──► LRF snapshot, failed
//!        ├── 300 ──► LRC label (snapshot if enabled), failed
//!        ├── other status / malformed ──► failed
//!        └── deadline / cancelled ──► failed, no result
//!        │
//!        ▼
//!   push [NONE], select idle pipeline (always, exactly once)
//! ```

use std::fmt;
use std::ops::{Deref, DerefMut};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use visionlink_hal::{RawResult, TimeProvider, VisionLink};

use crate::cancellation::CancellationToken;
use crate::decoder::decode;
use crate::error::DecodeError;
use crate::settings::RecognitionSettings;
use crate::snapshot::{SnapshotKind, TimestampSource};
use crate::types::{AllianceSelector, RecognitionResult};

/// Non-terminal poll cycles, by cause
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCounters {
    pub no_result: u32,
    pub no_output: u32,
    /// Device still reported the idle status
    pub idle_loop: u32,
    /// Pipeline ran without a camera frame
    pub no_image: u32,
}

impl fmt::Display for SessionCounters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "no result {}, no output {}, idle loop {}, no image {}",
            self.no_result, self.no_output, self.idle_loop, self.no_image
        )
    }
}

/// How a recognition session ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum SessionTermination {
    Succeeded,
    Crashed,
    RecognitionFailed,
    UnexpectedStatus(i32),
    RecognitionTimedOut,
    Cancelled,
    DecodeFailed(DecodeError),
}

impl SessionTermination {
    pub fn is_success(&self) -> bool {
        matches!(self, SessionTermination::Succeeded)
    }
}

/// Final report of one recognition session
///
/// `succeeded` is true only for [`SessionTermination::Succeeded`], which always carries a
/// success result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PollingOutcome {
    succeeded: bool,
    termination: SessionTermination,
    alliance: AllianceSelector,
    result: Option<RecognitionResult>,
    label: Option<String>,
    counters: SessionCounters,
    elapsed_ms: u64,
}

impl PollingOutcome {
    fn terminal(
        termination: SessionTermination,
        result: RecognitionResult,
        label: Option<String>,
        alliance: AllianceSelector,
        counters: SessionCounters,
        elapsed_ms: u64,
    ) -> Self {
        let succeeded = termination.is_success() && result.is_success();
        Self {
            succeeded,
            termination,
            alliance,
            result: Some(result),
            label,
            counters,
            elapsed_ms,
        }
    }

    fn without_result(
        termination: SessionTermination,
        alliance: AllianceSelector,
        counters: SessionCounters,
        elapsed_ms: u64,
    ) -> Self {
        Self {
            succeeded: false,
            termination,
            alliance,
            result: None,
            label: None,
            counters,
            elapsed_ms,
        }
    }

    pub fn succeeded(&self) -> bool {
        self.succeeded
    }

    pub fn termination(&self) -> &SessionTermination {
        &self.termination
    }

    pub fn alliance(&self) -> AllianceSelector {
        self.alliance
    }

    /// Terminal decoded result; none for timeouts, cancellation and malformed payloads
    pub fn result(&self) -> Option<&RecognitionResult> {
        self.result.as_ref()
    }

    pub fn into_result(self) -> Option<RecognitionResult> {
        self.result
    }

    /// Snapshot label of the terminal event (LRC/LRF/LRS)
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn counters(&self) -> &SessionCounters {
        &self.counters
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }
}

/// Holds the link on the recognition pipeline; restores idle when dropped
pub struct ActivePipelineGuard<'a, L: VisionLink + ?Sized> {
    link: &'a mut L,
    idle_pipeline: u32,
}

impl<'a, L: VisionLink + ?Sized> ActivePipelineGuard<'a, L> {
    /// Select `recognition_pipeline` and push the alliance input
    pub fn engage(
        link: &'a mut L,
        recognition_pipeline: u32,
        idle_pipeline: u32,
        alliance: AllianceSelector,
    ) -> Self {
        info!(
            "[VISION-RECOGNITION] Switching {} to sample recognition pipeline {}",
            link.name(),
            recognition_pipeline
        );
        link.select_pipeline(recognition_pipeline);
        info!(
            "[VISION-RECOGNITION] Run for alliance {} with ordinal {}",
            alliance,
            alliance.ordinal()
        );
        link.push_inputs(&alliance.as_inputs());
        Self {
            link,
            idle_pipeline,
        }
    }
}

impl<L: VisionLink + ?Sized> Deref for ActivePipelineGuard<'_, L> {
    type Target = L;

    fn deref(&self) -> &L {
        self.link
    }
}

impl<L: VisionLink + ?Sized> DerefMut for ActivePipelineGuard<'_, L> {
    fn deref_mut(&mut self) -> &mut L {
        self.link
    }
}

impl<L: VisionLink + ?Sized> Drop for ActivePipelineGuard<'_, L> {
    fn drop(&mut self) {
        info!(
            "[VISION-RECOGNITION] Resetting {} to pipeline {} (idle)",
            self.link.name(),
            self.idle_pipeline
        );
        self.link.push_inputs(&AllianceSelector::None.as_inputs());
        self.link.select_pipeline(self.idle_pipeline);
    }
}

/// What one poll cycle produced
enum Poll {
    Pending,
    Terminal {
        termination: SessionTermination,
        result: Option<RecognitionResult>,
        label: Option<String>,
    },
}

/// One recognition attempt for a fixed alliance
#[derive(Debug, Clone, Copy)]
pub struct RecognitionSession {
    alliance: AllianceSelector,
}

impl RecognitionSession {
    pub fn new(alliance: AllianceSelector) -> Self {
        Self { alliance }
    }

    pub fn alliance(&self) -> AllianceSelector {
        self.alliance
    }

    /// Poll until a terminal result, the deadline or cancellation
    ///
    /// The link is back on the idle pipeline with the neutral input when this returns.
    pub fn run<L, T, S>(
        &self,
        link: &mut L,
        clock: &T,
        stamps: &mut S,
        settings: &RecognitionSettings,
        cancel: &CancellationToken,
    ) -> PollingOutcome
    where
        L: VisionLink + ?Sized,
        T: TimeProvider + ?Sized,
        S: TimestampSource + ?Sized,
    {
        let mut active = ActivePipelineGuard::engage(
            link,
            settings.recognition_pipeline,
            settings.idle_pipeline,
            self.alliance,
        );
        let mut counters = SessionCounters::default();
        let started_us = clock.get_time_us();

        let (termination, result, label) = loop {
            if cancel.is_cancelled() {
                warn!(
                    "[VISION-RECOGNITION] Recognition cancelled for alliance {} after {} ms ({})",
                    self.alliance,
                    clock.elapsed_ms_since(started_us),
                    counters
                );
                break (SessionTermination::Cancelled, None, None);
            }
            let elapsed_ms = clock.elapsed_ms_since(started_us);
            if elapsed_ms >= settings.recognition_timeout_ms {
                warn!(
                    "[VISION-RECOGNITION] Timed out while processing for alliance {} \
                     after {} ms ({})",
                    self.alliance, elapsed_ms, counters
                );
                break (SessionTermination::RecognitionTimedOut, None, None);
            }
            match self.poll_once(&mut *active, stamps, settings, &mut counters) {
                Poll::Pending => continue,
                Poll::Terminal {
                    termination,
                    result,
                    label,
                } => break (termination, result, label),
            }
        };
        let elapsed_ms = clock.elapsed_ms_since(started_us);

        debug!(
            "[VISION-RECOGNITION] Poll cycles after {} ms: {}",
            elapsed_ms, counters
        );
        drop(active);

        match result {
            Some(result) => PollingOutcome::terminal(
                termination,
                result,
                label,
                self.alliance,
                counters,
                elapsed_ms,
            ),
            None => {
                PollingOutcome::without_result(termination, self.alliance, counters, elapsed_ms)
            }
        }
    }

    fn poll_once<L, S>(
        &self,
        link: &mut L,
        stamps: &mut S,
        settings: &RecognitionSettings,
        counters: &mut SessionCounters,
    ) -> Poll
    where
        L: VisionLink + ?Sized,
        S: TimestampSource + ?Sized,
    {
        let Some(raw) = link.latest_result() else {
            counters.no_result += 1;
            return Poll::Pending;
        };
        let payload = match raw.payload() {
            Some(values) if !values.is_empty() => values,
            _ => {
                counters.no_output += 1;
                return Poll::Pending;
            }
        };

        let decoded = match decode(payload) {
            Ok(decoded) => decoded,
            Err(e) => {
                warn!(
                    "[VISION-RECOGNITION] Malformed payload for alliance {}: {}",
                    self.alliance, e
                );
                return Poll::Terminal {
                    termination: SessionTermination::DecodeFailed(e),
                    result: None,
                    label: None,
                };
            }
        };

        let (termination, label) = match decoded {
            RecognitionResult::Idle => {
                counters.idle_loop += 1;
                return Poll::Pending;
            }
            RecognitionResult::ImageNotAvailable => {
                counters.no_image += 1;
                debug!("[VISION-RECOGNITION] Pipeline was called but no image was available");
                return Poll::Pending;
            }
            RecognitionResult::Crash { .. } => {
                let label = SnapshotKind::Crash.label(stamps);
                if settings.capture_on_crash {
                    link.capture_snapshot(&label);
                }
                (SessionTermination::Crashed, Some(label))
            }
            RecognitionResult::Failure { .. } => {
                let label = SnapshotKind::RecognitionFailure.label(stamps);
                debug!("[VISION-RECOGNITION] Saving recognition failure snapshot {}", label);
                link.capture_snapshot(&label);
                (SessionTermination::RecognitionFailed, Some(label))
            }
            RecognitionResult::Success { .. } => {
                let label = SnapshotKind::RecognitionSuccess.label(stamps);
                debug!("[VISION-RECOGNITION] Saving recognition success snapshot {}", label);
                link.capture_snapshot(&label);
                (SessionTermination::Succeeded, Some(label))
            }
            RecognitionResult::Unexpected { status } => {
                warn!(
                    "[VISION-RECOGNITION] Got status {} instead of the expected success code \
                     for alliance {}",
                    status, self.alliance
                );
                (SessionTermination::UnexpectedStatus(status), None)
            }
        };

        log_recognition_return(&decoded, self.alliance, label.as_deref());
        Poll::Terminal {
            termination,
            result: Some(decoded),
            label,
        }
    }
}

/// Terminal event of a session: success at info, crash and failure at warn
fn log_recognition_return(
    result: &RecognitionResult,
    alliance: AllianceSelector,
    label: Option<&str>,
) {
    let label = label.unwrap_or("-");
    match result {
        RecognitionResult::Crash { crash_line_number } => {
            warn!(
                "[VISION-RECOGNITION] On-device application crashed at line {} \
                 (alliance {}, status {}, label {})",
                crash_line_number,
                alliance,
                result.raw_status(),
                label
            );
        }
        RecognitionResult::Failure {
            selected_sample_color,
        } => {
            warn!(
                "[VISION-RECOGNITION] Recognition failed with selected sample color {} \
                 (alliance {}, status {}, label {})",
                selected_sample_color,
                alliance,
                result.raw_status(),
                label
            );
        }
        RecognitionResult::Success {
            selected_sample_color,
            angle_degrees,
            center_x,
            center_y,
        } => {
            info!(
                "[VISION-RECOGNITION] Recognized sample color {}, angle {}, center ({}, {}) \
                 (alliance {}, status {}, label {})",
                selected_sample_color,
                angle_degrees,
                center_x,
                center_y,
                alliance,
                result.raw_status(),
                label
            );
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::SequentialTimestamps;
    use crate::types::SampleColor;
    use visionlink_hal::platforms::{
        LinkCall, ManualTimeProvider, ScriptedFrame, ScriptedVisionLink,
    };

    const RECOGNITION: u32 = 0;
    const IDLE: u32 = 1;

    fn run(
        link: &mut ScriptedVisionLink,
        clock: &ManualTimeProvider,
        alliance: AllianceSelector,
    ) -> PollingOutcome {
        let mut stamps = SequentialTimestamps::new();
        RecognitionSession::new(alliance).run(
            link,
            clock,
            &mut stamps,
            &RecognitionSettings::default(),
            &CancellationToken::new(),
        )
    }

    fn restores(link: &ScriptedVisionLink) -> usize {
        link.calls()
            .windows(2)
            .filter(|pair| {
                pair[0] == LinkCall::PushInputs(vec![0.0])
                    && pair[1] == LinkCall::SelectPipeline(IDLE)
            })
            .count()
    }

    #[test]
    fn test_engages_recognition_pipeline_with_alliance() {
        let clock = ManualTimeProvider::new();
        let mut link = ScriptedVisionLink::new()
            .with_clock(clock.clone(), 1000)
            .with_frames(RECOGNITION, [ScriptedFrame::payload(&[500.0, 3.0])]);

        run(&mut link, &clock, AllianceSelector::Blue);

        assert_eq!(
            &link.calls()[..2],
            &[LinkCall::SelectPipeline(RECOGNITION), LinkCall::PushInputs(vec![1.0])]
        );
    }

    #[test]
    fn test_success_after_idle_and_no_image() {
        let clock = ManualTimeProvider::new();
        let mut link = ScriptedVisionLink::new().with_clock(clock.clone(), 1000).with_frames(
            RECOGNITION,
            [
                ScriptedFrame::NoResult,
                ScriptedFrame::NoOutput,
                ScriptedFrame::payload(&[400.0]),
                ScriptedFrame::payload(&[450.0]),
                ScriptedFrame::payload(&[200.0, 1.0, 37.5, 120.0, 80.0]),
            ],
        );

        let outcome = run(&mut link, &clock, AllianceSelector::Red);

        assert!(outcome.succeeded());
        assert_eq!(outcome.termination(), &SessionTermination::Succeeded);
        assert_eq!(
            outcome.result(),
            Some(&RecognitionResult::Success {
                selected_sample_color: SampleColor::Red,
                angle_degrees: 37.5,
                center_x: 120,
                center_y: 80,
            })
        );
        assert_eq!(
            outcome.counters(),
            &SessionCounters {
                no_result: 1,
                no_output: 1,
                idle_loop: 1,
                no_image: 1,
            }
        );
        assert_eq!(outcome.label(), Some("LRS_000000"));
        assert_eq!(link.snapshots(), vec!["LRS_000000"]);
        assert_eq!(restores(&link), 1);
        assert_eq!(link.selected_pipeline(), Some(IDLE));
        assert_eq!(link.inputs(), &[0.0]);
    }

    #[test]
    fn test_no_reads_after_terminal_result() {
        let clock = ManualTimeProvider::new();
        let mut link = ScriptedVisionLink::new()
            .with_clock(clock.clone(), 1000)
            .with_frames(RECOGNITION, [ScriptedFrame::payload(&[500.0, 0.0])]);

        run(&mut link, &clock, AllianceSelector::Red);

        let last_read = link.calls().iter().rposition(LinkCall::is_read).unwrap();
        let snapshot = link
            .calls()
            .iter()
            .position(|call| matches!(call, LinkCall::CaptureSnapshot(_)))
            .unwrap();
        assert!(last_read < snapshot);
        assert_eq!(link.count_calls(LinkCall::is_read), 1);
    }

    #[test]
    fn test_crash_without_capture_still_labels() {
        let clock = ManualTimeProvider::new();
        let mut link = ScriptedVisionLink::new()
            .with_clock(clock.clone(), 1000)
            .with_frames(RECOGNITION, [ScriptedFrame::payload(&[300.0, 42.0, 7.0])]);
        let settings = RecognitionSettings {
            capture_on_crash: false,
            ..RecognitionSettings::default()
        };

        let outcome = RecognitionSession::new(AllianceSelector::Red).run(
            &mut link,
            &clock,
            &mut SequentialTimestamps::new(),
            &settings,
            &CancellationToken::new(),
        );

        assert!(!outcome.succeeded());
        assert_eq!(outcome.termination(), &SessionTermination::Crashed);
        assert_eq!(
            outcome.result(),
            Some(&RecognitionResult::Crash {
                crash_line_number: 42
            })
        );
        assert_eq!(outcome.label(), Some("LRC_000000"));
        assert!(link.snapshots().is_empty());
        assert_eq!(restores(&link), 1);
    }

    #[test]
    fn test_unexpected_status_is_soft_failure() {
        let clock = ManualTimeProvider::new();
        let mut link = ScriptedVisionLink::new()
            .with_clock(clock.clone(), 1000)
            .with_frames(RECOGNITION, [ScriptedFrame::payload(&[404.0])]);

        let outcome = run(&mut link, &clock, AllianceSelector::Red);

        assert!(!outcome.succeeded());
        assert_eq!(outcome.termination(), &SessionTermination::UnexpectedStatus(404));
        assert_eq!(outcome.label(), None);
        assert!(link.snapshots().is_empty());
        assert_eq!(restores(&link), 1);
    }

    #[test]
    fn test_malformed_payload_ends_session() {
        let clock = ManualTimeProvider::new();
        let mut link = ScriptedVisionLink::new()
            .with_clock(clock.clone(), 1000)
            .with_frames(RECOGNITION, [ScriptedFrame::payload(&[200.0, 5.0, 0.0, 0.0, 0.0])]);

        let outcome = run(&mut link, &clock, AllianceSelector::Blue);

        assert!(!outcome.succeeded());
        assert_eq!(
            outcome.termination(),
            &SessionTermination::DecodeFailed(DecodeError::InvalidSampleColor { ordinal: 5 })
        );
        assert!(outcome.result().is_none());
        assert_eq!(restores(&link), 1);
    }

    #[test]
    fn test_timeout_restores_idle_once() {
        let clock = ManualTimeProvider::new();
        let mut link = ScriptedVisionLink::new()
            .with_clock(clock.clone(), 1000)
            .with_steady_frame(RECOGNITION, ScriptedFrame::payload(&[400.0]));

        let outcome = run(&mut link, &clock, AllianceSelector::Red);

        assert!(!outcome.succeeded());
        assert_eq!(outcome.termination(), &SessionTermination::RecognitionTimedOut);
        assert!(outcome.result().is_none());
        assert!(outcome.elapsed_ms() >= 1000);
        assert_eq!(outcome.counters().idle_loop, 1000);
        assert!(link.snapshots().is_empty());
        assert_eq!(restores(&link), 1);
    }

    #[test]
    fn test_cancellation_ends_session() {
        let clock = ManualTimeProvider::new();
        let mut link = ScriptedVisionLink::new()
            .with_clock(clock.clone(), 1000)
            .with_steady_frame(RECOGNITION, ScriptedFrame::payload(&[400.0]));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let outcome = RecognitionSession::new(AllianceSelector::Red).run(
            &mut link,
            &clock,
            &mut SequentialTimestamps::new(),
            &RecognitionSettings::default(),
            &cancel,
        );

        assert_eq!(outcome.termination(), &SessionTermination::Cancelled);
        assert_eq!(link.count_calls(LinkCall::is_read), 0);
        assert_eq!(restores(&link), 1);
    }

    #[test]
    fn test_outcome_serializes() {
        let clock = ManualTimeProvider::new();
        let mut link = ScriptedVisionLink::new()
            .with_clock(clock.clone(), 1000)
            .with_frames(RECOGNITION, [ScriptedFrame::payload(&[500.0, 3.0])]);

        let outcome = run(&mut link, &clock, AllianceSelector::Blue);
        let json = serde_json::to_value(&outcome).unwrap();

        assert_eq!(json["succeeded"], false);
        assert_eq!(json["alliance"], "BLUE");
        assert_eq!(json["termination"]["kind"], "recognition_failed");
        assert_eq!(json["result"]["selected_sample_color"], "NOT_FOUND");
        assert_eq!(json["label"], "LRF_000000");
    }
}
