// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Initialization handshake
//!
//! Confirms the co-processor is alive and running the idle pipeline before any recognition
//! is attempted.
//!
//! ```text
//! NotStarted ──run()──► Polling ──[400 decoded]──────► Confirmed
//!                          │
//!                          ├──[deadline reached]────► TimedOut
//!                          └──[token cancelled]─────► Cancelled
//! ```
//!
//! Every poll that does not confirm is tallied in [`HandshakeCounters`]. The counters are
//! diagnostic only; the deadline alone decides failure.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};
use visionlink_hal::{RawResult, TimeProvider, VisionLink};

use crate::cancellation::CancellationToken;
use crate::decoder::decode;
use crate::error::HandshakeError;
use crate::settings::RecognitionSettings;
use crate::types::{AllianceSelector, RecognitionResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HandshakeState {
    NotStarted,
    Polling,
    Confirmed,
    TimedOut,
    Cancelled,
}

impl HandshakeState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            HandshakeState::Confirmed | HandshakeState::TimedOut | HandshakeState::Cancelled
        )
    }
}

/// Non-confirming poll cycles, by cause
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandshakeCounters {
    /// Status missing or device not producing frames
    pub no_status: u32,
    pub no_result: u32,
    /// Result present without a payload
    pub no_output: u32,
    /// Decoded a status other than idle
    pub ignored_status: u32,
    /// Payload failed to decode
    pub malformed: u32,
}

impl HandshakeCounters {
    pub fn total(&self) -> u32 {
        self.no_status + self.no_result + self.no_output + self.ignored_status + self.malformed
    }
}

impl fmt::Display for HandshakeCounters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "no status {}, no result {}, no output {}, ignored status {}, malformed {}",
            self.no_status, self.no_result, self.no_output, self.ignored_status, self.malformed
        )
    }
}

/// Result of a confirmed handshake
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandshakeReport {
    /// Time from the end of the settle delay to confirmation
    pub elapsed_ms: u64,
    pub counters: HandshakeCounters,
}

/// Initialization handshake state machine
///
/// No internal retries. Calling [`run`](Self::run) again restarts from `NotStarted`.
#[derive(Debug, Clone)]
pub struct InitializationHandshake {
    state: HandshakeState,
    counters: HandshakeCounters,
}

impl Default for InitializationHandshake {
    fn default() -> Self {
        Self::new()
    }
}

impl InitializationHandshake {
    pub fn new() -> Self {
        Self {
            state: HandshakeState::NotStarted,
            counters: HandshakeCounters::default(),
        }
    }

    pub fn state(&self) -> HandshakeState {
        self.state
    }

    /// Counters from the most recent run
    pub fn counters(&self) -> &HandshakeCounters {
        &self.counters
    }

    /// Put the device on its idle pipeline, start it and poll until it reports idle
    pub fn run<L, T>(
        &mut self,
        link: &mut L,
        clock: &T,
        settings: &RecognitionSettings,
        cancel: &CancellationToken,
    ) -> Result<HandshakeReport, HandshakeError>
    where
        L: VisionLink + ?Sized,
        T: TimeProvider + ?Sized,
    {
        self.state = HandshakeState::NotStarted;
        self.counters = HandshakeCounters::default();

        info!(
            "[VISION-INIT] Setting up {} for pipeline {} (idle)",
            link.name(),
            settings.idle_pipeline
        );
        link.select_pipeline(settings.idle_pipeline);
        link.push_inputs(&AllianceSelector::None.as_inputs());
        link.start();
        clock.delay_ms(settings.settle_delay_ms);

        self.state = HandshakeState::Polling;
        let started_us = clock.get_time_us();

        let outcome = loop {
            if cancel.is_cancelled() {
                break HandshakeState::Cancelled;
            }
            if clock.elapsed_ms_since(started_us) >= settings.init_timeout_ms {
                break HandshakeState::TimedOut;
            }
            if self.poll_once(link) {
                break HandshakeState::Confirmed;
            }
        };
        self.state = outcome;
        let elapsed_ms = clock.elapsed_ms_since(started_us);

        debug!(
            "[VISION-INIT] Poll cycles after {} ms: {}",
            elapsed_ms, self.counters
        );

        match outcome {
            HandshakeState::Confirmed => {
                info!(
                    "[VISION-INIT] {} is initialized and returning results for pipeline {} (idle)",
                    link.name(),
                    settings.idle_pipeline
                );
                Ok(HandshakeReport {
                    elapsed_ms,
                    counters: self.counters,
                })
            }
            HandshakeState::Cancelled => {
                warn!(
                    "[VISION-INIT] Initialization cancelled after {} ms ({})",
                    elapsed_ms, self.counters
                );
                Err(HandshakeError::Cancelled {
                    counters: self.counters,
                })
            }
            _ => {
                warn!(
                    "[VISION-INIT] {} timed out during initialization after {} ms ({})",
                    link.name(),
                    elapsed_ms,
                    self.counters
                );
                Err(HandshakeError::InitTimedOut {
                    elapsed_ms,
                    counters: self.counters,
                })
            }
        }
    }

    /// One poll cycle; true when the device confirmed idle
    fn poll_once<L: VisionLink + ?Sized>(&mut self, link: &mut L) -> bool {
        match link.status() {
            Some(status) if status.is_live() => {}
            _ => {
                self.counters.no_status += 1;
                return false;
            }
        }

        let Some(result) = link.latest_result() else {
            self.counters.no_result += 1;
            return false;
        };
        let payload = match result.payload() {
            Some(values) if !values.is_empty() => values,
            _ => {
                self.counters.no_output += 1;
                return false;
            }
        };

        match decode(payload) {
            Ok(RecognitionResult::Idle) => true,
            Ok(other) => {
                trace!(
                    "[VISION-INIT] Ignoring status {} while waiting for idle",
                    other.raw_status()
                );
                self.counters.ignored_status += 1;
                false
            }
            Err(e) => {
                trace!("[VISION-INIT] Ignoring malformed payload: {}", e);
                self.counters.malformed += 1;
                false
            }
        }
    }
}
