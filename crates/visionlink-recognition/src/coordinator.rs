// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Session coordinator
//!
//! Entry point used by robot code: handshake once, run one or more recognition sessions,
//! then stop the device. The link is stopped on every exit path, including drop.

use tracing::{error, info};
use visionlink_hal::{TimeProvider, VisionLink};

use crate::cancellation::CancellationToken;
use crate::error::CoordinatorError;
use crate::handshake::{HandshakeReport, InitializationHandshake};
use crate::session::{PollingOutcome, RecognitionSession};
use crate::settings::RecognitionSettings;
use crate::snapshot::TimestampSource;
use crate::types::AllianceSelector;

/// Owns a confirmed, running link
///
/// Pass `&mut link` as `L` to keep the link after the coordinator is gone.
pub struct SessionCoordinator<L: VisionLink, T: TimeProvider, S: TimestampSource> {
    link: L,
    clock: T,
    stamps: S,
    settings: RecognitionSettings,
    handshake: HandshakeReport,
    stopped: bool,
}

impl<L: VisionLink, T: TimeProvider, S: TimestampSource> SessionCoordinator<L, T, S> {
    /// Run the initialization handshake on `link`
    ///
    /// Fails with [`CoordinatorError::DeviceUnavailable`] before touching anything when no
    /// link is configured. A failed handshake stops the link before returning.
    pub fn start(
        link: Option<L>,
        clock: T,
        stamps: S,
        settings: RecognitionSettings,
        cancel: &CancellationToken,
    ) -> Result<Self, CoordinatorError> {
        let Some(mut link) = link else {
            error!("[VISION-COORDINATOR] The vision link is not in the configuration");
            return Err(CoordinatorError::DeviceUnavailable);
        };

        let mut handshake = InitializationHandshake::new();
        match handshake.run(&mut link, &clock, &settings, cancel) {
            Ok(report) => Ok(Self {
                link,
                clock,
                stamps,
                settings,
                handshake: report,
                stopped: false,
            }),
            Err(e) => {
                error!("[VISION-COORDINATOR] {}", e);
                link.stop();
                Err(CoordinatorError::Initialization(e))
            }
        }
    }

    pub fn handshake_report(&self) -> &HandshakeReport {
        &self.handshake
    }

    pub fn settings(&self) -> &RecognitionSettings {
        &self.settings
    }

    pub fn link(&self) -> &L {
        &self.link
    }

    /// Run one recognition session for `alliance`
    pub fn recognize(
        &mut self,
        alliance: AllianceSelector,
        cancel: &CancellationToken,
    ) -> PollingOutcome {
        let outcome = RecognitionSession::new(alliance).run(
            &mut self.link,
            &self.clock,
            &mut self.stamps,
            &self.settings,
            cancel,
        );
        if !outcome.succeeded() {
            info!(
                "[VISION-COORDINATOR] {} timed out during recognition \
                 or failed to find a sample to pick up",
                self.link.name()
            );
        }
        outcome
    }

    /// Stop the link
    pub fn shutdown(mut self) {
        self.stop_link();
    }

    fn stop_link(&mut self) {
        if !self.stopped {
            info!("[VISION-COORDINATOR] Stopping {}", self.link.name());
            self.link.stop();
            self.stopped = true;
        }
    }
}

impl<L: VisionLink, T: TimeProvider, S: TimestampSource> Drop for SessionCoordinator<L, T, S> {
    fn drop(&mut self) {
        self.stop_link();
    }
}

/// Handshake, recognize once for `alliance`, stop
pub fn run_recognition<L, T, S>(
    link: Option<L>,
    clock: T,
    stamps: S,
    settings: RecognitionSettings,
    alliance: AllianceSelector,
    cancel: &CancellationToken,
) -> Result<PollingOutcome, CoordinatorError>
where
    L: VisionLink,
    T: TimeProvider,
    S: TimestampSource,
{
    let mut coordinator = SessionCoordinator::start(link, clock, stamps, settings, cancel)?;
    let outcome = coordinator.recognize(alliance, cancel);
    coordinator.shutdown();
    Ok(outcome)
}
