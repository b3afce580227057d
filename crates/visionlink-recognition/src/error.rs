// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Error types for the recognition core

use serde::Serialize;

use crate::handshake::HandshakeCounters;

/// Malformed payload from the on-device application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
pub enum DecodeError {
    /// Payload had no status element
    #[error("Empty payload")]
    EmptyPayload,

    /// Payload shorter than its status requires
    #[error("Status {status} needs {needed} payload values, got {actual}")]
    Truncated {
        status: i32,
        needed: usize,
        actual: usize,
    },

    /// Sample colour ordinal outside the known colours
    #[error("Sample color ordinal {ordinal} is out of range")]
    InvalidSampleColor { ordinal: i32 },
}

/// Initialization handshake did not confirm an idle device
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HandshakeError {
    /// No idle heartbeat observed within the initialization budget
    #[error("Vision link timed out during initialization after {elapsed_ms} ms ({counters})")]
    InitTimedOut {
        elapsed_ms: u64,
        counters: HandshakeCounters,
    },

    /// Stop was requested while polling
    #[error("Vision link initialization cancelled ({counters})")]
    Cancelled { counters: HandshakeCounters },
}

impl HandshakeError {
    /// Whether the caller may retry the whole handshake
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            HandshakeError::InitTimedOut { .. } | HandshakeError::Cancelled { .. }
        )
    }

    /// Diagnostic counters collected before the handshake gave up
    pub fn counters(&self) -> &HandshakeCounters {
        match self {
            HandshakeError::InitTimedOut { counters, .. } => counters,
            HandshakeError::Cancelled { counters } => counters,
        }
    }
}

/// Fatal setup errors surfaced by the coordinator
#[derive(Debug, thiserror::Error)]
pub enum CoordinatorError {
    /// Device handle missing from the configuration
    #[error("The vision link is not in the configuration")]
    DeviceUnavailable,

    /// Handshake failed; recognition is never attempted on an unconfirmed device
    #[error("Vision link failed to initialize: {0}")]
    Initialization(#[from] HandshakeError),
}
