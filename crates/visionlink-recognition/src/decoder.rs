// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Payload decoder
//!
//! Wire layout (all elements are `f64`):
//!
//! ```text
//! index:   0        1              2       3         4
//! 200:   status   color ordinal   angle   center_x  center_y
//! 500:   status   color ordinal
//! 300:   status   crash line
//! 400:   status
//! 450:   status
//! ```
//!
//! Integers are truncated toward zero. Trailing elements beyond what a status defines are ignored.

use crate::error::DecodeError;
use crate::types::{RecognitionResult, SampleColor, StatusCode};

/// Decode one result payload
pub fn decode(payload: &[f64]) -> Result<RecognitionResult, DecodeError> {
    let Some(&first) = payload.first() else {
        return Err(DecodeError::EmptyPayload);
    };
    let status = truncate(first);

    let require = |needed: usize| {
        if payload.len() < needed {
            Err(DecodeError::Truncated {
                status,
                needed,
                actual: payload.len(),
            })
        } else {
            Ok(())
        }
    };

    match StatusCode::from_code(status) {
        Some(StatusCode::IdleLoop) => Ok(RecognitionResult::Idle),
        Some(StatusCode::ImageNotAvailable) => Ok(RecognitionResult::ImageNotAvailable),
        Some(StatusCode::AppCrash) => {
            require(2)?;
            Ok(RecognitionResult::Crash {
                crash_line_number: truncate(payload[1]),
            })
        }
        Some(StatusCode::RecognitionFailure) => {
            require(2)?;
            Ok(RecognitionResult::Failure {
                selected_sample_color: sample_color(payload[1])?,
            })
        }
        Some(StatusCode::Success) => {
            require(5)?;
            Ok(RecognitionResult::Success {
                selected_sample_color: sample_color(payload[1])?,
                angle_degrees: payload[2],
                center_x: truncate(payload[3]),
                center_y: truncate(payload[4]),
            })
        }
        None => Ok(RecognitionResult::Unexpected { status }),
    }
}

// Saturating, NaN maps to 0
fn truncate(value: f64) -> i32 {
    value as i32
}

fn sample_color(value: f64) -> Result<SampleColor, DecodeError> {
    let ordinal = truncate(value);
    SampleColor::from_ordinal(ordinal).ok_or(DecodeError::InvalidSampleColor { ordinal })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_success() {
        let result = decode(&[200.0, 1.0, 37.5, 120.0, 80.0]).unwrap();
        assert_eq!(
            result,
            RecognitionResult::Success {
                selected_sample_color: SampleColor::Red,
                angle_degrees: 37.5,
                center_x: 120,
                center_y: 80,
            }
        );
    }

    #[test]
    fn test_decode_success_keeps_negative_centre_and_raw_angle() {
        let result = decode(&[200.0, 2.0, -450.25, -12.9, -0.5]).unwrap();
        assert_eq!(
            result,
            RecognitionResult::Success {
                selected_sample_color: SampleColor::Yellow,
                angle_degrees: -450.25,
                center_x: -12,
                center_y: 0,
            }
        );
    }

    #[test]
    fn test_decode_success_invalid_color() {
        assert_eq!(
            decode(&[200.0, 7.0, 0.0, 0.0, 0.0]),
            Err(DecodeError::InvalidSampleColor { ordinal: 7 })
        );
    }

    #[test]
    fn test_decode_success_truncated() {
        assert_eq!(
            decode(&[200.0, 1.0, 37.5]),
            Err(DecodeError::Truncated {
                status: 200,
                needed: 5,
                actual: 3
            })
        );
    }

    #[test]
    fn test_decode_failure() {
        assert_eq!(
            decode(&[500.0, 3.0]).unwrap(),
            RecognitionResult::Failure {
                selected_sample_color: SampleColor::NotFound
            }
        );
        assert_eq!(
            decode(&[500.0, -1.0]),
            Err(DecodeError::InvalidSampleColor { ordinal: -1 })
        );
    }

    #[test]
    fn test_decode_crash_ignores_trailing_values() {
        assert_eq!(
            decode(&[300.0, 42.0]).unwrap(),
            RecognitionResult::Crash {
                crash_line_number: 42
            }
        );
        assert_eq!(
            decode(&[300.0, 42.7, 1.0, 99.0, 5.0]).unwrap(),
            RecognitionResult::Crash {
                crash_line_number: 42
            }
        );
        assert!(matches!(
            decode(&[300.0]),
            Err(DecodeError::Truncated { status: 300, .. })
        ));
    }

    #[test]
    fn test_decode_idle_and_no_image_read_nothing_else() {
        assert_eq!(decode(&[400.0]).unwrap(), RecognitionResult::Idle);
        // Idle pipeline reports the alliance it was given; it is not part of the result
        assert_eq!(decode(&[400.0, 0.0]).unwrap(), RecognitionResult::Idle);
        assert_eq!(
            decode(&[450.0, f64::NAN]).unwrap(),
            RecognitionResult::ImageNotAvailable
        );
    }

    #[test]
    fn test_decode_status_truncates_toward_zero() {
        assert_eq!(decode(&[400.9]).unwrap(), RecognitionResult::Idle);
        assert_eq!(
            decode(&[-200.5]).unwrap(),
            RecognitionResult::Unexpected { status: -200 }
        );
    }

    #[test]
    fn test_decode_unexpected_status() {
        assert_eq!(
            decode(&[404.0, 1.0, 2.0]).unwrap(),
            RecognitionResult::Unexpected { status: 404 }
        );
        assert_eq!(
            decode(&[f64::NAN]).unwrap(),
            RecognitionResult::Unexpected { status: 0 }
        );
    }

    #[test]
    fn test_decode_empty() {
        assert_eq!(decode(&[]), Err(DecodeError::EmptyPayload));
    }
}
