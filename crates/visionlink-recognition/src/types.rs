// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Data model shared by the decoder, handshake and recognition session

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Target colour context pushed to the recognition pipeline
///
/// The device receives the ordinal (0, 1, 2) as its single input parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AllianceSelector {
    None,
    Blue,
    Red,
}

impl AllianceSelector {
    pub const ALL: [AllianceSelector; 3] = [
        AllianceSelector::None,
        AllianceSelector::Blue,
        AllianceSelector::Red,
    ];

    pub fn ordinal(self) -> u8 {
        match self {
            AllianceSelector::None => 0,
            AllianceSelector::Blue => 1,
            AllianceSelector::Red => 2,
        }
    }

    /// Input parameter vector for this selector
    pub fn as_inputs(self) -> [f64; 1] {
        [f64::from(self.ordinal())]
    }
}

impl fmt::Display for AllianceSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AllianceSelector::None => "NONE",
            AllianceSelector::Blue => "BLUE",
            AllianceSelector::Red => "RED",
        };
        f.write_str(name)
    }
}

impl FromStr for AllianceSelector {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "NONE" => Ok(AllianceSelector::None),
            "BLUE" => Ok(AllianceSelector::Blue),
            "RED" => Ok(AllianceSelector::Red),
            other => Err(format!("Unknown alliance '{}' (expected NONE, BLUE or RED)", other)),
        }
    }
}

/// Colour of the sample the device selected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SampleColor {
    Blue,
    Red,
    Yellow,
    NotFound,
}

impl SampleColor {
    /// Map a wire ordinal to a colour; `None` if out of range
    pub fn from_ordinal(ordinal: i32) -> Option<Self> {
        match ordinal {
            0 => Some(SampleColor::Blue),
            1 => Some(SampleColor::Red),
            2 => Some(SampleColor::Yellow),
            3 => Some(SampleColor::NotFound),
            _ => None,
        }
    }
}

impl fmt::Display for SampleColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SampleColor::Blue => "BLUE",
            SampleColor::Red => "RED",
            SampleColor::Yellow => "YELLOW",
            SampleColor::NotFound => "NOT_FOUND",
        };
        f.write_str(name)
    }
}

/// Status codes reported by the on-device application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum StatusCode {
    Success = 200,
    AppCrash = 300,
    IdleLoop = 400,
    ImageNotAvailable = 450,
    RecognitionFailure = 500,
}

impl StatusCode {
    /// Wire value
    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            200 => Some(StatusCode::Success),
            300 => Some(StatusCode::AppCrash),
            400 => Some(StatusCode::IdleLoop),
            450 => Some(StatusCode::ImageNotAvailable),
            500 => Some(StatusCode::RecognitionFailure),
            _ => None,
        }
    }
}

/// Decoded device result
///
/// Each variant carries exactly the fields its status defines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RecognitionResult {
    /// 200
    Success {
        selected_sample_color: SampleColor,
        angle_degrees: f64,
        center_x: i32,
        center_y: i32,
    },
    /// 500
    Failure { selected_sample_color: SampleColor },
    /// 300
    Crash { crash_line_number: i32 },
    /// 400
    Idle,
    /// 450
    ImageNotAvailable,
    /// Any status outside the known codes
    Unexpected { status: i32 },
}

impl RecognitionResult {
    /// Raw wire status this result was decoded from
    pub fn raw_status(&self) -> i32 {
        match self {
            RecognitionResult::Success { .. } => StatusCode::Success.code(),
            RecognitionResult::Failure { .. } => StatusCode::RecognitionFailure.code(),
            RecognitionResult::Crash { .. } => StatusCode::AppCrash.code(),
            RecognitionResult::Idle => StatusCode::IdleLoop.code(),
            RecognitionResult::ImageNotAvailable => StatusCode::ImageNotAvailable.code(),
            RecognitionResult::Unexpected { status } => *status,
        }
    }

    /// Known status, or `None` for [`RecognitionResult::Unexpected`]
    pub fn status(&self) -> Option<StatusCode> {
        StatusCode::from_code(self.raw_status())
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RecognitionResult::Success { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alliance_ordinals() {
        let ordinals: Vec<u8> = AllianceSelector::ALL.iter().map(|a| a.ordinal()).collect();
        assert_eq!(ordinals, vec![0, 1, 2]);
        assert_eq!(AllianceSelector::Red.as_inputs(), [2.0]);
    }

    #[test]
    fn test_alliance_parse_is_case_insensitive() {
        assert_eq!("red".parse::<AllianceSelector>(), Ok(AllianceSelector::Red));
        assert_eq!("Blue".parse::<AllianceSelector>(), Ok(AllianceSelector::Blue));
        assert!("green".parse::<AllianceSelector>().is_err());
    }

    #[test]
    fn test_sample_color_ordinals() {
        assert_eq!(SampleColor::from_ordinal(1), Some(SampleColor::Red));
        assert_eq!(SampleColor::from_ordinal(3), Some(SampleColor::NotFound));
        assert_eq!(SampleColor::from_ordinal(4), None);
        assert_eq!(SampleColor::from_ordinal(-1), None);
    }

    #[test]
    fn test_status_code_round_trip() {
        for code in [200, 300, 400, 450, 500] {
            assert_eq!(StatusCode::from_code(code).map(StatusCode::code), Some(code));
        }
        assert_eq!(StatusCode::from_code(404), None);
    }

    #[test]
    fn test_unexpected_keeps_raw_status() {
        let result = RecognitionResult::Unexpected { status: 404 };
        assert_eq!(result.raw_status(), 404);
        assert_eq!(result.status(), None);
    }

    #[test]
    fn test_result_serializes_with_outcome_tag() {
        let result = RecognitionResult::Failure {
            selected_sample_color: SampleColor::NotFound,
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["outcome"], "failure");
        assert_eq!(json["selected_sample_color"], "NOT_FOUND");
    }
}
