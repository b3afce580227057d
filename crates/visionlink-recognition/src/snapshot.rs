// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Snapshot labels
//!
//! Every terminal recognition event is tagged `<PREFIX>_<timestamp>` so the on-device image
//! can be matched with the robot log afterwards.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const WALL_CLOCK_FORMAT: &str = "%Y%m%d%H%M%S%3f";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SnapshotKind {
    /// On-device application crashed
    Crash,
    /// Recognition ran but found nothing usable
    RecognitionFailure,
    RecognitionSuccess,
}

impl SnapshotKind {
    pub fn prefix(self) -> &'static str {
        match self {
            SnapshotKind::Crash => "LRC",
            SnapshotKind::RecognitionFailure => "LRF",
            SnapshotKind::RecognitionSuccess => "LRS",
        }
    }

    /// Build a label from the next timestamp of `stamps`
    pub fn label<S: TimestampSource + ?Sized>(self, stamps: &mut S) -> String {
        format!("{}_{}", self.prefix(), stamps.next_timestamp())
    }
}

impl fmt::Display for SnapshotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// Source of the timestamp part of snapshot labels
pub trait TimestampSource {
    fn next_timestamp(&mut self) -> String;
}

impl<S: TimestampSource + ?Sized> TimestampSource for &mut S {
    fn next_timestamp(&mut self) -> String {
        (**self).next_timestamp()
    }
}

/// UTC wall-clock timestamps with millisecond resolution
///
/// UTC never repeats an hour, so labels stay ordered across daylight-saving changes. Two
/// requests inside the same millisecond get a `-<n>` suffix so labels never repeat.
#[derive(Debug, Default)]
pub struct WallClockTimestamps {
    last: Option<String>,
    repeats: u32,
}

impl WallClockTimestamps {
    pub fn new() -> Self {
        Self::default()
    }

    fn format_stamp(at: DateTime<Utc>) -> String {
        at.format(WALL_CLOCK_FORMAT).to_string()
    }

    fn dedupe(&mut self, stamp: String) -> String {
        if self.last.as_deref() == Some(stamp.as_str()) {
            self.repeats += 1;
            return format!("{}-{}", stamp, self.repeats);
        }
        self.repeats = 0;
        self.last = Some(stamp.clone());
        stamp
    }
}

impl TimestampSource for WallClockTimestamps {
    fn next_timestamp(&mut self) -> String {
        let stamp = Self::format_stamp(Utc::now());
        self.dedupe(stamp)
    }
}

/// Deterministic zero-padded counter, for tests and replays
#[derive(Debug, Default, Clone)]
pub struct SequentialTimestamps {
    next: u64,
}

impl SequentialTimestamps {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(next: u64) -> Self {
        Self { next }
    }
}

impl TimestampSource for SequentialTimestamps {
    fn next_timestamp(&mut self) -> String {
        let stamp = format!("{:06}", self.next);
        self.next += 1;
        stamp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefixes() {
        assert_eq!(SnapshotKind::Crash.prefix(), "LRC");
        assert_eq!(SnapshotKind::RecognitionFailure.prefix(), "LRF");
        assert_eq!(SnapshotKind::RecognitionSuccess.prefix(), "LRS");
    }

    #[test]
    fn test_sequential_labels() {
        let mut stamps = SequentialTimestamps::starting_at(7);
        assert_eq!(SnapshotKind::RecognitionSuccess.label(&mut stamps), "LRS_000007");
        assert_eq!(SnapshotKind::Crash.label(&mut stamps), "LRC_000008");
    }

    #[test]
    fn test_wall_clock_dedupes_same_millisecond() {
        let mut stamps = WallClockTimestamps::new();
        assert_eq!(stamps.dedupe("20250101120000123".to_string()), "20250101120000123");
        assert_eq!(stamps.dedupe("20250101120000123".to_string()), "20250101120000123-1");
        assert_eq!(stamps.dedupe("20250101120000123".to_string()), "20250101120000123-2");
        assert_eq!(stamps.dedupe("20250101120000124".to_string()), "20250101120000124");
    }

    #[test]
    fn test_wall_clock_stamps_are_utc() {
        use chrono::{Duration, TimeZone};

        // 01:30 happens twice in America/New_York on this date; in UTC the hours differ
        let first = Utc.with_ymd_and_hms(2025, 11, 2, 5, 30, 0).unwrap();
        let second = first + Duration::hours(1);

        assert_eq!(WallClockTimestamps::format_stamp(first), "20251102053000000");
        assert_eq!(WallClockTimestamps::format_stamp(second), "20251102063000000");
        assert!(
            WallClockTimestamps::format_stamp(first) < WallClockTimestamps::format_stamp(second)
        );
    }

    #[test]
    fn test_wall_clock_labels_are_unique() {
        let mut stamps = WallClockTimestamps::new();
        let labels: std::collections::HashSet<String> = (0..50)
            .map(|_| SnapshotKind::RecognitionFailure.label(&mut stamps))
            .collect();
        assert_eq!(labels.len(), 50);
        assert!(labels.iter().all(|l| l.starts_with("LRF_")));
    }
}
