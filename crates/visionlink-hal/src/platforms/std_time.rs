// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use std::thread;
use std::time::{Duration, Instant};

use crate::hal::TimeProvider;

/// Monotonic clock for hosted targets
#[derive(Debug, Clone, Copy)]
pub struct StdTimeProvider {
    origin: Instant,
}

impl StdTimeProvider {
    /// Create a clock whose origin is "now"
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for StdTimeProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeProvider for StdTimeProvider {
    fn get_time_us(&self) -> u64 {
        self.origin.elapsed().as_micros() as u64
    }

    fn delay_us(&self, us: u64) {
        thread::sleep(Duration::from_micros(us));
    }
}
