// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/// Time and delay abstraction for the polling loops
///
/// Deadlines in the handshake and recognition loops are measured against this clock,
/// never against ambient wall-clock state, so tests can drive time explicitly.
pub trait TimeProvider {
    /// Get current time in microseconds from an arbitrary monotonic origin
    ///
    /// # Returns
    /// Monotonic timestamp in microseconds
    fn get_time_us(&self) -> u64;

    /// Block for the specified number of microseconds
    ///
    /// # Arguments
    /// * `us` - Microseconds to delay
    fn delay_us(&self, us: u64);

    /// Block for the specified number of milliseconds
    ///
    /// # Arguments
    /// * `ms` - Milliseconds to delay
    fn delay_ms(&self, ms: u64) {
        self.delay_us(ms.saturating_mul(1000));
    }

    /// Current time in whole milliseconds
    fn get_time_ms(&self) -> u64 {
        self.get_time_us() / 1000
    }

    /// Milliseconds elapsed since `start_us` (a value previously returned by `get_time_us`)
    fn elapsed_ms_since(&self, start_us: u64) -> u64 {
        self.get_time_us().saturating_sub(start_us) / 1000
    }
}

impl<T: TimeProvider + ?Sized> TimeProvider for &T {
    fn get_time_us(&self) -> u64 {
        (**self).get_time_us()
    }

    fn delay_us(&self, us: u64) {
        (**self).delay_us(us)
    }
}
