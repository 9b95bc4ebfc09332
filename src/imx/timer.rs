//! i.MX Architectural Counter
//!
//! This module provides the counter abstraction consumed by the virtual real-time clock. On the platform it is backed
//! by the core's architectural timer service through the real-time clock component.
//!
//! The counter is started by earlier boot phases. Nothing here programs the timer, it is only ever read.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: Apache-2.0
//!

/// A free-running, monotonically increasing hardware counter.
///
/// Both reads are treated as infallible reads of hardware state and may be performed concurrently by any number of
/// consumers.
pub trait CounterSource: Send + Sync {
    /// Current value of the counter (ticks).
    fn ticks(&self) -> u64;
    /// Value in Hz of how often the counter increments, as reported by the hardware.
    fn frequency_hz(&self) -> u32;
}

impl<T: CounterSource + ?Sized> CounterSource for &T {
    fn ticks(&self) -> u64 {
        (**self).ticks()
    }

    fn frequency_hz(&self) -> u32 {
        (**self).frequency_hz()
    }
}

/// Narrows a performance counter frequency to the 32-bit resolution the clock reports.
///
/// Frequencies that do not fit saturate at `u32::MAX`.
pub const fn frequency_hz_from_perf(perf_frequency: u64) -> u32 {
    if perf_frequency > u32::MAX as u64 { u32::MAX } else { perf_frequency as u32 }
}

/// A counter frozen at a fixed tick value.
#[cfg(test)]
#[derive(Debug, Clone, Copy)]
pub(crate) struct FixedCounter {
    ticks: u64,
    frequency_hz: u32,
}

#[cfg(test)]
impl FixedCounter {
    pub(crate) const fn new(ticks: u64, frequency_hz: u32) -> Self {
        Self { ticks, frequency_hz }
    }
}

#[cfg(test)]
impl CounterSource for FixedCounter {
    fn ticks(&self) -> u64 {
        self.ticks
    }

    fn frequency_hz(&self) -> u32 {
        self.frequency_hz
    }
}
