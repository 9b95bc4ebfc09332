//! i.MX Virtual Real-Time Clock
//!
//! Implements the UEFI real-time clock services on top of the architectural performance counter.
//!
//! This clock is NOT a replacement for a hardware RTC and does not measure date or time of day. It reports the time
//! elapsed since the counter started, decomposed into days, hours, minutes and seconds, and is only meaningful for
//! measuring relative time between two readings (e.g. by an OS boot manager). Year and month are always reported as
//! zero since no calendar or leap-year logic exists here.
//!
//! The counter eventually wraps around. For a 64-bit counter running at 19.2 MHz this happens after roughly 30 000
//! years, which is treated as an operating bound and not checked.
//!
//! Setting the time, and the wakeup alarm, are not supported: there is no backing store to persist a write and no
//! alarm hardware is modeled.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: Apache-2.0
//!
use core::{ffi::c_void, fmt};

use patina::error::{EfiError, Result};
use r_efi::efi;

use crate::imx::timer::CounterSource;

const SECONDS_PER_MINUTE: u64 = 60;
const SECONDS_PER_HOUR: u64 = 60 * SECONDS_PER_MINUTE;
const SECONDS_PER_DAY: u64 = 24 * SECONDS_PER_HOUR;

/// Time elapsed since the counter started.
///
/// This is a duration and not a calendar date. `day` is an unbounded counter.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ElapsedTime {
    pub day: u64,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl ElapsedTime {
    /// Decomposes a number of elapsed seconds into days, hours, minutes and seconds.
    pub const fn from_seconds(elapsed_seconds: u64) -> Self {
        let mut remaining = elapsed_seconds;

        let day = remaining / SECONDS_PER_DAY;
        remaining %= SECONDS_PER_DAY;

        let hour = remaining / SECONDS_PER_HOUR;
        remaining %= SECONDS_PER_HOUR;

        let minute = remaining / SECONDS_PER_MINUTE;
        remaining %= SECONDS_PER_MINUTE;

        Self { day, hour: hour as u8, minute: minute as u8, second: remaining as u8 }
    }

    /// Converts the reading back into a number of seconds.
    pub const fn as_seconds(&self) -> u64 {
        self.day * SECONDS_PER_DAY
            + self.hour as u64 * SECONDS_PER_HOUR
            + self.minute as u64 * SECONDS_PER_MINUTE
            + self.second as u64
    }

    /// Always `0`, no calendar is kept.
    pub const fn year(&self) -> u16 {
        0
    }

    /// Always `0`, no calendar is kept.
    pub const fn month(&self) -> u8 {
        0
    }

    /// Always `0`, readings have a resolution of one second.
    pub const fn nanosecond(&self) -> u32 {
        0
    }
}

impl fmt::Display for ElapsedTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Day{} {}h:{}m:{}s", self.day, self.hour, self.minute, self.second)
    }
}

/// Converts the reading into the firmware time format.
///
/// The firmware day field is 8 bits wide, so `day` is truncated. Year, month, nanosecond, time zone and daylight are
/// all zero.
impl From<ElapsedTime> for efi::Time {
    fn from(elapsed: ElapsedTime) -> Self {
        efi::Time {
            year: elapsed.year(),
            month: elapsed.month(),
            day: elapsed.day as u8,
            hour: elapsed.hour,
            minute: elapsed.minute,
            second: elapsed.second,
            pad1: 0,
            nanosecond: elapsed.nanosecond(),
            timezone: 0,
            daylight: 0,
            pad2: 0,
        }
    }
}

/// Time-keeping capabilities of the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockCapabilities {
    /// Reporting resolution in counts per second, i.e. the counter frequency.
    pub resolution: u32,
    /// Accuracy in parts per million; `0` as it is unknown.
    pub accuracy: u32,
    /// Whether setting the time clears the sub-second part. Never, as the time cannot be set.
    pub sets_to_zero: bool,
}

impl ClockCapabilities {
    /// Capabilities of a clock driven by a counter running at `frequency_hz`.
    pub const fn for_frequency(frequency_hz: u32) -> Self {
        Self { resolution: frequency_hz, accuracy: 0, sets_to_zero: false }
    }
}

impl From<ClockCapabilities> for efi::TimeCapabilities {
    fn from(capabilities: ClockCapabilities) -> Self {
        efi::TimeCapabilities {
            resolution: capabilities.resolution,
            accuracy: capabilities.accuracy,
            sets_to_zero: capabilities.sets_to_zero.into(),
        }
    }
}

/// The real-time clock service contract.
///
/// Mirrors the time services of the UEFI runtime services table so that any implementation, virtual or backed by RTC
/// hardware, can be installed behind it without callers being aware of the difference.
pub trait RealTimeClock: Sync {
    /// Prepares the clock for use.
    fn initialize(&self) -> Result<()>;

    /// Reads the current time, and the clock's capabilities when `capabilities` is supplied.
    ///
    /// Nothing is written when an error is returned.
    fn get_time(&self, time: &mut efi::Time, capabilities: Option<&mut efi::TimeCapabilities>) -> Result<()>;

    /// Sets the current time.
    fn set_time(&self, time: Option<&efi::Time>) -> Result<()>;

    /// Reads the wakeup alarm setting.
    fn get_wakeup_time(
        &self,
        enabled: Option<&mut bool>,
        pending: Option<&mut bool>,
        time: Option<&mut efi::Time>,
    ) -> Result<()>;

    /// Arms or disarms the wakeup alarm.
    fn set_wakeup_time(&self, enabled: bool, time: Option<&efi::Time>) -> Result<()>;

    /// Converts any pointers held by the clock for use after the switch to virtual addressing.
    fn virtual_address_change(&self, event: efi::Event, context: *mut c_void);
}

/// A read-only clock that reports the time elapsed since the counter started.
///
/// The clock keeps no state of its own besides the counter it reads and the platform configured frequency; every
/// reading is computed from scratch.
#[derive(Debug)]
pub struct VirtualRealTimeClock<C> {
    counter: C,
    configured_frequency_hz: u32,
}

impl<C> VirtualRealTimeClock<C> {
    /// Creates a clock reading from `counter`.
    ///
    /// When `configured_frequency_hz` is non-zero it is used as the counter frequency, otherwise the frequency
    /// reported by the counter hardware is used.
    pub const fn new(counter: C, configured_frequency_hz: u32) -> Self {
        Self { counter, configured_frequency_hz }
    }
}

impl<C: CounterSource> VirtualRealTimeClock<C> {
    /// Resolves the counter frequency.
    ///
    /// Returns [`EfiError::DeviceError`] when the resolved frequency is zero.
    pub fn frequency_hz(&self) -> Result<u32> {
        let frequency_hz = match self.configured_frequency_hz {
            0 => self.counter.frequency_hz(),
            configured => configured,
        };

        if frequency_hz == 0 {
            log::error!("VirtualRealTimeClock: counter frequency is zero");
            return Err(EfiError::DeviceError);
        }

        Ok(frequency_hz)
    }

    /// Returns the time elapsed since the counter started, and the clock capabilities if requested.
    pub fn read(&self, capabilities_requested: bool) -> Result<(ElapsedTime, Option<ClockCapabilities>)> {
        let frequency_hz = self.frequency_hz()?;

        let elapsed = ElapsedTime::from_seconds(self.counter.ticks() / u64::from(frequency_hz));
        log::trace!("VirtualRealTimeClock: Time Elapsed Since Power-On: {elapsed}");

        let capabilities = capabilities_requested.then(|| ClockCapabilities::for_frequency(frequency_hz));
        Ok((elapsed, capabilities))
    }
}

impl<C: CounterSource> RealTimeClock for VirtualRealTimeClock<C> {
    fn initialize(&self) -> Result<()> {
        // The architectural timer is already running by the time this service is started.
        Ok(())
    }

    fn get_time(&self, time: &mut efi::Time, capabilities: Option<&mut efi::TimeCapabilities>) -> Result<()> {
        let (elapsed, clock_capabilities) = self.read(capabilities.is_some())?;

        if let (Some(capabilities), Some(clock_capabilities)) = (capabilities, clock_capabilities) {
            *capabilities = clock_capabilities.into();
        }
        *time = elapsed.into();

        Ok(())
    }

    fn set_time(&self, _time: Option<&efi::Time>) -> Result<()> {
        Err(EfiError::Unsupported)
    }

    fn get_wakeup_time(
        &self,
        _enabled: Option<&mut bool>,
        _pending: Option<&mut bool>,
        _time: Option<&mut efi::Time>,
    ) -> Result<()> {
        Err(EfiError::Unsupported)
    }

    fn set_wakeup_time(&self, _enabled: bool, _time: Option<&efi::Time>) -> Result<()> {
        Err(EfiError::Unsupported)
    }

    fn virtual_address_change(&self, _event: efi::Event, _context: *mut c_void) {
        // No pointers are held across calls, so there is nothing to convert.
    }
}
