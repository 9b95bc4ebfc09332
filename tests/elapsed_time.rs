//! Elapsed time decomposition tests for the virtual real-time clock.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: Apache-2.0
//!
use imx_resources::imx::{
    rtc::{ClockCapabilities, ElapsedTime, RealTimeClock, VirtualRealTimeClock},
    timer::CounterSource,
};
use patina::error::EfiError;
use proptest::prelude::*;
use r_efi::efi;

struct Counter {
    ticks: u64,
    frequency_hz: u32,
}

impl CounterSource for Counter {
    fn ticks(&self) -> u64 {
        self.ticks
    }

    fn frequency_hz(&self) -> u32 {
        self.frequency_hz
    }
}

fn clock(ticks: u64, frequency_hz: u32) -> VirtualRealTimeClock<Counter> {
    VirtualRealTimeClock::new(Counter { ticks, frequency_hz }, 0)
}

proptest! {
    #[test]
    fn decomposition_adds_back_up(ticks in any::<u64>(), frequency_hz in 1u32..) {
        let (elapsed, _) = clock(ticks, frequency_hz).read(false).unwrap();

        prop_assert!(elapsed.hour < 24);
        prop_assert!(elapsed.minute < 60);
        prop_assert!(elapsed.second < 60);
        prop_assert_eq!(
            elapsed.day * 86_400 + elapsed.hour as u64 * 3_600 + elapsed.minute as u64 * 60 + elapsed.second as u64,
            ticks / frequency_hz as u64
        );
    }

    #[test]
    fn firmware_time_never_has_a_date(ticks in any::<u64>(), frequency_hz in 1u32..) {
        let mut time = efi::Time {
            year: 2024,
            month: 6,
            day: 0,
            hour: 0,
            minute: 0,
            second: 0,
            pad1: 0,
            nanosecond: 5,
            timezone: 0,
            daylight: 0,
            pad2: 0,
        };

        prop_assert_eq!(clock(ticks, frequency_hz).get_time(&mut time, None), Ok(()));
        prop_assert_eq!(time.year, 0);
        prop_assert_eq!(time.month, 0);
        prop_assert_eq!(time.nanosecond, 0);
    }

    #[test]
    fn capabilities_report_the_frequency(frequency_hz in 1u32..) {
        let (_, capabilities) = clock(0, frequency_hz).read(true).unwrap();

        prop_assert_eq!(capabilities, Some(ClockCapabilities::for_frequency(frequency_hz)));
    }

    #[test]
    fn zero_frequency_always_fails(ticks in any::<u64>()) {
        prop_assert_eq!(clock(ticks, 0).read(true), Err(EfiError::DeviceError));
    }
}

#[test]
fn one_day_one_hour_one_minute_one_second() {
    let (elapsed, _) = clock(90_061, 1).read(false).unwrap();

    assert_eq!(elapsed, ElapsedTime { day: 1, hour: 1, minute: 1, second: 1 });
}

#[test]
fn counter_start_is_zero() {
    let (elapsed, _) = clock(0, 19_200_000).read(false).unwrap();

    assert_eq!(elapsed, ElapsedTime { day: 0, hour: 0, minute: 0, second: 0 });
}
