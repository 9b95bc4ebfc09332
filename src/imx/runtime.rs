//! i.MX Real-Time Clock Runtime Services
//!
//! Raw firmware entry points for the time services of the UEFI runtime services table, and their installation into
//! that table.
//!
//! The entry points are generic over a [`ClockInstance`], the process-wide clock they forward to. They translate the
//! raw pointer arguments into references, map a missing time buffer to `EFI_INVALID_PARAMETER`, and map
//! [`EfiError`](patina::error::EfiError) results onto UEFI status codes. Output buffers are only written on success.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: Apache-2.0
//!
use core::ffi::c_void;

use patina::error::Result;
use r_efi::efi;

use crate::imx::rtc::RealTimeClock;

/// A clock that lives for the whole firmware lifetime and can back the runtime services table.
pub trait ClockInstance: 'static {
    type Clock: RealTimeClock + 'static;

    /// Returns the clock the runtime services forward to.
    fn clock() -> &'static Self::Clock;
}

fn status(result: Result<()>) -> efi::Status {
    match result {
        Ok(()) => efi::Status::SUCCESS,
        Err(err) => err.into(),
    }
}

/// `GetTime()` runtime service.
pub extern "efiapi" fn get_time<P: ClockInstance>(
    time: *mut efi::Time,
    capabilities: *mut efi::TimeCapabilities,
) -> efi::Status {
    // SAFETY: The caller passes either null or a pointer to writable storage for each argument.
    let (time, capabilities) = unsafe { (time.as_mut(), capabilities.as_mut()) };

    let Some(time) = time else {
        return efi::Status::INVALID_PARAMETER;
    };

    status(P::clock().get_time(time, capabilities))
}

/// `SetTime()` runtime service.
pub extern "efiapi" fn set_time<P: ClockInstance>(time: *mut efi::Time) -> efi::Status {
    // SAFETY: The caller passes either null or a pointer to a valid time.
    let time = unsafe { time.as_ref() };

    status(P::clock().set_time(time))
}

/// `GetWakeupTime()` runtime service.
pub extern "efiapi" fn get_wakeup_time<P: ClockInstance>(
    enabled: *mut efi::Boolean,
    pending: *mut efi::Boolean,
    time: *mut efi::Time,
) -> efi::Status {
    // SAFETY: The caller passes either null or a pointer to writable storage for each argument.
    let (enabled, pending, time) = unsafe { (enabled.as_mut(), pending.as_mut(), time.as_mut()) };

    let mut alarm_enabled = false;
    let mut alarm_pending = false;
    let result = P::clock().get_wakeup_time(
        enabled.is_some().then_some(&mut alarm_enabled),
        pending.is_some().then_some(&mut alarm_pending),
        time,
    );

    if result.is_ok() {
        if let Some(enabled) = enabled {
            *enabled = alarm_enabled.into();
        }
        if let Some(pending) = pending {
            *pending = alarm_pending.into();
        }
    }

    status(result)
}

/// `SetWakeupTime()` runtime service.
pub extern "efiapi" fn set_wakeup_time<P: ClockInstance>(enabled: efi::Boolean, time: *mut efi::Time) -> efi::Status {
    // SAFETY: The caller passes either null or a pointer to a valid time.
    let time = unsafe { time.as_ref() };

    status(P::clock().set_wakeup_time(enabled.into(), time))
}

/// Notification function for the virtual address change event.
pub extern "efiapi" fn virtual_address_change<P: ClockInstance>(event: efi::Event, context: *mut c_void) {
    P::clock().virtual_address_change(event, context);
}

/// Initializes the clock and points the time services of `runtime_services` at it.
///
/// The caller is responsible for refreshing the table header CRC afterwards.
pub fn install<P: ClockInstance>(runtime_services: &mut efi::RuntimeServices) -> Result<()> {
    P::clock().initialize()?;

    runtime_services.get_time = get_time::<P>;
    runtime_services.set_time = set_time::<P>;
    runtime_services.get_wakeup_time = get_wakeup_time::<P>;
    runtime_services.set_wakeup_time = set_wakeup_time::<P>;

    log::debug!("Real-time clock services installed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use core::{mem, ptr};

    use super::*;
    use crate::imx::{rtc::VirtualRealTimeClock, timer::FixedCounter};

    struct RunningClock;

    static RUNNING_CLOCK: VirtualRealTimeClock<FixedCounter> =
        VirtualRealTimeClock::new(FixedCounter::new(90_061 * 1000, 1000), 0);

    impl ClockInstance for RunningClock {
        type Clock = VirtualRealTimeClock<FixedCounter>;

        fn clock() -> &'static Self::Clock {
            &RUNNING_CLOCK
        }
    }

    struct BrokenClock;

    static BROKEN_CLOCK: VirtualRealTimeClock<FixedCounter> = VirtualRealTimeClock::new(FixedCounter::new(500, 0), 0);

    impl ClockInstance for BrokenClock {
        type Clock = VirtualRealTimeClock<FixedCounter>;

        fn clock() -> &'static Self::Clock {
            &BROKEN_CLOCK
        }
    }

    fn sentinel_time() -> efi::Time {
        efi::Time {
            year: 1999,
            month: 12,
            day: 31,
            hour: 23,
            minute: 59,
            second: 58,
            pad1: 0,
            nanosecond: 1,
            timezone: 60,
            daylight: 1,
            pad2: 0,
        }
    }

    #[test]
    fn get_time_without_time_buffer_is_invalid() {
        let mut capabilities = efi::TimeCapabilities { resolution: 0, accuracy: 0, sets_to_zero: false.into() };

        assert_eq!(get_time::<RunningClock>(ptr::null_mut(), ptr::null_mut()), efi::Status::INVALID_PARAMETER);
        assert_eq!(get_time::<RunningClock>(ptr::null_mut(), &mut capabilities), efi::Status::INVALID_PARAMETER);
        assert_eq!(capabilities.resolution, 0);
    }

    #[test]
    fn get_time_reports_elapsed_time() {
        let mut time = sentinel_time();

        assert_eq!(get_time::<RunningClock>(&mut time, ptr::null_mut()), efi::Status::SUCCESS);
        assert_eq!((time.year, time.month, time.day), (0, 0, 1));
        assert_eq!((time.hour, time.minute, time.second), (1, 1, 1));
        assert_eq!(time.nanosecond, 0);
    }

    #[test]
    fn get_time_reports_capabilities_when_asked() {
        let mut time = sentinel_time();
        let mut capabilities = efi::TimeCapabilities { resolution: 0, accuracy: 9, sets_to_zero: true.into() };

        assert_eq!(get_time::<RunningClock>(&mut time, &mut capabilities), efi::Status::SUCCESS);
        assert_eq!(capabilities.resolution, 1000);
        assert_eq!(capabilities.accuracy, 0);
        assert!(!bool::from(capabilities.sets_to_zero));
    }

    #[test]
    fn get_time_with_zero_frequency_is_device_error() {
        let mut time = sentinel_time();

        assert_eq!(get_time::<BrokenClock>(&mut time, ptr::null_mut()), efi::Status::DEVICE_ERROR);
        assert_eq!(time.year, 1999);
        assert_eq!(time.second, 58);
    }

    #[test]
    fn mutating_services_are_unsupported() {
        let mut time = sentinel_time();
        let mut enabled: efi::Boolean = true.into();
        let mut pending: efi::Boolean = true.into();

        assert_eq!(set_time::<RunningClock>(ptr::null_mut()), efi::Status::UNSUPPORTED);
        assert_eq!(set_time::<RunningClock>(&mut time), efi::Status::UNSUPPORTED);
        assert_eq!(
            get_wakeup_time::<RunningClock>(ptr::null_mut(), ptr::null_mut(), ptr::null_mut()),
            efi::Status::UNSUPPORTED
        );
        assert_eq!(get_wakeup_time::<RunningClock>(&mut enabled, &mut pending, &mut time), efi::Status::UNSUPPORTED);
        assert_eq!(set_wakeup_time::<RunningClock>(true.into(), &mut time), efi::Status::UNSUPPORTED);
        assert_eq!(set_wakeup_time::<BrokenClock>(false.into(), ptr::null_mut()), efi::Status::UNSUPPORTED);

        assert!(bool::from(enabled));
        assert!(bool::from(pending));
        assert_eq!(time.year, 1999);
    }

    #[test]
    fn virtual_address_change_is_a_no_op() {
        virtual_address_change::<RunningClock>(ptr::null_mut(), ptr::null_mut());

        let mut time = sentinel_time();
        assert_eq!(get_time::<RunningClock>(&mut time, ptr::null_mut()), efi::Status::SUCCESS);
    }

    extern "efiapi" fn unused_slot() {}

    fn placeholder<F: Copy>() -> F {
        assert_eq!(mem::size_of::<F>(), mem::size_of::<extern "efiapi" fn()>());
        // SAFETY: Every slot is a function pointer of the same size; the placeholders are never called.
        unsafe { mem::transmute_copy(&(unused_slot as extern "efiapi" fn())) }
    }

    fn runtime_services() -> efi::RuntimeServices {
        efi::RuntimeServices {
            hdr: efi::TableHeader {
                signature: efi::RUNTIME_SERVICES_SIGNATURE,
                revision: efi::SYSTEM_TABLE_REVISION,
                header_size: mem::size_of::<efi::RuntimeServices>() as u32,
                crc32: 0x1234_5678,
                reserved: 0,
            },
            get_time: placeholder(),
            set_time: placeholder(),
            get_wakeup_time: placeholder(),
            set_wakeup_time: placeholder(),
            set_virtual_address_map: placeholder(),
            convert_pointer: placeholder(),
            get_variable: placeholder(),
            get_next_variable_name: placeholder(),
            set_variable: placeholder(),
            get_next_high_mono_count: placeholder(),
            reset_system: placeholder(),
            update_capsule: placeholder(),
            query_capsule_capabilities: placeholder(),
            query_variable_info: placeholder(),
        }
    }

    #[test]
    fn install_points_time_services_at_the_clock() {
        let mut rt = runtime_services();

        assert_eq!(install::<RunningClock>(&mut rt), Ok(()));

        let mut time = sentinel_time();
        assert_eq!(unsafe { (rt.get_time)(&mut time, ptr::null_mut()) }, efi::Status::SUCCESS);
        assert_eq!((time.day, time.hour, time.minute, time.second), (1, 1, 1, 1));

        let mut enabled: efi::Boolean = false.into();
        let mut pending: efi::Boolean = false.into();
        assert_eq!(unsafe { (rt.set_time)(&mut time) }, efi::Status::UNSUPPORTED);
        assert_eq!(unsafe { (rt.get_wakeup_time)(&mut enabled, &mut pending, &mut time) }, efi::Status::UNSUPPORTED);
        assert_eq!(unsafe { (rt.set_wakeup_time)(true.into(), ptr::null_mut()) }, efi::Status::UNSUPPORTED);
    }

    #[test]
    fn install_leaves_the_header_to_the_caller() {
        let mut rt = runtime_services();

        assert_eq!(install::<BrokenClock>(&mut rt), Ok(()));

        assert_eq!(rt.hdr.crc32, 0x1234_5678);
        assert_eq!(rt.hdr.signature, efi::RUNTIME_SERVICES_SIGNATURE);

        let mut time = sentinel_time();
        assert_eq!(unsafe { (rt.get_time)(&mut time, ptr::null_mut()) }, efi::Status::DEVICE_ERROR);
    }
}
