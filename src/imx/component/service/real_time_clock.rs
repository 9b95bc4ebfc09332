//! i.MX Virtual Real-Time Clock Component
//!
//! Produces the time services of the UEFI runtime services table from the virtual real-time clock, and the Real Time
//! Clock Architectural Protocol that signals their availability to the DXE core.
//!
//! The clock reads the architectural counter through the core's [`ArchTimerFunctionality`] service.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: Apache-2.0
//!
#![cfg(all(target_os = "uefi", feature = "aarch64"))]

extern crate alloc;

use alloc::boxed::Box;
use core::{
    ffi::c_void,
    ptr,
    sync::atomic::{AtomicPtr, Ordering},
};

use patina::{
    boot_services::{BootServices, StandardBootServices, event::EventType, tpl::Tpl},
    component::{
        IntoComponent,
        service::{Service, perf_timer::ArchTimerFunctionality},
    },
    error::{EfiError, Result},
    runtime_services::StandardRuntimeServices,
};
use r_efi::efi;

use crate::imx::{
    platform,
    rtc::VirtualRealTimeClock,
    runtime::{self, ClockInstance},
    timer::{CounterSource, frequency_hz_from_perf},
};

const REAL_TIME_CLOCK_ARCH_PROTOCOL_GUID: efi::Guid =
    efi::Guid::from_fields(0x27cfac87, 0x46cc, 0x11d4, 0x9a, 0x38, &[0x00, 0x90, 0x27, 0x3f, 0xc1, 0x4d]);

static ARCH_TIMER: AtomicPtr<Service<dyn ArchTimerFunctionality>> = AtomicPtr::new(ptr::null_mut());

/// Counter backed by the core's architectural timer service.
///
/// Reads zero until the component has run, which the clock reports as a device error.
struct ArchTimerCounter;

impl ArchTimerCounter {
    fn timer() -> Option<&'static dyn ArchTimerFunctionality> {
        // SAFETY: ARCH_TIMER is either null or points to a leaked service that is never freed.
        let service = unsafe { ARCH_TIMER.load(Ordering::Acquire).as_ref() }?;
        Some(&**service)
    }
}

impl CounterSource for ArchTimerCounter {
    fn ticks(&self) -> u64 {
        Self::timer().map_or(0, |timer| timer.cpu_count())
    }

    fn frequency_hz(&self) -> u32 {
        Self::timer().map_or(0, |timer| frequency_hz_from_perf(timer.perf_frequency()))
    }
}

static IMX_CLOCK: VirtualRealTimeClock<ArchTimerCounter> =
    VirtualRealTimeClock::new(ArchTimerCounter, platform::ARCH_TIMER_FREQUENCY_HZ);

struct ImxClock;

impl ClockInstance for ImxClock {
    type Clock = VirtualRealTimeClock<ArchTimerCounter>;

    fn clock() -> &'static Self::Clock {
        &IMX_CLOCK
    }
}

/// The i.MX virtual real-time clock component.
///
/// See [`crate::imx::rtc`] for what the reported time means.
#[derive(IntoComponent, Default)]
pub struct ImxRealTimeClock;

impl ImxRealTimeClock {
    /// Creates a new instance of the i.MX virtual real-time clock component.
    pub fn new() -> Self {
        Self
    }

    /// Entry point for the i.MX virtual real-time clock component.
    ///
    /// Points the time services of the runtime services table at the virtual clock, refreshes the table CRC, installs
    /// the Real Time Clock Architectural Protocol with a NULL interface and registers the virtual address change
    /// handler.
    pub fn entry_point(
        self,
        timer: Service<dyn ArchTimerFunctionality>,
        boot_services: StandardBootServices,
        runtime_services: StandardRuntimeServices,
    ) -> Result<()> {
        log::debug!("Virtual RTC Entry Point");

        let timer = Box::into_raw(Box::new(timer));
        if ARCH_TIMER.compare_exchange(ptr::null_mut(), timer, Ordering::AcqRel, Ordering::Acquire).is_err() {
            // SAFETY: `timer` was never published.
            drop(unsafe { Box::from_raw(timer) });
            log::error!("Virtual RTC: already installed");
            return Err(EfiError::AlreadyStarted);
        }

        // SAFETY: The runtime services table is owned by the DXE core and remains valid for the lifetime of the
        // firmware.
        let Some(rt) = (unsafe { runtime_services.as_mut_ptr().as_mut() }) else {
            log::error!("Virtual RTC: runtime services table unavailable");
            return Err(EfiError::NotReady);
        };

        runtime::install::<ImxClock>(rt).inspect_err(|e| log::error!("Virtual RTC: initialization failed: {e:?}"))?;

        rt.hdr.crc32 = 0;
        rt.hdr.crc32 = boot_services.calculate_crc_32(&*rt).map_err(|status| {
            log::error!("Virtual RTC: failed to compute runtime services CRC: {:?}", status);
            status
        })?;

        // SAFETY: The architectural protocol carries no interface, NULL is the documented value.
        unsafe {
            boot_services.install_protocol_interface_unchecked(
                None,
                &REAL_TIME_CLOCK_ARCH_PROTOCOL_GUID,
                ptr::null_mut(),
            )
        }
        .map_err(|status| {
            log::error!("Virtual RTC: failed to install the RTC architectural protocol: {:?}", status);
            status
        })?;

        boot_services
            .create_event_ex(
                EventType::NOTIFY_SIGNAL,
                Tpl::NOTIFY,
                Some(runtime::virtual_address_change::<ImxClock>),
                ptr::null_mut::<c_void>(),
                &efi::EVENT_GROUP_VIRTUAL_ADDRESS_CHANGE,
            )
            .map_err(|status| {
                log::error!("Virtual RTC: failed to register for virtual address change: {:?}", status);
                status
            })?;

        Ok(())
    }
}
