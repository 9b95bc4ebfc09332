//! i.MX Platform Configuration
//!
//! This module defines the build-time configuration for the i.MX platform: the debug UART register window, the
//! interrupt controller and the architectural timer frequency.
//!
//! ## References
//!
//! - [i.MX 8M Applications Processor Reference Manual](https://www.nxp.com/docs/en/reference-manual/IMX8MDQLQRM.pdf)
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: Apache-2.0
//!

/// Physical base address of the debug UART (UART2) register window.
pub const UART_BASE_ADDRESS: u64 = 0x3089_0000;

/// Size of the debug UART register window.
pub const UART_REGISTER_WINDOW_SIZE: u32 = 0x4000;

/// Frequency of the architectural timer in Hz.
///
/// A value of `0` means the frequency is not fixed by the platform and is read from the counter hardware instead.
pub const ARCH_TIMER_FREQUENCY_HZ: u32 = 8_000_000;

/// Physical base address of the GIC-500 distributor (GICD).
pub const GIC_DISTRIBUTOR_BASE: u64 = 0x3880_0000;

/// Physical base address of the GIC-500 redistributor (GICR) frames.
pub const GIC_REDISTRIBUTOR_BASE: u64 = 0x3888_0000;
