//! i.MX DBG2 Table Publisher
//!
//! Publishes the platform DBG2 table through the ACPI Table Protocol so the OS can locate the debug UART.
//!
//! ## License
//!
//! Copyright (c) Microsoft Corporation.
//!
//! SPDX-License-Identifier: Apache-2.0
//!
#![cfg(all(target_os = "uefi", feature = "aarch64"))]

use core::ffi::c_void;

use patina::{
    boot_services::{BootServices, StandardBootServices},
    component::IntoComponent,
    error::Result,
};
use r_efi::efi;

use crate::imx::dbg2::{DBG2_TABLE_SIZE, IMX_DBG2_TABLE};

const ACPI_TABLE_PROTOCOL_GUID: efi::Guid =
    efi::Guid::from_fields(0xffe06bdd, 0x6107, 0x46a6, 0x7b, 0xb2, &[0x5a, 0x9c, 0x7e, 0xc5, 0x27, 0x5c]);

/// EFI_ACPI_TABLE_PROTOCOL
#[repr(C)]
#[allow(dead_code)]
struct AcpiTableProtocol {
    install_acpi_table: extern "efiapi" fn(*const AcpiTableProtocol, *const c_void, usize, *mut usize) -> efi::Status,
    uninstall_acpi_table: extern "efiapi" fn(*const AcpiTableProtocol, usize) -> efi::Status,
}

/// Installs the platform DBG2 table.
#[derive(IntoComponent, Default)]
pub struct ImxDbg2Publisher;

impl ImxDbg2Publisher {
    pub fn new() -> Self {
        Self
    }

    /// Entry point for the DBG2 publisher.
    ///
    /// The ACPI Table Protocol copies the table, so the static image stays untouched.
    pub fn entry_point(self, boot_services: StandardBootServices) -> Result<()> {
        log::debug!("DBG2 Publisher Entry Point");

        let protocol_ptr = unsafe {
            boot_services.locate_protocol_unchecked(&ACPI_TABLE_PROTOCOL_GUID, core::ptr::null_mut()).map_err(|e| {
                log::error!("Failed to locate ACPI Table protocol: {:?}", e);
                e
            })?
        };

        // SAFETY: The pointer was produced by locating the ACPI Table protocol.
        let protocol = unsafe { &*(protocol_ptr as *const AcpiTableProtocol) };

        log::info!("DBG2 debug UART base: {:#X}", IMX_DBG2_TABLE.base_address());

        let mut table_key: usize = 0;
        let status = (protocol.install_acpi_table)(
            protocol,
            IMX_DBG2_TABLE.as_bytes().as_ptr() as *const c_void,
            DBG2_TABLE_SIZE,
            &mut table_key,
        );
        if status != efi::Status::SUCCESS {
            log::error!("Failed to install DBG2 table: {:?}", status);
            return Err(status.into());
        }

        log::debug!("DBG2 table installed, key {:#X}", table_key);
        Ok(())
    }
}
