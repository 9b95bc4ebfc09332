//! i.MX Debug Port Table 2 (DBG2)
//!
//! Describes the debug UART to the operating system. The table advertises a single PL011-compatible serial port
//! through one memory-mapped generic address register, its register window size, and its ACPI namespace path.
//!
//! The table is built entirely at compile time. Every offset and length it declares is taken from the layout of the
//! structures below, so reordering or resizing a field keeps the table self-consistent.
//!
//! ## References
//!
//! - [Microsoft Debug Port Table 2 (DBG2)](https://learn.microsoft.com/en-us/windows-hardware/drivers/bringup/acpi-debug-port-table)
//! - [ACPI Generic Address Structure](https://uefi.org/specs/ACPI/6.5/05_ACPI_Software_Programming_Model.html#generic-address-structure-gas)
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: Apache-2.0
//!
use core::mem::{offset_of, size_of};

use crate::imx::platform;

/// `"DBG2"`
pub const DBG2_SIGNATURE: [u8; 4] = *b"DBG2";
pub const DBG2_TABLE_REVISION: u8 = 0x00;
pub const DEBUG_DEVICE_INFORMATION_REVISION: u8 = 0x00;

/// Number of debug devices described by the table.
pub const NUMBER_OF_DEBUG_DEVICES: u32 = 1;
/// Number of generic address registers per debug device.
pub const NUMBER_OF_GENERIC_ADDRESS_REGISTERS: u8 = 1;
/// Size of the namespace string field, including the terminator.
pub const NAME_SPACE_STRING_FIELD_SIZE: usize = 12;
/// ACPI namespace path of the debug UART.
pub const DEBUG_UART_NAME_SPACE_PATH: &[u8] = b"\\_SB.COM0";

pub const PORT_TYPE_SERIAL: u16 = 0x8000;
pub const PORT_SUBTYPE_SERIAL_ARM_PL011_UART: u16 = 0x0003;

/// Generic address space IDs and access sizes.
pub mod gas {
    pub const SYSTEM_MEMORY: u8 = 0x00;

    pub const ACCESS_SIZE_BYTE: u8 = 0x01;
}

const ACPI_OEM_ID: [u8; 6] = *b"MCRSFT";
const ACPI_OEM_TABLE_ID: [u8; 8] = *b"IMX8MQ  ";
const ACPI_OEM_REVISION: u32 = 0x0000_0001;
const ACPI_CREATOR_ID: u32 = u32::from_le_bytes(*b"IMXP");
const ACPI_CREATOR_REVISION: u32 = 0x0000_0001;

/// ACPI System Description Table header.
#[repr(C, packed)]
#[derive(Debug, Clone, Copy)]
pub struct DescriptionHeader {
    pub signature: [u8; 4],
    pub length: u32,
    pub revision: u8,
    pub checksum: u8,
    pub oem_id: [u8; 6],
    pub oem_table_id: [u8; 8],
    pub oem_revision: u32,
    pub creator_id: u32,
    pub creator_revision: u32,
}

/// DBG2 table header.
#[repr(C, packed)]
#[derive(Debug, Clone, Copy)]
pub struct Dbg2Header {
    pub header: DescriptionHeader,
    /// Offset from the start of the table to the first debug device information structure.
    pub offset_dbg_device_info: u32,
    pub number_dbg_device_info: u32,
}

/// Fixed part of a debug device information structure.
///
/// All offsets are relative to the start of the structure.
#[repr(C, packed)]
#[derive(Debug, Clone, Copy)]
pub struct DebugDeviceInformation {
    pub revision: u8,
    /// Length of the device information structure, including the trailing arrays and namespace string.
    pub length: u16,
    pub number_of_generic_address_registers: u8,
    pub name_space_string_length: u16,
    pub name_space_string_offset: u16,
    pub oem_data_length: u16,
    pub oem_data_offset: u16,
    pub port_type: u16,
    pub port_subtype: u16,
    pub reserved: [u8; 2],
    pub base_address_register_offset: u16,
    pub address_size_offset: u16,
}

/// ACPI Generic Address Structure (GAS).
#[repr(C, packed)]
#[derive(Debug, Clone, Copy)]
pub struct GenericAddress {
    pub address_space_id: u8,
    pub register_bit_width: u8,
    pub register_bit_offset: u8,
    pub access_size: u8,
    pub address: u64,
}

impl GenericAddress {
    /// A 32-bit wide register in system memory, accessed bytewise.
    pub const fn mmio32(address: u64) -> Self {
        Self {
            address_space_id: gas::SYSTEM_MEMORY,
            register_bit_width: 32,
            register_bit_offset: 0,
            access_size: gas::ACCESS_SIZE_BYTE,
            address: address.to_le(),
        }
    }
}

/// A debug device information structure with its single register and namespace string.
#[repr(C, packed)]
#[derive(Debug, Clone, Copy)]
pub struct DebugDevice {
    pub info: DebugDeviceInformation,
    pub base_address_register: [GenericAddress; NUMBER_OF_GENERIC_ADDRESS_REGISTERS as usize],
    pub address_size: [u32; NUMBER_OF_GENERIC_ADDRESS_REGISTERS as usize],
    pub name_space_string: [u8; NAME_SPACE_STRING_FIELD_SIZE],
}

/// The complete DBG2 table for the platform.
#[repr(C, packed)]
#[derive(Debug, Clone, Copy)]
pub struct Dbg2Table {
    pub description: Dbg2Header,
    pub device: [DebugDevice; NUMBER_OF_DEBUG_DEVICES as usize],
}

/// Size in bytes of the whole table.
pub const DBG2_TABLE_SIZE: usize = size_of::<Dbg2Table>();

const _: () = assert!(size_of::<DescriptionHeader>() == 36);
const _: () = assert!(size_of::<GenericAddress>() == 12);
const _: () = assert!(DEBUG_UART_NAME_SPACE_PATH.len() < NAME_SPACE_STRING_FIELD_SIZE);
const _: () = assert!(size_of::<DebugDevice>() <= u16::MAX as usize);

/// Copies `path` into a zero-filled namespace string field, leaving room for the terminator.
const fn name_space_string(path: &[u8]) -> [u8; NAME_SPACE_STRING_FIELD_SIZE] {
    assert!(path.len() < NAME_SPACE_STRING_FIELD_SIZE, "namespace path does not fit with its terminator");

    let mut field = [0u8; NAME_SPACE_STRING_FIELD_SIZE];
    let mut i = 0;
    while i < path.len() {
        field[i] = path[i];
        i += 1;
    }
    field
}

/// Sum of all bytes of `bytes`, modulo 256.
const fn byte_sum(bytes: &[u8]) -> u8 {
    let mut sum: u8 = 0;
    let mut i = 0;
    while i < bytes.len() {
        sum = sum.wrapping_add(bytes[i]);
        i += 1;
    }
    sum
}

impl DebugDevice {
    /// Describes the debug UART with its register window at `base_address`, `window_size` bytes long.
    pub const fn serial_pl011(base_address: u64, window_size: u32) -> Self {
        Self {
            info: DebugDeviceInformation {
                revision: DEBUG_DEVICE_INFORMATION_REVISION,
                length: (size_of::<DebugDevice>() as u16).to_le(),
                number_of_generic_address_registers: NUMBER_OF_GENERIC_ADDRESS_REGISTERS,
                name_space_string_length: (NAME_SPACE_STRING_FIELD_SIZE as u16).to_le(),
                name_space_string_offset: (offset_of!(DebugDevice, name_space_string) as u16).to_le(),
                oem_data_length: 0,
                oem_data_offset: 0,
                port_type: PORT_TYPE_SERIAL.to_le(),
                port_subtype: PORT_SUBTYPE_SERIAL_ARM_PL011_UART.to_le(),
                reserved: [0; 2],
                base_address_register_offset: (offset_of!(DebugDevice, base_address_register) as u16).to_le(),
                address_size_offset: (offset_of!(DebugDevice, address_size) as u16).to_le(),
            },
            base_address_register: [GenericAddress::mmio32(base_address)],
            address_size: [window_size.to_le()],
            name_space_string: name_space_string(DEBUG_UART_NAME_SPACE_PATH),
        }
    }
}

impl Dbg2Table {
    /// Builds the table for a debug UART whose register window starts at `base_address`.
    ///
    /// The table is complete, including its checksum, and can be evaluated at compile time.
    pub const fn build(base_address: u64) -> Self {
        let mut table = Self {
            description: Dbg2Header {
                header: DescriptionHeader {
                    signature: DBG2_SIGNATURE,
                    length: (DBG2_TABLE_SIZE as u32).to_le(),
                    revision: DBG2_TABLE_REVISION,
                    checksum: 0,
                    oem_id: ACPI_OEM_ID,
                    oem_table_id: ACPI_OEM_TABLE_ID,
                    oem_revision: ACPI_OEM_REVISION.to_le(),
                    creator_id: ACPI_CREATOR_ID.to_le(),
                    creator_revision: ACPI_CREATOR_REVISION.to_le(),
                },
                offset_dbg_device_info: (offset_of!(Dbg2Table, device) as u32).to_le(),
                number_dbg_device_info: NUMBER_OF_DEBUG_DEVICES.to_le(),
            },
            device: [DebugDevice::serial_pl011(base_address, platform::UART_REGISTER_WINDOW_SIZE)],
        };

        table.description.header.checksum = 0u8.wrapping_sub(byte_sum(table.to_bytes().as_slice()));
        table
    }

    /// Returns the table image as it is handed to the OS.
    pub const fn to_bytes(self) -> [u8; DBG2_TABLE_SIZE] {
        // SAFETY: Every structure making up the table is packed and contains only integers and byte arrays, so the
        // table has no padding and any bit pattern of the same size is a valid byte array.
        unsafe { core::mem::transmute::<Self, [u8; DBG2_TABLE_SIZE]>(self) }
    }

    /// Returns the table image in place.
    pub const fn as_bytes(&self) -> &[u8; DBG2_TABLE_SIZE] {
        // SAFETY: See `to_bytes`. The table is packed, so its alignment is 1, the same as the byte array.
        unsafe { &*(self as *const Self as *const [u8; DBG2_TABLE_SIZE]) }
    }

    /// Base address of the debug UART register window.
    pub const fn base_address(&self) -> u64 {
        let gas = self.device[0].base_address_register[0];
        u64::from_le(gas.address)
    }

    /// Size of the debug UART register window.
    pub const fn window_size(&self) -> u32 {
        let address_size = self.device[0].address_size;
        u32::from_le(address_size[0])
    }

    /// Namespace string field of the debug device, including its terminator.
    pub const fn name_space_string(&self) -> [u8; NAME_SPACE_STRING_FIELD_SIZE] {
        self.device[0].name_space_string
    }

    /// Returns `true` when all bytes of the table sum to zero.
    pub const fn checksum_is_valid(&self) -> bool {
        byte_sum(self.as_bytes().as_slice()) == 0
    }
}

/// The platform DBG2 table.
///
/// Marked `#[used]` so that it is kept in the image until the table installation service publishes it.
#[used]
pub static IMX_DBG2_TABLE: Dbg2Table = Dbg2Table::build(platform::UART_BASE_ADDRESS);
