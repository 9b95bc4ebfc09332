//! i.MX Services
//!
//! Services used in the i.MX Patina binary.
//!
//! ## License
//!
//! Copyright (c) Microsoft Corporation.
//!
//! SPDX-License-Identifier: Apache-2.0
//!
#[coverage(off)]
pub mod dbg2_publisher;
#[coverage(off)]
pub mod real_time_clock;
