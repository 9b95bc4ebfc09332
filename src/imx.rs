//! i.MX Resources
//!
//! Resources used in the i.MX Patina binary.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: Apache-2.0
//!
pub mod component;
pub mod dbg2;
pub mod platform;
pub mod rtc;
pub mod runtime;
pub mod timer;
