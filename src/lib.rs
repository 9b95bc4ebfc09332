//! i.MX Platform Resources
//!
//! This module provides resources such as components and services used in the i.MX platform: the virtual real-time
//! clock backed by the architectural counter, and the DBG2 debug port table.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: Apache-2.0
//!
#![no_std]
#![feature(coverage_attribute)]

pub mod imx;
