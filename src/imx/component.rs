//! i.MX Components
//!
//! Components used in the i.MX Patina binary.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: Apache-2.0
//!
pub mod service;
