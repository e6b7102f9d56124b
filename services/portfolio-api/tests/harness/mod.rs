// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Test harness for submission flood simulation.
//!
//! Provides a controllable clock, request generators and outcome tallies
//! shared by the integration test binaries.

#![allow(dead_code)]

pub mod clock;
pub mod generators;
pub mod metrics;
