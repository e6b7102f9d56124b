// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Portfolio Backend
//!
//! Stores contact-form submissions, projects and skills in SQLite. Every
//! contact submission passes a request gate before it is written:
//!
//! - Per-address sliding-window admission (5 per hour by default)
//! - Keyword spam tagging (advisory, never blocks the write)
//!
//! Admin routes (listing submissions, adding projects and skills) require
//! a static shared key.

pub mod classifier;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod limiter;
pub mod metrics;
pub mod models;
pub mod validator;

pub use classifier::SpamClassifier;
pub use config::Config;
pub use error::{AppError, Result};
pub use handlers::{router, AppState};
pub use limiter::{Admission, AdmissionGate, Clock, SystemClock};
pub use validator::{ContactValidator, ValidationError};
