// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Items API
//!
//! A small in-memory CRUD service. Reads are open; creates, updates and
//! deletes require a static shared key.

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod store;

pub use config::Config;
pub use error::{AppError, Result};
pub use handlers::{router, AppState};
pub use models::{Item, ItemPatch};
pub use store::ItemStore;
