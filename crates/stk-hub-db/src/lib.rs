// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! SQLite persistence for the hub.
//!
//! Each repository implements one service crate's store trait over a shared
//! [`SqlitePool`](sqlx::SqlitePool).

pub mod error;
pub mod migrations;
pub mod pool;
pub mod registry;
pub mod schema;
pub mod testing;
pub mod vault;

pub use error::{DbError, Result};
pub use migrations::run_migrations;
pub use pool::create_pool;
pub use registry::SqliteManifestStore;
pub use schema::SqlitePlannerStateStore;
pub use vault::SqliteSecretStore;
