// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sections. Each has a resolved form and a partial `*Layer`
//! form used for merging sources.

mod database;
mod edge;
mod logging;
mod schema;
mod vault;

pub use database::{DatabaseConfig, DatabaseConfigLayer};
pub use edge::{EdgeConfig, EdgeConfigLayer};
pub use logging::{LoggingConfig, LoggingConfigLayer};
pub use schema::{SchemaConfig, SchemaConfigLayer};
pub use vault::{VaultConfig, VaultConfigLayer};
