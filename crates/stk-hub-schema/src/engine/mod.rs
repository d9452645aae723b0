// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Seams to live databases: an engine opens clients for connection URLs.

mod sqlite;

use async_trait::async_trait;

use crate::diff::SchemaChange;
use crate::error::Result;
use crate::model::Realm;

pub use sqlite::{render_sqlite, SqliteEngine};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
	Sqlite,
}

impl Dialect {
	pub fn as_str(&self) -> &'static str {
		match self {
			Dialect::Sqlite => "sqlite",
		}
	}
}

#[async_trait]
pub trait SchemaEngine: Send + Sync {
	/// Whether this engine understands the URL's scheme.
	fn supports(&self, url: &str) -> bool;

	/// Open a client. Failures to reach the database are
	/// [`SchemaError::Connect`](crate::SchemaError::Connect).
	async fn connect(&self, url: &str) -> Result<Box<dyn SchemaClient>>;
}

#[async_trait]
pub trait SchemaClient: Send + Sync {
	fn dialect(&self) -> Dialect;

	/// Read the live schema.
	async fn inspect(&self) -> Result<Realm>;

	/// Render changes as statements for this dialect.
	fn plan_changes(&self, changes: &[SchemaChange]) -> Result<Vec<String>>;

	/// Execute statements in one transaction.
	async fn execute(&self, statements: &[String]) -> Result<()>;
}
