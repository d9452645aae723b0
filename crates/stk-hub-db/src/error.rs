// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use stk_hub_registry::RegistryError;
use stk_hub_schema::SchemaError;
use stk_hub_vault::VaultError;

#[derive(Debug, thiserror::Error)]
pub enum DbError {
	#[error("Database error: {0}")]
	Sqlx(#[from] sqlx::Error),

	#[error("Not found: {0}")]
	NotFound(String),

	#[error("Conflict: {0}")]
	Conflict(String),

	#[error("Internal: {0}")]
	Internal(String),

	#[error("Serialization error: {0}")]
	Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DbError>;

impl From<DbError> for VaultError {
	fn from(e: DbError) -> Self {
		VaultError::Store(e.to_string())
	}
}

impl From<DbError> for RegistryError {
	fn from(e: DbError) -> Self {
		RegistryError::Store(e.to_string())
	}
}

impl From<DbError> for SchemaError {
	fn from(e: DbError) -> Self {
		SchemaError::Store(e.to_string())
	}
}

pub(crate) fn parse_timestamp(column: &str, value: &str) -> Result<chrono::DateTime<chrono::Utc>> {
	chrono::DateTime::parse_from_rfc3339(value)
		.map(|dt| dt.with_timezone(&chrono::Utc))
		.map_err(|e| DbError::Internal(format!("Invalid {column}: {e}")))
}
