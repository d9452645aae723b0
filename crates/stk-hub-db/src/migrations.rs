// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use sqlx::sqlite::SqlitePool;

use crate::error::DbError;

const MIGRATIONS: &[(&str, &str)] = &[
	(
		"001_vault_secrets",
		include_str!("../migrations/001_vault_secrets.sql"),
	),
	(
		"002_registry_manifests",
		include_str!("../migrations/002_registry_manifests.sql"),
	),
	(
		"003_schema_state",
		include_str!("../migrations/003_schema_state.sql"),
	),
];

/// Run all hub migrations in order.
///
/// Every statement is `IF NOT EXISTS`, so this is safe to run on every start.
#[tracing::instrument(skip(pool))]
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), DbError> {
	for (name, sql) in MIGRATIONS {
		for stmt in sql.split(';').filter(|s| !s.trim().is_empty()) {
			sqlx::query(stmt).execute(pool).await?;
		}
		tracing::debug!(migration = name, "migration applied");
	}
	Ok(())
}
