// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Encrypted secret rows.

use async_trait::async_trait;
use sqlx::{sqlite::SqlitePool, Row};
use stk_hub_vault::{SecretRecord, SecretStore};

use crate::error::{parse_timestamp, DbError};

#[derive(Clone)]
pub struct SqliteSecretStore {
	pool: SqlitePool,
}

impl SqliteSecretStore {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	#[tracing::instrument(skip(self, record), fields(project_id = %record.project_id, key = %record.key))]
	pub async fn upsert_secret(&self, record: &SecretRecord) -> Result<(), DbError> {
		sqlx::query(
			r#"
			INSERT INTO vault_secrets (project_id, secret_key, encrypted_value, updated_at)
			VALUES (?, ?, ?, ?)
			ON CONFLICT (project_id, secret_key) DO UPDATE SET
				encrypted_value = excluded.encrypted_value,
				updated_at = excluded.updated_at
			"#,
		)
		.bind(&record.project_id)
		.bind(&record.key)
		.bind(&record.encrypted_value)
		.bind(record.updated_at.to_rfc3339())
		.execute(&self.pool)
		.await?;

		tracing::debug!("secret row upserted");
		Ok(())
	}

	#[tracing::instrument(skip(self), fields(project_id = %project_id, key = %key))]
	pub async fn get_secret(
		&self,
		project_id: &str,
		key: &str,
	) -> Result<Option<SecretRecord>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT project_id, secret_key, encrypted_value, updated_at
			FROM vault_secrets
			WHERE project_id = ? AND secret_key = ?
			"#,
		)
		.bind(project_id)
		.bind(key)
		.fetch_optional(&self.pool)
		.await?;

		match row {
			Some(row) => {
				let updated_at: String = row.get("updated_at");
				Ok(Some(SecretRecord {
					project_id: row.get("project_id"),
					key: row.get("secret_key"),
					encrypted_value: row.get("encrypted_value"),
					updated_at: parse_timestamp("updated_at", &updated_at)?,
				}))
			}
			None => Ok(None),
		}
	}

	#[tracing::instrument(skip(self), fields(project_id = %project_id, key = %key))]
	pub async fn delete_secret(&self, project_id: &str, key: &str) -> Result<bool, DbError> {
		let result = sqlx::query("DELETE FROM vault_secrets WHERE project_id = ? AND secret_key = ?")
			.bind(project_id)
			.bind(key)
			.execute(&self.pool)
			.await?;

		let deleted = result.rows_affected() > 0;
		tracing::debug!(deleted, "secret row delete");
		Ok(deleted)
	}

	#[tracing::instrument(skip(self), fields(project_id = %project_id))]
	pub async fn list_secret_keys(&self, project_id: &str) -> Result<Vec<String>, DbError> {
		let rows = sqlx::query(
			"SELECT secret_key FROM vault_secrets WHERE project_id = ? ORDER BY secret_key",
		)
		.bind(project_id)
		.fetch_all(&self.pool)
		.await?;

		Ok(rows.iter().map(|r| r.get("secret_key")).collect())
	}
}

#[async_trait]
impl SecretStore for SqliteSecretStore {
	async fn upsert_secret(&self, record: &SecretRecord) -> stk_hub_vault::Result<()> {
		Ok(self.upsert_secret(record).await?)
	}

	async fn get_secret(
		&self,
		project_id: &str,
		key: &str,
	) -> stk_hub_vault::Result<Option<SecretRecord>> {
		Ok(self.get_secret(project_id, key).await?)
	}

	async fn delete_secret(&self, project_id: &str, key: &str) -> stk_hub_vault::Result<bool> {
		Ok(self.delete_secret(project_id, key).await?)
	}

	async fn list_secret_keys(&self, project_id: &str) -> stk_hub_vault::Result<Vec<String>> {
		Ok(self.list_secret_keys(project_id).await?)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::create_migrated_test_pool;
	use chrono::Utc;
	use std::sync::Arc;
	use stk_hub_vault::VaultService;

	fn record(project: &str, key: &str, value: &str) -> SecretRecord {
		SecretRecord {
			project_id: project.into(),
			key: key.into(),
			encrypted_value: value.into(),
			updated_at: Utc::now(),
		}
	}

	#[tokio::test]
	async fn upsert_replaces_value() {
		let store = SqliteSecretStore::new(create_migrated_test_pool().await);
		store.upsert_secret(&record("p1", "k", "one")).await.unwrap();
		store.upsert_secret(&record("p1", "k", "two")).await.unwrap();

		let found = store.get_secret("p1", "k").await.unwrap().unwrap();
		assert_eq!(found.encrypted_value, "two");
		assert_eq!(store.list_secret_keys("p1").await.unwrap(), vec!["k"]);
	}

	#[tokio::test]
	async fn delete_reports_whether_row_existed() {
		let store = SqliteSecretStore::new(create_migrated_test_pool().await);
		store.upsert_secret(&record("p1", "k", "v")).await.unwrap();
		assert!(store.delete_secret("p1", "k").await.unwrap());
		assert!(!store.delete_secret("p1", "k").await.unwrap());
		assert!(store.get_secret("p1", "k").await.unwrap().is_none());
	}

	#[tokio::test]
	async fn keys_are_scoped_by_project() {
		let store = SqliteSecretStore::new(create_migrated_test_pool().await);
		store.upsert_secret(&record("p1", "b", "v")).await.unwrap();
		store.upsert_secret(&record("p1", "a", "v")).await.unwrap();
		store.upsert_secret(&record("p2", "c", "v")).await.unwrap();

		assert_eq!(store.list_secret_keys("p1").await.unwrap(), vec!["a", "b"]);
		assert_eq!(store.list_secret_keys("p2").await.unwrap(), vec!["c"]);
	}

	#[tokio::test]
	async fn vault_round_trips_through_sqlite() {
		let store = Arc::new(SqliteSecretStore::new(create_migrated_test_pool().await));
		let vault = VaultService::new(store.clone(), &[9u8; 32]).unwrap();

		vault.set("p1", "stripe", "sk_live_123").await.unwrap();
		assert_eq!(vault.get("p1", "stripe").await.unwrap().expose(), "sk_live_123");

		let raw = store.get_secret("p1", "stripe").await.unwrap().unwrap();
		assert!(!raw.encrypted_value.contains("sk_live_123"));
	}
}
