// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Manifest history. Rows are only ever inserted.

use async_trait::async_trait;
use sqlx::{sqlite::SqlitePool, Row};
use stk_hub_registry::{Bundle, Manifest, ManifestStore};

use crate::error::{parse_timestamp, DbError};

#[derive(Clone)]
pub struct SqliteManifestStore {
	pool: SqlitePool,
}

impl SqliteManifestStore {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// # Database Constraints
	/// - `id` must be unique
	#[tracing::instrument(skip(self, manifest), fields(project_id = %manifest.project_id, version = %manifest.version))]
	pub async fn append_manifest(&self, manifest: &Manifest) -> Result<(), DbError> {
		let bundles_json = serde_json::to_string(&manifest.bundles)?;

		let result = sqlx::query(
			r#"
			INSERT INTO registry_manifests (id, project_id, version, bundles, created_at, created_by)
			VALUES (?, ?, ?, ?, ?, ?)
			"#,
		)
		.bind(&manifest.id)
		.bind(&manifest.project_id)
		.bind(&manifest.version)
		.bind(&bundles_json)
		.bind(manifest.created_at.to_rfc3339())
		.bind(&manifest.created_by)
		.execute(&self.pool)
		.await;

		match result {
			Ok(_) => {
				tracing::debug!(manifest_id = %manifest.id, "manifest row inserted");
				Ok(())
			}
			Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(DbError::Conflict(
				format!("manifest {} already exists", manifest.id),
			)),
			Err(e) => Err(e.into()),
		}
	}

	#[tracing::instrument(skip(self), fields(project_id = %project_id))]
	pub async fn get_latest(&self, project_id: &str) -> Result<Option<Manifest>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT id, project_id, version, bundles, created_at, created_by
			FROM registry_manifests
			WHERE project_id = ?
			ORDER BY seq DESC
			LIMIT 1
			"#,
		)
		.bind(project_id)
		.fetch_optional(&self.pool)
		.await?;

		row.as_ref().map(parse_manifest_row).transpose()
	}

	#[tracing::instrument(skip(self), fields(project_id = %project_id, version = %version))]
	pub async fn get_by_version(
		&self,
		project_id: &str,
		version: &str,
	) -> Result<Option<Manifest>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT id, project_id, version, bundles, created_at, created_by
			FROM registry_manifests
			WHERE project_id = ? AND version = ?
			ORDER BY seq DESC
			LIMIT 1
			"#,
		)
		.bind(project_id)
		.bind(version)
		.fetch_optional(&self.pool)
		.await?;

		row.as_ref().map(parse_manifest_row).transpose()
	}

	#[tracing::instrument(skip(self), fields(project_id = %project_id))]
	pub async fn list_versions(&self, project_id: &str) -> Result<Vec<String>, DbError> {
		let rows = sqlx::query(
			"SELECT version FROM registry_manifests WHERE project_id = ? ORDER BY seq ASC",
		)
		.bind(project_id)
		.fetch_all(&self.pool)
		.await?;

		Ok(rows.iter().map(|r| r.get("version")).collect())
	}
}

fn parse_manifest_row(row: &sqlx::sqlite::SqliteRow) -> Result<Manifest, DbError> {
	let bundles_json: String = row.get("bundles");
	let created_at_str: String = row.get("created_at");
	let bundles: Vec<Bundle> = serde_json::from_str(&bundles_json)?;

	Ok(Manifest {
		id: row.get("id"),
		project_id: row.get("project_id"),
		version: row.get("version"),
		bundles,
		created_at: parse_timestamp("created_at", &created_at_str)?,
		created_by: row.get("created_by"),
	})
}

#[async_trait]
impl ManifestStore for SqliteManifestStore {
	async fn append_manifest(&self, manifest: &Manifest) -> stk_hub_registry::Result<()> {
		Ok(self.append_manifest(manifest).await?)
	}

	async fn get_latest(&self, project_id: &str) -> stk_hub_registry::Result<Option<Manifest>> {
		Ok(self.get_latest(project_id).await?)
	}

	async fn get_by_version(
		&self,
		project_id: &str,
		version: &str,
	) -> stk_hub_registry::Result<Option<Manifest>> {
		Ok(self.get_by_version(project_id, version).await?)
	}

	async fn list_versions(&self, project_id: &str) -> stk_hub_registry::Result<Vec<String>> {
		Ok(self.list_versions(project_id).await?)
	}
}
