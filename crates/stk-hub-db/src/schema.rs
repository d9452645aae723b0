// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Planner state rows.
//!
//! `schema_plans` keeps one row per project for its lifetime: clearing a plan
//! nulls the documents but keeps `generation`, so tokens are never reused.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{sqlite::SqlitePool, Row};
use stk_hub_schema::{PlannedSchema, PlannerStateStore, SchemaDocuments};

use crate::error::{parse_timestamp, DbError};

#[derive(Clone)]
pub struct SqlitePlannerStateStore {
	pool: SqlitePool,
}

impl SqlitePlannerStateStore {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	#[tracing::instrument(skip(self, documents), fields(project_id = %project_id, aliases = documents.len()))]
	pub async fn save_plan(
		&self,
		project_id: &str,
		documents: &SchemaDocuments,
	) -> Result<u64, DbError> {
		let documents_json = serde_json::to_string(documents)?;

		let row = sqlx::query(
			r#"
			INSERT INTO schema_plans (project_id, generation, planned_documents, planned_at)
			VALUES (?, 1, ?, ?)
			ON CONFLICT (project_id) DO UPDATE SET
				generation = schema_plans.generation + 1,
				planned_documents = excluded.planned_documents,
				planned_at = excluded.planned_at
			RETURNING generation
			"#,
		)
		.bind(project_id)
		.bind(&documents_json)
		.bind(Utc::now().to_rfc3339())
		.fetch_one(&self.pool)
		.await?;

		let generation: i64 = row.get("generation");
		let generation = u64::try_from(generation)
			.map_err(|_| DbError::Internal(format!("Invalid generation: {generation}")))?;
		tracing::debug!(generation, "plan recorded");
		Ok(generation)
	}

	#[tracing::instrument(skip(self), fields(project_id = %project_id))]
	pub async fn get_plan(&self, project_id: &str) -> Result<Option<PlannedSchema>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT generation, planned_documents, planned_at
			FROM schema_plans
			WHERE project_id = ? AND planned_documents IS NOT NULL
			"#,
		)
		.bind(project_id)
		.fetch_optional(&self.pool)
		.await?;

		let Some(row) = row else {
			return Ok(None);
		};

		let generation: i64 = row.get("generation");
		let documents_json: String = row.get("planned_documents");
		let planned_at: Option<String> = row.get("planned_at");
		let planned_at = planned_at
			.ok_or_else(|| DbError::Internal("planned_at missing for recorded plan".into()))?;

		Ok(Some(PlannedSchema {
			generation: u64::try_from(generation)
				.map_err(|_| DbError::Internal(format!("Invalid generation: {generation}")))?,
			documents: serde_json::from_str(&documents_json)?,
			planned_at: parse_timestamp("planned_at", &planned_at)?,
		}))
	}

	#[tracing::instrument(skip(self), fields(project_id = %project_id))]
	pub async fn clear_plan(&self, project_id: &str, generation: u64) -> Result<bool, DbError> {
		let generation = i64::try_from(generation)
			.map_err(|_| DbError::Internal(format!("Invalid generation: {generation}")))?;

		let result = sqlx::query(
			r#"
			UPDATE schema_plans
			SET planned_documents = NULL, planned_at = NULL
			WHERE project_id = ? AND generation = ? AND planned_documents IS NOT NULL
			"#,
		)
		.bind(project_id)
		.bind(generation)
		.execute(&self.pool)
		.await?;

		Ok(result.rows_affected() > 0)
	}

	#[tracing::instrument(skip(self), fields(project_id = %project_id))]
	pub async fn get_state(&self, project_id: &str) -> Result<Option<SchemaDocuments>, DbError> {
		let row = sqlx::query("SELECT documents FROM schema_states WHERE project_id = ?")
			.bind(project_id)
			.fetch_optional(&self.pool)
			.await?;

		match row {
			Some(row) => {
				let documents_json: String = row.get("documents");
				Ok(Some(serde_json::from_str(&documents_json)?))
			}
			None => Ok(None),
		}
	}

	#[tracing::instrument(skip(self, documents), fields(project_id = %project_id))]
	pub async fn save_state(
		&self,
		project_id: &str,
		documents: &SchemaDocuments,
	) -> Result<(), DbError> {
		let documents_json = serde_json::to_string(documents)?;

		sqlx::query(
			r#"
			INSERT INTO schema_states (project_id, documents, applied_at)
			VALUES (?, ?, ?)
			ON CONFLICT (project_id) DO UPDATE SET
				documents = excluded.documents,
				applied_at = excluded.applied_at
			"#,
		)
		.bind(project_id)
		.bind(&documents_json)
		.bind(Utc::now().to_rfc3339())
		.execute(&self.pool)
		.await?;

		tracing::debug!("applied state recorded");
		Ok(())
	}
}

#[async_trait]
impl PlannerStateStore for SqlitePlannerStateStore {
	async fn save_plan(
		&self,
		project_id: &str,
		documents: &SchemaDocuments,
	) -> stk_hub_schema::Result<u64> {
		Ok(self.save_plan(project_id, documents).await?)
	}

	async fn get_plan(&self, project_id: &str) -> stk_hub_schema::Result<Option<PlannedSchema>> {
		Ok(self.get_plan(project_id).await?)
	}

	async fn clear_plan(&self, project_id: &str, generation: u64) -> stk_hub_schema::Result<bool> {
		Ok(self.clear_plan(project_id, generation).await?)
	}

	async fn get_state(&self, project_id: &str) -> stk_hub_schema::Result<Option<SchemaDocuments>> {
		Ok(self.get_state(project_id).await?)
	}

	async fn save_state(
		&self,
		project_id: &str,
		documents: &SchemaDocuments,
	) -> stk_hub_schema::Result<()> {
		Ok(self.save_state(project_id, documents).await?)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::create_migrated_test_pool;

	fn docs(text: &str) -> SchemaDocuments {
		SchemaDocuments::from([("main".to_string(), text.to_string())])
	}

	#[tokio::test]
	async fn generations_increase_and_survive_clear() {
		let store = SqlitePlannerStateStore::new(create_migrated_test_pool().await);

		let first = store.save_plan("p1", &docs("a")).await.unwrap();
		let second = store.save_plan("p1", &docs("b")).await.unwrap();
		assert_eq!((first, second), (1, 2));

		assert!(store.clear_plan("p1", second).await.unwrap());
		assert!(store.get_plan("p1").await.unwrap().is_none());

		let third = store.save_plan("p1", &docs("c")).await.unwrap();
		assert_eq!(third, 3);
		let plan = store.get_plan("p1").await.unwrap().unwrap();
		assert_eq!(plan.generation, 3);
		assert_eq!(plan.documents, docs("c"));
	}

	#[tokio::test]
	async fn stale_generation_does_not_clear() {
		let store = SqlitePlannerStateStore::new(create_migrated_test_pool().await);
		let first = store.save_plan("p1", &docs("a")).await.unwrap();
		store.save_plan("p1", &docs("b")).await.unwrap();

		assert!(!store.clear_plan("p1", first).await.unwrap());
		assert_eq!(store.get_plan("p1").await.unwrap().unwrap().documents, docs("b"));
	}

	#[tokio::test]
	async fn clearing_twice_reports_false() {
		let store = SqlitePlannerStateStore::new(create_migrated_test_pool().await);
		let g = store.save_plan("p1", &docs("a")).await.unwrap();
		assert!(store.clear_plan("p1", g).await.unwrap());
		assert!(!store.clear_plan("p1", g).await.unwrap());
		assert!(!store.clear_plan("nobody", 1).await.unwrap());
	}

	#[tokio::test]
	async fn applied_state_is_replaced() {
		let store = SqlitePlannerStateStore::new(create_migrated_test_pool().await);
		assert!(store.get_state("p1").await.unwrap().is_none());
		store.save_state("p1", &docs("a")).await.unwrap();
		store.save_state("p1", &docs("b")).await.unwrap();
		assert_eq!(store.get_state("p1").await.unwrap(), Some(docs("b")));
	}
}
