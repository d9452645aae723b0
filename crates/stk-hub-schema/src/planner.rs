// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The plan/apply state machine.
//!
//! Per project: `Idle -> plan -> Planned -> apply -> Idle`. Each plan gets a
//! new generation (the plan token); apply only runs against the generation
//! its caller reviewed and always re-derives the changes from the recorded
//! documents, never from caller-supplied SQL.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use stk_hub_vault::VaultService;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::diff::diff_realms;
use crate::engine::{Dialect, SchemaClient, SchemaEngine, SqliteEngine};
use crate::error::{Result, SchemaError};
use crate::hcl::parse_realm;
use crate::model::Realm;
use crate::state::PlannerStateStore;
use crate::types::{Migration, PlanResult, SchemaDocuments};

#[derive(Debug, Clone)]
pub struct PlannerOptions {
	/// Bound on opening the project database; exceeding it selects the fallback.
	pub connect_timeout: Duration,
	/// Vault key holding the project's database URL.
	pub database_url_key: String,
}

impl Default for PlannerOptions {
	fn default() -> Self {
		Self {
			connect_timeout: Duration::from_secs(10),
			database_url_key: "database_url".to_string(),
		}
	}
}

/// How a single plan or apply computes its diff.
pub enum DiffStrategy {
	/// Structural diff against a live database.
	Native(Box<dyn SchemaClient>),
	/// Document text comparison against the last applied documents.
	ContentHash,
}

impl DiffStrategy {
	pub fn name(&self) -> &'static str {
		match self {
			DiffStrategy::Native(_) => "native",
			DiffStrategy::ContentHash => "content_hash",
		}
	}
}

impl fmt::Debug for DiffStrategy {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			DiffStrategy::Native(client) => f
				.debug_tuple("Native")
				.field(&client.dialect().as_str())
				.finish(),
			DiffStrategy::ContentHash => f.write_str("ContentHash"),
		}
	}
}

pub struct SchemaPlanner {
	vault: VaultService,
	state: Arc<dyn PlannerStateStore>,
	engines: Vec<Arc<dyn SchemaEngine>>,
	options: PlannerOptions,
	locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl SchemaPlanner {
	/// Planner with the built-in SQLite engine.
	pub fn new(
		vault: VaultService,
		state: Arc<dyn PlannerStateStore>,
		options: PlannerOptions,
	) -> Self {
		Self {
			vault,
			state,
			engines: vec![Arc::new(SqliteEngine)],
			options,
			locks: Mutex::new(HashMap::new()),
		}
	}

	/// Replace the engines consulted when resolving a native strategy.
	pub fn with_engines(mut self, engines: Vec<Arc<dyn SchemaEngine>>) -> Self {
		self.engines = engines;
		self
	}

	/// Pick the strategy for a project.
	///
	/// A missing or empty database secret, an unsupported scheme, and a failed
	/// or timed-out connection select [`DiffStrategy::ContentHash`]. Any other
	/// vault error is returned.
	#[tracing::instrument(skip(self), fields(project_id = %project_id))]
	pub async fn resolve_strategy(&self, project_id: &str) -> Result<DiffStrategy> {
		let url = match self.vault.get(project_id, &self.options.database_url_key).await {
			Ok(url) => url,
			Err(e) if e.is_not_found() => {
				info!(reason = "no database secret", "using content-hash strategy");
				return Ok(DiffStrategy::ContentHash);
			}
			Err(e) => return Err(e.into()),
		};

		let url = url.expose().trim();
		if url.is_empty() {
			info!(reason = "empty database secret", "using content-hash strategy");
			return Ok(DiffStrategy::ContentHash);
		}

		let Some(engine) = self.engines.iter().find(|engine| engine.supports(url)) else {
			warn!(reason = "unsupported database scheme", "using content-hash strategy");
			return Ok(DiffStrategy::ContentHash);
		};

		match self.connect(&**engine, url).await {
			Ok(client) => Ok(DiffStrategy::Native(client)),
			Err(e) if e.is_unreachable() => {
				warn!(error = %e, "project database unreachable, using content-hash strategy");
				Ok(DiffStrategy::ContentHash)
			}
			Err(e) => Err(e),
		}
	}

	async fn connect(&self, engine: &dyn SchemaEngine, url: &str) -> Result<Box<dyn SchemaClient>> {
		let timeout = self.options.connect_timeout;
		tokio::time::timeout(timeout, engine.connect(url))
			.await
			.map_err(|_| SchemaError::ConnectTimeout(timeout.as_secs()))?
	}

	/// Diff `documents` against the project's current schema and record them as the plan.
	pub async fn plan(&self, project_id: &str, documents: &SchemaDocuments) -> Result<PlanResult> {
		validate_plan_input(project_id, documents)?;
		let strategy = self.resolve_strategy(project_id).await?;
		self.plan_with_strategy(project_id, documents, strategy)
			.await
	}

	#[tracing::instrument(
		skip(self, documents, strategy),
		fields(project_id = %project_id, strategy = strategy.name(), documents = documents.len())
	)]
	pub async fn plan_with_strategy(
		&self,
		project_id: &str,
		documents: &SchemaDocuments,
		strategy: DiffStrategy,
	) -> Result<PlanResult> {
		validate_plan_input(project_id, documents)?;

		let lock = self.project_lock(project_id).await;
		let result = {
			let _guard = lock.lock().await;
			self.plan_locked(project_id, documents, &strategy).await
		};
		self.release_lock(project_id, lock).await;
		result
	}

	async fn plan_locked(
		&self,
		project_id: &str,
		documents: &SchemaDocuments,
		strategy: &DiffStrategy,
	) -> Result<PlanResult> {
		let (migrations, summary) = match strategy {
			DiffStrategy::Native(client) => {
				self.plan_native(project_id, documents, client.as_ref())
					.await?
			}
			DiffStrategy::ContentHash => self.plan_content_hash(project_id, documents).await?,
		};

		let plan_token = self.state.save_plan(project_id, documents).await?;

		info!(
			plan_token,
			migrations = migrations.len(),
			"schema plan recorded"
		);
		Ok(PlanResult {
			has_changes: !migrations.is_empty(),
			migrations,
			summary,
			plan_token,
		})
	}

	/// Execute the recorded plan identified by `plan_token`.
	///
	/// `migrations` is accepted for audit only; what runs is always re-derived
	/// from the recorded documents.
	pub async fn apply(
		&self,
		project_id: &str,
		migrations: &[Migration],
		plan_token: Option<u64>,
	) -> Result<()> {
		validate_project(project_id)?;
		let strategy = self.resolve_strategy(project_id).await?;
		self.apply_with_strategy(project_id, migrations, plan_token, strategy)
			.await
	}

	#[tracing::instrument(
		skip(self, migrations, strategy),
		fields(project_id = %project_id, strategy = strategy.name(), migrations = migrations.len())
	)]
	pub async fn apply_with_strategy(
		&self,
		project_id: &str,
		migrations: &[Migration],
		plan_token: Option<u64>,
		strategy: DiffStrategy,
	) -> Result<()> {
		validate_project(project_id)?;

		let lock = self.project_lock(project_id).await;
		let result = {
			let _guard = lock.lock().await;
			self.apply_locked(project_id, migrations, plan_token, &strategy)
				.await
		};
		self.release_lock(project_id, lock).await;
		result
	}

	async fn apply_locked(
		&self,
		project_id: &str,
		migrations: &[Migration],
		plan_token: Option<u64>,
		strategy: &DiffStrategy,
	) -> Result<()> {
		let Some(plan) = self.state.get_plan(project_id).await? else {
			if plan_token.is_none() && migrations.is_empty() {
				info!("nothing planned and nothing supplied, apply is a no-op");
				return Ok(());
			}
			return Err(SchemaError::NoPlannedSchema {
				project_id: project_id.to_string(),
			});
		};

		if plan_token != Some(plan.generation) {
			return Err(SchemaError::StalePlan {
				project_id: project_id.to_string(),
				current: plan.generation,
				provided: plan_token,
			});
		}

		match strategy {
			DiffStrategy::Native(client) => {
				let desired = parse_for_dialect(&combine(&plan.documents), client.dialect())?;
				let current = client.inspect().await?;
				let changes = diff_realms(&current, &desired);
				if changes.is_empty() {
					info!("live schema already matches plan");
				} else {
					let statements = client.plan_changes(&changes)?;
					client.execute(&statements).await?;
					info!(statements = statements.len(), "schema changes executed");
				}
			}
			DiffStrategy::ContentHash => {
				self.state.save_state(project_id, &plan.documents).await?;
			}
		}

		self.state.clear_plan(project_id, plan.generation).await?;
		info!(plan_token = plan.generation, "schema plan applied");
		Ok(())
	}

	/// Reject blank documents before they reach a plan.
	pub fn validate(&self, document: &str) -> Result<()> {
		if document.trim().is_empty() {
			return Err(SchemaError::InvalidInput(
				"schema content is empty".to_string(),
			));
		}
		Ok(())
	}

	/// [`validate`](Self::validate) plus a full parse for `dialect`.
	pub fn validate_for_dialect(&self, document: &str, dialect: Dialect) -> Result<()> {
		self.validate(document)?;
		parse_for_dialect(document, dialect).map(|_| ())
	}

	/// Last applied document for `alias` under the content-hash strategy.
	#[tracing::instrument(skip(self), fields(project_id = %project_id, alias = %alias))]
	pub async fn current_state(&self, project_id: &str, alias: &str) -> Result<String> {
		self.state
			.get_state(project_id)
			.await?
			.and_then(|mut documents| documents.remove(alias))
			.ok_or_else(|| SchemaError::StateNotFound {
				project_id: project_id.to_string(),
				alias: alias.to_string(),
			})
	}

	async fn plan_native(
		&self,
		project_id: &str,
		documents: &SchemaDocuments,
		client: &dyn SchemaClient,
	) -> Result<(Vec<Migration>, String)> {
		let combined = combine(documents);
		let desired = parse_for_dialect(&combined, client.dialect())?;
		let current = client.inspect().await?;
		let changes = diff_realms(&current, &desired);

		let mut migrations = Vec::new();
		if !changes.is_empty() {
			let statements = client.plan_changes(&changes)?;
			migrations.push(Migration::new(
				project_id,
				&combined,
				statements.join(";\n"),
				"Schema update (Native)".to_string(),
			));
		}

		debug!(changes = changes.len(), "native diff computed");
		let summary = format!("{} changes proposed", migrations.len());
		Ok((migrations, summary))
	}

	async fn plan_content_hash(
		&self,
		project_id: &str,
		documents: &SchemaDocuments,
	) -> Result<(Vec<Migration>, String)> {
		let current = self.state.get_state(project_id).await?.unwrap_or_default();

		let migrations: Vec<Migration> = documents
			.iter()
			.filter(|(alias, desired)| {
				let existing = current.get(*alias).map(String::as_str).unwrap_or("");
				existing.trim() != desired.trim()
			})
			.map(|(alias, desired)| {
				Migration::new(
					project_id,
					desired,
					format!("-- Mock migration for {alias}"),
					format!("schema update for {alias} (mock)"),
				)
			})
			.collect();

		let summary = if migrations.is_empty() {
			"Local mode: no changes detected".to_string()
		} else {
			format!("Local mode: {} schema changes detected", migrations.len())
		};
		Ok((migrations, summary))
	}

	async fn project_lock(&self, project_id: &str) -> Arc<Mutex<()>> {
		let mut locks = self.locks.lock().await;
		locks.entry(project_id.to_string()).or_default().clone()
	}

	/// Drop the project's entry once no other caller holds or waits on it.
	async fn release_lock(&self, project_id: &str, lock: Arc<Mutex<()>>) {
		let mut locks = self.locks.lock().await;
		let idle = locks
			.get(project_id)
			.is_some_and(|entry| Arc::ptr_eq(entry, &lock) && Arc::strong_count(entry) == 2);
		if idle {
			locks.remove(project_id);
		}
	}
}

fn validate_project(project_id: &str) -> Result<()> {
	if project_id.trim().is_empty() {
		return Err(SchemaError::InvalidInput(
			"project_id is required".to_string(),
		));
	}
	Ok(())
}

fn validate_plan_input(project_id: &str, documents: &SchemaDocuments) -> Result<()> {
	validate_project(project_id)?;
	if documents.is_empty() {
		return Err(SchemaError::InvalidInput(
			"at least one schema document is required".to_string(),
		));
	}
	Ok(())
}

/// All documents in alias order, newline separated.
fn combine(documents: &SchemaDocuments) -> String {
	let mut combined = String::new();
	for content in documents.values() {
		combined.push_str(content);
		combined.push('\n');
	}
	combined
}

fn parse_for_dialect(document: &str, dialect: Dialect) -> Result<Realm> {
	match dialect {
		Dialect::Sqlite => parse_realm(document),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::state::MemoryPlannerStateStore;
	use async_trait::async_trait;
	use stk_common_core::ErrorKind;
	use stk_hub_vault::MemorySecretStore;

	const MASTER_KEY: &[u8; 32] = b"0123456789abcdef0123456789abcdef";
	const USERS: &str = "table users {\n  column id { type = integer }\n  primary_key { columns = [column.id] }\n}\n";

	fn planner() -> (SchemaPlanner, VaultService) {
		let vault = VaultService::new(Arc::new(MemorySecretStore::new()), MASTER_KEY).unwrap();
		let planner = SchemaPlanner::new(
			vault.clone(),
			Arc::new(MemoryPlannerStateStore::new()),
			PlannerOptions::default(),
		);
		(planner, vault)
	}

	fn docs(alias: &str, text: &str) -> SchemaDocuments {
		SchemaDocuments::from([(alias.to_string(), text.to_string())])
	}

	fn sqlite_url(dir: &tempfile::TempDir) -> String {
		format!("sqlite:{}", dir.path().join("project.db").display())
	}

	#[tokio::test]
	async fn content_hash_plan_without_database_secret() {
		let (planner, _) = planner();
		let result = planner.plan("p1", &docs("main", USERS)).await.unwrap();

		assert!(result.has_changes);
		assert_eq!(result.migrations.len(), 1);
		let migration = &result.migrations[0];
		assert_eq!(migration.project_id, "p1");
		assert_eq!(migration.description, "schema update for main (mock)");
		assert!(migration.sql.starts_with("--"));
		assert!(!migration.applied);
		assert_eq!(result.summary, "Local mode: 1 schema changes detected");
	}

	#[tokio::test]
	async fn plan_then_apply_then_replan_converges() {
		let (planner, _) = planner();
		let documents = docs("main", USERS);

		let plan = planner.plan("p1", &documents).await.unwrap();
		planner
			.apply("p1", &plan.migrations, Some(plan.plan_token))
			.await
			.unwrap();

		let replan = planner.plan("p1", &documents).await.unwrap();
		assert!(!replan.has_changes);
		assert_eq!(replan.summary, "Local mode: no changes detected");
		assert_eq!(planner.current_state("p1", "main").await.unwrap(), USERS);
	}

	#[tokio::test]
	async fn whitespace_only_differences_are_not_changes() {
		let (planner, _) = planner();
		let plan = planner.plan("p1", &docs("main", USERS)).await.unwrap();
		planner.apply("p1", &[], Some(plan.plan_token)).await.unwrap();

		let padded = format!("\n\n  {USERS}  \n");
		let replan = planner.plan("p1", &docs("main", &padded)).await.unwrap();
		assert!(!replan.has_changes);
	}

	#[tokio::test]
	async fn second_apply_has_no_plan() {
		let (planner, _) = planner();
		let plan = planner.plan("p1", &docs("main", USERS)).await.unwrap();

		planner.apply("p1", &[], Some(plan.plan_token)).await.unwrap();
		let err = planner
			.apply("p1", &[], Some(plan.plan_token))
			.await
			.unwrap_err();
		assert!(matches!(err, SchemaError::NoPlannedSchema { .. }));
		assert_eq!(err.kind(), ErrorKind::PreconditionFailed);
	}

	#[tokio::test]
	async fn apply_without_plan_and_without_migrations_is_noop() {
		let (planner, _) = planner();
		planner.apply("p1", &[], None).await.unwrap();
	}

	#[tokio::test]
	async fn apply_without_plan_with_migrations_fails() {
		let (planner, _) = planner();
		let migration = Migration::new("p1", USERS, "DROP TABLE users".into(), "evil".into());
		let err = planner.apply("p1", &[migration], None).await.unwrap_err();
		assert_eq!(err.kind(), ErrorKind::PreconditionFailed);
	}

	#[tokio::test]
	async fn superseded_token_is_stale() {
		let (planner, _) = planner();
		let first = planner.plan("p1", &docs("main", USERS)).await.unwrap();
		let second = planner
			.plan("p1", &docs("main", "table posts { column id { type = int } }"))
			.await
			.unwrap();
		assert!(second.plan_token > first.plan_token);

		let err = planner
			.apply("p1", &first.migrations, Some(first.plan_token))
			.await
			.unwrap_err();
		assert!(matches!(
			err,
			SchemaError::StalePlan { current, provided: Some(p), .. }
				if current == second.plan_token && p == first.plan_token
		));

		planner
			.apply("p1", &second.migrations, Some(second.plan_token))
			.await
			.unwrap();
		assert!(planner.current_state("p1", "main").await.unwrap().contains("posts"));
	}

	#[tokio::test]
	async fn missing_token_with_plan_on_record_is_stale() {
		let (planner, _) = planner();
		planner.plan("p1", &docs("main", USERS)).await.unwrap();
		let err = planner.apply("p1", &[], None).await.unwrap_err();
		assert!(matches!(err, SchemaError::StalePlan { provided: None, .. }));
	}

	#[tokio::test]
	async fn tokens_keep_increasing_after_apply() {
		let (planner, _) = planner();
		let first = planner.plan("p1", &docs("main", USERS)).await.unwrap();
		planner.apply("p1", &[], Some(first.plan_token)).await.unwrap();
		let second = planner.plan("p1", &docs("main", USERS)).await.unwrap();
		assert!(second.plan_token > first.plan_token);
	}

	#[tokio::test]
	async fn empty_documents_are_invalid() {
		let (planner, _) = planner();
		let err = planner.plan("p1", &SchemaDocuments::new()).await.unwrap_err();
		assert_eq!(err.kind(), ErrorKind::InvalidInput);
		let err = planner.plan("", &docs("main", USERS)).await.unwrap_err();
		assert_eq!(err.kind(), ErrorKind::InvalidInput);
	}

	#[test]
	fn validate_rejects_blank_documents() {
		let (planner, _) = planner();
		assert!(planner.validate("   \n").is_err());
		assert!(planner.validate(USERS).is_ok());
		assert!(planner
			.validate_for_dialect("table users {", Dialect::Sqlite)
			.is_err());
		assert!(planner.validate_for_dialect(USERS, Dialect::Sqlite).is_ok());
	}

	#[tokio::test]
	async fn current_state_missing_alias() {
		let (planner, _) = planner();
		let err = planner.current_state("p1", "main").await.unwrap_err();
		assert_eq!(err.kind(), ErrorKind::NotFound);
	}

	#[tokio::test]
	async fn undecryptable_database_secret_is_fatal() {
		let store = Arc::new(MemorySecretStore::new());
		let other = VaultService::new(store.clone(), &[9u8; 32]).unwrap();
		other.set("p1", "database_url", "sqlite::memory:").await.unwrap();

		let vault = VaultService::new(store, MASTER_KEY).unwrap();
		let planner = SchemaPlanner::new(
			vault,
			Arc::new(MemoryPlannerStateStore::new()),
			PlannerOptions::default(),
		);
		let err = planner.plan("p1", &docs("main", USERS)).await.unwrap_err();
		assert!(matches!(err, SchemaError::Vault(_)));
		assert_eq!(err.kind(), ErrorKind::Internal);
	}

	#[tokio::test]
	async fn unsupported_scheme_falls_back() {
		let (planner, vault) = planner();
		vault
			.set("p1", "database_url", "postgres://localhost/app")
			.await
			.unwrap();
		let strategy = planner.resolve_strategy("p1").await.unwrap();
		assert!(matches!(strategy, DiffStrategy::ContentHash));
	}

	struct HangingEngine;

	#[async_trait]
	impl SchemaEngine for HangingEngine {
		fn supports(&self, _url: &str) -> bool {
			true
		}

		async fn connect(&self, _url: &str) -> Result<Box<dyn SchemaClient>> {
			tokio::time::sleep(Duration::from_secs(3600)).await;
			Err(SchemaError::Connect("unreachable".into()))
		}
	}

	#[tokio::test]
	async fn connect_timeout_falls_back() {
		let vault = VaultService::new(Arc::new(MemorySecretStore::new()), MASTER_KEY).unwrap();
		vault.set("p1", "database_url", "hang://db").await.unwrap();
		let planner = SchemaPlanner::new(
			vault,
			Arc::new(MemoryPlannerStateStore::new()),
			PlannerOptions {
				connect_timeout: Duration::from_millis(50),
				..Default::default()
			},
		)
		.with_engines(vec![Arc::new(HangingEngine)]);

		let result = planner.plan("p1", &docs("main", USERS)).await.unwrap();
		assert!(result.summary.starts_with("Local mode"));
	}

	#[tokio::test]
	async fn hanging_connect_reports_timeout() {
		let (planner, _) = planner();
		let planner = SchemaPlanner {
			options: PlannerOptions {
				connect_timeout: Duration::from_millis(20),
				..Default::default()
			},
			..planner
		};

		let err = planner.connect(&HangingEngine, "hang://db").await.err().unwrap();
		assert!(matches!(err, SchemaError::ConnectTimeout(_)));
		assert!(err.is_unreachable());
	}

	#[tokio::test]
	async fn native_summary_counts_migrations() {
		let dir = tempfile::tempdir().unwrap();
		let (planner, vault) = planner();
		vault.set("p1", "database_url", &sqlite_url(&dir)).await.unwrap();

		let two_tables = format!("{USERS}table posts {{\n  column id {{ type = integer }}\n}}\n");
		let plan = planner.plan("p1", &docs("main", &two_tables)).await.unwrap();
		assert_eq!(plan.migrations.len(), 1);
		assert!(plan.migrations[0].sql.contains("\"posts\""));
		assert_eq!(plan.summary, "1 changes proposed");
	}

	#[tokio::test]
	async fn idle_project_locks_are_released() {
		let (planner, _) = planner();
		let plan = planner.plan("p1", &docs("main", USERS)).await.unwrap();
		planner.plan("p2", &docs("main", USERS)).await.unwrap();
		planner
			.apply("p1", &plan.migrations, Some(plan.plan_token))
			.await
			.unwrap();
		planner.apply("p1", &[], Some(plan.plan_token)).await.unwrap_err();

		assert!(planner.locks.lock().await.is_empty());
	}

	#[tokio::test]
	async fn native_plan_and_apply_against_sqlite() {
		let dir = tempfile::tempdir().unwrap();
		let (planner, vault) = planner();
		vault.set("p1", "database_url", &sqlite_url(&dir)).await.unwrap();

		let plan = planner.plan("p1", &docs("main", USERS)).await.unwrap();
		assert!(plan.has_changes);
		assert_eq!(plan.migrations.len(), 1);
		assert_eq!(plan.migrations[0].description, "Schema update (Native)");
		assert!(plan.migrations[0].sql.contains("CREATE TABLE \"users\""));
		assert_eq!(plan.summary, "1 changes proposed");

		planner
			.apply("p1", &plan.migrations, Some(plan.plan_token))
			.await
			.unwrap();

		let replan = planner.plan("p1", &docs("main", USERS)).await.unwrap();
		assert!(!replan.has_changes);
		assert_eq!(replan.summary, "0 changes proposed");

		// Native apply does not record fallback state.
		assert!(planner.current_state("p1", "main").await.is_err());
	}

	#[tokio::test]
	async fn native_apply_of_converged_plan_is_noop() {
		let dir = tempfile::tempdir().unwrap();
		let (planner, vault) = planner();
		vault.set("p1", "database_url", &sqlite_url(&dir)).await.unwrap();

		let first = planner.plan("p1", &docs("main", USERS)).await.unwrap();
		planner.apply("p1", &[], Some(first.plan_token)).await.unwrap();

		let second = planner.plan("p1", &docs("main", USERS)).await.unwrap();
		assert!(!second.has_changes);
		planner.apply("p1", &[], Some(second.plan_token)).await.unwrap();
	}

	#[tokio::test]
	async fn native_parse_error_is_invalid_input() {
		let dir = tempfile::tempdir().unwrap();
		let (planner, vault) = planner();
		vault.set("p1", "database_url", &sqlite_url(&dir)).await.unwrap();

		let err = planner
			.plan("p1", &docs("main", "table users { column id }"))
			.await
			.unwrap_err();
		assert_eq!(err.kind(), ErrorKind::InvalidInput);
	}

	#[tokio::test]
	async fn forced_content_hash_ignores_database() {
		let dir = tempfile::tempdir().unwrap();
		let (planner, vault) = planner();
		vault.set("p1", "database_url", &sqlite_url(&dir)).await.unwrap();

		let result = planner
			.plan_with_strategy("p1", &docs("main", USERS), DiffStrategy::ContentHash)
			.await
			.unwrap();
		assert!(result.summary.starts_with("Local mode"));
	}

	#[tokio::test]
	async fn concurrent_plans_get_distinct_tokens() {
		let (planner, _) = planner();
		let planner = Arc::new(planner);

		let handles: Vec<_> = (0..8)
			.map(|i| {
				let planner = planner.clone();
				tokio::spawn(async move {
					let text = format!("table t{i} {{ column id {{ type = int }} }}");
					planner.plan("p1", &docs("main", &text)).await.unwrap().plan_token
				})
			})
			.collect();

		let mut tokens = Vec::new();
		for handle in handles {
			tokens.push(handle.await.unwrap());
		}
		let latest = *tokens.iter().max().unwrap();
		tokens.sort();
		tokens.dedup();
		assert_eq!(tokens.len(), 8);

		for token in &tokens {
			let result = planner.apply("p1", &[], Some(*token)).await;
			assert_eq!(result.is_ok(), *token == latest);
			if *token == latest {
				break;
			}
		}
	}
}
