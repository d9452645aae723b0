// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The Santokit hub.
//!
//! [`Hub`] wires the secret vault, the schema planner and the manifest
//! registry from a [`HubConfig`] and exposes the request-level operations the
//! HTTP layer calls. Request types come from `stk-hub-api`.

pub mod error;
pub mod logging;

use std::sync::Arc;

use stk_hub_api::{
	ApplySchemaRequest, DeleteSecretQuery, GetManifestQuery, ListSecretsQuery, ListVersionsResponse,
	PlanSchemaRequest, PushManifestRequest, SetSecretRequest, SuccessResponse,
};
use stk_hub_config::{EdgeConfig, HubConfig, SchemaConfig};
use stk_hub_db::{
	create_pool, run_migrations, SqliteManifestStore, SqlitePlannerStateStore, SqliteSecretStore,
};
use stk_hub_registry::{
	secret_edge_key, EdgePropagator, EdgeSink, FileKvSink, HttpKvSink, Manifest,
	MemoryManifestStore, RegistryService,
};
use stk_hub_schema::{MemoryPlannerStateStore, PlanResult, PlannerOptions, SchemaPlanner};
use stk_hub_vault::{MemorySecretStore, VaultService};
use tracing::{debug, info};

pub use error::{HubError, Result};
pub use logging::init_tracing;

const DEFAULT_CREATED_BY: &str = "local";

#[derive(Clone)]
pub struct Hub {
	vault: VaultService,
	planner: Arc<SchemaPlanner>,
	registry: RegistryService,
}

impl Hub {
	pub fn new(vault: VaultService, planner: SchemaPlanner, registry: RegistryService) -> Self {
		Self {
			vault,
			planner: Arc::new(planner),
			registry,
		}
	}

	/// Open the hub database, run migrations and build every service over it.
	#[tracing::instrument(skip(config))]
	pub async fn from_config(config: &HubConfig) -> Result<Self> {
		let master_key = config.vault.encryption_key.as_ref().ok_or_else(|| {
			HubError::Config(stk_hub_config::ConfigError::Validation(
				"vault.encryption_key is required".to_string(),
			))
		})?;

		let pool = create_pool(&config.database.url).await?;
		run_migrations(&pool).await?;

		let vault = VaultService::new(
			Arc::new(SqliteSecretStore::new(pool.clone())),
			master_key.expose().as_bytes(),
		)?;
		let planner = SchemaPlanner::new(
			vault.clone(),
			Arc::new(SqlitePlannerStateStore::new(pool.clone())),
			planner_options(&config.schema),
		);
		let registry = RegistryService::new(
			Arc::new(SqliteManifestStore::new(pool)),
			edge_propagator(&config.edge)?,
		);

		info!("hub services ready");
		Ok(Self::new(vault, planner, registry))
	}

	/// Every service over process-local stores. `edge_sink = None` disables
	/// propagation.
	pub fn in_memory(master_key: &[u8], edge_sink: Option<Arc<dyn EdgeSink>>) -> Result<Self> {
		let vault = VaultService::new(Arc::new(MemorySecretStore::new()), master_key)?;
		let planner = SchemaPlanner::new(
			vault.clone(),
			Arc::new(MemoryPlannerStateStore::new()),
			PlannerOptions::default(),
		);
		let propagator =
			edge_sink.map(|sink| EdgePropagator::new(sink, EdgeConfig::default().timeout()));
		let registry = RegistryService::new(Arc::new(MemoryManifestStore::new()), propagator);
		Ok(Self::new(vault, planner, registry))
	}

	pub fn vault(&self) -> &VaultService {
		&self.vault
	}

	pub fn planner(&self) -> &SchemaPlanner {
		&self.planner
	}

	pub fn registry(&self) -> &RegistryService {
		&self.registry
	}

	// Secrets

	#[tracing::instrument(skip(self, req), fields(project_id = %req.project_id, key = %req.key))]
	pub async fn set_secret(&self, req: SetSecretRequest) -> Result<SuccessResponse> {
		self.vault
			.set(&req.project_id, &req.key, req.value.expose())
			.await?;
		Ok(SuccessResponse::new("secret saved"))
	}

	pub async fn list_secrets(&self, query: &ListSecretsQuery) -> Result<Vec<String>> {
		Ok(self.vault.list(&query.project_id).await?)
	}

	#[tracing::instrument(skip(self, query), fields(project_id = %query.project_id, key = %key))]
	pub async fn delete_secret(&self, key: &str, query: &DeleteSecretQuery) -> Result<SuccessResponse> {
		self.vault.delete(&query.project_id, key).await?;
		Ok(SuccessResponse::new("secret deleted"))
	}

	/// Re-encrypt a secret under `edge_key` and hand it to the edge sink.
	///
	/// Returns the re-encrypted value. Delivery is best-effort and happens in
	/// the background; with propagation disabled nothing is sent.
	#[tracing::instrument(skip(self, edge_key), fields(project_id = %project_id, key = %key))]
	pub async fn provision_secret(
		&self,
		project_id: &str,
		key: &str,
		edge_key: &[u8],
	) -> Result<String> {
		let sealed = self
			.vault
			.re_encrypt_for_edge(project_id, key, edge_key)
			.await?;

		match self.registry.propagator() {
			Some(propagator) => {
				propagator.spawn_record(secret_edge_key(project_id, key), sealed.clone().into_bytes());
				info!("secret provisioning scheduled");
			}
			None => debug!("edge propagation disabled, secret not provisioned"),
		}
		Ok(sealed)
	}

	// Schema

	#[tracing::instrument(skip(self, req), fields(project_id = %req.project_id, aliases = req.schemas.len()))]
	pub async fn plan_schema(&self, req: &PlanSchemaRequest) -> Result<PlanResult> {
		if req.schemas.is_empty() {
			return Err(HubError::InvalidInput("schemas must not be empty".to_string()));
		}
		for (alias, document) in &req.schemas {
			if alias.trim().is_empty() {
				return Err(HubError::InvalidInput("schema alias must not be blank".to_string()));
			}
			self.planner.validate(document)?;
		}

		Ok(self.planner.plan(&req.project_id, &req.schemas).await?)
	}

	pub async fn apply_schema(&self, req: &ApplySchemaRequest) -> Result<SuccessResponse> {
		self.planner
			.apply(&req.project_id, &req.migrations, req.plan_token)
			.await?;
		Ok(SuccessResponse::new("schema applied"))
	}

	// Manifests

	pub async fn get_manifest(&self, query: &GetManifestQuery) -> Result<Manifest> {
		let manifest = match &query.version {
			Some(version) => self.registry.get_by_version(&query.project_id, version).await?,
			None => self.registry.get_latest(&query.project_id).await?,
		};
		Ok(manifest)
	}

	pub async fn list_manifest_versions(&self, project_id: &str) -> Result<ListVersionsResponse> {
		Ok(ListVersionsResponse {
			project_id: project_id.to_string(),
			versions: self.registry.list_versions(project_id).await?,
		})
	}

	pub async fn push_manifest(&self, req: PushManifestRequest) -> Result<Manifest> {
		let created_by = req.created_by.as_deref().unwrap_or(DEFAULT_CREATED_BY);
		Ok(self
			.registry
			.push(&req.project_id, req.bundles, created_by)
			.await?)
	}

	/// Wait for outstanding edge propagation (shutdown and tests).
	pub async fn wait_for_propagation(&self) {
		self.registry.wait_for_propagation().await;
	}
}

fn planner_options(config: &SchemaConfig) -> PlannerOptions {
	PlannerOptions {
		connect_timeout: config.connect_timeout(),
		database_url_key: config.database_url_key.clone(),
	}
}

fn edge_propagator(config: &EdgeConfig) -> Result<Option<EdgePropagator>> {
	if !config.enabled {
		info!("edge propagation disabled");
		return Ok(None);
	}

	let sink: Arc<dyn EdgeSink> = match &config.kv_url {
		Some(url) => {
			let http = reqwest::Client::builder()
				.timeout(config.timeout())
				.build()?;
			let mut sink = HttpKvSink::new(url, http).map_err(|e| {
				HubError::Config(stk_hub_config::ConfigError::Validation(format!("edge.kv_url: {e}")))
			})?;
			if let Some(token) = &config.kv_token {
				sink = sink.with_token(token.clone());
			}
			Arc::new(sink)
		}
		None => Arc::new(FileKvSink::new(config.dir.clone())),
	};

	info!(sink = sink.name(), timeout_secs = config.timeout_secs, "edge propagation enabled");
	Ok(Some(EdgePropagator::new(sink, config.timeout())))
}
