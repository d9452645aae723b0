// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{RegistryError, Result};
use crate::propagation::EdgePropagator;
use crate::store::ManifestStore;
use crate::types::{Bundle, Manifest};

#[derive(Clone)]
pub struct RegistryService {
	store: Arc<dyn ManifestStore>,
	propagator: Option<EdgePropagator>,
}

impl std::fmt::Debug for RegistryService {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("RegistryService")
			.field("edge_sink", &self.propagator.as_ref().map(|p| p.sink_name()))
			.finish_non_exhaustive()
	}
}

impl RegistryService {
	/// `propagator = None` disables edge propagation.
	pub fn new(store: Arc<dyn ManifestStore>, propagator: Option<EdgePropagator>) -> Self {
		Self { store, propagator }
	}

	pub fn propagator(&self) -> Option<&EdgePropagator> {
		self.propagator.as_ref()
	}

	/// Append a new manifest and schedule its edge propagation.
	///
	/// Returns once the manifest is durable; propagation outcome never
	/// affects the result.
	#[tracing::instrument(skip(self, bundles), fields(project_id = %project_id, bundles = bundles.len()))]
	pub async fn push(
		&self,
		project_id: &str,
		bundles: Vec<Bundle>,
		created_by: &str,
	) -> Result<Manifest> {
		validate_push(project_id, &bundles)?;

		let now = Utc::now();
		let manifest = Manifest {
			id: Uuid::new_v4().to_string(),
			project_id: project_id.to_string(),
			version: now.format("%Y%m%d%H%M%S").to_string(),
			bundles,
			created_at: now,
			created_by: created_by.to_string(),
		};

		self.store.append_manifest(&manifest).await?;
		info!(manifest_id = %manifest.id, version = %manifest.version, "manifest pushed");

		match &self.propagator {
			Some(propagator) => propagator.spawn_manifest(manifest.clone()),
			None => debug!("edge propagation disabled"),
		}

		Ok(manifest)
	}

	#[tracing::instrument(skip(self), fields(project_id = %project_id))]
	pub async fn get_latest(&self, project_id: &str) -> Result<Manifest> {
		self.store
			.get_latest(project_id)
			.await?
			.ok_or_else(|| RegistryError::ManifestNotFound {
				project_id: project_id.to_string(),
			})
	}

	#[tracing::instrument(skip(self), fields(project_id = %project_id, version = %version))]
	pub async fn get_by_version(&self, project_id: &str, version: &str) -> Result<Manifest> {
		self.store
			.get_by_version(project_id, version)
			.await?
			.ok_or_else(|| RegistryError::VersionNotFound {
				project_id: project_id.to_string(),
				version: version.to_string(),
			})
	}

	pub async fn list_versions(&self, project_id: &str) -> Result<Vec<String>> {
		self.store.list_versions(project_id).await
	}

	/// Drain scheduled propagation work. A no-op when propagation is disabled.
	pub async fn wait_for_propagation(&self) {
		if let Some(propagator) = &self.propagator {
			propagator.wait().await;
		}
	}
}

fn validate_push(project_id: &str, bundles: &[Bundle]) -> Result<()> {
	if project_id.trim().is_empty() {
		return Err(RegistryError::InvalidInput("project_id is required".into()));
	}

	let mut seen = HashSet::new();
	for bundle in bundles {
		if bundle.namespace.is_empty() || bundle.name.is_empty() {
			return Err(RegistryError::InvalidInput(
				"bundle namespace and name are required".into(),
			));
		}
		if !seen.insert((bundle.namespace.as_str(), bundle.name.as_str())) {
			return Err(RegistryError::InvalidInput(format!(
				"duplicate bundle {}/{}",
				bundle.namespace, bundle.name
			)));
		}
	}
	Ok(())
}
