// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::Result;
use crate::types::Manifest;

/// Append-only manifest history. "Latest" means last appended.
#[async_trait]
pub trait ManifestStore: Send + Sync {
	async fn append_manifest(&self, manifest: &Manifest) -> Result<()>;
	async fn get_latest(&self, project_id: &str) -> Result<Option<Manifest>>;
	/// Most recently appended manifest carrying `version`.
	async fn get_by_version(&self, project_id: &str, version: &str) -> Result<Option<Manifest>>;
	/// Versions in append order.
	async fn list_versions(&self, project_id: &str) -> Result<Vec<String>>;
}

#[derive(Debug, Default)]
pub struct MemoryManifestStore {
	manifests: RwLock<HashMap<String, Vec<Manifest>>>,
}

impl MemoryManifestStore {
	pub fn new() -> Self {
		Self::default()
	}
}

#[async_trait]
impl ManifestStore for MemoryManifestStore {
	async fn append_manifest(&self, manifest: &Manifest) -> Result<()> {
		let mut manifests = self.manifests.write().await;
		manifests
			.entry(manifest.project_id.clone())
			.or_default()
			.push(manifest.clone());
		Ok(())
	}

	async fn get_latest(&self, project_id: &str) -> Result<Option<Manifest>> {
		let manifests = self.manifests.read().await;
		Ok(manifests
			.get(project_id)
			.and_then(|history| history.last().cloned()))
	}

	async fn get_by_version(&self, project_id: &str, version: &str) -> Result<Option<Manifest>> {
		let manifests = self.manifests.read().await;
		Ok(manifests.get(project_id).and_then(|history| {
			history
				.iter()
				.rev()
				.find(|m| m.version == version)
				.cloned()
		}))
	}

	async fn list_versions(&self, project_id: &str) -> Result<Vec<String>> {
		let manifests = self.manifests.read().await;
		Ok(manifests
			.get(project_id)
			.map(|history| history.iter().map(|m| m.version.clone()).collect())
			.unwrap_or_default())
	}
}
