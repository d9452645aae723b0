// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Storage seam for encrypted secrets.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::error::Result;

/// A stored secret. `encrypted_value` is the sealed form; plaintext is never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretRecord {
	pub project_id: String,
	pub key: String,
	pub encrypted_value: String,
	pub updated_at: DateTime<Utc>,
}

#[async_trait]
pub trait SecretStore: Send + Sync {
	/// Insert or fully replace the record for `(project_id, key)`.
	async fn upsert_secret(&self, record: &SecretRecord) -> Result<()>;
	async fn get_secret(&self, project_id: &str, key: &str) -> Result<Option<SecretRecord>>;
	/// Returns whether a record was removed.
	async fn delete_secret(&self, project_id: &str, key: &str) -> Result<bool>;
	async fn list_secret_keys(&self, project_id: &str) -> Result<Vec<String>>;
}

/// Process-local store for tests and local development.
#[derive(Debug, Default)]
pub struct MemorySecretStore {
	secrets: RwLock<HashMap<(String, String), SecretRecord>>,
}

impl MemorySecretStore {
	pub fn new() -> Self {
		Self::default()
	}
}

#[async_trait]
impl SecretStore for MemorySecretStore {
	async fn upsert_secret(&self, record: &SecretRecord) -> Result<()> {
		let mut secrets = self.secrets.write().await;
		secrets.insert(
			(record.project_id.clone(), record.key.clone()),
			record.clone(),
		);
		Ok(())
	}

	async fn get_secret(&self, project_id: &str, key: &str) -> Result<Option<SecretRecord>> {
		let secrets = self.secrets.read().await;
		Ok(secrets
			.get(&(project_id.to_string(), key.to_string()))
			.cloned())
	}

	async fn delete_secret(&self, project_id: &str, key: &str) -> Result<bool> {
		let mut secrets = self.secrets.write().await;
		Ok(secrets
			.remove(&(project_id.to_string(), key.to_string()))
			.is_some())
	}

	async fn list_secret_keys(&self, project_id: &str) -> Result<Vec<String>> {
		let secrets = self.secrets.read().await;
		let mut keys: Vec<String> = secrets
			.keys()
			.filter(|(project, _)| project == project_id)
			.map(|(_, key)| key.clone())
			.collect();
		keys.sort();
		Ok(keys)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn record(project_id: &str, key: &str, value: &str) -> SecretRecord {
		SecretRecord {
			project_id: project_id.to_string(),
			key: key.to_string(),
			encrypted_value: value.to_string(),
			updated_at: Utc::now(),
		}
	}

	#[tokio::test]
	async fn upsert_replaces_existing() {
		let store = MemorySecretStore::new();
		store.upsert_secret(&record("p1", "k", "v1")).await.unwrap();
		store.upsert_secret(&record("p1", "k", "v2")).await.unwrap();

		let got = store.get_secret("p1", "k").await.unwrap().unwrap();
		assert_eq!(got.encrypted_value, "v2");
		assert_eq!(store.list_secret_keys("p1").await.unwrap(), vec!["k"]);
	}

	#[tokio::test]
	async fn projects_are_isolated() {
		let store = MemorySecretStore::new();
		store.upsert_secret(&record("p1", "a", "x")).await.unwrap();
		store.upsert_secret(&record("p2", "b", "y")).await.unwrap();

		assert_eq!(store.list_secret_keys("p1").await.unwrap(), vec!["a"]);
		assert!(store.get_secret("p1", "b").await.unwrap().is_none());
	}

	#[tokio::test]
	async fn delete_reports_presence() {
		let store = MemorySecretStore::new();
		store.upsert_secret(&record("p1", "k", "v")).await.unwrap();
		assert!(store.delete_secret("p1", "k").await.unwrap());
		assert!(!store.delete_secret("p1", "k").await.unwrap());
	}
}
