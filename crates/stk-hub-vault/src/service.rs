// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Vault service: secret CRUD over a [`SecretStore`] plus edge re-encryption.

use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use stk_common_secret::SecretString;
use tracing::{debug, info};
use zeroize::Zeroizing;

use crate::encryption::{self, KEY_SIZE};
use crate::error::{Result, VaultError};
use crate::store::{SecretRecord, SecretStore};

#[derive(Clone)]
pub struct VaultService {
	store: Arc<dyn SecretStore>,
	master_key: Arc<Zeroizing<[u8; KEY_SIZE]>>,
}

impl fmt::Debug for VaultService {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("VaultService")
			.field("master_key", &stk_common_secret::REDACTED)
			.finish_non_exhaustive()
	}
}

impl VaultService {
	/// Build a vault over `store`. The master key must be exactly [`KEY_SIZE`] bytes.
	pub fn new(store: Arc<dyn SecretStore>, master_key: &[u8]) -> Result<Self> {
		let master_key = encryption::key_from_slice(master_key)?;
		Ok(Self {
			store,
			master_key: Arc::new(master_key),
		})
	}

	/// Encrypt and store `value`, replacing any previous value for the key.
	#[tracing::instrument(skip(self, value), fields(project_id = %project_id, key = %key))]
	pub async fn set(&self, project_id: &str, key: &str, value: &str) -> Result<()> {
		validate_ids(project_id, key)?;

		let encrypted_value = encryption::seal(&self.master_key, value.as_bytes())?;
		let record = SecretRecord {
			project_id: project_id.to_string(),
			key: key.to_string(),
			encrypted_value,
			updated_at: Utc::now(),
		};
		self.store.upsert_secret(&record).await?;

		info!("secret stored");
		Ok(())
	}

	/// Decrypt the stored value. Corrupt or foreign ciphertext is an error, never garbage.
	#[tracing::instrument(skip(self), fields(project_id = %project_id, key = %key))]
	pub async fn get(&self, project_id: &str, key: &str) -> Result<SecretString> {
		validate_ids(project_id, key)?;

		let record = self
			.store
			.get_secret(project_id, key)
			.await?
			.ok_or_else(|| VaultError::SecretNotFound {
				project_id: project_id.to_string(),
				key: key.to_string(),
			})?;

		let plaintext = encryption::open(&self.master_key, &record.encrypted_value)?;
		let value = String::from_utf8(plaintext.to_vec())
			.map_err(|_| VaultError::Decryption("secret value is not valid UTF-8".to_string()))?;

		debug!("secret decrypted");
		Ok(SecretString::new(value))
	}

	/// Remove a secret. Absent keys are not an error.
	#[tracing::instrument(skip(self), fields(project_id = %project_id, key = %key))]
	pub async fn delete(&self, project_id: &str, key: &str) -> Result<()> {
		validate_ids(project_id, key)?;

		let removed = self.store.delete_secret(project_id, key).await?;
		info!(removed, "secret deleted");
		Ok(())
	}

	/// Keys only; values are never returned.
	#[tracing::instrument(skip(self), fields(project_id = %project_id))]
	pub async fn list(&self, project_id: &str) -> Result<Vec<String>> {
		if project_id.is_empty() {
			return Err(VaultError::InvalidInput(
				"project_id must not be empty".to_string(),
			));
		}
		self.store.list_secret_keys(project_id).await
	}

	/// Decrypt a secret and seal it again under `edge_key` with a fresh nonce.
	#[tracing::instrument(skip(self, edge_key), fields(project_id = %project_id, key = %key))]
	pub async fn re_encrypt_for_edge(
		&self,
		project_id: &str,
		key: &str,
		edge_key: &[u8],
	) -> Result<String> {
		let edge_key = encryption::key_from_slice(edge_key)?;
		let value = self.get(project_id, key).await?;
		let sealed = encryption::seal(&edge_key, value.expose().as_bytes())?;

		debug!("secret re-encrypted for edge");
		Ok(sealed)
	}
}

fn validate_ids(project_id: &str, key: &str) -> Result<()> {
	if project_id.is_empty() {
		return Err(VaultError::InvalidInput(
			"project_id must not be empty".to_string(),
		));
	}
	if key.is_empty() {
		return Err(VaultError::InvalidInput(
			"secret key must not be empty".to_string(),
		));
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::encryption::generate_key;
	use crate::store::MemorySecretStore;
	use proptest::prelude::*;

	const MASTER_KEY: &[u8; 32] = b"0123456789abcdef0123456789abcdef";

	fn vault() -> (VaultService, Arc<MemorySecretStore>) {
		let store = Arc::new(MemorySecretStore::new());
		let vault = VaultService::new(store.clone(), MASTER_KEY).unwrap();
		(vault, store)
	}

	#[test]
	fn rejects_short_master_key() {
		let err = VaultService::new(Arc::new(MemorySecretStore::new()), b"short").unwrap_err();
		assert!(matches!(
			err,
			VaultError::InvalidKey {
				expected: 32,
				actual: 5
			}
		));
	}

	#[tokio::test]
	async fn set_then_get_roundtrip() {
		let (vault, store) = vault();
		vault.set("p1", "database_url", "sqlite::memory:").await.unwrap();

		let value = vault.get("p1", "database_url").await.unwrap();
		assert_eq!(value.expose(), "sqlite::memory:");

		let record = store.get_secret("p1", "database_url").await.unwrap().unwrap();
		assert!(!record.encrypted_value.contains("sqlite"));
	}

	#[tokio::test]
	async fn set_overwrites_previous_value() {
		let (vault, _) = vault();
		vault.set("p1", "k", "first").await.unwrap();
		vault.set("p1", "k", "second").await.unwrap();
		assert_eq!(vault.get("p1", "k").await.unwrap().expose(), "second");
	}

	#[tokio::test]
	async fn empty_value_is_allowed() {
		let (vault, _) = vault();
		vault.set("p1", "k", "").await.unwrap();
		assert!(vault.get("p1", "k").await.unwrap().is_empty());
	}

	#[tokio::test]
	async fn missing_secret_is_not_found() {
		let (vault, _) = vault();
		let err = vault.get("p1", "nope").await.unwrap_err();
		assert!(err.is_not_found());
	}

	#[tokio::test]
	async fn empty_key_is_invalid_input() {
		let (vault, _) = vault();
		let err = vault.set("p1", "", "v").await.unwrap_err();
		assert!(matches!(err, VaultError::InvalidInput(_)));
		let err = vault.list("").await.unwrap_err();
		assert!(matches!(err, VaultError::InvalidInput(_)));
	}

	#[tokio::test]
	async fn delete_is_idempotent() {
		let (vault, _) = vault();
		vault.set("p1", "k", "v").await.unwrap();
		vault.delete("p1", "k").await.unwrap();
		vault.delete("p1", "k").await.unwrap();
		assert!(vault.get("p1", "k").await.unwrap_err().is_not_found());
	}

	#[tokio::test]
	async fn list_returns_keys_only() {
		let (vault, _) = vault();
		vault.set("p1", "b", "secret-b").await.unwrap();
		vault.set("p1", "a", "secret-a").await.unwrap();
		vault.set("p2", "c", "secret-c").await.unwrap();

		let mut keys = vault.list("p1").await.unwrap();
		keys.sort();
		assert_eq!(keys, vec!["a", "b"]);
	}

	#[tokio::test]
	async fn corrupt_ciphertext_fails_decryption() {
		let (vault, store) = vault();
		store
			.upsert_secret(&SecretRecord {
				project_id: "p1".into(),
				key: "k".into(),
				encrypted_value: "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA".into(),
				updated_at: Utc::now(),
			})
			.await
			.unwrap();

		let err = vault.get("p1", "k").await.unwrap_err();
		assert!(matches!(err, VaultError::Decryption(_)));
	}

	#[tokio::test]
	async fn value_from_other_master_key_fails() {
		let store = Arc::new(MemorySecretStore::new());
		let first = VaultService::new(store.clone(), MASTER_KEY).unwrap();
		let other_key = generate_key();
		let second = VaultService::new(store, other_key.as_slice()).unwrap();

		first.set("p1", "k", "v").await.unwrap();
		assert!(matches!(
			second.get("p1", "k").await.unwrap_err(),
			VaultError::Decryption(_)
		));
	}

	#[tokio::test]
	async fn re_encrypt_for_edge_uses_edge_key() {
		let (vault, _) = vault();
		vault.set("p1", "api_token", "tok-123").await.unwrap();

		let edge_key = generate_key();
		let sealed = vault
			.re_encrypt_for_edge("p1", "api_token", edge_key.as_slice())
			.await
			.unwrap();

		let opened = encryption::open(&edge_key, &sealed).unwrap();
		assert_eq!(opened.as_slice(), b"tok-123");
		assert!(encryption::open(MASTER_KEY, &sealed).is_err());
	}

	#[tokio::test]
	async fn re_encrypt_rejects_bad_edge_key() {
		let (vault, _) = vault();
		vault.set("p1", "k", "v").await.unwrap();
		let err = vault.re_encrypt_for_edge("p1", "k", b"short").await.unwrap_err();
		assert!(matches!(err, VaultError::InvalidKey { .. }));
	}

	#[tokio::test]
	async fn concurrent_sets_leave_one_value() {
		let (vault, _) = vault();
		let a = {
			let vault = vault.clone();
			tokio::spawn(async move { vault.set("p1", "k", "a").await })
		};
		let b = {
			let vault = vault.clone();
			tokio::spawn(async move { vault.set("p1", "k", "b").await })
		};
		a.await.unwrap().unwrap();
		b.await.unwrap().unwrap();

		let value = vault.get("p1", "k").await.unwrap();
		assert!(value.expose() == "a" || value.expose() == "b");
	}

	proptest! {
		#![proptest_config(ProptestConfig::with_cases(32))]

		#[test]
		fn prop_get_returns_what_was_set(value in "\\PC{0,256}") {
			let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
			let (vault, _) = vault();
			let got = rt.block_on(async {
				vault.set("p1", "k", &value).await.unwrap();
				vault.get("p1", "k").await.unwrap()
			});
			prop_assert_eq!(got.expose(), &value);
		}
	}
}
