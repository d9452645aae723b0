// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Vault configuration.

use serde::Deserialize;
use stk_common_config::SecretString;

/// Vault configuration (runtime, fully resolved).
///
/// The encryption key stays optional here; the vault checks its length when it
/// is constructed.
#[derive(Debug, Clone, Default)]
pub struct VaultConfig {
	pub encryption_key: Option<SecretString>,
}

/// Vault configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VaultConfigLayer {
	#[serde(default)]
	pub encryption_key: Option<SecretString>,
}

impl VaultConfigLayer {
	pub fn merge(&mut self, other: VaultConfigLayer) {
		if other.encryption_key.is_some() {
			self.encryption_key = other.encryption_key;
		}
	}

	pub fn finalize(self) -> VaultConfig {
		VaultConfig {
			encryption_key: self.encryption_key,
		}
	}
}
