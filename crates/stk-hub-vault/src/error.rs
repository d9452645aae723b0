// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use stk_common_core::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VaultError {
	#[error("invalid key length: expected {expected} bytes, got {actual}")]
	InvalidKey { expected: usize, actual: usize },

	#[error("secret not found: {project_id}/{key}")]
	SecretNotFound { project_id: String, key: String },

	#[error("invalid input: {0}")]
	InvalidInput(String),

	#[error("encryption failed: {0}")]
	Encryption(String),

	#[error("decryption failed: {0}")]
	Decryption(String),

	#[error("secret store error: {0}")]
	Store(String),
}

impl VaultError {
	pub fn kind(&self) -> ErrorKind {
		match self {
			VaultError::SecretNotFound { .. } => ErrorKind::NotFound,
			VaultError::InvalidInput(_) => ErrorKind::InvalidInput,
			VaultError::InvalidKey { .. }
			| VaultError::Encryption(_)
			| VaultError::Decryption(_)
			| VaultError::Store(_) => ErrorKind::Internal,
		}
	}

	pub fn is_not_found(&self) -> bool {
		matches!(self, VaultError::SecretNotFound { .. })
	}
}

pub type Result<T> = std::result::Result<T, VaultError>;
