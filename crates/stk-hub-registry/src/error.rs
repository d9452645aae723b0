// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use stk_common_core::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
	#[error("invalid input: {0}")]
	InvalidInput(String),

	#[error("no manifest found for project {project_id}")]
	ManifestNotFound { project_id: String },

	#[error("manifest version {version} not found for project {project_id}")]
	VersionNotFound { project_id: String, version: String },

	#[error("manifest store error: {0}")]
	Store(String),
}

impl RegistryError {
	pub fn kind(&self) -> ErrorKind {
		match self {
			RegistryError::InvalidInput(_) => ErrorKind::InvalidInput,
			RegistryError::ManifestNotFound { .. } | RegistryError::VersionNotFound { .. } => {
				ErrorKind::NotFound
			}
			RegistryError::Store(_) => ErrorKind::Internal,
		}
	}
}

pub type Result<T> = std::result::Result<T, RegistryError>;
