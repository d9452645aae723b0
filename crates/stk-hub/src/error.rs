// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use stk_common_core::ErrorKind;
use stk_hub_api::ApiError;
use stk_hub_config::ConfigError;
use stk_hub_db::DbError;
use stk_hub_registry::RegistryError;
use stk_hub_schema::SchemaError;
use stk_hub_vault::VaultError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HubError {
	#[error("configuration error: {0}")]
	Config(#[from] ConfigError),

	#[error("database error: {0}")]
	Db(#[from] DbError),

	#[error("failed to build edge http client: {0}")]
	HttpClient(#[from] reqwest::Error),

	#[error("failed to initialize logging: {0}")]
	Logging(String),

	#[error("invalid input: {0}")]
	InvalidInput(String),

	#[error(transparent)]
	Vault(#[from] VaultError),

	#[error(transparent)]
	Schema(#[from] SchemaError),

	#[error(transparent)]
	Registry(#[from] RegistryError),
}

impl HubError {
	pub fn kind(&self) -> ErrorKind {
		match self {
			HubError::InvalidInput(_) => ErrorKind::InvalidInput,
			HubError::Vault(e) => e.kind(),
			HubError::Schema(e) => e.kind(),
			HubError::Registry(e) => e.kind(),
			HubError::Config(_) | HubError::Db(_) | HubError::HttpClient(_) | HubError::Logging(_) => {
				ErrorKind::Internal
			}
		}
	}
}

impl From<&HubError> for ApiError {
	fn from(e: &HubError) -> Self {
		ApiError::new(e.kind(), e.to_string())
	}
}

impl From<HubError> for ApiError {
	fn from(e: HubError) -> Self {
		ApiError::from(&e)
	}
}

pub type Result<T> = std::result::Result<T, HubError>;

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn service_kinds_pass_through() {
		let err = HubError::from(SchemaError::NoPlannedSchema {
			project_id: "p1".into(),
		});
		assert_eq!(err.kind(), ErrorKind::PreconditionFailed);

		let api = ApiError::from(err);
		assert_eq!(api.status().as_u16(), 409);
		assert!(api.message.contains("p1"));
	}

	#[test]
	fn secret_not_found_renders_not_found() {
		let err = HubError::from(VaultError::SecretNotFound {
			project_id: "p1".into(),
			key: "stripe".into(),
		});
		assert_eq!(ApiError::from(&err).to_response().error, "not_found");
	}
}
