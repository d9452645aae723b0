// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use stk_common_core::ErrorKind;
use stk_hub_vault::VaultError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaError {
	#[error("invalid input: {0}")]
	InvalidInput(String),

	#[error("schema parse error at line {line}: {message}")]
	Parse { line: usize, message: String },

	#[error("no planned schema on record for project {project_id}; run plan first")]
	NoPlannedSchema { project_id: String },

	#[error("plan token {provided:?} does not match the current plan {current} for project {project_id}; re-run plan")]
	StalePlan {
		project_id: String,
		current: u64,
		provided: Option<u64>,
	},

	#[error("schema state not found for {project_id}/{alias}")]
	StateNotFound { project_id: String, alias: String },

	#[error("unsupported database URL scheme: {0}")]
	UnsupportedScheme(String),

	#[error("failed to connect to project database: {0}")]
	Connect(String),

	#[error("timed out connecting to project database after {0}s")]
	ConnectTimeout(u64),

	#[error("schema engine error: {0}")]
	Engine(String),

	#[error("planner state store error: {0}")]
	Store(String),

	#[error(transparent)]
	Vault(#[from] VaultError),
}

impl SchemaError {
	pub fn kind(&self) -> ErrorKind {
		match self {
			SchemaError::InvalidInput(_) | SchemaError::Parse { .. } => ErrorKind::InvalidInput,
			SchemaError::NoPlannedSchema { .. } | SchemaError::StalePlan { .. } => {
				ErrorKind::PreconditionFailed
			}
			SchemaError::StateNotFound { .. } => ErrorKind::NotFound,
			SchemaError::UnsupportedScheme(_)
			| SchemaError::Connect(_)
			| SchemaError::ConnectTimeout(_) => ErrorKind::Unavailable,
			SchemaError::Engine(_) | SchemaError::Store(_) => ErrorKind::Internal,
			SchemaError::Vault(e) => e.kind(),
		}
	}

	/// Failures that mean "no live database"; these select the content-hash strategy.
	pub fn is_unreachable(&self) -> bool {
		matches!(
			self,
			SchemaError::UnsupportedScheme(_)
				| SchemaError::Connect(_)
				| SchemaError::ConnectTimeout(_)
		)
	}
}

pub type Result<T> = std::result::Result<T, SchemaError>;

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn plan_errors_are_precondition_failures() {
		let err = SchemaError::NoPlannedSchema {
			project_id: "p1".into(),
		};
		assert_eq!(err.kind(), ErrorKind::PreconditionFailed);
		assert!(err.to_string().contains("run plan first"));

		let err = SchemaError::StalePlan {
			project_id: "p1".into(),
			current: 3,
			provided: Some(2),
		};
		assert_eq!(err.kind(), ErrorKind::PreconditionFailed);
	}

	#[test]
	fn vault_errors_keep_their_kind() {
		let err = SchemaError::from(VaultError::Decryption("bad tag".into()));
		assert_eq!(err.kind(), ErrorKind::Internal);
		assert!(!err.is_unreachable());
		assert!(SchemaError::ConnectTimeout(10).is_unreachable());
	}
}
