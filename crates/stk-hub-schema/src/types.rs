// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::collections::BTreeMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Alias (logical database name) to raw schema document text.
pub type SchemaDocuments = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Migration {
	pub id: String,
	pub project_id: String,
	pub version: String,
	pub sql: String,
	pub description: String,
	#[serde(default)]
	pub applied: bool,
}

impl Migration {
	/// `id` is `{project_id}-{hash}` so it is stable for the same desired content.
	pub(crate) fn new(
		project_id: &str,
		desired: &str,
		sql: String,
		description: String,
	) -> Self {
		Self {
			id: format!("{project_id}-{}", short_hash(desired)),
			project_id: project_id.to_string(),
			version: version_now(),
			sql,
			description,
			applied: false,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanResult {
	pub migrations: Vec<Migration>,
	pub has_changes: bool,
	pub summary: String,
	/// Must be passed back to `apply`; a newer plan invalidates it.
	pub plan_token: u64,
}

pub(crate) fn short_hash(value: &str) -> String {
	let digest = Sha256::digest(value.as_bytes());
	hex::encode(&digest[..6])
}

pub(crate) fn version_now() -> String {
	Utc::now().format("%Y%m%d%H%M%S").to_string()
}
