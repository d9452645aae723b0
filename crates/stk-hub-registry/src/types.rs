// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BundleType {
	Logic,
	Schema,
}

impl BundleType {
	pub fn as_str(&self) -> &'static str {
		match self {
			BundleType::Logic => "logic",
			BundleType::Schema => "schema",
		}
	}
}

/// One deployable unit. Identity within a manifest is `(namespace, name)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bundle {
	#[serde(rename = "type")]
	pub bundle_type: BundleType,
	pub namespace: String,
	pub name: String,
	pub hash: String,
	/// Base64 in JSON.
	#[serde(with = "base64_bytes")]
	pub content: Vec<u8>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub config: Option<serde_json::Map<String, serde_json::Value>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
	pub id: String,
	pub project_id: String,
	pub version: String,
	pub bundles: Vec<Bundle>,
	pub created_at: DateTime<Utc>,
	pub created_by: String,
}

mod base64_bytes {
	use base64::{engine::general_purpose::STANDARD, Engine as _};
	use serde::{Deserialize, Deserializer, Serializer};

	pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_str(&STANDARD.encode(bytes))
	}

	pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
		let encoded = String::deserialize(deserializer)?;
		STANDARD
			.decode(encoded.as_bytes())
			.map_err(serde::de::Error::custom)
	}
}
