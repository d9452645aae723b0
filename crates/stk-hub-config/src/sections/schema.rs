// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Schema planner configuration.

use std::time::Duration;

use serde::Deserialize;

const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_DATABASE_URL_KEY: &str = "database_url";

/// Schema planner configuration (runtime, fully resolved).
#[derive(Debug, Clone)]
pub struct SchemaConfig {
	/// Upper bound for opening a project's database before falling back.
	pub connect_timeout_secs: u64,
	/// Vault key holding each project's database connection string.
	pub database_url_key: String,
}

impl SchemaConfig {
	pub fn connect_timeout(&self) -> Duration {
		Duration::from_secs(self.connect_timeout_secs)
	}
}

impl Default for SchemaConfig {
	fn default() -> Self {
		SchemaConfigLayer::default().finalize()
	}
}

/// Schema planner configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SchemaConfigLayer {
	#[serde(default)]
	pub connect_timeout_secs: Option<u64>,
	#[serde(default)]
	pub database_url_key: Option<String>,
}

impl SchemaConfigLayer {
	pub fn merge(&mut self, other: SchemaConfigLayer) {
		if other.connect_timeout_secs.is_some() {
			self.connect_timeout_secs = other.connect_timeout_secs;
		}
		if other.database_url_key.is_some() {
			self.database_url_key = other.database_url_key;
		}
	}

	pub fn finalize(self) -> SchemaConfig {
		SchemaConfig {
			connect_timeout_secs: self
				.connect_timeout_secs
				.unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS),
			database_url_key: self
				.database_url_key
				.unwrap_or_else(|| DEFAULT_DATABASE_URL_KEY.to_string()),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_defaults() {
		let config = SchemaConfig::default();
		assert_eq!(config.connect_timeout(), Duration::from_secs(10));
		assert_eq!(config.database_url_key, "database_url");
	}
}
