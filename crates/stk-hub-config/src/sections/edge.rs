// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Edge propagation configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use stk_common_config::SecretString;

const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Edge propagation configuration (runtime, fully resolved).
///
/// When `kv_url` is set bundles go to the remote KV; otherwise they are written
/// as files under `dir`.
#[derive(Debug, Clone)]
pub struct EdgeConfig {
	pub enabled: bool,
	pub kv_url: Option<String>,
	pub kv_token: Option<SecretString>,
	pub dir: PathBuf,
	/// Bound on a single propagation attempt.
	pub timeout_secs: u64,
}

impl EdgeConfig {
	pub fn timeout(&self) -> Duration {
		Duration::from_secs(self.timeout_secs)
	}
}

impl Default for EdgeConfig {
	fn default() -> Self {
		EdgeConfigLayer::default().finalize()
	}
}

/// Edge propagation configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EdgeConfigLayer {
	#[serde(default)]
	pub enabled: Option<bool>,
	#[serde(default)]
	pub kv_url: Option<String>,
	#[serde(default)]
	pub kv_token: Option<SecretString>,
	#[serde(default)]
	pub dir: Option<PathBuf>,
	#[serde(default)]
	pub timeout_secs: Option<u64>,
}

impl EdgeConfigLayer {
	pub fn merge(&mut self, other: EdgeConfigLayer) {
		if other.enabled.is_some() {
			self.enabled = other.enabled;
		}
		if other.kv_url.is_some() {
			self.kv_url = other.kv_url;
		}
		if other.kv_token.is_some() {
			self.kv_token = other.kv_token;
		}
		if other.dir.is_some() {
			self.dir = other.dir;
		}
		if other.timeout_secs.is_some() {
			self.timeout_secs = other.timeout_secs;
		}
	}

	pub fn finalize(self) -> EdgeConfig {
		EdgeConfig {
			enabled: self.enabled.unwrap_or(true),
			kv_url: self.kv_url,
			kv_token: self.kv_token,
			dir: self.dir.unwrap_or_else(default_kv_dir),
			timeout_secs: self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
		}
	}
}

fn default_kv_dir() -> PathBuf {
	dirs::home_dir()
		.unwrap_or_else(|| PathBuf::from("."))
		.join(".santokit")
		.join("tmp")
		.join("kv")
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_defaults() {
		let config = EdgeConfig::default();
		assert!(config.enabled);
		assert!(config.kv_url.is_none());
		assert!(config.dir.ends_with(".santokit/tmp/kv"));
		assert_eq!(config.timeout(), Duration::from_secs(10));
	}

	#[test]
	fn test_merge_overrides() {
		let mut layer = EdgeConfigLayer {
			kv_url: Some("https://kv.example".to_string()),
			..Default::default()
		};
		layer.merge(EdgeConfigLayer {
			enabled: Some(false),
			timeout_secs: Some(3),
			..Default::default()
		});
		let config = layer.finalize();
		assert!(!config.enabled);
		assert_eq!(config.kv_url.as_deref(), Some("https://kv.example"));
		assert_eq!(config.timeout_secs, 3);
	}
}
