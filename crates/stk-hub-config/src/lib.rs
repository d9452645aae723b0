// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Centralized configuration management for the Santokit hub.
//!
//! This crate provides:
//! - Layered configuration from multiple sources (defaults, TOML file, environment)
//! - Consistent environment variable naming (`STK_HUB_*`)
//!
//! # Usage
//!
//! ```ignore
//! use stk_hub_config::load_config;
//!
//! let config = load_config()?;
//! println!("hub database at {}", config.database.url);
//! ```

pub mod error;
pub mod layer;
pub mod sections;
pub mod sources;

pub use error::ConfigError;
pub use layer::HubConfigLayer;
pub use sections::*;
pub use sources::{ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource};

use tracing::{debug, info};

/// Fully resolved hub configuration.
#[derive(Debug, Clone, Default)]
pub struct HubConfig {
	pub database: DatabaseConfig,
	pub vault: VaultConfig,
	pub schema: SchemaConfig,
	pub edge: EdgeConfig,
	pub logging: LoggingConfig,
}

/// Load configuration from all sources with standard precedence.
///
/// Precedence (highest to lowest):
/// 1. Environment variables (`STK_HUB_*`)
/// 2. Config file (`/etc/santokit/hub.toml`)
/// 3. Built-in defaults
pub fn load_config() -> Result<HubConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(EnvSource),
	])
}

/// Load configuration from environment only (for testing or simple deployments).
pub fn load_config_from_env() -> Result<HubConfig, ConfigError> {
	let mut merged = HubConfigLayer::default();
	merged.merge(EnvSource.load()?);
	finalize(merged)
}

/// Load configuration with a custom config file path.
pub fn load_config_with_file(
	config_path: impl Into<std::path::PathBuf>,
) -> Result<HubConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource),
	])
}

fn load_from_sources(mut sources: Vec<Box<dyn ConfigSource>>) -> Result<HubConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = HubConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		let layer = source.load()?;
		merged.merge(layer);
	}

	finalize(merged)
}

/// Finalize configuration layer into resolved config.
pub fn finalize(layer: HubConfigLayer) -> Result<HubConfig, ConfigError> {
	let config = HubConfig {
		database: layer.database.unwrap_or_default().finalize(),
		vault: layer.vault.unwrap_or_default().finalize(),
		schema: layer.schema.unwrap_or_default().finalize(),
		edge: layer.edge.unwrap_or_default().finalize(),
		logging: layer.logging.unwrap_or_default().finalize(),
	};

	validate_config(&config)?;

	info!(
		database = %config.database.url,
		encryption_key_configured = config.vault.encryption_key.is_some(),
		edge_enabled = config.edge.enabled,
		edge_kv_url = config.edge.kv_url.as_deref().unwrap_or("-"),
		edge_dir = %config.edge.dir.display(),
		log_level = %config.logging.level,
		"Hub configuration loaded"
	);

	Ok(config)
}

/// Validate cross-field configuration rules.
fn validate_config(config: &HubConfig) -> Result<(), ConfigError> {
	if config.database.url.trim().is_empty() {
		return Err(ConfigError::Validation(
			"database.url must not be empty (STK_HUB_DATABASE_URL)".to_string(),
		));
	}

	if config.vault.encryption_key.is_none() {
		return Err(ConfigError::Validation(
			"vault.encryption_key is required; set STK_HUB_ENCRYPTION_KEY or STK_HUB_ENCRYPTION_KEY_FILE"
				.to_string(),
		));
	}

	if config.schema.connect_timeout_secs == 0 {
		return Err(ConfigError::Validation(
			"schema.connect_timeout_secs must be greater than zero".to_string(),
		));
	}

	if config.edge.timeout_secs == 0 {
		return Err(ConfigError::Validation(
			"edge.timeout_secs must be greater than zero".to_string(),
		));
	}

	if let Some(url) = &config.edge.kv_url {
		if !(url.starts_with("http://") || url.starts_with("https://")) {
			return Err(ConfigError::InvalidValue {
				key: "edge.kv_url".to_string(),
				message: format!("expected an http(s) URL, got '{url}'"),
			});
		}
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use stk_common_config::SecretString;

	fn valid_layer() -> HubConfigLayer {
		HubConfigLayer {
			vault: Some(VaultConfigLayer {
				encryption_key: Some(SecretString::from("0123456789abcdef0123456789abcdef")),
			}),
			..Default::default()
		}
	}

	#[test]
	fn test_finalize_applies_defaults() {
		let config = finalize(valid_layer()).unwrap();
		assert_eq!(config.database.url, "sqlite:./santokit-hub.db");
		assert_eq!(config.schema.database_url_key, "database_url");
		assert!(config.edge.enabled);
		assert_eq!(config.logging.level, "info");
	}

	#[test]
	fn test_missing_encryption_key_rejected() {
		let err = finalize(HubConfigLayer::default()).unwrap_err();
		assert!(matches!(err, ConfigError::Validation(_)));
		assert!(err.to_string().contains("STK_HUB_ENCRYPTION_KEY"));
	}

	#[test]
	fn test_zero_edge_timeout_rejected() {
		let mut layer = valid_layer();
		layer.edge = Some(EdgeConfigLayer {
			timeout_secs: Some(0),
			..Default::default()
		});
		assert!(finalize(layer).is_err());
	}

	#[test]
	fn test_non_http_kv_url_rejected() {
		let mut layer = valid_layer();
		layer.edge = Some(EdgeConfigLayer {
			kv_url: Some("redis://localhost:6379".to_string()),
			..Default::default()
		});
		let err = finalize(layer).unwrap_err();
		assert!(matches!(err, ConfigError::InvalidValue { .. }));
	}

	#[test]
	fn test_file_layer_overrides_defaults() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("hub.toml");
		std::fs::write(
			&path,
			r#"
[vault]
encryption_key = "0123456789abcdef0123456789abcdef"

[schema]
connect_timeout_secs = 3
"#,
		)
		.unwrap();

		let mut merged = HubConfigLayer::default();
		merged.merge(TomlSource::new(&path).load().unwrap());
		let config = finalize(merged).unwrap();
		assert_eq!(config.schema.connect_timeout_secs, 3);
	}
}
