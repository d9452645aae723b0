// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: environment variables and TOML files.

use std::path::PathBuf;

use stk_common_config::load_secret_env;
use tracing::{debug, trace};

use crate::error::ConfigError;
use crate::layer::HubConfigLayer;
use crate::sections::{
	DatabaseConfigLayer, EdgeConfigLayer, LoggingConfigLayer, SchemaConfigLayer, VaultConfigLayer,
};

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	ConfigFile = 20,
	Environment = 50,
}

/// Trait for configuration sources.
pub trait ConfigSource: Send + Sync {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<HubConfigLayer, ConfigError>;
}

/// Built-in defaults source.
pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<HubConfigLayer, ConfigError> {
		debug!("loading defaults");
		Ok(HubConfigLayer::default())
	}
}

/// TOML file configuration source. A missing file yields an empty layer.
pub struct TomlSource {
	path: PathBuf,
}

impl TomlSource {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	pub fn system() -> Self {
		Self::new("/etc/santokit/hub.toml")
	}
}

impl ConfigSource for TomlSource {
	fn name(&self) -> &'static str {
		"toml-config"
	}

	fn precedence(&self) -> Precedence {
		Precedence::ConfigFile
	}

	fn load(&self) -> Result<HubConfigLayer, ConfigError> {
		if !self.path.exists() {
			debug!(path = %self.path.display(), "config file not found, skipping");
			return Ok(HubConfigLayer::default());
		}

		debug!(path = %self.path.display(), "loading config file");
		let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::FileRead {
			path: self.path.clone(),
			source: e,
		})?;

		let layer: HubConfigLayer = toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
			path: self.path.clone(),
			source: e,
		})?;

		trace!("parsed config layer from TOML");
		Ok(layer)
	}
}

/// Environment variable source.
///
/// Convention: STK_HUB_<SECTION>_<FIELD>. Secrets also accept a `_FILE` variant.
pub struct EnvSource;

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<HubConfigLayer, ConfigError> {
		debug!("loading environment variables");
		Ok(HubConfigLayer {
			database: Some(load_database_from_env()),
			vault: Some(load_vault_from_env()?),
			schema: Some(load_schema_from_env()?),
			edge: Some(load_edge_from_env()?),
			logging: Some(load_logging_from_env()),
		})
	}
}

fn env_var(name: &str) -> Option<String> {
	std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn env_bool(name: &str) -> Option<bool> {
	env_var(name).map(|v| v.eq_ignore_ascii_case("true") || v == "1")
}

fn env_u64(name: &str) -> Result<Option<u64>, ConfigError> {
	match env_var(name) {
		Some(v) => v.parse().map(Some).map_err(|_| ConfigError::InvalidValue {
			key: name.to_string(),
			message: format!("invalid u64 value '{v}'"),
		}),
		None => Ok(None),
	}
}

fn load_database_from_env() -> DatabaseConfigLayer {
	DatabaseConfigLayer {
		url: env_var("STK_HUB_DATABASE_URL"),
	}
}

fn load_vault_from_env() -> Result<VaultConfigLayer, ConfigError> {
	Ok(VaultConfigLayer {
		encryption_key: load_secret_env("STK_HUB_ENCRYPTION_KEY")
			.map_err(|e| ConfigError::Secret(e.to_string()))?,
	})
}

fn load_schema_from_env() -> Result<SchemaConfigLayer, ConfigError> {
	Ok(SchemaConfigLayer {
		connect_timeout_secs: env_u64("STK_HUB_SCHEMA_CONNECT_TIMEOUT_SECS")?,
		database_url_key: env_var("STK_HUB_SCHEMA_DATABASE_URL_KEY"),
	})
}

fn load_edge_from_env() -> Result<EdgeConfigLayer, ConfigError> {
	Ok(EdgeConfigLayer {
		enabled: env_bool("STK_HUB_EDGE_ENABLED"),
		kv_url: env_var("STK_HUB_EDGE_KV_URL"),
		kv_token: load_secret_env("STK_HUB_EDGE_KV_TOKEN")
			.map_err(|e| ConfigError::Secret(e.to_string()))?,
		dir: env_var("STK_HUB_EDGE_DIR").map(PathBuf::from),
		timeout_secs: env_u64("STK_HUB_EDGE_TIMEOUT_SECS")?,
	})
}

fn load_logging_from_env() -> LoggingConfigLayer {
	LoggingConfigLayer {
		level: env_var("STK_HUB_LOG_LEVEL"),
		json: env_bool("STK_HUB_LOG_JSON"),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	#[test]
	fn test_precedence_ordering() {
		assert!(Precedence::Defaults < Precedence::ConfigFile);
		assert!(Precedence::ConfigFile < Precedence::Environment);
	}

	#[test]
	fn test_toml_source_missing_file() {
		let source = TomlSource::new("/nonexistent/santokit/hub.toml");
		let layer = source.load().unwrap();
		assert!(layer.database.is_none());
		assert!(layer.edge.is_none());
	}

	#[test]
	fn test_toml_source_parses_sections() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(
			file,
			r#"
[database]
url = "sqlite:/tmp/hub.db"

[vault]
encryption_key = "0123456789abcdef0123456789abcdef"

[edge]
enabled = false
timeout_secs = 2

[logging]
level = "debug"
"#
		)
		.unwrap();

		let layer = TomlSource::new(file.path()).load().unwrap();
		assert_eq!(
			layer.database.unwrap().url.as_deref(),
			Some("sqlite:/tmp/hub.db")
		);
		let key = layer.vault.unwrap().encryption_key.unwrap();
		assert_eq!(key.expose().len(), 32);
		let edge = layer.edge.unwrap();
		assert_eq!(edge.enabled, Some(false));
		assert_eq!(edge.timeout_secs, Some(2));
		assert_eq!(layer.logging.unwrap().level.as_deref(), Some("debug"));
	}

	#[test]
	fn test_toml_source_invalid_toml() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "[database\nurl = ").unwrap();
		let err = TomlSource::new(file.path()).load().unwrap_err();
		assert!(matches!(err, ConfigError::TomlParse { .. }));
	}
}
