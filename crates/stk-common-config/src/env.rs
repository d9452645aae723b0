// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Secret loading from the environment.
//!
//! A secret named `STK_HUB_ENCRYPTION_KEY` may be supplied either inline, or as
//! a path in `STK_HUB_ENCRYPTION_KEY_FILE` (container secret mounts). Setting
//! both is an error.

use std::path::PathBuf;

use stk_common_secret::SecretString;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SecretEnvError {
	#[error("both {name} and {name}_FILE are set; use only one")]
	Conflict { name: String },

	#[error("failed to read {name}_FILE at {path}: {source}")]
	FileRead {
		name: String,
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},
}

/// Load an optional secret from `name` or `name_FILE`.
///
/// Empty values are treated as unset. File contents have trailing newlines
/// stripped.
pub fn load_secret_env(name: &str) -> Result<Option<SecretString>, SecretEnvError> {
	let file_var = format!("{name}_FILE");
	let inline = std::env::var(name).ok().filter(|v| !v.is_empty());
	let file = std::env::var(&file_var).ok().filter(|v| !v.is_empty());

	match (inline, file) {
		(Some(_), Some(_)) => Err(SecretEnvError::Conflict {
			name: name.to_string(),
		}),
		(Some(value), None) => Ok(Some(SecretString::new(value))),
		(None, Some(path)) => read_secret_file(name, PathBuf::from(path)).map(Some),
		(None, None) => Ok(None),
	}
}

fn read_secret_file(name: &str, path: PathBuf) -> Result<SecretString, SecretEnvError> {
	let mut content = std::fs::read_to_string(&path).map_err(|source| SecretEnvError::FileRead {
		name: name.to_string(),
		path: path.clone(),
		source,
	})?;
	let trimmed_len = content.trim_end_matches(['\n', '\r']).len();
	content.truncate(trimmed_len);
	Ok(SecretString::new(content))
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	// Each test uses its own variable names; the process environment is shared.

	#[test]
	fn unset_is_none() {
		assert!(load_secret_env("STK_TEST_SECRET_UNSET").unwrap().is_none());
	}

	#[test]
	fn inline_value_is_loaded() {
		std::env::set_var("STK_TEST_SECRET_INLINE", "abc");
		let secret = load_secret_env("STK_TEST_SECRET_INLINE").unwrap().unwrap();
		assert_eq!(secret.expose(), "abc");
		std::env::remove_var("STK_TEST_SECRET_INLINE");
	}

	#[test]
	fn file_value_strips_trailing_newline() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "from-file").unwrap();
		std::env::set_var("STK_TEST_SECRET_FROM_FILE_FILE", file.path());

		let secret = load_secret_env("STK_TEST_SECRET_FROM_FILE").unwrap().unwrap();
		assert_eq!(secret.expose(), "from-file");
		std::env::remove_var("STK_TEST_SECRET_FROM_FILE_FILE");
	}

	#[test]
	fn both_set_is_conflict() {
		std::env::set_var("STK_TEST_SECRET_BOTH", "a");
		std::env::set_var("STK_TEST_SECRET_BOTH_FILE", "/tmp/whatever");
		let err = load_secret_env("STK_TEST_SECRET_BOTH").unwrap_err();
		assert!(matches!(err, SecretEnvError::Conflict { .. }));
		std::env::remove_var("STK_TEST_SECRET_BOTH");
		std::env::remove_var("STK_TEST_SECRET_BOTH_FILE");
	}

	#[test]
	fn missing_file_is_error() {
		std::env::set_var("STK_TEST_SECRET_NOFILE_FILE", "/nonexistent/secret");
		let err = load_secret_env("STK_TEST_SECRET_NOFILE").unwrap_err();
		assert!(matches!(err, SecretEnvError::FileRead { .. }));
		std::env::remove_var("STK_TEST_SECRET_NOFILE_FILE");
	}
}
