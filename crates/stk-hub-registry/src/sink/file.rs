// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::{EdgeSink, EdgeSinkError};

/// One file per key under a directory, for local edge runtimes.
#[derive(Debug, Clone)]
pub struct FileKvSink {
	dir: PathBuf,
}

impl FileKvSink {
	pub fn new(dir: impl Into<PathBuf>) -> Self {
		Self { dir: dir.into() }
	}

	pub fn dir(&self) -> &Path {
		&self.dir
	}
}

#[async_trait]
impl EdgeSink for FileKvSink {
	fn name(&self) -> &str {
		"file"
	}

	async fn put(&self, key: &str, value: &[u8]) -> Result<(), EdgeSinkError> {
		if key.is_empty() || key.contains('/') || key.contains('\\') || key.starts_with('.') {
			return Err(EdgeSinkError::Permanent(format!(
				"key '{key}' is not a valid file name"
			)));
		}

		tokio::fs::create_dir_all(&self.dir)
			.await
			.map_err(|e| EdgeSinkError::Transient(format!("failed to create KV dir: {e}")))?;

		tokio::fs::write(self.dir.join(key), value)
			.await
			.map_err(|e| EdgeSinkError::Transient(format!("failed to write KV key {key}: {e}")))?;

		Ok(())
	}
}
