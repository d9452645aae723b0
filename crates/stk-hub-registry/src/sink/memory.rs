// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{EdgeSink, EdgeSinkError};

/// In-process sink for tests and local development.
#[derive(Debug, Default)]
pub struct MemoryKvSink {
	entries: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl MemoryKvSink {
	pub fn new() -> Self {
		Self::default()
	}

	pub async fn get(&self, key: &str) -> Option<Vec<u8>> {
		self.entries.read().await.get(key).cloned()
	}

	pub async fn keys(&self) -> Vec<String> {
		self.entries.read().await.keys().cloned().collect()
	}
}

#[async_trait]
impl EdgeSink for MemoryKvSink {
	fn name(&self) -> &str {
		"memory"
	}

	async fn put(&self, key: &str, value: &[u8]) -> Result<(), EdgeSinkError> {
		self.entries
			.write()
			.await
			.insert(key.to_string(), value.to_vec());
		Ok(())
	}
}
