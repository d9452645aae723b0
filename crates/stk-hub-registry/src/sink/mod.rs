// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Destinations for edge-ready records.

mod file;
mod http;
mod memory;

use async_trait::async_trait;
use thiserror::Error;

pub use file::FileKvSink;
pub use http::HttpKvSink;
pub use memory::MemoryKvSink;

#[derive(Debug, Error)]
pub enum EdgeSinkError {
	#[error("transient error: {0}")]
	Transient(String),

	#[error("permanent error: {0}")]
	Permanent(String),

	#[error("invalid edge url: {0}")]
	InvalidUrl(String),
}

#[async_trait]
pub trait EdgeSink: Send + Sync {
	fn name(&self) -> &str;

	/// Write `value` under `key`, replacing any previous value.
	async fn put(&self, key: &str, value: &[u8]) -> Result<(), EdgeSinkError>;
}
