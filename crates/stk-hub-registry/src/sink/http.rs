// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use async_trait::async_trait;
use reqwest::StatusCode;
use stk_common_secret::SecretString;
use tracing::debug;
use url::Url;

use super::{EdgeSink, EdgeSinkError};

/// Remote edge KV reached over HTTP: `PUT {base_url}/{key}` with a JSON body.
///
/// The key is appended as a single percent-encoded path segment.
pub struct HttpKvSink {
	base_url: Url,
	token: Option<SecretString>,
	http: reqwest::Client,
}

impl HttpKvSink {
	pub fn new(base_url: &str, http: reqwest::Client) -> Result<Self, EdgeSinkError> {
		let base_url =
			Url::parse(base_url).map_err(|e| EdgeSinkError::InvalidUrl(format!("{base_url}: {e}")))?;
		if base_url.cannot_be_a_base() {
			return Err(EdgeSinkError::InvalidUrl(format!(
				"{base_url}: not a hierarchical url"
			)));
		}
		Ok(Self {
			base_url,
			token: None,
			http,
		})
	}

	pub fn with_token(mut self, token: SecretString) -> Self {
		self.token = Some(token);
		self
	}

	fn record_url(&self, key: &str) -> Result<Url, EdgeSinkError> {
		let mut url = self.base_url.clone();
		url.path_segments_mut()
			.map_err(|_| EdgeSinkError::InvalidUrl(self.base_url.to_string()))?
			.pop_if_empty()
			.push(key);
		Ok(url)
	}

	fn apply_auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
		if let Some(token) = &self.token {
			req.header("Authorization", format!("Bearer {}", token.expose()))
		} else {
			req
		}
	}
}

#[async_trait]
impl EdgeSink for HttpKvSink {
	fn name(&self) -> &str {
		"http-kv"
	}

	async fn put(&self, key: &str, value: &[u8]) -> Result<(), EdgeSinkError> {
		let url = self.record_url(key)?;
		debug!(url = %url, bytes = value.len(), "putting edge KV record");

		let req = self
			.http
			.put(url)
			.header("Content-Type", "application/json")
			.body(value.to_vec());

		let response = self
			.apply_auth(req)
			.send()
			.await
			.map_err(|e| EdgeSinkError::Transient(format!("edge KV request failed: {e}")))?;

		match response.status() {
			StatusCode::OK | StatusCode::CREATED => Ok(()),
			status if status.is_server_error() => Err(EdgeSinkError::Transient(format!(
				"edge KV returned status {status}"
			))),
			status => Err(EdgeSinkError::Permanent(format!(
				"edge KV returned status {status}"
			))),
		}
	}
}
