// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Best-effort copies of manifest bundles (and provisioned secrets) to an
//! edge sink.
//!
//! Work is spawned on a [`TaskTracker`] after the durable write. Every record
//! gets exactly one attempt bounded by the configured timeout; failures are
//! logged and counted, never returned to the pusher.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

use crate::sink::{EdgeSink, EdgeSinkError};
use crate::types::{Bundle, Manifest};

/// Outcome of one propagation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PropagationReport {
	pub propagated: usize,
	pub failed: usize,
}

/// Edge record key for a bundle.
pub fn edge_key(project_id: &str, bundle: &Bundle) -> String {
	format!("{project_id}:logic:{}:{}", bundle.namespace, bundle.name)
}

/// Edge record key for a provisioned secret.
pub fn secret_edge_key(project_id: &str, key: &str) -> String {
	format!("{project_id}:secrets:{key}")
}

/// The denormalized record the edge runtime reads.
///
/// `content` is the bundle bytes as text; a bundle without config gets
/// `{"target": "main", "access": "public"}`.
pub fn server_bundle(bundle: &Bundle) -> Value {
	let config = match &bundle.config {
		Some(config) => Value::Object(config.clone()),
		None => json!({ "target": "main", "access": "public" }),
	};

	json!({
		"type": bundle.bundle_type.as_str(),
		"namespace": bundle.namespace,
		"name": bundle.name,
		"config": config,
		"content": String::from_utf8_lossy(&bundle.content),
		"hash": bundle.hash,
	})
}

#[derive(Clone)]
pub struct EdgePropagator {
	sink: Arc<dyn EdgeSink>,
	timeout: Duration,
	tracker: TaskTracker,
}

impl EdgePropagator {
	pub fn new(sink: Arc<dyn EdgeSink>, timeout: Duration) -> Self {
		Self {
			sink,
			timeout,
			tracker: TaskTracker::new(),
		}
	}

	pub fn sink_name(&self) -> &str {
		self.sink.name()
	}

	/// One bounded attempt at writing a record.
	pub async fn put_record(&self, key: &str, value: &[u8]) -> Result<(), EdgeSinkError> {
		match tokio::time::timeout(self.timeout, self.sink.put(key, value)).await {
			Ok(result) => result,
			Err(_) => Err(EdgeSinkError::Transient(format!(
				"timed out after {}ms",
				self.timeout.as_millis()
			))),
		}
	}

	/// Propagate every bundle of `manifest`, one attempt each, and report.
	#[tracing::instrument(
		skip(self, manifest),
		fields(project_id = %manifest.project_id, version = %manifest.version, sink = self.sink.name())
	)]
	pub async fn propagate_manifest(&self, manifest: &Manifest) -> PropagationReport {
		let mut report = PropagationReport::default();

		for bundle in &manifest.bundles {
			let key = edge_key(&manifest.project_id, bundle);
			let value = match serde_json::to_vec(&server_bundle(bundle)) {
				Ok(value) => value,
				Err(e) => {
					warn!(key = %key, error = %e, "failed to encode edge bundle");
					report.failed += 1;
					continue;
				}
			};

			match self.put_record(&key, &value).await {
				Ok(()) => {
					debug!(key = %key, "bundle propagated");
					report.propagated += 1;
				}
				Err(e) => {
					warn!(key = %key, error = %e, "bundle propagation failed");
					report.failed += 1;
				}
			}
		}

		info!(
			propagated = report.propagated,
			failed = report.failed,
			"edge propagation finished"
		);
		report
	}

	/// Fire-and-forget [`propagate_manifest`](Self::propagate_manifest).
	pub fn spawn_manifest(&self, manifest: Manifest) {
		let propagator = self.clone();
		self.tracker.spawn(async move {
			propagator.propagate_manifest(&manifest).await;
		});
	}

	/// Fire-and-forget [`put_record`](Self::put_record); failures are logged.
	pub fn spawn_record(&self, key: String, value: Vec<u8>) {
		let propagator = self.clone();
		self.tracker.spawn(async move {
			match propagator.put_record(&key, &value).await {
				Ok(()) => debug!(key = %key, sink = propagator.sink_name(), "edge record written"),
				Err(e) => warn!(
					key = %key,
					sink = propagator.sink_name(),
					error = %e,
					"edge record write failed"
				),
			}
		});
	}

	/// Wait for every spawned propagation to finish.
	pub async fn wait(&self) {
		self.tracker.close();
		self.tracker.wait().await;
		self.tracker.reopen();
	}
}
