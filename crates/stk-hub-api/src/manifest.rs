// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use serde::{Deserialize, Serialize};
use stk_hub_registry::Bundle;

/// `POST /manifest`. Responds with the stored
/// [`Manifest`](stk_hub_registry::Manifest).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushManifestRequest {
	pub project_id: String,
	pub bundles: Vec<Bundle>,
	/// Defaults to `"local"` when absent.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub created_by: Option<String>,
}

/// `GET /manifest?project_id=[&version=]`. Without `version` the latest
/// manifest is returned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetManifestQuery {
	pub project_id: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub version: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListVersionsResponse {
	pub project_id: String,
	pub versions: Vec<String>,
}
