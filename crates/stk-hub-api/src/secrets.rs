// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use serde::{Deserialize, Serialize};
use stk_common_secret::SecretString;

/// `POST /secrets`
#[derive(Debug, Clone, Deserialize)]
pub struct SetSecretRequest {
	pub project_id: String,
	pub key: String,
	/// Plaintext on the wire; redacted in `Debug`.
	pub value: SecretString,
}

/// `GET /secrets?project_id=`. The response body is a JSON array of keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListSecretsQuery {
	pub project_id: String,
}

/// `DELETE /secrets/{key}?project_id=`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteSecretQuery {
	pub project_id: String,
}
