// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Schema plan/apply bodies. `POST /schema/plan` responds with a
//! [`PlanResult`](stk_hub_schema::PlanResult).

use serde::{Deserialize, Serialize};
use stk_hub_schema::{Migration, SchemaDocuments};

/// `POST /schema/plan`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanSchemaRequest {
	pub project_id: String,
	/// Alias to schema document text.
	pub schemas: SchemaDocuments,
}

/// `POST /schema/apply`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplySchemaRequest {
	pub project_id: String,
	/// Accepted for audit; apply always re-derives from the recorded plan.
	#[serde(default)]
	pub migrations: Vec<Migration>,
	/// The `plan_token` returned by the plan being applied.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub plan_token: Option<u64>,
}
