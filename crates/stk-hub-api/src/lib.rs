// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

pub mod error;
pub mod manifest;
pub mod schema;
pub mod secrets;

pub use error::{status_for, ApiError, ErrorResponse, SuccessResponse};
pub use manifest::{GetManifestQuery, ListVersionsResponse, PushManifestRequest};
pub use schema::{ApplySchemaRequest, PlanSchemaRequest};
pub use secrets::{DeleteSecretQuery, ListSecretsQuery, SetSecretRequest};
