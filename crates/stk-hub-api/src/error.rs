// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error bodies and status mapping for the hub API.

use http::StatusCode;
use serde::{Deserialize, Serialize};
use stk_common_core::ErrorKind;

/// `{ "error": <code>, "message": <text> }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
	pub error: String,
	pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuccessResponse {
	pub message: String,
}

impl SuccessResponse {
	pub fn new(message: impl Into<String>) -> Self {
		Self {
			message: message.into(),
		}
	}
}

pub fn status_for(kind: ErrorKind) -> StatusCode {
	match kind {
		ErrorKind::NotFound => StatusCode::NOT_FOUND,
		ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
		ErrorKind::PreconditionFailed => StatusCode::CONFLICT,
		ErrorKind::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
		ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
	}
}

/// A classified failure ready to be rendered.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct ApiError {
	pub kind: ErrorKind,
	pub message: String,
}

impl ApiError {
	pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
		Self {
			kind,
			message: message.into(),
		}
	}

	pub fn status(&self) -> StatusCode {
		status_for(self.kind)
	}

	/// Internal failures are rendered without their detail.
	pub fn to_response(&self) -> ErrorResponse {
		let message = match self.kind {
			ErrorKind::Internal => "internal error".to_string(),
			_ => self.message.clone(),
		};
		ErrorResponse {
			error: self.kind.as_str().to_string(),
			message,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn every_kind_has_a_distinct_status() {
		let kinds = [
			ErrorKind::NotFound,
			ErrorKind::InvalidInput,
			ErrorKind::PreconditionFailed,
			ErrorKind::Unavailable,
			ErrorKind::Internal,
		];
		let statuses: std::collections::HashSet<u16> =
			kinds.iter().map(|k| status_for(*k).as_u16()).collect();
		assert_eq!(statuses.len(), kinds.len());
		assert_eq!(status_for(ErrorKind::PreconditionFailed), StatusCode::CONFLICT);
	}

	#[test]
	fn response_carries_stable_code() {
		let err = ApiError::new(
			ErrorKind::PreconditionFailed,
			"no plan on record, run plan first",
		);
		let body = serde_json::to_value(err.to_response()).unwrap();
		assert_eq!(body["error"], "precondition_failed");
		assert_eq!(body["message"], "no plan on record, run plan first");
	}

	#[test]
	fn internal_detail_is_not_rendered() {
		let err = ApiError::new(ErrorKind::Internal, "database is locked at /var/lib/x");
		assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
		assert_eq!(err.to_response().message, "internal error");
	}
}
