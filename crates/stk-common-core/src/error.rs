// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Error taxonomy shared by every hub service.
//!
//! Each service crate keeps its own `thiserror` enum and reports one of these
//! kinds through `kind()`, so outer layers can render a stable code without
//! matching on crate-specific variants.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable, user-visible classification of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
	/// Secret, manifest, or planned state absent.
	NotFound,
	/// Empty schema documents, zero-length secret key, malformed content.
	InvalidInput,
	/// Apply without a matching plan.
	PreconditionFailed,
	/// Database or edge cache unreachable where fallback is impossible.
	Unavailable,
	/// Cryptographic or storage failure.
	Internal,
}

impl ErrorKind {
	pub fn as_str(&self) -> &'static str {
		match self {
			ErrorKind::NotFound => "not_found",
			ErrorKind::InvalidInput => "invalid_input",
			ErrorKind::PreconditionFailed => "precondition_failed",
			ErrorKind::Unavailable => "unavailable",
			ErrorKind::Internal => "internal",
		}
	}
}

impl fmt::Display for ErrorKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn serde_matches_as_str() {
		for kind in [
			ErrorKind::NotFound,
			ErrorKind::InvalidInput,
			ErrorKind::PreconditionFailed,
			ErrorKind::Unavailable,
			ErrorKind::Internal,
		] {
			let json = serde_json::to_string(&kind).unwrap();
			assert_eq!(json, format!("\"{}\"", kind.as_str()));
		}
	}

	#[test]
	fn display_uses_code() {
		assert_eq!(ErrorKind::PreconditionFailed.to_string(), "precondition_failed");
	}
}
