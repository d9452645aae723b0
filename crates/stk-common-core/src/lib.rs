// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Shared primitives for the Santokit hub crates.

pub mod error;

pub use error::ErrorKind;
