// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Manifest registry.
//!
//! A push appends an immutable manifest to the project's history and then,
//! without blocking the caller, copies each bundle to an edge cache. The
//! manifest store is authoritative; edge copies are best-effort.

pub mod error;
pub mod propagation;
pub mod service;
pub mod sink;
pub mod store;
pub mod types;

pub use error::{RegistryError, Result};
pub use propagation::{edge_key, secret_edge_key, server_bundle, EdgePropagator, PropagationReport};
pub use service::RegistryService;
pub use sink::{EdgeSink, EdgeSinkError, FileKvSink, HttpKvSink, MemoryKvSink};
pub use store::{ManifestStore, MemoryManifestStore};
pub use types::{Bundle, BundleType, Manifest};
