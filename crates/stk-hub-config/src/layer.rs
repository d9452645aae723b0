// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Partial configuration produced by a single source.

use serde::Deserialize;

use crate::sections::{
	DatabaseConfigLayer, EdgeConfigLayer, LoggingConfigLayer, SchemaConfigLayer, VaultConfigLayer,
};

/// One source's view of the configuration; `None` sections were not provided.
#[derive(Debug, Default, Deserialize)]
pub struct HubConfigLayer {
	#[serde(default)]
	pub database: Option<DatabaseConfigLayer>,
	#[serde(default)]
	pub vault: Option<VaultConfigLayer>,
	#[serde(default)]
	pub schema: Option<SchemaConfigLayer>,
	#[serde(default)]
	pub edge: Option<EdgeConfigLayer>,
	#[serde(default)]
	pub logging: Option<LoggingConfigLayer>,
}

impl HubConfigLayer {
	/// Merge `other` on top of `self`; values present in `other` win.
	pub fn merge(&mut self, other: HubConfigLayer) {
		merge_section(&mut self.database, other.database, DatabaseConfigLayer::merge);
		merge_section(&mut self.vault, other.vault, VaultConfigLayer::merge);
		merge_section(&mut self.schema, other.schema, SchemaConfigLayer::merge);
		merge_section(&mut self.edge, other.edge, EdgeConfigLayer::merge);
		merge_section(&mut self.logging, other.logging, LoggingConfigLayer::merge);
	}
}

fn merge_section<T>(base: &mut Option<T>, other: Option<T>, merge: fn(&mut T, T)) {
	match (base.as_mut(), other) {
		(Some(existing), Some(incoming)) => merge(existing, incoming),
		(None, Some(incoming)) => *base = Some(incoming),
		(_, None) => {}
	}
}
