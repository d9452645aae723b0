// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Structural schema model shared by the parser, the introspector and the diff.

use std::collections::BTreeMap;

/// Every table of one database, keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Realm {
	pub tables: BTreeMap<String, Table>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
	pub name: String,
	/// Declaration order is significant for rendering.
	pub columns: Vec<Column>,
	pub primary_key: Vec<String>,
	pub indexes: BTreeMap<String, Index>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
	pub name: String,
	/// Upper-cased declared type, e.g. `INTEGER` or `VARCHAR(255)`.
	pub sql_type: String,
	pub nullable: bool,
	/// Default as SQL expression text.
	pub default: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Index {
	pub name: String,
	pub columns: Vec<String>,
	pub unique: bool,
}

impl Table {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			columns: Vec::new(),
			primary_key: Vec::new(),
			indexes: BTreeMap::new(),
		}
	}

	pub fn column(&self, name: &str) -> Option<&Column> {
		self.columns.iter().find(|c| c.name == name)
	}
}

impl Column {
	pub fn new(name: impl Into<String>, sql_type: impl AsRef<str>) -> Self {
		Self {
			name: name.into(),
			sql_type: normalize_type(sql_type.as_ref()),
			nullable: false,
			default: None,
		}
	}
}

pub(crate) fn normalize_type(raw: &str) -> String {
	raw.split_whitespace()
		.collect::<Vec<_>>()
		.join(" ")
		.to_ascii_uppercase()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn column_type_is_normalized() {
		assert_eq!(Column::new("c", "varchar(255)").sql_type, "VARCHAR(255)");
		assert_eq!(Column::new("c", " unsigned   big int ").sql_type, "UNSIGNED BIG INT");
	}

	#[test]
	fn table_column_lookup() {
		let mut table = Table::new("users");
		table.columns.push(Column::new("id", "integer"));
		assert!(table.column("id").is_some());
		assert!(table.column("email").is_none());
	}
}
