// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Structural diff between a live [`Realm`] and a desired one.

use std::collections::BTreeSet;

use crate::model::{Column, Index, Realm, Table};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaChange {
	AddTable(Table),
	DropTable(String),
	AddColumn { table: String, column: Column },
	DropColumn { table: String, column: String },
	/// The table must be recreated because a change cannot be made in place.
	/// `copy_columns` are the columns present in both shapes.
	RebuildTable { from: Table, to: Table, copy_columns: Vec<String> },
	AddIndex { table: String, index: Index },
	DropIndex { table: String, index: String },
}

impl SchemaChange {
	pub fn table(&self) -> &str {
		match self {
			SchemaChange::AddTable(t) => &t.name,
			SchemaChange::DropTable(name) => name,
			SchemaChange::AddColumn { table, .. }
			| SchemaChange::DropColumn { table, .. }
			| SchemaChange::AddIndex { table, .. }
			| SchemaChange::DropIndex { table, .. } => table,
			SchemaChange::RebuildTable { to, .. } => &to.name,
		}
	}
}

/// Changes that turn `current` into `desired`, ordered by table name.
///
/// Within one table the order is: index drops, column drops, column adds,
/// index adds.
pub fn diff_realms(current: &Realm, desired: &Realm) -> Vec<SchemaChange> {
	let names: BTreeSet<&String> = current.tables.keys().chain(desired.tables.keys()).collect();
	let mut changes = Vec::new();

	for name in names {
		match (current.tables.get(name), desired.tables.get(name)) {
			(None, Some(to)) => changes.push(SchemaChange::AddTable(to.clone())),
			(Some(_), None) => changes.push(SchemaChange::DropTable(name.clone())),
			(Some(from), Some(to)) => diff_table(from, to, &mut changes),
			(None, None) => {}
		}
	}

	changes
}

fn diff_table(from: &Table, to: &Table, changes: &mut Vec<SchemaChange>) {
	if from == to {
		return;
	}

	if needs_rebuild(from, to) {
		let copy_columns = to
			.columns
			.iter()
			.filter(|c| from.column(&c.name).is_some())
			.map(|c| c.name.clone())
			.collect();
		changes.push(SchemaChange::RebuildTable {
			from: from.clone(),
			to: to.clone(),
			copy_columns,
		});
		return;
	}

	for (name, index) in &from.indexes {
		if to.indexes.get(name) != Some(index) {
			changes.push(SchemaChange::DropIndex {
				table: to.name.clone(),
				index: name.clone(),
			});
		}
	}
	for column in &from.columns {
		if to.column(&column.name).is_none() {
			changes.push(SchemaChange::DropColumn {
				table: to.name.clone(),
				column: column.name.clone(),
			});
		}
	}
	for column in &to.columns {
		if from.column(&column.name).is_none() {
			changes.push(SchemaChange::AddColumn {
				table: to.name.clone(),
				column: column.clone(),
			});
		}
	}
	for (name, index) in &to.indexes {
		if from.indexes.get(name) != Some(index) {
			changes.push(SchemaChange::AddIndex {
				table: to.name.clone(),
				index: index.clone(),
			});
		}
	}
}

/// SQLite can only add nullable-or-defaulted columns and drop plain ones in
/// place; anything else means a rebuild. A new column's default must also be
/// a constant, since `ADD COLUMN` rejects expressions once the table has rows.
fn needs_rebuild(from: &Table, to: &Table) -> bool {
	if from.primary_key != to.primary_key {
		return true;
	}

	let modified = to.columns.iter().any(|c| {
		from.column(&c.name)
			.is_some_and(|existing| existing != c)
	});
	if modified {
		return true;
	}

	let unaddable = to
		.columns
		.iter()
		.filter(|c| from.column(&c.name).is_none())
		.any(|c| match c.default.as_deref() {
			Some(default) => !is_constant_default(default),
			None => !c.nullable,
		});
	if unaddable {
		return true;
	}

	// Dropping a column still referenced by a surviving index is not allowed.
	from.columns.iter().any(|c| {
		to.column(&c.name).is_none()
			&& from
				.indexes
				.iter()
				.any(|(name, i)| i.columns.contains(&c.name) && to.indexes.get(name) == Some(i))
	})
}

/// Literal defaults: numbers, quoted strings, blobs, `TRUE`, `FALSE`, `NULL`.
fn is_constant_default(default: &str) -> bool {
	let d = default.trim();
	if ["TRUE", "FALSE", "NULL"].iter().any(|k| d.eq_ignore_ascii_case(k)) {
		return true;
	}
	if is_quoted(d) {
		return true;
	}
	if let Some(blob) = d.strip_prefix(['x', 'X']) {
		return is_quoted(blob);
	}
	let unsigned = d.strip_prefix(['+', '-']).unwrap_or(d);
	unsigned.parse::<f64>().is_ok()
		&& !unsigned.contains(|c: char| c.is_alphabetic() && c != 'e' && c != 'E')
}

fn is_quoted(s: &str) -> bool {
	s.len() >= 2
		&& s.starts_with('\'')
		&& s.ends_with('\'')
		&& !s[1..s.len() - 1].replace("''", "").contains('\'')
}
