// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::collections::BTreeMap;
use std::str::FromStr;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;

use super::{Dialect, SchemaClient, SchemaEngine};
use crate::diff::SchemaChange;
use crate::error::{Result, SchemaError};
use crate::model::{normalize_type, Column, Index, Realm, Table};

const REBUILD_PREFIX: &str = "_stk_new_";

/// Native engine for `sqlite:` URLs.
#[derive(Debug, Clone, Default)]
pub struct SqliteEngine;

#[async_trait]
impl SchemaEngine for SqliteEngine {
	fn supports(&self, url: &str) -> bool {
		url.starts_with("sqlite:")
	}

	#[tracing::instrument(skip(self, url))]
	async fn connect(&self, url: &str) -> Result<Box<dyn SchemaClient>> {
		if !self.supports(url) {
			return Err(SchemaError::UnsupportedScheme(scheme_of(url)));
		}

		let options = SqliteConnectOptions::from_str(url)
			.map_err(|e| SchemaError::Connect(format!("invalid sqlite URL: {e}")))?
			.create_if_missing(true);

		let pool = SqlitePoolOptions::new()
			.max_connections(1)
			.connect_with(options)
			.await
			.map_err(|e| SchemaError::Connect(e.to_string()))?;

		tracing::debug!("sqlite schema client connected");
		Ok(Box::new(SqliteClient { pool }))
	}
}

fn scheme_of(url: &str) -> String {
	url.split_once(':')
		.map(|(scheme, _)| scheme.to_string())
		.unwrap_or_else(|| "<none>".to_string())
}

struct SqliteClient {
	pool: SqlitePool,
}

fn engine_error(e: sqlx::Error) -> SchemaError {
	SchemaError::Engine(e.to_string())
}

#[async_trait]
impl SchemaClient for SqliteClient {
	fn dialect(&self) -> Dialect {
		Dialect::Sqlite
	}

	#[tracing::instrument(skip(self))]
	async fn inspect(&self) -> Result<Realm> {
		let names: Vec<String> = sqlx::query_scalar(
			r#"
			SELECT name FROM sqlite_master
			WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
			ORDER BY name
			"#,
		)
		.fetch_all(&self.pool)
		.await
		.map_err(engine_error)?;

		let mut realm = Realm::default();
		for name in names {
			let table = self.inspect_table(&name).await?;
			realm.tables.insert(name, table);
		}

		tracing::debug!(tables = realm.tables.len(), "inspected sqlite schema");
		Ok(realm)
	}

	fn plan_changes(&self, changes: &[SchemaChange]) -> Result<Vec<String>> {
		Ok(render_sqlite(changes))
	}

	#[tracing::instrument(skip(self, statements), fields(statements = statements.len()))]
	async fn execute(&self, statements: &[String]) -> Result<()> {
		let mut tx = self.pool.begin().await.map_err(engine_error)?;
		for statement in statements {
			sqlx::query(statement)
				.execute(&mut *tx)
				.await
				.map_err(engine_error)?;
		}
		tx.commit().await.map_err(engine_error)?;
		Ok(())
	}
}

impl SqliteClient {
	async fn inspect_table(&self, name: &str) -> Result<Table> {
		let mut table = Table::new(name);

		let rows = sqlx::query(&format!("PRAGMA table_info({})", quote(name)))
			.fetch_all(&self.pool)
			.await
			.map_err(engine_error)?;

		let mut primary_key: Vec<(i64, String)> = Vec::new();
		for row in rows {
			let column_name: String = row.try_get("name").map_err(engine_error)?;
			let sql_type: String = row.try_get("type").map_err(engine_error)?;
			let notnull: i64 = row.try_get("notnull").map_err(engine_error)?;
			let default: Option<String> = row.try_get("dflt_value").map_err(engine_error)?;
			let pk: i64 = row.try_get("pk").map_err(engine_error)?;

			if pk > 0 {
				primary_key.push((pk, column_name.clone()));
			}
			table.columns.push(Column {
				name: column_name,
				sql_type: normalize_type(&sql_type),
				nullable: notnull == 0,
				default,
			});
		}
		primary_key.sort();
		table.primary_key = primary_key.into_iter().map(|(_, c)| c).collect();

		let indexes = sqlx::query(&format!("PRAGMA index_list({})", quote(name)))
			.fetch_all(&self.pool)
			.await
			.map_err(engine_error)?;

		let mut found = BTreeMap::new();
		for row in indexes {
			let origin: String = row.try_get("origin").map_err(engine_error)?;
			// Only explicit CREATE INDEX; pk/unique constraint indexes belong to the table.
			if origin != "c" {
				continue;
			}
			let index_name: String = row.try_get("name").map_err(engine_error)?;
			let unique: i64 = row.try_get("unique").map_err(engine_error)?;

			let mut columns: Vec<(i64, String)> = Vec::new();
			let info = sqlx::query(&format!("PRAGMA index_info({})", quote(&index_name)))
				.fetch_all(&self.pool)
				.await
				.map_err(engine_error)?;
			for col in info {
				let seqno: i64 = col.try_get("seqno").map_err(engine_error)?;
				let column: Option<String> = col.try_get("name").map_err(engine_error)?;
				if let Some(column) = column {
					columns.push((seqno, column));
				}
			}
			columns.sort();

			found.insert(
				index_name.clone(),
				Index {
					name: index_name,
					columns: columns.into_iter().map(|(_, c)| c).collect(),
					unique: unique != 0,
				},
			);
		}
		table.indexes = found;

		Ok(table)
	}
}

fn quote(ident: &str) -> String {
	format!("\"{}\"", ident.replace('"', "\"\""))
}

fn column_list(columns: &[String]) -> String {
	columns.iter().map(|c| quote(c)).collect::<Vec<_>>().join(", ")
}

fn column_definition(column: &Column) -> String {
	let mut def = format!("{} {}", quote(&column.name), column.sql_type);
	if !column.nullable {
		def.push_str(" NOT NULL");
	}
	if let Some(default) = &column.default {
		def.push_str(" DEFAULT ");
		def.push_str(default);
	}
	def
}

fn create_table(name: &str, table: &Table) -> String {
	let mut parts: Vec<String> = table.columns.iter().map(column_definition).collect();
	if !table.primary_key.is_empty() {
		parts.push(format!("PRIMARY KEY ({})", column_list(&table.primary_key)));
	}
	format!("CREATE TABLE {} ({})", quote(name), parts.join(", "))
}

fn create_index(table: &str, index: &Index) -> String {
	format!(
		"CREATE {}INDEX {} ON {} ({})",
		if index.unique { "UNIQUE " } else { "" },
		quote(&index.name),
		quote(table),
		column_list(&index.columns)
	)
}

/// Render changes as SQLite statements, in order.
///
/// A rebuild creates `_stk_new_<table>`, copies the shared columns, drops the
/// old table, renames the new one and recreates its indexes.
pub fn render_sqlite(changes: &[SchemaChange]) -> Vec<String> {
	let mut statements = Vec::new();
	for change in changes {
		match change {
			SchemaChange::AddTable(table) => {
				statements.push(create_table(&table.name, table));
				for index in table.indexes.values() {
					statements.push(create_index(&table.name, index));
				}
			}
			SchemaChange::DropTable(name) => {
				statements.push(format!("DROP TABLE {}", quote(name)));
			}
			SchemaChange::AddColumn { table, column } => {
				statements.push(format!(
					"ALTER TABLE {} ADD COLUMN {}",
					quote(table),
					column_definition(column)
				));
			}
			SchemaChange::DropColumn { table, column } => {
				statements.push(format!(
					"ALTER TABLE {} DROP COLUMN {}",
					quote(table),
					quote(column)
				));
			}
			SchemaChange::RebuildTable {
				to, copy_columns, ..
			} => {
				let temp = format!("{REBUILD_PREFIX}{}", to.name);
				statements.push(create_table(&temp, to));
				if !copy_columns.is_empty() {
					let columns = column_list(copy_columns);
					statements.push(format!(
						"INSERT INTO {} ({columns}) SELECT {columns} FROM {}",
						quote(&temp),
						quote(&to.name)
					));
				}
				statements.push(format!("DROP TABLE {}", quote(&to.name)));
				statements.push(format!(
					"ALTER TABLE {} RENAME TO {}",
					quote(&temp),
					quote(&to.name)
				));
				for index in to.indexes.values() {
					statements.push(create_index(&to.name, index));
				}
			}
			SchemaChange::AddIndex { table, index } => {
				statements.push(create_index(table, index));
			}
			SchemaChange::DropIndex { index, .. } => {
				statements.push(format!("DROP INDEX {}", quote(index)));
			}
		}
	}
	statements
}
